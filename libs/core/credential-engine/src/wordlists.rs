// [libs/core/credential-engine/src/wordlists.rs]
/*!
 * =================================================================
 * APARATO: CURATED LEXICON REGISTRY (V1.3)
 * CLASIFICACIÓN: CORE SECURITY DATA (ESTRATO L1)
 * RESPONSABILIDAD: MATERIAL LÉXICO DEL ESCRUTINIO Y DEL FORJADOR
 *
 * VISION HIPER-HOLÍSTICA:
 * Dos listas curadas alimentan al forjador (común y segura); los
 * fragmentos de diccionario, las ráfagas de teclado y las frases
 * célebres alimentan las penalizaciones del escrutinio. El registro
 * de brechas local siembra el filtro de Bloom del oráculo.
 * =================================================================
 */

/// Lista común: palabras cortas de alta memorabilidad para el forjador.
pub const COMMON_WORDLIST: &[&str] = &[
    "amber", "anchor", "apple", "arrow", "autumn", "badge", "bamboo", "basil",
    "beacon", "birch", "blossom", "breeze", "bridge", "bronze", "cabin", "candle",
    "canyon", "cedar", "cherry", "cliff", "clover", "cobalt", "comet", "coral",
    "cotton", "creek", "crystal", "dawn", "delta", "desert", "drift", "eagle",
    "ember", "fable", "falcon", "feather", "fern", "flint", "forest", "fossil",
    "galaxy", "garnet", "ginger", "glacier", "grove", "harbor", "hazel", "horizon",
    "island", "ivory", "jasper", "juniper", "lagoon", "lantern", "lark", "lava",
    "lemon", "lilac", "linen", "lotus", "maple", "marble", "meadow", "mesa",
    "mist", "moss", "nectar", "nimbus", "north", "oasis", "ocean", "olive",
    "onyx", "opal", "orbit", "orchid", "otter", "pebble", "pepper", "pine",
    "plume", "prairie", "prism", "quartz", "raven", "reef", "ridge", "river",
    "rowan", "saffron", "sage", "sierra", "silver", "sparrow", "spruce", "summit",
    "sunset", "thistle", "thunder", "tidal", "timber", "topaz", "tulip", "tundra",
    "velvet", "violet", "walnut", "willow", "winter", "zephyr",
];

/// Lista segura: palabras más largas y de menor frecuencia estadística.
pub const SECURE_WORDLIST: &[&str] = &[
    "abundance", "alabaster", "amaranth", "anthracite", "aqueduct", "arbitrage",
    "archipelago", "armature", "asteroid", "atrium", "ballast", "barometer",
    "bastion", "bellwether", "bifurcate", "bramble", "buttress", "cadence",
    "caldera", "campanile", "cartography", "cascade", "catalyst", "chrysalis",
    "citadel", "colonnade", "conduit", "cornice", "crucible", "cupola",
    "dirigible", "dolomite", "dynamo", "eiderdown", "entablature", "ephemeral",
    "escarpment", "estuary", "filament", "firmament", "fulcrum", "gossamer",
    "gradient", "hinterland", "hourglass", "incandescent", "inflection", "isthmus",
    "juggernaut", "keystone", "labyrinth", "lighthouse", "lodestone", "luminary",
    "mangrove", "mezzanine", "monolith", "moraine", "obelisk", "obsidian",
    "palisade", "parallax", "peninsula", "perihelion", "phosphor", "pinnacle",
    "porcelain", "quicksilver", "rampart", "resonance", "sandstone", "sediment",
    "spillway", "stalactite", "stratosphere", "sycamore", "tessellate", "threshold",
    "tourmaline", "travertine", "turbine", "vanguard", "vellum", "verdigris",
    "vestibule", "watershed", "whetstone", "windlass", "zenith", "ziggurat",
];

/// Fragmentos de diccionario penalizados dentro de contraseñas.
pub const DICTIONARY_FRAGMENTS: &[&str] = &[
    "password", "passwort", "contrasena", "admin", "welcome", "dragon", "monkey",
    "letmein", "master", "shadow", "sunshine", "princess", "football", "baseball",
    "superman", "batman", "trustno", "iloveyou", "secret", "freedom", "whatever",
    "qwerty", "login", "access", "hello", "ninja", "mustang", "michael",
    "jordan", "harley", "ranger", "soccer", "hockey", "killer", "george",
    "charlie", "andrew", "thomas", "jessica", "daniel", "hunter", "summer",
    "winter", "entativa",
];

/// Ráfagas de teclado detectables en cualquier posición.
pub const KEYBOARD_RUNS: &[&str] = &[
    "qwerty", "qwertz", "azerty", "asdf", "asdfgh", "zxcv", "zxcvbn",
    "12345", "123456", "1234567", "12345678", "123456789", "987654321",
    "abcdef", "abcde", "1qaz", "2wsx", "qazwsx", "0987",
];

/// Frases célebres penalizadas dentro de passphrases.
pub const COMMON_PHRASES: &[&str] = &[
    "correct horse battery staple",
    "the quick brown fox",
    "to be or not to be",
    "mary had a little lamb",
    "may the force be with you",
    "once upon a time",
    "all that glitters is not gold",
    "a journey of a thousand miles",
];

/// Registro local de credenciales quemadas (siembra del oráculo Bloom).
pub const BREACH_BLOCKLIST: &[&str] = &[
    "123456", "123456789", "12345678", "12345", "1234567", "1234567890",
    "password", "password1", "password123", "passw0rd", "p@ssw0rd",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "111111", "123123",
    "000000", "iloveyou", "dragon", "monkey", "sunshine", "princess",
    "letmein", "welcome", "welcome1", "admin", "admin123", "root",
    "football", "baseball", "superman", "batman", "trustno1", "master",
    "shadow", "michael", "jennifer", "jordan23", "harley", "ranger",
    "soccer", "hockey", "killer", "charlie", "donald", "freedom",
    "whatever", "nicole", "daniel", "babygirl", "lovely", "jessica",
    "666666", "777777", "159753", "696969", "112233", "121212",
    "asdfgh", "zxcvbnm", "1q2w3e4r", "q1w2e3r4", "1qaz2wsx", "zaq12wsx",
    "pokemon", "starwars", "computer", "internet", "samsung", "google",
    "secret", "summer09", "flower", "hottie", "loveme", "ashley",
];
