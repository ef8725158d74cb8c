
pub mod breach;
pub mod errors;
pub mod generator;
pub mod passphrase;
pub mod password;
pub mod wordlists;

pub use breach::{BloomBreachOracle, BreachOracle};
pub use errors::CredentialError;
pub use generator::{PassphraseForge, PassphraseRecipe};
pub use passphrase::{evaluate_passphrase, PassphraseReport};
pub use password::{evaluate_password, PasswordContext, PasswordReport, StrengthOrdinal};
