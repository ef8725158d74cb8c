
pub mod claims;
pub mod errors;
pub mod forge;
pub mod keyring;
pub mod opaque;

pub use claims::{AccessTokenClaims, RefreshTokenClaims};
pub use errors::TokenForgeError;
pub use forge::{MintedJwt, TokenForge};
pub use keyring::{JwkDocument, JwkSetDocument, TokenKeyring};
pub use opaque::{forge_api_key, forge_authorization_code, forge_opaque_secret, sha256_digest_hex, ApiKeyMaterial};
