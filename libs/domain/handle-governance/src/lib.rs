
pub mod alternatives;
pub mod errors;
pub mod matcher;
pub mod syntax;

pub use alternatives::forge_alternative_candidates;
pub use errors::HandleFault;
pub use matcher::{scan_registry, ProtectionHit};
pub use syntax::normalize_and_validate;
