
pub mod audit;
pub mod identity;
pub mod mfa;
pub mod oauth_client;
pub mod oauth_flow;
pub mod protected_entity;
pub mod reservation;
pub mod session;
pub mod token;

pub use identity::{Identity, IdentityStatus, Profile, FieldVisibility, VerificationStatus, VerificationBadge, RegisterIdentityPayload};
pub use protected_entity::{ProtectedCategory, ProtectedEntity, ProtectionKind, ProtectionVerdict};
pub use reservation::{ReservationRequest, ReservationStatus, HandleChangeHistory};
pub use oauth_client::{OAuthClient, ClientStatus, GrantKind, PkcePolicy};
pub use oauth_flow::{AuthorizationCode, AuthorizationFlowState, PendingAuthorization, CodeChallengeMethod};
pub use token::{TokenRecord, TokenKind, SecurityLevel};
pub use session::Session;
pub use mfa::{MfaMethod, MfaKind, BackupCode};
pub use audit::{AuditEvent, AuditAction, LawfulBasis};
