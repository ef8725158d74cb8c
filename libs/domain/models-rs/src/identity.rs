// INICIO DEL ARCHIVO [libs/domain/models-rs/src/identity.rs]
/*!
 * =================================================================
 * APARATO: IDENTITY DOMAIN MODELS (V3.2 - SOVEREIGN EID)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: DEFINICIÓN DE IDENTIDADES, PERFILES Y PAYLOADS
 *
 * VISION HIPER-HOLÍSTICA:
 * La entidad Identity es la raíz de agregación del ecosistema: una
 * sola fila por (email) y por (eid). El Profile viaja como satélite
 * 1:1 con visibilidad por campo para el estrato de privacidad.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Estados del ciclo de vida de una Identidad Soberana.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    Active,
    Locked,
    Suspended,
    Deleted,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "locked" => Some(Self::Locked),
            "suspended" => Some(Self::Suspended),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Estado del escrutinio de verificación de la identidad real.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "unverified" => Some(Self::Unverified),
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }
}

/// Insignia visual otorgada tras la verificación de entidad protegida.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationBadge {
    /// Persona pública verificada (celebridad, figura gubernamental).
    Notable,
    /// Organización o marca verificada.
    Organization,
    /// Cuenta institucional del propio sistema.
    System,
}

impl VerificationBadge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notable => "notable",
            Self::Organization => "organization",
            Self::System => "system",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "notable" => Some(Self::Notable),
            "organization" => Some(Self::Organization),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Entidad de Identidad Soberana (raíz de agregación del núcleo).
///
/// # Invariantes:
/// - A lo sumo una identidad por `email` y por `eid`.
/// - `password_hash` es material bcrypt (coste >= 12); jamás texto plano.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    /// Identificador humano globalmente único (Entativa ID).
    pub eid: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Material bcrypt. Nunca viaja hacia el Dashboard.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: IdentityStatus,
    pub verification_status: VerificationStatus,
    pub verification_badge: Option<VerificationBadge>,
    /// Puntaje de reputación federado [0.0, 100.0].
    pub reputation_score: f64,
    /// Contador durable de intentos fallidos de autenticación.
    pub failed_login_attempts: u32,
    /// Veto temporal de autenticación (lockout).
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Rastro forense de la creación de la cuenta.
    pub created_ip: Option<String>,
    pub created_user_agent: Option<String>,
}

impl Identity {
    /// Determina si la identidad se encuentra bajo veto temporal activo.
    ///
    /// Un veto con fecha (`locked_until`) expira solo; el estado Locked
    /// sin fecha es un bloqueo administrativo sin expiración.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(until) => until > now,
            None => matches!(self.status, IdentityStatus::Locked),
        }
    }
}

/// Visibilidad por campo del perfil satélite.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldVisibility {
    Public,
    Friends,
    Private,
}

impl FieldVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Friends => "friends",
            Self::Private => "private",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "public" => Some(Self::Public),
            "friends" => Some(Self::Friends),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Perfil 1:1 con la Identidad. Su ciclo de vida sigue al de la raíz.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub identity_id: Uuid,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
    /// Año de nacimiento; alimenta las penalizaciones del escrutinio de credenciales.
    pub birth_year: Option<i32>,
    pub location: Option<String>,
    pub website_url: Option<String>,
    pub display_name_visibility: FieldVisibility,
    pub email_visibility: FieldVisibility,
    pub phone_visibility: FieldVisibility,
    pub birth_visibility: FieldVisibility,
    pub location_visibility: FieldVisibility,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Perfil mínimo con visibilidad conservadora por defecto.
    pub fn bootstrap_for(identity_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            identity_id,
            display_name: None,
            given_name: None,
            family_name: None,
            biography: None,
            avatar_url: None,
            birth_year: None,
            location: None,
            website_url: None,
            display_name_visibility: FieldVisibility::Public,
            email_visibility: FieldVisibility::Private,
            phone_visibility: FieldVisibility::Private,
            birth_visibility: FieldVisibility::Private,
            location_visibility: FieldVisibility::Friends,
            updated_at: now,
        }
    }
}

/// DTO de ingesta para el registro de una nueva identidad.
#[typeshare]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterIdentityPayload {
    pub eid: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub birth_year: Option<i32>,
    pub request_ip: Option<String>,
    pub request_user_agent: Option<String>,
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/identity.rs]
