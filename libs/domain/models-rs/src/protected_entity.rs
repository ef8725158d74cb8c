// INICIO DEL ARCHIVO [libs/domain/models-rs/src/protected_entity.rs]
/*!
 * =================================================================
 * APARATO: PROTECTED ENTITY MODELS (V2.1 - REGISTRY SOBERANO)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: REGISTRO CATEGORIZADO ANTI-SUPLANTACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CATEGORY ORDERING: El orden de desempate entre categorías es una
 *    tabla fija (dispatch_priority); jamás se infiere del almacén.
 * 2. VERDICT CONTRACT: ProtectionVerdict transporta el resultado
 *    completo del escrutinio hacia el estrato de gobernanza L4.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Categorías del registro de entidades protegidas.
///
/// El desempate entre coincidencias de igual similitud respeta el orden
/// fijo de `dispatch_priority` (menor gana).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectedCategory {
    Celebrity,
    Government,
    Business,
    Brand,
    Academic,
    Media,
    Sports,
    Community,
}

impl ProtectedCategory {
    /// Tabla fija de precedencia para el desempate de coincidencias.
    pub const DISPATCH_ORDER: [ProtectedCategory; 8] = [
        Self::Celebrity,
        Self::Government,
        Self::Business,
        Self::Brand,
        Self::Academic,
        Self::Media,
        Self::Sports,
        Self::Community,
    ];

    pub fn dispatch_priority(&self) -> u8 {
        Self::DISPATCH_ORDER
            .iter()
            .position(|candidate| candidate == self)
            .unwrap_or(u8::MAX as usize) as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celebrity => "CELEBRITY",
            Self::Government => "GOVERNMENT",
            Self::Business => "BUSINESS",
            Self::Brand => "BRAND",
            Self::Academic => "ACADEMIC",
            Self::Media => "MEDIA",
            Self::Sports => "SPORTS",
            Self::Community => "COMMUNITY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CELEBRITY" => Some(Self::Celebrity),
            "GOVERNMENT" => Some(Self::Government),
            "BUSINESS" => Some(Self::Business),
            "BRAND" => Some(Self::Brand),
            "ACADEMIC" => Some(Self::Academic),
            "MEDIA" => Some(Self::Media),
            "SPORTS" => Some(Self::Sports),
            "COMMUNITY" => Some(Self::Community),
            _ => None,
        }
    }
}

/// Registro de una entidad del mundo real bajo protección de namespace.
///
/// # Invariante:
/// `canonical_handle` es único dentro de la unión de todas las categorías.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedEntity {
    pub id: Uuid,
    /// Handle canónico ya normalizado (NFC + minúsculas).
    pub canonical_handle: String,
    /// Alias normalizados (variantes, abreviaturas, marcas secundarias).
    pub aliases: Vec<String>,
    pub category: ProtectedCategory,
    pub display_name: String,
    /// Metadatos de soporte (capitalización de mercado, año Nobel, etc.).
    pub metadata_json: Option<String>,
    /// Si la reclamación exige verificación documental del titular.
    pub requires_verification: bool,
    pub created_at: DateTime<Utc>,
}

/// Naturaleza de la coincidencia que disparó la protección.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionKind {
    /// Reserva del sistema (tabla reserved_handles o fail-secure).
    System,
    /// Coincidencia exacta con el handle canónico.
    Exact,
    /// Coincidencia exacta con un alias registrado.
    AliasExact,
    /// Coincidencia difusa con el handle canónico.
    Fuzzy,
    /// Coincidencia difusa con un alias registrado.
    AliasFuzzy,
}

/// Contrato de resultado del escrutinio de protección de handle.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionVerdict {
    pub protected: bool,
    pub protection_kind: Option<ProtectionKind>,
    pub category: Option<ProtectedCategory>,
    /// Explicación legible de la decisión para el estrato de consentimiento.
    pub reason: Option<String>,
    pub suggested_alternatives: Vec<String>,
    pub requires_verification: bool,
    /// Ratio de similitud Levenshtein cuando la coincidencia fue difusa.
    pub similarity_score: Option<f64>,
}

impl ProtectionVerdict {
    /// Veredicto de disponibilidad: el handle no colisiona con el registro.
    pub fn clear() -> Self {
        Self {
            protected: false,
            protection_kind: None,
            category: None,
            reason: None,
            suggested_alternatives: Vec::new(),
            requires_verification: false,
            similarity_score: None,
        }
    }

    /// Veredicto fail-secure: ante un registro inalcanzable se deniega todo.
    pub fn fail_secure(reason: impl Into<String>) -> Self {
        Self {
            protected: true,
            protection_kind: Some(ProtectionKind::System),
            category: None,
            reason: Some(reason.into()),
            suggested_alternatives: Vec::new(),
            requires_verification: true,
            similarity_score: None,
        }
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/protected_entity.rs]
