// [libs/domain/notification/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HERALD NOTIFICATION CONTRACT (V2.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GRAMÁTICA DE SEÑALES Y CONTRATO DE DESPACHO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CAPABILITY BOUNDARY: El núcleo solo conoce NotificationSink;
 *    SMTP, SMS y push son colaboradores inyectados desde afuera.
 * 2. CONTRACT SOVEREIGNTY: Define la gramática inmutable de las
 *    señales que viajan del Núcleo hacia los canales de entrega.
 * 3. RATE AWARENESS: Los límites por canal (email 10/h, SMS 5/h y
 *    20/día) los custodia el despachador del estrato L4 sobre el
 *    KeyValueStore; este contrato solo nombra los canales.
 * =================================================================
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typeshare::typeshare;
use uuid::Uuid;

/// Canal físico de entrega de la señal.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
        }
    }
}

/// Clase semántica de la señal emitida por el núcleo.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// OTP de desafío MFA (SMS/email).
    MfaChallenge,
    /// Alerta de inicio de sesión desde dispositivo nuevo.
    NewDeviceLogin,
    /// Aviso de cambio de contraseña.
    PasswordChanged,
    /// Dictamen de una reserva de handle.
    ReservationVerdict,
    /// Alerta de seguridad (lockout, replay, factor desactivado).
    SecurityAlert,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MfaChallenge => "mfa_challenge",
            Self::NewDeviceLogin => "new_device_login",
            Self::PasswordChanged => "password_changed",
            Self::ReservationVerdict => "reservation_verdict",
            Self::SecurityAlert => "security_alert",
        }
    }
}

/// Unidad atómica de comunicación hacia un canal de entrega.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Identificador único universal (UUID v4) de la señal.
    pub identifier: Uuid,
    pub kind: NotificationKind,
    /// Destinatario en la gramática del canal (email, E.164, device token).
    pub recipient: String,
    /// Llave de plantilla (i18n) para el renderizado externo.
    pub template_key: String,
    /// Variables de plantilla en formato JSON.
    pub variables_json: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationPayload {
    pub fn forge(
        kind: NotificationKind,
        recipient: impl Into<String>,
        template_key: impl Into<String>,
        variables_json: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            kind,
            recipient: recipient.into(),
            template_key: template_key.into(),
            variables_json: variables_json.into(),
            created_at,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotificationError {
    /// El canal externo rechazó o no pudo procesar la señal.
    #[error("[L2_HERALD_FAULT]: CHANNEL_DELIVERY_REJECTED -> {0}")]
    DeliveryRejected(String),

    /// El canal externo no respondió (clase transitoria).
    #[error("[L2_HERALD_FAULT]: CHANNEL_UNREACHABLE -> {0}")]
    ChannelUnreachable(String),
}

/// Contrato único de despacho hacia los canales externos.
///
/// Las implementaciones reales (SMTP, SMS gateway, push broker) viven
/// fuera del núcleo y se inyectan en la ignición del Kernel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        channel: NotificationChannel,
        payload: &NotificationPayload,
    ) -> Result<(), NotificationError>;
}

/// Sink de desarrollo: emite la señal como traza estructurada.
/// Sustituido en despliegues por los colaboradores reales.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn send(
        &self,
        channel: NotificationChannel,
        payload: &NotificationPayload,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            channel = channel.as_str(),
            kind = payload.kind.as_str(),
            template = %payload.template_key,
            "📨 [HERALD_DISPATCH]: Signal {} emitted.",
            payload.identifier
        );
        Ok(())
    }
}
