// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/notification_dispatch.test.rs]
/**
 * =================================================================
 * APARATO: NOTIFICATION DISPATCH TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar las ventanas contractuales por canal:
 *           email 10/h; SMS 5/h y 20/día.
 * =================================================================
 */

use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::notification_dispatcher::NotificationDispatcher;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_notification::{
    NotificationChannel, NotificationKind, NotificationPayload, TracingSink,
};
use entativa_infra_cache::MemoryKeyValueStore;
use entativa_infra_db::TursoClient;
use std::sync::Arc;

async fn forge_state(label: &str) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_herald_{}?mode=memory&cache=shared", label),
        None,
    )
    .await
    .expect("Fallo al inicializar DB en memoria");

    AppState::forge_with_collaborators(
        client,
        AuthorityConfig::default(),
        Arc::new(FrozenClock::at(Utc::now())),
        Arc::new(MemoryKeyValueStore::new()),
        Arc::new(BloomBreachOracle::with_default_blocklist()),
        Arc::new(TracingSink),
        Arc::new(NoopGeoResolver),
    )
    .expect("ignición del estado colapsó")
}

fn forge_signal(recipient: &str) -> NotificationPayload {
    NotificationPayload::forge(
        NotificationKind::SecurityAlert,
        recipient,
        "NOTIF_SECURITY_ALERT",
        "{}",
        Utc::now(),
    )
}

#[tokio::test]
async fn certify_email_window_ten_per_hour() {
    let state = forge_state("email").await;
    let dispatcher = NotificationDispatcher::new(state);

    for _ in 0..10 {
        dispatcher
            .dispatch(
                NotificationChannel::Email,
                forge_signal("alice@entativa.id"),
                None,
            )
            .await
            .expect("despacho dentro de ventana colapsó");
    }

    // Undécimo: ventana agotada.
    let vetoed = dispatcher
        .dispatch(
            NotificationChannel::Email,
            forge_signal("alice@entativa.id"),
            None,
        )
        .await;
    assert!(matches!(vetoed, Err(AuthorityError::RateLimited { .. })));

    // Otro destinatario conserva su propia ventana.
    dispatcher
        .dispatch(
            NotificationChannel::Email,
            forge_signal("bob@entativa.id"),
            None,
        )
        .await
        .expect("la ventana es por destinatario");
}

#[tokio::test]
async fn certify_sms_dual_window() {
    let state = forge_state("sms").await;
    let dispatcher = NotificationDispatcher::new(state);

    for _ in 0..5 {
        dispatcher
            .dispatch(NotificationChannel::Sms, forge_signal("+5491100000001"), None)
            .await
            .expect("despacho SMS dentro de ventana colapsó");
    }

    // Sexto en la hora: veto de la ventana horaria.
    let vetoed = dispatcher
        .dispatch(NotificationChannel::Sms, forge_signal("+5491100000001"), None)
        .await;
    let Err(AuthorityError::RateLimited { action, .. }) = vetoed else {
        panic!("se esperaba veto de ventana SMS");
    };
    assert_eq!(action, "sms_send");
}

#[tokio::test]
async fn certify_push_channel_is_unmetered() {
    let state = forge_state("push").await;
    let dispatcher = NotificationDispatcher::new(state);

    for _ in 0..25 {
        dispatcher
            .dispatch(
                NotificationChannel::Push,
                forge_signal("device-token-abc"),
                None,
            )
            .await
            .expect("el canal push no porta ventana contractual");
    }
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/notification_dispatch.test.rs]
