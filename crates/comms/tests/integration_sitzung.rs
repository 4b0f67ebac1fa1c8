//! Integration-Tests fuer Host/Publikum-Sitzungen ueber das In-Process-Relay

use parking_lot::Mutex;
use podium_comms::{
    CommandPayload, Comms, CommsConfig, CommsError, CommsHandlers, PresenceUpdate,
    ResponsePayload,
};
use podium_core::{ClientId, Identity};
use podium_relay::{kanal, Credentials, MemoryRelay, PresenceAction, PresenceMessage, RelayMessage};
use serde_json::json;
use std::sync::Arc;

type Ablage<T> = Arc<Mutex<Vec<T>>>;

fn ablage<T>() -> Ablage<T> {
    Arc::new(Mutex::new(Vec::new()))
}

async fn teilnehmer(relay: &MemoryRelay, id: &str, handlers: CommsHandlers) -> Comms {
    let comms = Comms::neu(Arc::new(relay.clone()));
    comms
        .configure(
            CommsConfig::new(Identity::new(id, id), Credentials::Token("test-token".into())),
            handlers,
        )
        .await
        .expect("configure muss gelingen");
    comms
}

fn broadcast_sammler(ablage: &Ablage<RelayMessage>) -> CommsHandlers {
    let a = Arc::clone(ablage);
    CommsHandlers::new().on_broadcast(move |m| a.lock().push(m))
}

#[tokio::test]
async fn host_sendet_befehl_publikum_antwortet() {
    let relay = MemoryRelay::neu();
    let antworten = ablage::<RelayMessage>();
    let empfangen = ablage::<RelayMessage>();

    let a = Arc::clone(&antworten);
    let host = teilnehmer(&relay, "host", CommsHandlers::new().on_response(move |m| a.lock().push(m))).await;
    let publikum = teilnehmer(&relay, "gast", broadcast_sammler(&empfangen)).await;

    host.start("Host", true).await.unwrap();
    publikum.start("Gast", false).await.unwrap();

    host.broadcast("show-slide", json!({"slideId": "s1"})).await.unwrap();

    let befehle = empfangen.lock().clone();
    assert_eq!(befehle.len(), 1);
    assert_eq!(befehle[0].name, "broadcast");
    let befehl = CommandPayload::aus_nachricht(&befehle[0]).unwrap();
    assert_eq!(befehl.command, "show-slide");
    assert_eq!(befehl.context, json!({"slideId": "s1"}));

    publikum
        .send_message(json!("Antwort B"), json!({"slideId": "s1"}))
        .await
        .unwrap();

    let erhalten = antworten.lock().clone();
    assert_eq!(erhalten.len(), 1);
    assert_eq!(erhalten[0].name, "response");
    assert_eq!(erhalten[0].client_id, ClientId::new("gast"));
    let antwort = ResponsePayload::aus_nachricht(&erhalten[0]).unwrap();
    assert_eq!(antwort.message, json!("Antwort B"));
    assert_eq!(antwort.context["slideId"], "s1");
}

#[tokio::test]
async fn private_nachricht_erreicht_nur_den_empfaenger() {
    let relay = MemoryRelay::neu();
    let bei_a = ablage::<RelayMessage>();
    let bei_b = ablage::<RelayMessage>();

    let host = teilnehmer(&relay, "host", CommsHandlers::new()).await;
    let a = teilnehmer(&relay, "a", broadcast_sammler(&bei_a)).await;
    let b = teilnehmer(&relay, "b", broadcast_sammler(&bei_b)).await;

    host.start("Host", true).await.unwrap();
    a.start("A", false).await.unwrap();
    b.start("B", false).await.unwrap();

    host.send_private_message(&ClientId::new("b"), "sync", json!({"slideId": "s2"}))
        .await
        .unwrap();

    assert!(bei_a.lock().is_empty());
    let nachrichten = bei_b.lock().clone();
    assert_eq!(nachrichten.len(), 1);
    assert_eq!(nachrichten[0].name, "broadcast");
    assert_eq!(CommandPayload::aus_nachricht(&nachrichten[0]).unwrap().command, "sync");
}

#[tokio::test]
async fn send_verwendet_typ_als_ereignisname() {
    let relay = MemoryRelay::neu();
    let antworten = ablage::<RelayMessage>();
    let a = Arc::clone(&antworten);

    let host = teilnehmer(&relay, "host", CommsHandlers::new().on_response(move |m| a.lock().push(m))).await;
    let gast = teilnehmer(&relay, "gast", CommsHandlers::new()).await;
    host.start("Host", true).await.unwrap();
    gast.start("Gast", false).await.unwrap();

    gast.send("vote", json!({"choice": 2})).await.unwrap();

    let erhalten = antworten.lock().clone();
    assert_eq!(erhalten.len(), 1);
    assert_eq!(erhalten[0].name, "vote");
    assert_eq!(erhalten[0].data, json!({"choice": 2}));
}

#[tokio::test]
async fn host_beobachtet_presence() {
    let relay = MemoryRelay::neu();
    let ereignisse = ablage::<PresenceMessage>();

    let (e1, e2, e3) = (Arc::clone(&ereignisse), Arc::clone(&ereignisse), Arc::clone(&ereignisse));
    let handlers = CommsHandlers::new()
        .on_presence_enter(move |m| e1.lock().push(m))
        .on_presence_update(move |m| e2.lock().push(m))
        .on_presence_leave(move |m| e3.lock().push(m));

    let host = teilnehmer(&relay, "host", handlers).await;
    host.start("Host", true).await.unwrap();

    let gast = teilnehmer(&relay, "gast", CommsHandlers::new()).await;
    gast.start("Gast", false).await.unwrap();
    gast.update_presence_data(PresenceUpdate::leer().mit("punkte", 5)).await.unwrap();
    gast.stop().await;

    let ereignisse = ereignisse.lock().clone();
    let aktionen: Vec<_> = ereignisse
        .iter()
        .filter(|e| e.client_id.as_str() == "gast")
        .map(|e| e.action)
        .collect();
    assert_eq!(
        aktionen,
        vec![PresenceAction::Enter, PresenceAction::Update, PresenceAction::Leave]
    );

    let betreten = &ereignisse.iter().find(|e| e.client_id.as_str() == "gast").unwrap().data;
    assert_eq!(betreten, &json!({"type": "user", "name": "Gast"}));
}

#[tokio::test]
async fn publikum_hoert_nicht_auf_antwort_kanal() {
    let relay = MemoryRelay::neu();
    let handlers = CommsHandlers::new()
        .on_broadcast(|_| {})
        .on_response(|_| {})
        .on_presence_enter(|_| {});

    let gast = teilnehmer(&relay, "gast", handlers).await;
    gast.start("Gast", false).await.unwrap();

    assert_eq!(relay.abonnenten_anzahl(kanal::ANTWORT), 0);
    assert_eq!(relay.presence_abonnenten_anzahl(kanal::ANTWORT), 0);
    assert_eq!(relay.abonnenten_anzahl(kanal::BROADCAST_ALLE), 1);
    assert_eq!(relay.abonnenten_anzahl("broadcast:gast"), 1);
    assert!(!gast.ist_host().await);
}

#[tokio::test]
async fn fehlende_handler_werden_nicht_abonniert() {
    let relay = MemoryRelay::neu();
    let host = teilnehmer(&relay, "host", CommsHandlers::new().on_presence_leave(|_| {})).await;
    host.start("Host", true).await.unwrap();

    let s = relay.statistik();
    assert_eq!(s.abonniert, 0);
    assert_eq!(s.presence_abonniert, 1);
    assert!(host.ist_host().await);
}

#[tokio::test]
async fn get_users_normalisiert_user_id() {
    let relay = MemoryRelay::neu();
    let host = teilnehmer(&relay, "host", CommsHandlers::new()).await;
    let gast = teilnehmer(&relay, "gast", CommsHandlers::new()).await;

    host.start("Host", true).await.unwrap();
    gast.update_presence_data(PresenceUpdate::leer().mit("userId", "falsch"))
        .await
        .unwrap();
    gast.start("Gast", false).await.unwrap();

    let nutzer = host.get_users().await.unwrap();
    assert_eq!(nutzer.len(), 2);
    assert_eq!(nutzer[0].user_id.as_str(), "host");
    assert_eq!(nutzer[1].user_id.as_str(), "gast");
    assert_eq!(nutzer[1].name(), Some("Gast"));
    assert!(!nutzer[1].felder.contains_key("userId"));
    assert_eq!(nutzer[1].felder["type"], "user");
}

#[tokio::test]
async fn get_users_scheitert_bei_abfragefehler() {
    let relay = MemoryRelay::neu();
    let host = teilnehmer(&relay, "host", CommsHandlers::new()).await;
    host.start("Host", true).await.unwrap();

    relay.presence_fehler_setzen(Some("Relay nicht erreichbar".into()));
    let fehler = host.get_users().await.unwrap_err();
    assert!(matches!(fehler, CommsError::Relay(_)));
    assert!(fehler.to_string().contains("Relay nicht erreichbar"));

    relay.presence_fehler_setzen(None);
    assert_eq!(host.get_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn nachrichten_ohne_start_scheitern() {
    let relay = MemoryRelay::neu();
    let comms = teilnehmer(&relay, "x", CommsHandlers::new()).await;

    assert!(matches!(comms.send("a", json!(null)).await, Err(CommsError::NichtGestartet)));
    assert!(matches!(
        comms.send_message(json!("m"), json!({})).await,
        Err(CommsError::NichtGestartet)
    ));
    assert!(matches!(
        comms.broadcast("c", json!({})).await,
        Err(CommsError::NichtGestartet)
    ));
    assert!(matches!(
        comms.send_private_message(&ClientId::new("y"), "c", json!({})).await,
        Err(CommsError::NichtGestartet)
    ));
    assert!(matches!(comms.get_users().await, Err(CommsError::NichtGestartet)));
    assert_eq!(relay.statistik().publiziert, 0);
}
