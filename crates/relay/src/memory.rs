//! In-Process-Relay
//!
//! Vollstaendige Implementierung des Relay-Vertrags im eigenen Prozess.
//! Alle Verbindungen, die ueber denselben [`MemoryRelay`] aufgebaut werden,
//! teilen Kanaele und Presence-Mengen. Zustellung erfolgt synchron in
//! Publish-Reihenfolge, ohne Puffer.
//!
//! Zusaetzlich laesst sich das Relay fuer Tests steuern:
//! - Verbindungszustand einzelner Clients setzen (`zustand_setzen`)
//! - Startzustand neuer Verbindungen festlegen (`start_zustand_setzen`)
//! - Presence-Abfragen fehlschlagen lassen (`presence_fehler_setzen`)
//! - Aufrufe zaehlen (`statistik`)

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use podium_core::ClientId;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;

use crate::channel::{RelayChannel, RelayConnection, RelayConnector};
use crate::error::{RelayError, RelayResult};
use crate::presence::{PresenceAbonnent, PresenceSet};
use crate::types::{
    ClientOptions, ConnectionState, Credentials, MessageHandler, PresenceAction,
    PresenceHandler, PresenceMember, PresenceMessage, RelayMessage, SubscriptionId,
};

// ---------------------------------------------------------------------------
// Kanal-Zustand
// ---------------------------------------------------------------------------

/// Nachrichten-Abonnent eines Kanals
#[derive(Clone)]
struct Abonnent {
    id: SubscriptionId,
    verbindung: u64,
    handler: MessageHandler,
}

#[derive(Default)]
struct KanalZustand {
    abonnenten: Vec<Abonnent>,
    presence: PresenceSet,
}

// ---------------------------------------------------------------------------
// Statistik
// ---------------------------------------------------------------------------

/// Momentaufnahme der gezaehlten Relay-Aufrufe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStatistik {
    pub verbindungen: usize,
    pub abonniert: usize,
    pub abbestellt: usize,
    pub presence_abonniert: usize,
    pub presence_abbestellt: usize,
    pub presence_betreten: usize,
    pub presence_aktualisiert: usize,
    pub presence_verlassen: usize,
    pub publiziert: usize,
    pub geschlossen: usize,
}

#[derive(Default)]
struct Zaehler {
    verbindungen: AtomicUsize,
    abonniert: AtomicUsize,
    abbestellt: AtomicUsize,
    presence_abonniert: AtomicUsize,
    presence_abbestellt: AtomicUsize,
    presence_betreten: AtomicUsize,
    presence_aktualisiert: AtomicUsize,
    presence_verlassen: AtomicUsize,
    publiziert: AtomicUsize,
    geschlossen: AtomicUsize,
}

fn zaehlen(z: &AtomicUsize) {
    z.fetch_add(1, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// MemoryRelay
// ---------------------------------------------------------------------------

/// In-Process-Relay fuer Tests und lokale Sitzungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct MemoryRelay {
    inner: Arc<MemoryRelayInner>,
}

struct MemoryRelayInner {
    /// Kanalname -> Abonnenten und Presence
    kanaele: DashMap<String, KanalZustand>,
    /// Zuletzt aufgebaute Verbindung je Client (fuer Zustandssteuerung)
    verbindungen: DashMap<ClientId, (u64, Arc<watch::Sender<ConnectionState>>)>,
    /// Zustand, mit dem neue Verbindungen starten
    start_zustand: RwLock<ConnectionState>,
    /// Gesetzt: Presence-Abfragen schlagen mit dieser Meldung fehl
    presence_fehler: Mutex<Option<String>>,
    naechste_id: AtomicU64,
    zaehler: Zaehler,
}

impl MemoryRelay {
    /// Erstellt ein Relay, dessen Verbindungen sofort `Connected` sind
    pub fn neu() -> Self {
        Self::mit_start_zustand(ConnectionState::Connected)
    }

    /// Erstellt ein Relay, dessen Verbindungen in `zustand` starten
    pub fn mit_start_zustand(zustand: ConnectionState) -> Self {
        Self {
            inner: Arc::new(MemoryRelayInner {
                kanaele: DashMap::new(),
                verbindungen: DashMap::new(),
                start_zustand: RwLock::new(zustand),
                presence_fehler: Mutex::new(None),
                naechste_id: AtomicU64::new(1),
                zaehler: Zaehler::default(),
            }),
        }
    }

    /// Legt den Startzustand fuer zukuenftige Verbindungen fest
    pub fn start_zustand_setzen(&self, zustand: ConnectionState) {
        *self.inner.start_zustand.write() = zustand;
    }

    /// Setzt den Verbindungszustand der zuletzt aufgebauten Verbindung eines Clients
    ///
    /// Gibt `false` zurueck wenn der Client nie verbunden war.
    pub fn zustand_setzen(&self, client_id: &ClientId, zustand: ConnectionState) -> bool {
        match self.inner.verbindungen.get(client_id) {
            Some(eintrag) => {
                eintrag.1.send_replace(zustand);
                tracing::debug!(client_id = %client_id, zustand = %zustand, "Zustand gesetzt");
                true
            }
            None => false,
        }
    }

    /// Laesst Presence-Abfragen fehlschlagen (`None` hebt das wieder auf)
    pub fn presence_fehler_setzen(&self, meldung: Option<String>) {
        *self.inner.presence_fehler.lock() = meldung;
    }

    /// Gezaehlte Aufrufe seit Erstellung
    pub fn statistik(&self) -> RelayStatistik {
        let z = &self.inner.zaehler;
        let lesen = |a: &AtomicUsize| a.load(Ordering::Relaxed);
        RelayStatistik {
            verbindungen: lesen(&z.verbindungen),
            abonniert: lesen(&z.abonniert),
            abbestellt: lesen(&z.abbestellt),
            presence_abonniert: lesen(&z.presence_abonniert),
            presence_abbestellt: lesen(&z.presence_abbestellt),
            presence_betreten: lesen(&z.presence_betreten),
            presence_aktualisiert: lesen(&z.presence_aktualisiert),
            presence_verlassen: lesen(&z.presence_verlassen),
            publiziert: lesen(&z.publiziert),
            geschlossen: lesen(&z.geschlossen),
        }
    }

    /// Anzahl aktiver Nachrichten-Abonnements auf einem Kanal
    pub fn abonnenten_anzahl(&self, kanal: &str) -> usize {
        self.inner
            .kanaele
            .get(kanal)
            .map(|k| k.abonnenten.len())
            .unwrap_or(0)
    }

    /// Anzahl aktiver Presence-Abonnements auf einem Kanal
    pub fn presence_abonnenten_anzahl(&self, kanal: &str) -> usize {
        self.inner
            .kanaele
            .get(kanal)
            .map(|k| k.presence.abonnenten_anzahl())
            .unwrap_or(0)
    }

    /// Presence-Menge eines Kanals
    pub fn presence_mitglieder(&self, kanal: &str) -> Vec<PresenceMember> {
        self.inner
            .kanaele
            .get(kanal)
            .map(|k| k.presence.mitglieder())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn naechste_abo_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.naechste_id.fetch_add(1, Ordering::Relaxed))
    }

    fn presence_verteilen(&self, handler: Vec<PresenceHandler>, nachricht: PresenceMessage) {
        for h in handler {
            h(nachricht.clone());
        }
    }

    /// Gibt alle Ressourcen einer Verbindung frei (implizites Presence-Leave)
    fn verbindung_freigeben(&self, verbindung: u64) {
        let mut abgang = Vec::new();
        self.inner.kanaele.iter_mut().for_each(|mut kanal| {
            kanal.abonnenten.retain(|a| a.verbindung != verbindung);
            let entfernt = kanal.presence.verbindung_austragen(verbindung);
            let handler = kanal.presence.handler_fuer(PresenceAction::Leave);
            for mitglied in entfernt {
                abgang.push((handler.clone(), mitglied));
            }
        });

        for (handler, mitglied) in abgang {
            self.presence_verteilen(
                handler,
                PresenceMessage {
                    action: PresenceAction::Leave,
                    client_id: mitglied.client_id,
                    data: mitglied.data,
                },
            );
        }
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::neu()
    }
}

impl RelayConnector for MemoryRelay {
    fn connect(&self, options: ClientOptions) -> RelayResult<Arc<dyn RelayConnection>> {
        let leer = match &options.credentials {
            Credentials::Token(t) => t.trim().is_empty(),
            Credentials::AuthUrl(u) => u.trim().is_empty(),
        };
        if leer {
            return Err(RelayError::Authentifizierung(
                "Weder Token noch Auth-URL angegeben".into(),
            ));
        }

        let client_id = options.identity.id;
        let verbindung = self.inner.naechste_id.fetch_add(1, Ordering::Relaxed);
        let start = *self.inner.start_zustand.read();
        let (tx, rx) = watch::channel(start);
        let tx = Arc::new(tx);

        self.inner
            .verbindungen
            .insert(client_id.clone(), (verbindung, Arc::clone(&tx)));
        zaehlen(&self.inner.zaehler.verbindungen);
        tracing::info!(client_id = %client_id, zustand = %start, "Relay-Client erstellt");

        Ok(Arc::new(MemoryConnection {
            relay: self.clone(),
            client_id,
            verbindung,
            zustand_tx: tx,
            zustand_rx: rx,
        }))
    }
}

// ---------------------------------------------------------------------------
// MemoryConnection
// ---------------------------------------------------------------------------

/// Verbindung eines Clients zum In-Process-Relay
pub struct MemoryConnection {
    relay: MemoryRelay,
    client_id: ClientId,
    verbindung: u64,
    zustand_tx: Arc<watch::Sender<ConnectionState>>,
    zustand_rx: watch::Receiver<ConnectionState>,
}

#[async_trait]
impl RelayConnection for MemoryConnection {
    fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    fn state(&self) -> ConnectionState {
        *self.zustand_rx.borrow()
    }

    fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.zustand_rx.clone()
    }

    fn channel(&self, name: &str) -> Arc<dyn RelayChannel> {
        Arc::new(MemoryChannel {
            relay: self.relay.clone(),
            client_id: self.client_id.clone(),
            verbindung: self.verbindung,
            name: name.to_string(),
            zustand_rx: self.zustand_rx.clone(),
        })
    }

    async fn close(&self) {
        if matches!(self.state(), ConnectionState::Closed) {
            return;
        }
        self.zustand_tx.send_replace(ConnectionState::Closing);
        self.relay.verbindung_freigeben(self.verbindung);
        self.zustand_tx.send_replace(ConnectionState::Closed);

        // Nur den eigenen Registry-Eintrag entfernen, nicht den einer neueren Verbindung
        self.relay
            .inner
            .verbindungen
            .remove_if(&self.client_id, |_, (nr, _)| *nr == self.verbindung);
        zaehlen(&self.relay.inner.zaehler.geschlossen);
        tracing::info!(client_id = %self.client_id, "Relay-Verbindung geschlossen");
    }
}

// ---------------------------------------------------------------------------
// MemoryChannel
// ---------------------------------------------------------------------------

/// Kanal-Handle einer Verbindung
pub struct MemoryChannel {
    relay: MemoryRelay,
    client_id: ClientId,
    verbindung: u64,
    name: String,
    zustand_rx: watch::Receiver<ConnectionState>,
}

impl MemoryChannel {
    fn pruefen_offen(&self) -> RelayResult<()> {
        if self.zustand_rx.borrow().ist_endgueltig() {
            return Err(RelayError::VerbindungGeschlossen(self.client_id.clone()));
        }
        Ok(())
    }

    fn zaehler(&self) -> &Zaehler {
        &self.relay.inner.zaehler
    }

    /// Traegt den Client in die Presence ein und verteilt das Ereignis
    fn presence_setzen(&self, data: Value) {
        let (action, handler) = {
            let mut kanal = self.relay.inner.kanaele.entry(self.name.clone()).or_default();
            let action = kanal.presence.eintragen(self.verbindung, &self.client_id, data.clone());
            (action, kanal.presence.handler_fuer(action))
        };
        self.relay.presence_verteilen(
            handler,
            PresenceMessage {
                action,
                client_id: self.client_id.clone(),
                data,
            },
        );
    }
}

#[async_trait]
impl RelayChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn subscribe(&self, handler: MessageHandler) -> RelayResult<SubscriptionId> {
        self.pruefen_offen()?;
        let id = self.relay.naechste_abo_id();
        self.relay
            .inner
            .kanaele
            .entry(self.name.clone())
            .or_default()
            .abonnenten
            .push(Abonnent {
                id,
                verbindung: self.verbindung,
                handler,
            });
        zaehlen(&self.zaehler().abonniert);
        tracing::debug!(kanal = %self.name, client_id = %self.client_id, abo = %id, "Kanal abonniert");
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> RelayResult<()> {
        zaehlen(&self.zaehler().abbestellt);
        if let Some(mut kanal) = self.relay.inner.kanaele.get_mut(&self.name) {
            kanal.abonnenten.retain(|a| a.id != id);
        }
        tracing::debug!(kanal = %self.name, client_id = %self.client_id, abo = %id, "Abo beendet");
        Ok(())
    }

    async fn publish(&self, name: &str, data: Value) -> RelayResult<()> {
        self.pruefen_offen()?;
        zaehlen(&self.zaehler().publiziert);

        // Handler kopieren, damit kein DashMap-Guard waehrend der Zustellung gehalten wird
        let handler: Vec<MessageHandler> = self
            .relay
            .inner
            .kanaele
            .get(&self.name)
            .map(|k| k.abonnenten.iter().map(|a| a.handler.clone()).collect())
            .unwrap_or_default();

        tracing::trace!(kanal = %self.name, ereignis = name, empfaenger = handler.len(), "Publish");
        let nachricht = RelayMessage {
            name: name.to_string(),
            client_id: self.client_id.clone(),
            data,
        };
        for h in handler {
            h(nachricht.clone());
        }
        Ok(())
    }

    async fn presence_enter(&self, data: Value) -> RelayResult<()> {
        self.pruefen_offen()?;
        zaehlen(&self.zaehler().presence_betreten);
        self.presence_setzen(data);
        Ok(())
    }

    async fn presence_update(&self, data: Value) -> RelayResult<()> {
        self.pruefen_offen()?;
        zaehlen(&self.zaehler().presence_aktualisiert);
        self.presence_setzen(data);
        Ok(())
    }

    async fn presence_leave(&self) -> RelayResult<()> {
        self.pruefen_offen()?;
        zaehlen(&self.zaehler().presence_verlassen);
        let abgang = {
            match self.relay.inner.kanaele.get_mut(&self.name) {
                Some(mut kanal) => kanal
                    .presence
                    .austragen(&self.client_id)
                    .map(|m| (m, kanal.presence.handler_fuer(PresenceAction::Leave))),
                None => None,
            }
        };
        if let Some((mitglied, handler)) = abgang {
            self.relay.presence_verteilen(
                handler,
                PresenceMessage {
                    action: PresenceAction::Leave,
                    client_id: mitglied.client_id,
                    data: mitglied.data,
                },
            );
        }
        Ok(())
    }

    async fn subscribe_presence(
        &self,
        action: PresenceAction,
        handler: PresenceHandler,
    ) -> RelayResult<SubscriptionId> {
        self.pruefen_offen()?;
        let id = self.relay.naechste_abo_id();
        self.relay
            .inner
            .kanaele
            .entry(self.name.clone())
            .or_default()
            .presence
            .abonnieren(PresenceAbonnent {
                id,
                verbindung: self.verbindung,
                action,
                handler,
            });
        zaehlen(&self.zaehler().presence_abonniert);
        Ok(id)
    }

    async fn unsubscribe_presence(&self, id: SubscriptionId) -> RelayResult<()> {
        zaehlen(&self.zaehler().presence_abbestellt);
        if let Some(mut kanal) = self.relay.inner.kanaele.get_mut(&self.name) {
            kanal.presence.abbestellen(id);
        }
        Ok(())
    }

    async fn presence_members(&self) -> RelayResult<Vec<PresenceMember>> {
        if let Some(meldung) = self.relay.inner.presence_fehler.lock().clone() {
            return Err(RelayError::PresenceAbfrage(meldung));
        }
        self.pruefen_offen()?;
        Ok(self.relay.presence_mitglieder(&self.name))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
