//! Comms – Sitzung eines Teilnehmers
//!
//! Lebenszyklus: `configure` -> `await_ready` -> `start` -> `stop`.
//!
//! `Comms` ist ein billig klonbarer Handle. Die Sitzungsphase ist durch einen
//! async Mutex geschuetzt, damit `stop` gefahrlos neben einem laufenden
//! `start` aufgerufen werden kann. Ein Generationszaehler bricht ein `start`
//! ab, dessen Warten auf die Verbindung von `stop`/`configure` ueberholt wurde.

use parking_lot::Mutex;
use podium_core::ClientId;
use podium_relay::{
    kanal, ConnectionState, PresenceAction, RelayChannel, RelayConnection, RelayConnector,
    SubscriptionId,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::CommsConfig;
use crate::connection::{await_ready, ConnectionManager};
use crate::error::{CommsError, CommsResult};
use crate::handlers::CommsHandlers;
use crate::presence::{PresenceRecord, PresenceUpdate};

// ---------------------------------------------------------------------------
// Sitzungszustand
// ---------------------------------------------------------------------------

/// Alles was `start` angelegt hat und `stop` wieder abbauen muss
#[derive(Default)]
pub(crate) struct Sitzung {
    pub(crate) gestartet: bool,
    pub(crate) host: bool,
    pub(crate) verbindung: Option<Arc<dyn RelayConnection>>,
    pub(crate) broadcast: Option<Arc<dyn RelayChannel>>,
    pub(crate) privat: Option<Arc<dyn RelayChannel>>,
    pub(crate) antwort: Option<Arc<dyn RelayChannel>>,
    abos: Vec<(Arc<dyn RelayChannel>, SubscriptionId)>,
    presence_abos: Vec<(Arc<dyn RelayChannel>, SubscriptionId)>,
    presence_betreten: bool,
}

impl Sitzung {
    /// Entfernt alles, was tatsaechlich angelegt wurde
    ///
    /// Fehler werden protokolliert, nie weitergegeben.
    async fn abbauen(&mut self) {
        for (kanal, id) in self.abos.drain(..) {
            if let Err(e) = kanal.unsubscribe(id).await {
                tracing::warn!(kanal = kanal.name(), abo = %id, fehler = %e, "Abbestellen fehlgeschlagen");
            }
        }

        for (kanal, id) in self.presence_abos.drain(..) {
            if let Err(e) = kanal.unsubscribe_presence(id).await {
                tracing::warn!(kanal = kanal.name(), abo = %id, fehler = %e, "Presence-Abbestellen fehlgeschlagen");
            }
        }

        if self.presence_betreten {
            if let Some(antwort) = &self.antwort {
                if let Err(e) = antwort.presence_leave().await {
                    tracing::warn!(fehler = %e, "Presence verlassen fehlgeschlagen");
                }
            }
        }

        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Comms
// ---------------------------------------------------------------------------

/// Sitzungsschicht ueber dem Relay
#[derive(Clone)]
pub struct Comms {
    pub(crate) inner: Arc<CommsInner>,
}

pub(crate) struct CommsInner {
    verbindung: Mutex<ConnectionManager>,
    handlers: Mutex<CommsHandlers>,
    presence: Mutex<PresenceRecord>,
    pub(crate) sitzung: tokio::sync::Mutex<Sitzung>,
    generation: AtomicU64,
}

impl Comms {
    /// Erstellt eine unkonfigurierte Instanz
    pub fn neu(connector: Arc<dyn RelayConnector>) -> Self {
        Self {
            inner: Arc::new(CommsInner {
                verbindung: Mutex::new(ConnectionManager::neu(connector)),
                handlers: Mutex::new(CommsHandlers::default()),
                presence: Mutex::new(PresenceRecord::neu()),
                sitzung: tokio::sync::Mutex::new(Sitzung::default()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Konfiguriert Identitaet, Zugangsdaten und Handler
    ///
    /// Eine laufende Sitzung wird vorher gestoppt und der Presence-Datensatz
    /// auf `{type: "user"}` zurueckgesetzt.
    pub async fn configure(&self, config: CommsConfig, handlers: CommsHandlers) -> CommsResult<()> {
        self.stop().await;

        *self.inner.presence.lock() = PresenceRecord::neu();
        let fatal = handlers.fatal_oder_standard();
        *self.inner.handlers.lock() = handlers;

        self.inner.verbindung.lock().configure(
            config.identity,
            config.credentials,
            config.readiness,
            fatal,
        )?;
        Ok(())
    }

    /// Wartet bis die konfigurierte Verbindung nutzbar ist
    pub async fn await_ready(&self) -> CommsResult<()> {
        let (verbindung, readiness) = self.verbindung_und_readiness()?;
        await_ready(verbindung.as_ref(), &readiness).await
    }

    /// Tritt der Sitzung bei
    ///
    /// Abonnements werden vor dem Betreten der Presence angelegt. Schlaegt ein
    /// Schritt fehl, wird alles bereits Angelegte wieder entfernt.
    pub async fn start(&self, display_name: &str, is_host: bool) -> CommsResult<()> {
        let generation = self.inner.generation.load(Ordering::SeqCst);

        if self.inner.sitzung.lock().await.gestartet {
            return Err(CommsError::BereitsGestartet);
        }

        let (verbindung, readiness) = self.verbindung_und_readiness()?;
        let bereit = await_ready(verbindung.as_ref(), &readiness).await;

        let mut sitzung = self.inner.sitzung.lock().await;
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::info!(client_id = %verbindung.client_id(), "Start durch stop/configure abgebrochen");
            return Err(CommsError::Abgebrochen);
        }
        bereit?;
        if sitzung.gestartet {
            return Err(CommsError::BereitsGestartet);
        }

        if let Err(e) = self.aufbauen(&mut sitzung, verbindung, display_name, is_host).await {
            tracing::warn!(fehler = %e, "Start fehlgeschlagen, angelegte Abonnements werden entfernt");
            sitzung.abbauen().await;
            return Err(e);
        }

        sitzung.gestartet = true;
        tracing::info!(
            client_id = %self.client_id().map(|c| c.to_string()).unwrap_or_default(),
            name = display_name,
            host = is_host,
            "Sitzung gestartet"
        );
        Ok(())
    }

    async fn aufbauen(
        &self,
        sitzung: &mut Sitzung,
        verbindung: Arc<dyn RelayConnection>,
        display_name: &str,
        is_host: bool,
    ) -> CommsResult<()> {
        let handlers = self.inner.handlers.lock().clone();
        let client_id = verbindung.client_id().clone();

        let broadcast = verbindung.channel(kanal::BROADCAST_ALLE);
        let privat = verbindung.channel(&kanal::privat(&client_id));
        let antwort = verbindung.channel(kanal::ANTWORT);

        sitzung.host = is_host;
        sitzung.verbindung = Some(verbindung);
        sitzung.broadcast = Some(Arc::clone(&broadcast));
        sitzung.privat = Some(Arc::clone(&privat));
        sitzung.antwort = Some(Arc::clone(&antwort));

        if let Some(handler) = handlers.broadcast {
            for kanal in [&broadcast, &privat] {
                let id = kanal.subscribe(Arc::clone(&handler)).await?;
                sitzung.abos.push((Arc::clone(kanal), id));
            }
        }

        if is_host {
            if let Some(handler) = handlers.response {
                let id = antwort.subscribe(handler).await?;
                sitzung.abos.push((Arc::clone(&antwort), id));
            }

            let beobachter = [
                (PresenceAction::Enter, handlers.presence_enter),
                (PresenceAction::Update, handlers.presence_update),
                (PresenceAction::Leave, handlers.presence_leave),
            ];
            for (action, handler) in beobachter {
                if let Some(handler) = handler {
                    let id = antwort.subscribe_presence(action, handler).await?;
                    sitzung.presence_abos.push((Arc::clone(&antwort), id));
                }
            }
        }

        let daten = {
            let mut presence = self.inner.presence.lock();
            presence.name = Some(display_name.to_string());
            presence.als_json()
        };
        antwort.presence_enter(daten).await?;
        sitzung.presence_betreten = true;
        Ok(())
    }

    /// Verlaesst die Sitzung und schliesst die Verbindung
    ///
    /// Mehrfach aufrufbar, auch vor `configure` oder nach einem fehlgeschlagenen
    /// `start`. Gibt nie einen Fehler zurueck.
    pub async fn stop(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let mut sitzung = self.inner.sitzung.lock().await;
        let war_gestartet = sitzung.gestartet;
        sitzung.abbauen().await;

        let verbindung = self.inner.verbindung.lock().trennen();
        if let Some(verbindung) = verbindung {
            verbindung.close().await;
            tracing::info!(
                client_id = %verbindung.client_id(),
                war_gestartet,
                "Sitzung gestoppt"
            );
        }
    }

    /// Fuehrt eine Teilaktualisierung ein und veroeffentlicht sie
    ///
    /// Ohne gestartete Sitzung bleibt die Aktualisierung lokal erhalten und
    /// wird beim naechsten `start` mit veroeffentlicht.
    pub async fn update_presence_data(&self, update: PresenceUpdate) -> CommsResult<()> {
        // Sitzungs-Lock zuerst: Zusammenfuehren und Veroeffentlichen bleiben
        // in derselben Reihenfolge
        let sitzung = self.inner.sitzung.lock().await;
        let daten = {
            let mut presence = self.inner.presence.lock();
            presence.zusammenfuehren(&update);
            presence.als_json()
        };

        match sitzung.antwort.as_ref().filter(|_| sitzung.gestartet) {
            Some(antwort) => antwort.presence_update(daten).await?,
            None => tracing::debug!("Presence nur lokal aktualisiert, Sitzung nicht gestartet"),
        }
        Ok(())
    }

    /// Fuehrt `update` ein und liefert den vollstaendigen Datensatz
    pub fn presence_snapshot(&self, update: PresenceUpdate) -> PresenceRecord {
        let mut presence = self.inner.presence.lock();
        presence.zusammenfuehren(&update);
        presence.clone()
    }

    /// Client-ID der konfigurierten Verbindung
    pub fn client_id(&self) -> Option<ClientId> {
        self.inner
            .verbindung
            .lock()
            .verbindung()
            .map(|v| v.client_id().clone())
    }

    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.inner.verbindung.lock().state()
    }

    pub async fn ist_gestartet(&self) -> bool {
        self.inner.sitzung.lock().await.gestartet
    }

    pub async fn ist_host(&self) -> bool {
        let sitzung = self.inner.sitzung.lock().await;
        sitzung.gestartet && sitzung.host
    }

    fn verbindung_und_readiness(
        &self,
    ) -> CommsResult<(Arc<dyn RelayConnection>, crate::config::ReadinessConfig)> {
        let manager = self.inner.verbindung.lock();
        let verbindung = manager.verbindung().ok_or(CommsError::NichtKonfiguriert)?;
        Ok((verbindung, manager.readiness()))
    }
}
