//! Connection-Manager – Relay-Client und Verbindungsbereitschaft
//!
//! Haelt genau eine Relay-Verbindung und einen Beobachter-Task, der
//! Zustandswechsel verfolgt. Wiederherstellung der Transportverbindung ist
//! Sache des Relays; hier wird nur entschieden, ob die Verbindung fuer eine
//! Sitzung brauchbar ist.
//!
//! ## Bereitschaft
//! ```text
//! connected | disconnected              -> bereit
//! initialized | connecting              -> warten (poll_interval), max. max_attempts Mal
//! suspended | closing | closed | failed -> sofort Fehler
//! ```

use podium_core::Identity;
use podium_relay::{ClientOptions, ConnectionState, Credentials, RelayConnection, RelayConnector};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

use crate::config::ReadinessConfig;
use crate::error::{CommsError, CommsResult};
use crate::handlers::FatalHandler;

// ---------------------------------------------------------------------------
// await_ready
// ---------------------------------------------------------------------------

/// Wartet bis die Verbindung nutzbar ist
///
/// Prueft den Zustand sofort und dann nach jedem Wartezyklus erneut. Nach
/// `max_attempts` Wartezyklen ohne Ergebnis gibt die Funktion auf.
pub async fn await_ready(
    verbindung: &dyn RelayConnection,
    config: &ReadinessConfig,
) -> CommsResult<()> {
    let mut wartezyklen: u32 = 0;
    loop {
        let zustand = verbindung.state();
        match zustand {
            ConnectionState::Connected | ConnectionState::Disconnected => {
                tracing::debug!(
                    client_id = %verbindung.client_id(),
                    zustand = %zustand,
                    wartezyklen,
                    "Relay-Verbindung bereit"
                );
                return Ok(());
            }
            ConnectionState::Initialized | ConnectionState::Connecting => {
                wartezyklen += 1;
                if wartezyklen > config.max_attempts {
                    tracing::warn!(
                        client_id = %verbindung.client_id(),
                        zustand = %zustand,
                        "Zeitlimit beim Verbindungsaufbau"
                    );
                    return Err(CommsError::Zeitlimit {
                        versuche: config.max_attempts,
                        zustand,
                    });
                }
                tokio::time::sleep(config.poll_interval).await;
            }
            ConnectionState::Suspended
            | ConnectionState::Closing
            | ConnectionState::Closed
            | ConnectionState::Failed => {
                tracing::warn!(
                    client_id = %verbindung.client_id(),
                    zustand = %zustand,
                    "Relay-Verbindung nicht nutzbar"
                );
                return Err(CommsError::NichtNutzbar(zustand));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionManager
// ---------------------------------------------------------------------------

/// Besitzt die Relay-Verbindung einer Comms-Instanz
pub struct ConnectionManager {
    connector: Arc<dyn RelayConnector>,
    readiness: ReadinessConfig,
    verbindung: Option<Arc<dyn RelayConnection>>,
    beobachter: Option<JoinHandle<()>>,
    /// Gesetzt sobald lokal getrennt wird; unterdrueckt Fatal-Meldungen
    absichtlich_getrennt: Arc<AtomicBool>,
}

impl ConnectionManager {
    /// Erstellt einen Manager ohne Verbindung
    pub fn neu(connector: Arc<dyn RelayConnector>) -> Self {
        Self {
            connector,
            readiness: ReadinessConfig::default(),
            verbindung: None,
            beobachter: None,
            absichtlich_getrennt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Baut eine neue Relay-Verbindung auf und ersetzt eine vorhandene
    ///
    /// Muss innerhalb einer tokio-Runtime aufgerufen werden (Beobachter-Task).
    pub fn configure(
        &mut self,
        identity: Identity,
        credentials: Credentials,
        readiness: ReadinessConfig,
        fatal: FatalHandler,
    ) -> CommsResult<Arc<dyn RelayConnection>> {
        if let Some(alt) = self.trennen() {
            tracing::debug!(client_id = %alt.client_id(), "Vorherige Verbindung wird ersetzt");
            tokio::spawn(async move { alt.close().await });
        }

        let client_id = identity.id.clone();
        let verbindung = self.connector.connect(ClientOptions {
            identity,
            credentials,
        })?;

        let getrennt = Arc::new(AtomicBool::new(false));
        self.beobachter = Some(beobachter_starten(
            Arc::clone(&verbindung),
            Arc::clone(&getrennt),
            fatal,
        ));
        self.absichtlich_getrennt = getrennt;
        self.readiness = readiness;
        self.verbindung = Some(Arc::clone(&verbindung));

        tracing::info!(client_id = %client_id, "Relay-Client konfiguriert");
        Ok(verbindung)
    }

    /// Aktuelle Verbindung (falls konfiguriert)
    pub fn verbindung(&self) -> Option<Arc<dyn RelayConnection>> {
        self.verbindung.clone()
    }

    pub fn readiness(&self) -> ReadinessConfig {
        self.readiness
    }

    /// Aktueller Verbindungszustand (falls konfiguriert)
    pub fn state(&self) -> Option<ConnectionState> {
        self.verbindung.as_ref().map(|v| v.state())
    }

    /// Loest die Verbindung vom Manager, ohne sie zu schliessen
    ///
    /// Der Beobachter wird beendet; der Aufrufer schliesst die Verbindung.
    pub fn trennen(&mut self) -> Option<Arc<dyn RelayConnection>> {
        self.absichtlich_getrennt.store(true, Ordering::SeqCst);
        if let Some(beobachter) = self.beobachter.take() {
            beobachter.abort();
        }
        self.verbindung.take()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(beobachter) = self.beobachter.take() {
            beobachter.abort();
        }
    }
}

/// Beobachtet Zustandswechsel und meldet unbrauchbare Zustaende als fatal
fn beobachter_starten(
    verbindung: Arc<dyn RelayConnection>,
    absichtlich_getrennt: Arc<AtomicBool>,
    fatal: FatalHandler,
) -> JoinHandle<()> {
    let mut zustaende = verbindung.state_changes();
    let client_id = verbindung.client_id().clone();
    drop(verbindung);

    tokio::spawn(async move {
        while zustaende.changed().await.is_ok() {
            let zustand = *zustaende.borrow_and_update();

            if zustand.ist_nutzbar() || zustand.ist_uebergang() {
                tracing::debug!(client_id = %client_id, zustand = %zustand, "Verbindungszustand");
                continue;
            }

            if absichtlich_getrennt.load(Ordering::SeqCst) {
                tracing::debug!(client_id = %client_id, zustand = %zustand, "Verbindung lokal getrennt");
                continue;
            }

            tracing::error!(client_id = %client_id, zustand = %zustand, "Relay-Verbindung unbrauchbar");
            fatal(CommsError::VerbindungVerloren(zustand));
        }
        tracing::trace!(client_id = %client_id, "Zustandsbeobachter beendet");
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
