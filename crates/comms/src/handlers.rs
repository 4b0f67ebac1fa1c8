//! Handler, die der Aufrufer an Comms uebergibt
//!
//! Alle Handler sind optional. Fehlt ein Handler, wird das zugehoerige
//! Abonnement beim Start gar nicht erst angelegt.

use podium_relay::{MessageHandler, PresenceHandler, PresenceMessage, RelayMessage};
use std::sync::Arc;

use crate::error::CommsError;

/// Empfaenger fuer nicht behebbare Verbindungsfehler nach dem Aufbau
pub type FatalHandler = Arc<dyn Fn(CommsError) + Send + Sync>;

/// Satz aller Handler einer Comms-Instanz
#[derive(Clone, Default)]
pub struct CommsHandlers {
    /// Oeffentliche und private Broadcasts (ein Handler fuer beide Kanaele)
    pub broadcast: Option<MessageHandler>,
    /// Nachrichten auf dem Antwort-Kanal (nur Host)
    pub response: Option<MessageHandler>,
    pub presence_enter: Option<PresenceHandler>,
    pub presence_update: Option<PresenceHandler>,
    pub presence_leave: Option<PresenceHandler>,
    /// Standard: Fehler wird per `tracing::error!` gemeldet
    pub fatal: Option<FatalHandler>,
}

impl CommsHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_broadcast(mut self, f: impl Fn(RelayMessage) + Send + Sync + 'static) -> Self {
        self.broadcast = Some(Arc::new(f));
        self
    }

    pub fn on_response(mut self, f: impl Fn(RelayMessage) + Send + Sync + 'static) -> Self {
        self.response = Some(Arc::new(f));
        self
    }

    pub fn on_presence_enter(mut self, f: impl Fn(PresenceMessage) + Send + Sync + 'static) -> Self {
        self.presence_enter = Some(Arc::new(f));
        self
    }

    pub fn on_presence_update(mut self, f: impl Fn(PresenceMessage) + Send + Sync + 'static) -> Self {
        self.presence_update = Some(Arc::new(f));
        self
    }

    pub fn on_presence_leave(mut self, f: impl Fn(PresenceMessage) + Send + Sync + 'static) -> Self {
        self.presence_leave = Some(Arc::new(f));
        self
    }

    pub fn on_fatal(mut self, f: impl Fn(CommsError) + Send + Sync + 'static) -> Self {
        self.fatal = Some(Arc::new(f));
        self
    }

    /// Fatal-Handler oder der protokollierende Standard
    pub(crate) fn fatal_oder_standard(&self) -> FatalHandler {
        self.fatal.clone().unwrap_or_else(|| {
            Arc::new(|fehler: CommsError| {
                tracing::error!(fehler = %fehler, "Nicht behebbarer Verbindungsfehler");
            })
        })
    }
}
