//! Trait-Definitionen fuer Relay-Verbindung und Kanaele
//!
//! Die Sitzungsschicht kennt das Relay nur ueber diese Traits. Jede
//! Implementierung (In-Process, extern gehostet) liefert dieselben
//! Garantien: Reihenfolge pro Kanal, Presence pro Kanal, Zustandsmeldungen.

use async_trait::async_trait;
use podium_core::ClientId;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::RelayResult;
use crate::types::{
    ClientOptions, ConnectionState, MessageHandler, PresenceAction, PresenceHandler,
    PresenceMember, SubscriptionId,
};

/// Baut Relay-Verbindungen auf
pub trait RelayConnector: Send + Sync {
    /// Erstellt einen Client; der Verbindungsaufbau laeuft im Hintergrund
    /// und wird ueber [`RelayConnection::state_changes`] gemeldet.
    fn connect(&self, options: ClientOptions) -> RelayResult<Arc<dyn RelayConnection>>;
}

/// Eine Client-Verbindung zum Relay
#[async_trait]
pub trait RelayConnection: Send + Sync {
    /// Kennung, unter der der Client angemeldet ist
    fn client_id(&self) -> &ClientId;

    /// Aktueller Verbindungszustand
    fn state(&self) -> ConnectionState;

    /// Beobachter fuer Zustandswechsel
    fn state_changes(&self) -> watch::Receiver<ConnectionState>;

    /// Handle auf einen Kanal (legt nichts beim Relay an)
    fn channel(&self, name: &str) -> Arc<dyn RelayChannel>;

    /// Schliesst die Verbindung und gibt alle Relay-Ressourcen frei
    async fn close(&self);
}

/// Handle auf einen benannten Kanal
#[async_trait]
pub trait RelayChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn subscribe(&self, handler: MessageHandler) -> RelayResult<SubscriptionId>;

    /// Unbekannte Kennungen werden ignoriert
    async fn unsubscribe(&self, id: SubscriptionId) -> RelayResult<()>;

    async fn publish(&self, name: &str, data: Value) -> RelayResult<()>;

    async fn presence_enter(&self, data: Value) -> RelayResult<()>;

    async fn presence_update(&self, data: Value) -> RelayResult<()>;

    async fn presence_leave(&self) -> RelayResult<()>;

    async fn subscribe_presence(
        &self,
        action: PresenceAction,
        handler: PresenceHandler,
    ) -> RelayResult<SubscriptionId>;

    async fn unsubscribe_presence(&self, id: SubscriptionId) -> RelayResult<()>;

    /// Momentaufnahme der Presence-Menge, in Beitrittsreihenfolge
    async fn presence_members(&self) -> RelayResult<Vec<PresenceMember>>;
}
