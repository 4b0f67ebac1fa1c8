//! podium-relay – Vertrag zum Pub/Sub-Relay
//!
//! Dieses Crate beschreibt, was die Sitzungsschicht vom Relay erwartet,
//! und liefert mit [`MemoryRelay`] eine vollstaendige In-Process-
//! Implementierung fuer Tests und lokale Sitzungen.
//!
//! ## Architektur
//!
//! ```text
//! RelayConnector  – baut aus ClientOptions eine Verbindung
//!     |
//!     v
//! RelayConnection – Verbindungszustand (watch), Kanal-Handles, close()
//!     |
//!     v
//! RelayChannel    – subscribe/unsubscribe/publish + Presence
//! ```
//!
//! Das Relay garantiert Reihenfolge pro Kanal. Es wird hier weder
//! gepuffert noch dedupliziert.

pub mod channel;
pub mod error;
pub mod memory;
pub mod presence;
pub mod types;

// Bequeme Re-Exporte
pub use channel::{RelayChannel, RelayConnection, RelayConnector};
pub use error::{RelayError, RelayResult};
pub use memory::{MemoryRelay, RelayStatistik};
pub use types::{
    ClientOptions, ConnectionState, Credentials, MessageHandler, PresenceAction,
    PresenceHandler, PresenceMember, PresenceMessage, RelayMessage, SubscriptionId, kanal,
};
