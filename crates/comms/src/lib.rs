//! podium-comms – Echtzeit-Sitzungsschicht
//!
//! Dieses Crate haelt eine Host/Publikum-Sitzung ueber ein Pub/Sub-Relay
//! zusammen: Verbindungsaufbau, Kanaele, Presence und Nachrichten.
//!
//! ## Architektur
//!
//! ```text
//! Comms (ein Objekt pro Teilnehmer, Clone teilt den Zustand)
//!     |
//!     +-- ConnectionManager  (Relay-Client, Zustandsbeobachter, await_ready)
//!     +-- Sitzung            (broadcast:all, broadcast:<id>, response)
//!     +-- PresenceRecord     (type/name + offene Felder, flach zusammengefuehrt)
//!     +-- Messaging          (send, send_message, broadcast, send_private_message, get_users)
//! ```
//!
//! ## Lebenszyklus
//! `configure -> start -> (aktiv) -> stop`. `stop` ist jederzeit erlaubt,
//! auch mehrfach und waehrend eines laufenden `start`.

pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod messaging;
pub mod presence;
pub mod session;

// Bequeme Re-Exporte
pub use config::{CommsConfig, ReadinessConfig};
pub use connection::{ConnectionManager, await_ready};
pub use error::{CommsError, CommsResult};
pub use handlers::{CommsHandlers, FatalHandler};
pub use messaging::{CommandPayload, EREIGNIS_ANTWORT, EREIGNIS_BROADCAST, Participant, ResponsePayload};
pub use presence::{PresenceRecord, PresenceUpdate};
pub use session::Comms;
