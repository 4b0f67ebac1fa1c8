//! # podium-observability
//!
//! Structured Logging via tracing-subscriber, text oder JSON.
//! Level und Format kommen aus der Konfiguration und koennen per
//! Umgebungsvariable ueberschrieben werden.

pub mod logging;

pub use logging::{
    logging_initialisieren, sitzungs_span, LogFormat, LoggingError, ENV_LOG_FORMAT, ENV_LOG_LEVEL,
};
