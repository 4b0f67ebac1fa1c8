//! Structured Logging Setup via tracing-subscriber
//!
//! Umgebungsvariablen haben Vorrang vor der Konfiguration:
//! - `PODIUM_LOG_LEVEL`: EnvFilter-Ausdruck, z.B. `info` oder `podium_comms=debug,info`
//! - `PODIUM_LOG_FORMAT`: `text` oder `json`

use podium_core::{ClientId, Rolle};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "PODIUM_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PODIUM_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Ungueltiges Log-Format '{0}' (erlaubt: text, json)")]
    UngueltigesFormat(String),

    #[error("Logging bereits initialisiert")]
    BereitsInitialisiert,
}

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            anderes => Err(LoggingError::UngueltigesFormat(anderes.to_string())),
        }
    }
}

/// Initialisiert das Logging-System
///
/// Ein ungueltiger Filter faellt auf `info` zurueck, ein ungueltiges
/// Format aus der Umgebung auf das konfigurierte.
pub fn logging_initialisieren(level: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = filter_bauen(std::env::var(ENV_LOG_LEVEL).ok().as_deref(), level);
    let format = format_waehlen(std::env::var(ENV_LOG_FORMAT).ok().as_deref(), format);

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.map_err(|_| LoggingError::BereitsInitialisiert)
}

/// Span fuer alle Ereignisse einer Sitzung
pub fn sitzungs_span(client_id: &ClientId, rolle: Rolle) -> tracing::Span {
    tracing::info_span!("sitzung", client_id = %client_id, host = rolle.ist_host())
}

fn filter_bauen(aus_env: Option<&str>, konfiguriert: &str) -> EnvFilter {
    aus_env
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_new(konfiguriert).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn format_waehlen(aus_env: Option<&str>, konfiguriert: LogFormat) -> LogFormat {
    match aus_env.map(LogFormat::from_str) {
        Some(Ok(format)) => format,
        _ => konfiguriert,
    }
}
