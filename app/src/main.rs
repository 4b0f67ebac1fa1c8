//! Podium – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet die Sitzung.

use anyhow::Result;
use podium_app::{config::AppConfig, App};
use podium_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("PODIUM_CONFIG").unwrap_or_else(|_| "podium.toml".into());

    let config = AppConfig::laden(&config_pfad)?;
    logging_initialisieren(&config.logging.level, config.logging.format)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        rolle = ?config.sitzung.rolle,
        "Podium wird initialisiert"
    );

    App::neu(config).starten().await
}
