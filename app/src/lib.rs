//! podium-app – Bibliotheks-Root
//!
//! Deklariert die App-Module und stellt den Einstiegspunkt fuer
//! Integrationstests bereit.

pub mod config;
pub mod host;
pub mod identity;

use anyhow::{Context, Result};
use config::AppConfig;
use podium_board::{BoardSource, HttpBoardApi, Presentation, TrelloBoard};
use podium_comms::{CommandPayload, Comms, CommsConfig, CommsHandlers};
use podium_core::{Identity, Rolle};
use podium_relay::{MemoryRelay, RelayConnector};
use podium_store::LocalStore;
use std::sync::Arc;
use tracing::Instrument;

pub use host::{Antwort, HostController, BEFEHL_FOLIE_ZEIGEN};

/// Haelt die laufende App zusammen
pub struct App {
    pub config: AppConfig,
}

impl App {
    pub fn neu(config: AppConfig) -> Self {
        Self { config }
    }

    /// Startet eine Sitzung auf dem In-Process-Relay und laeuft bis Ctrl-C
    ///
    /// Reihenfolge:
    /// 1. Identitaet aus Konfiguration bzw. lokalem Speicher
    /// 2. Board laden (falls konfiguriert)
    /// 3. Sitzung als Host oder Publikum starten
    /// 4. Auf Ctrl-C warten, Sitzung stoppen
    pub async fn starten(self) -> Result<()> {
        let mut store = LocalStore::open(&self.config.speicher.pfad)
            .with_context(|| format!("Speicher '{}' nicht nutzbar", self.config.speicher.pfad))?;
        let identitaet = identity::identitaet_aufloesen(&self.config.sitzung, &mut store)?;
        let rolle = self.config.sitzung.rolle;
        let span = podium_observability::sitzungs_span(&identitaet.id, rolle);

        let relay: Arc<dyn RelayConnector> = Arc::new(MemoryRelay::neu());
        async move {
            // Der Controller muss bis zum Ende leben, seine Handler halten nur Weak-Verweise
            let (comms, _host) = match rolle {
                Rolle::Host => {
                    let (board, praesentation) = self.board_laden().await?;
                    let host = host_starten(&self.config, relay, identitaet, board, praesentation).await?;
                    (host.comms().clone(), Some(host))
                }
                Rolle::Publikum => (publikum_starten(&self.config, relay, identitaet).await?, None),
            };

            tracing::info!("Sitzung laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown-Signal empfangen, Sitzung wird beendet");
            comms.stop().await;
            Ok::<_, anyhow::Error>(())
        }
        .instrument(span)
        .await
    }

    async fn board_laden(&self) -> Result<(Arc<dyn BoardSource>, Presentation)> {
        let api = HttpBoardApi::neu(self.config.board.http_config())?;
        let board = TrelloBoard::neu(api).mit_aktiv_label(&self.config.board.aktiv_label);

        let praesentation = match &self.config.board.url {
            Some(url) => board
                .load(url)
                .await
                .with_context(|| format!("Board '{url}' nicht ladbar"))?,
            None => {
                tracing::warn!("Keine Board-URL konfiguriert, Sitzung ohne Folien");
                Presentation::default()
            }
        };
        let board: Arc<dyn BoardSource> = Arc::new(board);
        Ok((board, praesentation))
    }
}

/// Konfiguriert und startet eine Host-Sitzung und zeigt die Startfolie
pub async fn host_starten(
    config: &AppConfig,
    relay: Arc<dyn RelayConnector>,
    identitaet: Identity,
    board: Arc<dyn BoardSource>,
    praesentation: Presentation,
) -> Result<HostController> {
    let start_folie = praesentation.start_folie().map(|s| s.id.clone());
    let name = identitaet.display_name.clone();

    let host = HostController::neu(Comms::neu(relay), board, praesentation);
    host.comms()
        .configure(comms_config(config, identitaet)?, host.handlers())
        .await?;
    host.comms().start(&name, true).await?;

    if let Some(folie) = start_folie {
        host.show_slide(&folie).await?;
    }
    Ok(host)
}

/// Konfiguriert und startet eine Publikums-Sitzung, die Befehle protokolliert
pub async fn publikum_starten(
    config: &AppConfig,
    relay: Arc<dyn RelayConnector>,
    identitaet: Identity,
) -> Result<Comms> {
    let name = identitaet.display_name.clone();
    let comms = Comms::neu(relay);
    let handlers = CommsHandlers::new().on_broadcast(|nachricht| {
        match CommandPayload::aus_nachricht(&nachricht) {
            Ok(befehl) => {
                tracing::info!(befehl = %befehl.command, kontext = %befehl.context, "Befehl empfangen")
            }
            Err(e) => tracing::warn!(fehler = %e, "Unlesbarer Befehl"),
        }
    });
    comms
        .configure(comms_config(config, identitaet)?, handlers)
        .await?;
    comms.start(&name, false).await?;
    Ok(comms)
}

fn comms_config(config: &AppConfig, identitaet: Identity) -> Result<CommsConfig> {
    Ok(CommsConfig::new(identitaet, config.relay.credentials()?)
        .mit_readiness(config.relay.readiness()))
}
