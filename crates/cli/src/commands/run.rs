//! `run`: dial a line list until interrupted

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use autodial_call_engine::notify::TracingNotifier;
use autodial_call_engine::CallEngine;
use autodial_manager_client::AmiClient;

use crate::config::AppConfig;

pub async fn execute(config: &AppConfig, lines: &Path, agent: Option<&str>) -> Result<()> {
    let store = config.store.open().await?;

    let batch = super::prepare_from_file(store.as_ref(), lines).await?;
    if let Some(rejection) = batch.rejection() {
        bail!("nothing to dial in {}: {}", lines.display(), rejection);
    }
    if batch.skipped_lines > 0 || batch.already_dialed > 0 {
        info!(
            "Skipped {} unusable lines and {} numbers already on record",
            batch.skipped_lines, batch.already_dialed
        );
    }

    info!("Connecting to manager interface at {}", config.manager.address());
    let (client, events) = AmiClient::connect(config.manager.clone());
    let client = Arc::new(client);

    let engine = CallEngine::new(
        config.engine.clone(),
        client.clone(),
        store,
        Arc::new(TracingNotifier),
    )?;
    if let Some(agent) = agent {
        engine.set_agent(agent)?;
    }

    let router = engine.spawn_event_loop(events);

    tokio::select! {
        report = engine.start_batch(batch.targets) => {
            let report = report?;
            info!(
                "Dialing {} numbers with agent {}, {} calls in flight",
                report.queued,
                engine.current_agent(),
                report.dispatched
            );
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            warn!("Interrupted before the batch started");
            client.close();
            router.abort();
            return Ok(());
        }
    }

    info!("Press Ctrl+C to stop dialing");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!(
        "Stopping with {} numbers still queued, {} responses captured",
        engine.queue_len(),
        engine.pressed_count()
    );
    client.close();
    router.abort();
    Ok(())
}
