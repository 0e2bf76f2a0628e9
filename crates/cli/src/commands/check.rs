//! `check`: show what a line list would dial

use std::path::Path;

use anyhow::Result;

use crate::config::AppConfig;

pub async fn execute(config: &AppConfig, lines: &Path) -> Result<()> {
    let store = config.store.open().await?;
    let batch = super::prepare_from_file(store.as_ref(), lines).await?;

    for target in &batch.targets {
        println!("{}\t{}", target, target.raw_line);
    }
    println!(
        "{} to dial, {} unusable lines, {} already on record",
        batch.targets.len(),
        batch.skipped_lines,
        batch.already_dialed
    );
    if let Some(rejection) = batch.rejection() {
        println!("Batch would be rejected: {}", rejection);
    }
    Ok(())
}
