//! Subcommand implementations

pub mod check;
pub mod lines;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};

use autodial_call_engine::database::CallStore;
use autodial_call_engine::intake::{self, PreparedBatch};

/// Read a line list and filter it against the store
pub async fn prepare_from_file(store: &dyn CallStore, path: &Path) -> Result<PreparedBatch> {
    let text = read_line_list(path).await?;
    Ok(intake::prepare_batch(store, &text).await?)
}

/// Read an uploaded list; bytes that are not UTF-8 become replacement characters
pub async fn read_line_list(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read line list {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
