//! `count` and `claim`: hand recorded responses to operators

use anyhow::Result;

use crate::config::AppConfig;

pub async fn count(config: &AppConfig) -> Result<()> {
    let store = config.store.open().await?;
    let remaining = store.count_unclaimed().await?;
    println!("{} lines remaining", remaining);
    Ok(())
}

pub async fn claim(config: &AppConfig) -> Result<()> {
    let store = config.store.open().await?;
    match store.claim_next().await? {
        Some(line) => println!("{}", line.raw_line),
        None => println!("No lines left"),
    }
    Ok(())
}
