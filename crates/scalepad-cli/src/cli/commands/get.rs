//! `scalepad get` – fetch one item by ID.

use anyhow::{Context, Result};
use scalepad_core::{ResourceKind, ScalePadClient};

pub async fn run_get(client: &ScalePadClient, kind: ResourceKind, id: &str) -> Result<()> {
    let item = client
        .core()
        .v1()
        .resource(kind)
        .get_by_id(id)
        .await
        .with_context(|| format!("fetching {} {}", kind, id))?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}
