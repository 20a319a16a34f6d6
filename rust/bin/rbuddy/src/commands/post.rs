//! `rbuddy post` and `rbuddy rename`.

use std::path::Path;

use anyhow::Result;
use rbuddy_client::Tag;
use rbuddy_sync::request::{CreateResolutionReq, RenameReq};
use rbuddy_sync::validate_resolution;

use super::Client;

/// Share a new resolution.
pub async fn post(text: &str, tags: Vec<Tag>, config_path: &Path) -> Result<()> {
    // Catch form errors before touching the network.
    validate_resolution(text, &tags).map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let client = Client::open(config_path, None).await?;
    client
        .emit(CreateResolutionReq::PATH, CreateResolutionReq { text: text.to_string(), tags })
        .await?;

    if let Some(err) = client.app.resolutions().draft().error {
        anyhow::bail!(err);
    }
    Ok(())
}

pub async fn rename(name: &str, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    client.emit(RenameReq::PATH, RenameReq { name: name.to_string() }).await
}
