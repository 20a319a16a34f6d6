//! `rbuddy like` and `rbuddy comment`.

use std::path::Path;

use anyhow::Result;
use rbuddy_sync::request::{CommentDraftReq, CommentSubmitReq, DetailOpenReq, ToggleLikeReq};

use super::Client;

/// Open the resolution so its interaction state is tracked.
async fn track(client: &Client, id: &str) -> Result<()> {
    client.emit(DetailOpenReq::PATH, DetailOpenReq { id: id.to_string() }).await
}

pub async fn like(id: &str, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    track(&client, id).await?;
    client.emit(ToggleLikeReq::PATH, ToggleLikeReq { id: id.to_string() }).await?;

    if let Some(s) = client.app.interactions().get(id) {
        let verb = if s.has_liked { "Liked" } else { "Unliked" };
        println!("{} {} ({} likes).", verb, id, s.like_count);
    }
    Ok(())
}

pub async fn comment(id: &str, text: &str, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    track(&client, id).await?;
    client
        .emit(CommentDraftReq::PATH, CommentDraftReq { id: id.to_string(), text: text.to_string() })
        .await?;
    client.emit(CommentSubmitReq::PATH, CommentSubmitReq { id: id.to_string() }).await?;

    let draft = client.app.comments().draft(id);
    if let Some(err) = draft.error {
        anyhow::bail!(err);
    }
    if let Some(s) = client.app.interactions().get(id) {
        if let Some(c) = s.comments.first() {
            println!("Comment {} added ({} comments).", c.id, s.comment_count);
        }
    }
    Ok(())
}
