//! Read commands: `rbuddy feed`, `rbuddy show`, `rbuddy mine`.

use std::path::Path;

use anyhow::Result;
use rbuddy_client::SortKey;
use rbuddy_sync::request::{DetailOpenReq, FeedLoadMoreReq, LoadOwnReq};
use rbuddy_sync::state::OwnResolutions;

use super::{print_json, print_table, Client};

/// Load up to `pages` feed pages and list them.
pub async fn list(sort: Option<SortKey>, pages: u32, json: bool, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, sort).await?;
    for _ in 0..pages.max(1) {
        client.emit(FeedLoadMoreReq::PATH, FeedLoadMoreReq).await?;
        if !client.app.feed().state().has_more {
            break;
        }
    }

    let feed = client.app.feed().state();
    if json {
        return print_json(&feed.items);
    }
    print_table(&feed.items);
    if feed.has_more {
        println!("\n{} shown, more available (--pages {}).", feed.items.len(), pages + 1);
    }
    Ok(())
}

/// Show one resolution with its comments.
pub async fn show(id: &str, json: bool, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    client.emit(DetailOpenReq::PATH, DetailOpenReq { id: id.to_string() }).await?;

    let state = client
        .app
        .interactions()
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Resolution \"{}\" not found.", id))?;
    if json {
        return print_json(&state);
    }

    let panel = client.app.detail().panel();
    let liked = if state.has_liked { " (you liked this)" } else { "" };
    match &panel.resolution {
        Some(r) => {
            println!("{} · {}", r.author_name, r.created_at.format("%Y-%m-%d"));
            println!("  {}", r.text);
            if !r.tags.is_empty() {
                let tags: Vec<&str> = r.tags.iter().map(|t| t.as_str()).collect();
                println!("  Tags:     {}", tags.join(", "));
            }
        }
        None => println!("{}", id),
    }
    println!("  Likes:    {}{}", state.like_count, liked);
    println!("  Comments: {}", state.comment_count);
    for c in &state.comments {
        println!();
        println!("  {} · {}", c.author.name, c.created_at.format("%Y-%m-%d %H:%M"));
        println!("    {}", c.text);
    }
    Ok(())
}

/// List the signed-in user's own resolutions.
pub async fn mine(json: bool, config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    client.emit(LoadOwnReq::PATH, LoadOwnReq).await?;

    let own = client.flux.get_as::<OwnResolutions>(OwnResolutions::PATH).unwrap_or_default();
    if json {
        return print_json(&own.items);
    }
    print_table(&own.items);
    Ok(())
}
