pub mod context;
pub mod feed;
pub mod login;
pub mod post;
pub mod react;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rbuddy_client::{ResolutionSummary, SortKey};
use rbuddy_flux::Flux;
use rbuddy_sync::state::{LoginPrompt, Notice, NoticeLevel};
use rbuddy_sync::{ResolutionsApp, SessionHandle};
use tracing::debug;

use crate::config::ClientConfig;

/// An engine bound to the current context, driven through its Flux router.
pub struct Client {
    pub app: Arc<ResolutionsApp>,
    pub flux: Flux,
}

impl Client {
    /// Connect to the current context. A saved token is verified first so
    /// authenticated requests carry a known user.
    pub async fn open(config_path: &Path, sort: Option<SortKey>) -> Result<Self> {
        let config = ClientConfig::load(config_path)?;
        let client = Self::anonymous(&config, sort)?;
        let token = &config.require_current()?.token;
        if !token.is_empty() {
            if let Err(e) = client.app.login(token).await {
                eprintln!("Saved token rejected ({}). Continuing anonymously.", e.user_message());
            }
        }
        Ok(client)
    }

    /// Connect to the current context without a session.
    pub fn anonymous(config: &ClientConfig, sort: Option<SortKey>) -> Result<Self> {
        let ctx = config.require_current()?;
        debug!(context = %ctx.name, server = %ctx.server, "connecting");
        let app = Arc::new(ResolutionsApp::connect(
            &ctx.server,
            SessionHandle::anonymous(),
            config.sync_config(sort),
        ));
        let flux = app.clone().into_flux();
        Ok(Self { app, flux })
    }

    /// Emit a request and turn whatever the handler left behind into a
    /// result: a login prompt or an error notice fails the command.
    pub async fn emit<T: std::any::Any + Send + Sync>(&self, path: &str, req: T) -> Result<()> {
        self.flux.store().remove(Notice::PATH);
        self.flux.store().remove(LoginPrompt::PATH);
        self.flux.emit(path, req).await;

        if let Some(prompt) = self.flux.get_as::<LoginPrompt>(LoginPrompt::PATH) {
            anyhow::bail!("{} Run `rbuddy login --token <token>`.", prompt.message);
        }
        match self.flux.get_as::<Notice>(Notice::PATH) {
            Some(Notice { level: NoticeLevel::Error, message }) => anyhow::bail!(message),
            Some(Notice { level: NoticeLevel::Info, message }) => println!("{}", message),
            None => {}
        }
        Ok(())
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(items: &[ResolutionSummary]) {
    if items.is_empty() {
        println!("No resolutions yet.");
        return;
    }
    println!("{:26} {:16} {:>5} {:>5}  {}", "ID", "AUTHOR", "LIKES", "CMTS", "RESOLUTION");
    for r in items {
        let liked = if r.has_liked { "*" } else { " " };
        println!(
            "{:26} {:16} {:>4}{} {:>5}  {}",
            r.id,
            truncate(&r.author_name, 16),
            r.like_count,
            liked,
            r.comment_count,
            truncate(&r.text, 60),
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
