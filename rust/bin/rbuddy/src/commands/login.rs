//! Login / logout commands.

use std::path::Path;

use anyhow::Result;
use rbuddy_sync::request::LoginReq;
use rbuddy_sync::state::{AuthPhase, AuthState};

use super::Client;
use crate::config::ClientConfig;

/// Verify `token` against the current context's server and save it.
pub async fn login(token: &str, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;
    let name = config.require_current()?.name.clone();

    let client = Client::anonymous(&config, None)?;
    let emitted = client.emit(LoginReq::PATH, LoginReq { token: token.to_string() }).await;

    let auth = client.flux.get_as::<AuthState>(AuthState::PATH).unwrap_or_else(AuthState::anonymous);
    if auth.phase != AuthPhase::Authenticated {
        emitted?;
        anyhow::bail!(auth.error.unwrap_or_else(|| "Login failed.".to_string()));
    }
    // Signed in; the follow-up feed reload is not part of the login.
    if let Err(e) = emitted {
        eprintln!("Warning: {}", e);
    }

    let ctx = config
        .get_mut(&name)
        .ok_or_else(|| anyhow::anyhow!("Context disappeared"))?;
    ctx.token = token.to_string();
    config.save(config_path)?;
    println!("Token saved to context \"{}\".", name);
    Ok(())
}

/// Logout: clear the token from the current context.
pub fn logout(config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;
    let name = config.require_current()?.name.clone();

    let ctx = config
        .get_mut(&name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    ctx.token = String::new();
    config.save(config_path)?;
    println!("Logged out from context \"{}\".", name);
    Ok(())
}

/// Print who the saved token belongs to.
pub async fn whoami(config_path: &Path) -> Result<()> {
    let client = Client::open(config_path, None).await?;
    match client.app.session().user() {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
        None => println!("Not logged in."),
    }
    Ok(())
}
