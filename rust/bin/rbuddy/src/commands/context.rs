//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Register a server under `name`. The first context becomes current.
pub fn add(name: &str, server: &str, config_path: &Path) -> Result<()> {
    if !server.starts_with("http://") && !server.starts_with("https://") {
        anyhow::bail!("Server must be an http(s) URL, got \"{}\".", server);
    }
    let mut config = ClientConfig::load(config_path)?;
    config.upsert_context(Context {
        name: name.to_string(),
        server: server.trim_end_matches('/').to_string(),
        token: String::new(),
    });
    config.save(config_path)?;
    println!("Context \"{}\" saved.", name);
    Ok(())
}

pub fn list(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: rbuddy context add <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {}", "", "NAME", "SERVER", "AUTH");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let auth = if ctx.token.is_empty() { "-" } else { "token" };
        println!("{:2} {:20} {:40} {}", marker, ctx.name, ctx.server, auth);
    }
    Ok(())
}

pub fn use_context(name: &str, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" not found. Run `rbuddy context list` to see available contexts.", name);
    }

    config.current_context = name.to_string();
    config.save(config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

pub fn delete(name: &str, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_use_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        add("local", "http://localhost:5000/", &path).unwrap();
        add("prod", "https://rbuddy.example.com", &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current_context, "local");
        assert_eq!(config.require_current().unwrap().server, "http://localhost:5000");

        use_context("prod", &path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap().current_context, "prod");
        assert!(use_context("nope", &path).is_err());

        delete("prod", &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.contexts.len(), 1);
        assert!(config.current().is_none());
        assert!(delete("prod", &path).is_err());
    }

    #[test]
    fn rejects_non_http_server() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(add("x", "localhost:5000", &path).is_err());
        assert!(!path.exists());
    }
}
