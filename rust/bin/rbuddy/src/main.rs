//! `rbuddy`: command-line client for the resolutions feed.
//!
//! Every command builds a fresh sync engine for the current context, drives
//! it through Flux requests and prints the state it ends up in.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use rbuddy_client::{SortKey, Tag};

#[derive(Parser, Debug)]
#[command(name = "rbuddy", about = "rbuddy resolutions client")]
struct Cli {
    /// Path to client config file (default: ~/.rbuddy/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage server contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Save a bearer token for the current context after verifying it.
    Login {
        #[arg(long)]
        token: String,
    },

    /// Clear the token from the current context.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// List the public feed.
    Feed {
        /// recent or popular.
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortKey>,
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Show a resolution and its comments.
    Show { id: String },

    /// Toggle your like on a resolution.
    Like { id: String },

    /// Comment on a resolution.
    Comment { id: String, text: String },

    /// Share a new resolution.
    Post {
        text: String,
        /// Tag (repeatable, up to 3).
        #[arg(long = "tag", short = 't', value_parser = parse_tag)]
        tags: Vec<Tag>,
    },

    /// List your own resolutions.
    Mine,

    /// Change your display name.
    Rename { name: String },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Add or update a context.
    Add {
        name: String,
        #[arg(long)]
        server: String,
    },
    /// List all contexts.
    List,
    /// Switch the current context.
    Use { name: String },
    /// Delete a context.
    Delete { name: String },
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse()
}

fn parse_tag(s: &str) -> Result<Tag, String> {
    s.parse::<Tag>().map_err(|e| e.to_string())
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.output == "json";

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Add { name, server } => commands::context::add(&name, &server, &config_path)?,
            ContextAction::List => commands::context::list(&config_path)?,
            ContextAction::Use { name } => commands::context::use_context(&name, &config_path)?,
            ContextAction::Delete { name } => commands::context::delete(&name, &config_path)?,
        },

        Commands::Login { token } => commands::login::login(&token, &config_path).await?,
        Commands::Logout => commands::login::logout(&config_path)?,
        Commands::Whoami => commands::login::whoami(&config_path).await?,

        Commands::Feed { sort, pages } => commands::feed::list(sort, pages, json, &config_path).await?,
        Commands::Show { id } => commands::feed::show(&id, json, &config_path).await?,
        Commands::Mine => commands::feed::mine(json, &config_path).await?,

        Commands::Like { id } => commands::react::like(&id, &config_path).await?,
        Commands::Comment { id, text } => commands::react::comment(&id, &text, &config_path).await?,

        Commands::Post { text, tags } => commands::post::post(&text, tags, &config_path).await?,
        Commands::Rename { name } => commands::post::rename(&name, &config_path).await?,

        Commands::Version => println!("rbuddy cli v{}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}
