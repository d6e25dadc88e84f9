mod edit;
mod lookup;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "platemap")]
#[command(about = "Restaurant location editor")]
struct Cli {
    /// Signed-in owner whose restaurant is edited.
    #[arg(long, global = true, env = "PLATEMAP_OWNER_ID")]
    owner_id: Option<String>,

    /// Bearer token for the restaurant backend.
    #[arg(
        long,
        global = true,
        env = "PLATEMAP_SESSION_TOKEN",
        hide_env_values = true
    )]
    token: Option<String>,

    /// Restaurant id already known from sign-in; skips the owner lookup.
    #[arg(long, global = true, env = "PLATEMAP_RESTAURANT_ID")]
    restaurant_id: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Forward-geocode free text into address suggestions.
    Search { text: String },
    /// Reverse-geocode a coordinate into an address.
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Print the id of the owner's restaurant.
    ResolveId,
    /// Print the owner's restaurant profile as JSON.
    Show,
    /// Search, pick one suggestion as the restaurant location, optionally save.
    Pick {
        query: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Place the marker at a coordinate, resolve its address, optionally save.
    Click {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[command(flatten)]
        save: SaveArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct SaveArgs {
    /// Commit the new location and profile to the backend.
    #[arg(long)]
    save: bool,

    /// Image file to upload with the save.
    #[arg(long, requires = "save")]
    image: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = platemap_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi_logs())
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Some(Commands::Search { ref text }) => lookup::run_search(&config, text).await?,
        Some(Commands::Reverse { lat, lng }) => lookup::run_reverse(&config, lat, lng).await?,
        Some(Commands::ResolveId) => edit::run_resolve_id(&config, &session(&cli)?).await?,
        Some(Commands::Show) => edit::run_show(&config, &session(&cli)?).await?,
        Some(Commands::Pick {
            ref query,
            index,
            ref save,
        }) => edit::run_pick(&config, &session(&cli)?, query, index, save).await?,
        Some(Commands::Click { lat, lng, ref save }) => {
            edit::run_click(&config, &session(&cli)?, lat, lng, save).await?;
        }
        None => println!("no command given, see `platemap --help`"),
    }

    Ok(())
}

/// Builds the session from the global flags, failing when a required part is
/// missing.
fn session(cli: &Cli) -> anyhow::Result<platemap_core::SessionContext> {
    let owner_id = cli
        .owner_id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--owner-id (or PLATEMAP_OWNER_ID) is required"))?;
    let token = cli
        .token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--token (or PLATEMAP_SESSION_TOKEN) is required"))?;
    Ok(platemap_core::SessionContext {
        owner_id,
        restaurant_id: cli.restaurant_id.clone(),
        token,
    })
}
