use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wifi_screen_client::{DisplayClient, DisplaySession};
use wifi_screen_core::config::Config;
use wifi_screen_core::CanvasBatch;

mod logging;

#[derive(Parser)]
#[command(
    name = "wifi-screen",
    about = "Draw on a network-attached display through its HTTP canvas API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Device base URL (overrides device.base_url)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the greeting text, pause, then draw the shape sampler
    Demo,

    /// Show the display resolution
    Info,

    /// Send a JSON batch file (array of tagged canvas commands)
    Draw {
        /// Path to the batch file
        file: PathBuf,
    },

    /// Paint the whole canvas one color
    Clear {
        #[arg(long, default_value = "black")]
        color: String,
    },

    /// Upload an image into the device cache for `Image { key }` commands
    Upload {
        /// Cache key
        #[arg(short, long)]
        key: String,
        /// PNG, JPEG or GIF file
        file: PathBuf,
    },

    /// Draw a PNG, JPEG or GIF file at the top-left corner without caching it
    DrawImage {
        /// Image file
        file: PathBuf,
    },

    /// Remove an image from the device cache
    DeleteImage { key: String },

    /// Show the device status document
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);

    let mut config = Config::load(&config_path)?;
    if let Some(url) = cli.url {
        config.device.base_url = url;
    }

    logging::init(cli.verbose, config.logging.as_ref());

    let (warnings, errors) = config.validate();
    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    if !errors.is_empty() {
        anyhow::bail!("invalid config {}: {}", config_path.display(), errors.join("; "));
    }

    let client = DisplayClient::from_config(&config)?;
    tracing::debug!(url = client.base_url(), "Using device");

    match cli.command {
        Commands::Demo => {
            DisplaySession::new(client).run().await?;
        }
        Commands::Info => {
            let screen = client.fetch_config().await?;
            println!("{}x{}", screen.rotated_width, screen.rotated_height);
        }
        Commands::Draw { file } => {
            let json = std::fs::read_to_string(&file)?;
            let batch = CanvasBatch::from_json(&json)?;
            tracing::info!(file = %file.display(), commands = batch.len(), "Drawing batch");
            client.draw_batch(&batch).await?;
        }
        Commands::Clear { color } => {
            let screen = client.fetch_config().await?;
            client
                .draw_batch(&CanvasBatch::cleared(&screen, color))
                .await?;
        }
        Commands::Upload { key, file } => {
            let data = std::fs::read(&file)?;
            tracing::info!(%key, file = %file.display(), "Uploading image");
            let keys = client.upload_image(&key, data).await?;
            println!("{keys}");
        }
        Commands::DrawImage { file } => {
            let data = std::fs::read(&file)?;
            tracing::info!(file = %file.display(), bytes = data.len(), "Drawing image");
            let drawn = client.draw_image(data).await?;
            println!("{}x{} {}", drawn.width, drawn.height, drawn.detail);
        }
        Commands::DeleteImage { key } => {
            let keys = client.delete_image(&key).await?;
            println!("{keys}");
        }
        Commands::Status => {
            let status = client.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                if let Some(dir) = config_path.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                config.save(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}
