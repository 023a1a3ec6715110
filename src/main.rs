use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roomiehaus::{
    config::Config,
    greeting::{self, DisplayElement, GREETING_ELEMENT_ID},
    roommates, server, FirebaseApp,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "RoomieHaus backend and Firestore tools")]
struct Cli {
    /// Path to a JSON config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP backend
    Serve,
    /// Add a roommate, then list the collection
    Seed {
        #[clap(long, default_value = "Aura")]
        name: String,
        #[clap(long, default_value_t = 10000.0)]
        income: f64,
        /// Start the write and the listing together, without waiting for the write
        #[clap(long)]
        unordered: bool,
    },
    /// List every roommate
    List,
    /// Fetch the greeting from the backend and print it
    Greet {
        /// Endpoint to query instead of the configured one
        #[clap(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Cli::parse();

    let config = if let Some(path) = args.config {
        debug!("loading config from {:?}", path);
        Config::load(path).await?
    } else {
        debug!("using default config");
        Config::default().with_env_overrides()
    };

    match args.command {
        Command::Serve => {
            let app = FirebaseApp::from_config(&config)
                .await
                .context("failed to read service account key")?;
            server::run_until_ctrl_c(&config.server, app.firestore()).await
        }
        Command::Seed {
            name,
            income,
            unordered,
        } => {
            let db = FirebaseApp::from_config(&config)
                .await
                .context("failed to read service account key")?
                .firestore();
            if unordered {
                roommates::add_and_list_unordered(&db, &name, income).await;
            } else {
                roommates::add_then_list(&db, &name, income).await;
            }
            Ok(())
        }
        Command::List => {
            let db = FirebaseApp::from_config(&config)
                .await
                .context("failed to read service account key")?
                .firestore();
            if let Err(e) = roommates::list_roommates(&db).await {
                tracing::error!("{}", e);
            }
            Ok(())
        }
        Command::Greet { url } => {
            let url = url.unwrap_or(config.greeting_url);
            let mut element = DisplayElement::new(GREETING_ELEMENT_ID);
            greeting::render_greeting(&reqwest::Client::new(), &url, &mut element).await;
            println!("{}", element.text());
            Ok(())
        }
    }
}
