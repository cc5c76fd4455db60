//! Vitrine CLI - Database migrations and a device client.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! vitrine migrate
//!
//! # Show (creating on first use) this device's anonymous id
//! vitrine identity show
//!
//! # Start over with a new anonymous id
//! vitrine identity reset
//!
//! # Toggle a favourite / list favourites on a running server
//! vitrine favourite toggle 6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f
//! vitrine favourite list --server http://localhost:3000
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use vitrine_core::ItemId;

mod commands;
mod identity;

use commands::favourite::FavouriteClient;
use identity::DeviceIdentity;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine CLI tools")]
struct Cli {
    /// Base URL of the Vitrine server
    #[arg(long, global = true, env = "VITRINE_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// File holding this device's anonymous id
    #[arg(long, global = true, env = "VITRINE_IDENTITY_FILE")]
    identity_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage this device's anonymous identity
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// Favourite items on a running server
    Favourite {
        #[command(subcommand)]
        action: FavouriteAction,
    },
}

#[derive(Subcommand)]
enum IdentityAction {
    /// Print the anonymous id, creating it on first use
    Show,
    /// Replace the anonymous id with a new one
    Reset,
}

#[derive(Subcommand)]
enum FavouriteAction {
    /// Favourite an item, or un-favourite it if already favourited
    Toggle {
        /// Item id
        item_id: ItemId,
    },
    /// List this device's favourites
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let identity = DeviceIdentity::at(
        cli.identity_file
            .clone()
            .unwrap_or_else(DeviceIdentity::default_path),
    );

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Identity { action } => {
            let id = match action {
                IdentityAction::Show => identity.load_or_create(Utc::now())?,
                IdentityAction::Reset => identity.reset(Utc::now())?,
            };
            println!("{id}");
        }
        Commands::Favourite { action } => {
            let user = identity.load_or_create(Utc::now())?;
            let client = FavouriteClient::new(&cli.server)?;

            match action {
                FavouriteAction::Toggle { item_id } => {
                    let outcome = client.toggle(item_id, &user).await?;
                    if outcome.favourited {
                        println!("favourited {item_id}");
                    } else {
                        println!("removed {item_id} from favourites");
                    }
                }
                FavouriteAction::List => {
                    for favourite in client.list(&user).await? {
                        println!(
                            "{}  {}  {}  {}",
                            favourite.item.id,
                            favourite.item.slug,
                            favourite.item.price,
                            favourite.item.name
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
