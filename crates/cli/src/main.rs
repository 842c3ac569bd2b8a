//! Sepet CLI - Drive the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two medium blue shirts
//! sepet add --id p1 --name Shirt --price 100 --size M --color blue --qty 2
//!
//! # Add a product document as the catalog returns it
//! sepet add --json '{"_id":"p2","title":"Mug","price":{"newPrice":45}}'
//!
//! # Change or remove a line
//! sepet update p1-M-blue 4
//! sepet remove p1-M-blue
//!
//! # Show lines, totals and the active storage tier
//! sepet show
//! ```
//!
//! # Environment Variables
//!
//! - `SEPET_DATA_DIR` - Directory holding the durable storage file (default: `.sepet`)
//! - `RUST_LOG` - Log filter (default: `sepet=info`)
//! - See `sepet_cart::config` for cart settings

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "sepet")]
#[command(author, version, about = "Sepet cart tools")]
struct Cli {
    /// Directory holding the durable storage file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add {
        /// Product ID
        #[arg(long, conflicts_with = "json")]
        id: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Unit price
        #[arg(long)]
        price: Option<Decimal>,

        /// Image reference
        #[arg(long)]
        image: Option<String>,

        /// Full product document as JSON
        #[arg(long)]
        json: Option<String>,

        /// Selected size
        #[arg(short, long)]
        size: Option<String>,

        /// Selected colour
        #[arg(short, long)]
        color: Option<String>,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a line by its cart item ID
    Remove {
        /// Cart item ID (e.g. `p1-M-blue`)
        cart_item_id: String,
    },
    /// Set a line's quantity (zero or less removes it)
    Update {
        /// Cart item ID
        cart_item_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Empty the cart
    Clear,
    /// Show cart contents
    Show,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sepet=info,sepet_cart=info,sepet_core=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let mut cart = commands::cart::open(cli.data_dir)?;

    match cli.command {
        Commands::Add {
            id,
            name,
            price,
            image,
            json,
            size,
            color,
            qty,
        } => {
            let product = match json {
                Some(json) => commands::cart::product_from_json(&json),
                None => commands::cart::product_from_flags(id, name, price, image)?,
            };
            commands::cart::add(&mut cart, &product, size.as_deref(), color.as_deref(), qty);
        }
        Commands::Remove { cart_item_id } => commands::cart::remove(&mut cart, &cart_item_id),
        Commands::Update { cart_item_id, qty } => {
            commands::cart::update(&mut cart, &cart_item_id, qty);
        }
        Commands::Clear => cart.clear(),
        Commands::Show => {}
    }

    commands::cart::show(&cart);
    Ok(())
}
