//! RojarHat CLI - cart, checkout and order management.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the cart and check out
//! rh-cli cart add 3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b -q 2
//! rh-cli checkout --name "Rahim" --phone 01700000000 --address "Mirpur 10, Dhaka"
//!
//! # Manage orders
//! rh-cli orders list
//! rh-cli orders status 5e0f... processing
//! rh-cli orders watch
//!
//! # Dashboard summaries
//! rh-cli dashboard
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the cart stored on this device
//! - `wishlist` - Show and toggle wishlist entries
//! - `checkout` - Place the cart as an order
//! - `orders` - List orders, change status, watch for changes
//! - `dashboard` - Sales, inventory and category summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::{Context, LogFormat, init_tracing};

#[derive(Parser)]
#[command(name = "rh-cli")]
#[command(author, version, about = "RojarHat storefront and admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Place the cart as an order
    Checkout {
        /// Customer name
        #[arg(long)]
        name: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Delivery address
        #[arg(long)]
        address: String,

        /// Registered customer ID, if any
        #[arg(long)]
        customer_id: Option<String>,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Show dashboard summaries
    Dashboard,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show,
    /// Add a product
    Add {
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity by a signed amount
    Update {
        product_id: String,

        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Set a line's quantity
    Set { product_id: String, quantity: u32 },
    /// Remove a line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Print the wishlist
    Show,
    /// Add or remove a product
    Toggle { product_id: String },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        /// Only orders for this customer ID
        #[arg(long)]
        customer: Option<String>,
    },
    /// Change an order's status (`pending`, `processing`, `delivered`, `cancelled`)
    Status { order_id: String, status: String },
    /// Print the order list whenever it changes
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    match LogFormat::from_env() {
        Ok(format) => init_tracing(format),
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::warn!(error = %e, "Falling back to text logs");
        }
    }

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, &product_id, quantity).await?,
            CartAction::Update { product_id, delta } => {
                commands::cart::update(&ctx, &product_id, delta);
            }
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&ctx, &product_id, quantity),
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, &product_id),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::cart::wishlist_show(&ctx),
            WishlistAction::Toggle { product_id } => {
                commands::cart::wishlist_toggle(&ctx, &product_id);
            }
        },
        Commands::Checkout {
            name,
            phone,
            address,
            customer_id,
        } => commands::checkout::run(&ctx, name, phone, address, customer_id).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { customer } => commands::orders::list(&ctx, customer).await?,
            OrdersAction::Status { order_id, status } => {
                commands::orders::set_status(&ctx, &order_id, &status).await?;
            }
            OrdersAction::Watch { interval } => {
                commands::orders::watch(&ctx, Duration::from_secs(interval.max(1))).await?;
            }
        },
        Commands::Dashboard => commands::dashboard::run(&ctx).await?,
    }
    Ok(())
}
