//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use karigar_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "karigar")]
#[command(version = "0.1")]
#[command(about = "Karigar home-services booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a new account
    Register(commands::auth::RegisterArgs),

    /// Log out and clear the stored session
    Logout,

    /// Show the currently authenticated user
    Whoami,

    /// Browse and manage services
    Services {
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Create and track bookings
    Bookings {
        #[command(subcommand)]
        command: BookingCommands,
    },

    /// Pay for bookings
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ServiceCommands {
    /// List available services
    List(commands::services::ListArgs),
    /// Show one service
    Show {
        /// Service id
        #[arg(value_name = "SERVICE_ID")]
        id: i64,
    },
    /// Publish a new service (providers only)
    Create(commands::services::CreateArgs),
    /// List your own services (providers only)
    Mine,
    /// List service categories
    Categories,
    /// Show catalog statistics
    Stats,
}

#[derive(clap::Subcommand)]
enum BookingCommands {
    /// Book a service
    Create(commands::bookings::CreateArgs),
    /// List your bookings
    List {
        /// Filter by status (pending, confirmed, in_progress, completed, cancelled)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one booking
    Show {
        /// Booking id (UUID)
        #[arg(value_name = "BOOKING_ID")]
        id: String,
    },
    /// Update a booking's status (providers only)
    SetStatus {
        /// Numeric booking id
        #[arg(value_name = "ID")]
        id: i64,
        /// New status (pending, confirmed, in_progress, completed, cancelled)
        #[arg(value_name = "STATUS")]
        status: String,
    },
    /// Show booking statistics
    Stats,
}

#[derive(clap::Subcommand)]
enum PaymentCommands {
    /// Create a payment intent for a booking
    Create {
        /// Booking id (UUID)
        #[arg(long)]
        booking: String,
        /// Payment method (card, upi, wallet)
        #[arg(long, default_value = "upi")]
        method: String,
    },
    /// Confirm a pending payment
    Confirm {
        /// Payment id (UUID)
        #[arg(value_name = "PAYMENT_ID")]
        id: String,
    },
    /// List your payments
    List,
    /// Show the payment status for a booking
    Status {
        /// Booking id (UUID)
        #[arg(value_name = "BOOKING_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::Login { username, password } => {
            let client = commands::client(&config)?;
            commands::auth::login(&client, &username, password).await
        }
        Commands::Register(args) => {
            let client = commands::client(&config)?;
            commands::auth::register(&client, args).await
        }
        Commands::Logout => {
            let client = commands::client(&config)?;
            commands::auth::logout(&client).await
        }
        Commands::Whoami => {
            let client = commands::client(&config)?;
            commands::auth::whoami(&client).await
        }

        Commands::Services { command } => {
            let client = commands::client(&config)?;
            match command {
                ServiceCommands::List(args) => commands::services::list(&client, args).await,
                ServiceCommands::Show { id } => commands::services::show(&client, id).await,
                ServiceCommands::Create(args) => commands::services::create(&client, args).await,
                ServiceCommands::Mine => commands::services::mine(&client).await,
                ServiceCommands::Categories => commands::services::categories(&client).await,
                ServiceCommands::Stats => commands::services::stats(&client).await,
            }
        }

        Commands::Bookings { command } => {
            let client = commands::client(&config)?;
            match command {
                BookingCommands::Create(args) => commands::bookings::create(&client, args).await,
                BookingCommands::List { status } => {
                    commands::bookings::list(&client, status.as_deref()).await
                }
                BookingCommands::Show { id } => commands::bookings::show(&client, &id).await,
                BookingCommands::SetStatus { id, status } => {
                    commands::bookings::set_status(&client, id, &status).await
                }
                BookingCommands::Stats => commands::bookings::stats(&client).await,
            }
        }

        Commands::Payments { command } => {
            let client = commands::client(&config)?;
            match command {
                PaymentCommands::Create { booking, method } => {
                    commands::payments::create(&client, &booking, &method).await
                }
                PaymentCommands::Confirm { id } => commands::payments::confirm(&client, &id).await,
                PaymentCommands::List => commands::payments::list(&client).await,
                PaymentCommands::Status { id } => commands::payments::status(&client, &id).await,
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
