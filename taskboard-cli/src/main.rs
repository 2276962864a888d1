//! # Taskboard
//!
//! Command line task tracker: users, projects and tasks kept in a local
//! SQLite database.
//!
//! ## Usage
//!
//! ```bash
//! taskboard user add alice alice@example.com --role manager
//! taskboard project add Launch --start 2024-01-01 --end 2024-03-31
//! taskboard task add "Write report" --due "2024-02-01 17:00" --project 1 --assignee 1
//! taskboard task overdue
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_cli::commands::{self, Cli};
use taskboard_cli::config::Config;
use taskboard_shared::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads TASKBOARD_DATABASE_URL
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_cli=info,taskboard_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?.with_database_url(cli.database_url);
    config.prepare_database_dir()?;

    tracing::debug!(
        "Taskboard v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.database.url
    );

    let store = Store::open(config.pool_config()).await?;

    let mut stdout = std::io::stdout().lock();
    let result = commands::run(cli.command, &store, cli.json, &mut stdout).await;

    store.close().await;
    result
}
