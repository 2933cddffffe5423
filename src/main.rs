#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use goal_buddy::api::SqliteGoalApi;
use goal_buddy::store::{SharedGoalStore, refresh_goal_store};
use goal_buddy::{config, db, errors::Result, shell};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;

    // 4. Initialize database
    let db_pool = db::init_db(&app_config.database_path)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed initial goals (if necessary)
    let arc_app_config = Arc::new(app_config);
    db::seed_initial_goals(&db_pool, &arc_app_config)
        .await
        .inspect(|_| info!("Initial goals seeded successfully."))
        .inspect_err(|e| error!("Failed to seed initial goals: {}", e))?;

    // 6. Fill the shared store from the database
    let store = SharedGoalStore::new();
    refresh_goal_store(&db_pool, &store)
        .await
        .inspect_err(|e| error!("Failed to fill goal store: {}", e))?;

    // 7. Run the shell against the local backend
    let api = Arc::new(SqliteGoalApi::new(db_pool));
    shell::run_shell(store, api).await?;

    Ok(())
}
