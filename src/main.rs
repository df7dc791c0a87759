use std::process::ExitCode;

use tracing::{debug, error};

use blogo::cli::{register_all_commands, AppContext, Command, CommandRegistry};
use blogo::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_all_commands(&mut registry);

    let Some(command) = Command::from_args(std::env::args().skip(1)) else {
        println!("Usage: blogo <command> [args...]");
        println!("Commands: {}", registry.names().join(", "));
        return ExitCode::FAILURE;
    };

    match run(&registry, &command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command {} failed: {}", command.name, e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(registry: &CommandRegistry, command: &Command) -> blogo::Result<()> {
    let config_path = Config::default_path();
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = blogo::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        blogo::logging::init_console_only(&config.logging.level);
    }
    config.validate()?;
    debug!("Using config file {:?}", config_path);

    let db = Database::open(&config.database.path).await?;
    let mut ctx = AppContext::new(db, config, config_path);

    let result = registry.run(&mut ctx, command).await;
    ctx.db.close().await;
    result
}
