// Standard library
use std::error::Error;
use std::sync::Arc;

// 3rd party crates
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

// Project imports
use studio_limiter::inspector::{Command, Inspector};
use studio_limiter::settings::ConfigManager;

/// Development console for the AI provider rate limiter.
///
/// Loads the provider quota profiles from the configuration file, builds a
/// limiter and answers inspection commands read from stdin. Refuses to run
/// outside the development environment.
#[tokio::main]
async fn main() {
    // loads the .env file from the current directory or parents.
    dotenvy::dotenv_override().ok();

    let config: Arc<ConfigManager> = match ConfigManager::new().await {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to initialize configuration: {}", e);
            std::process::exit(1);
        }
    };

    // setup logging.
    let log_level: String = config.get_log_level().await;

    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(log_level);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    info!("⚙️ Settings have been loaded from {:?}", config.config_path);

    if !config.is_development().await {
        error!(
            "The inspection console only runs in development, current environment is '{}'",
            config.get_environment().await
        );
        std::process::exit(1);
    }

    let inspector = match config.build_limiter().await {
        Ok(limiter) => Inspector::new(limiter),
        Err(e) => {
            error!("Failed to build the rate limiter: {}", e);
            std::process::exit(1);
        }
    };

    // Create a broadcast channel for shutdown signal
    let (shutdown_tx, _) = broadcast::channel(1);
    let shutdown_tx_clone = shutdown_tx.clone();

    // Handle Ctrl+C
    tokio::spawn(async move {
        if let Err(e) = ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received shutdown signal, initiating graceful shutdown...");
        let _ = shutdown_tx_clone.send(());
    });

    if let Err(e) = run(inspector, shutdown_tx.subscribe()).await {
        error!("Application error: {}", e);
    }

    info!("Shutdown complete.");
}

/// Reads commands until `quit`, end of input or the shutdown signal.
///
/// Each command runs in its own task so that an `acquire` waiting in a
/// queue does not block the console; results are printed as they finish.
async fn run(
    inspector: Inspector,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type 'help' for the list of commands.");

    loop {
        tokio::select! {
            // Handle shutdown signal
            Ok(_) = shutdown_rx.recv() => {
                info!("Received shutdown signal, leaving console...");
                break;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input reached");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command: Command = match line.parse() {
                    Ok(Command::Quit) => break,
                    Ok(command) => command,
                    Err(e) => {
                        warn!("Rejected console input '{}': {}", line.trim(), e);
                        println!("error: {}", e);
                        continue;
                    }
                };

                let inspector = inspector.clone();
                tokio::spawn(async move {
                    match inspector.execute(command).await {
                        Ok(serde_json::Value::String(text)) => println!("{}", text),
                        Ok(value) => match serde_json::to_string_pretty(&value) {
                            Ok(rendered) => println!("{}", rendered),
                            Err(e) => error!("Failed to render result: {}", e),
                        },
                        Err(e) => println!("error: {}", e),
                    }
                });
            }
        }
    }

    Ok(())
}
