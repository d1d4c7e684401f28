use chms_cli::cli::dispatcher::Dispatcher;
use chms_cli::cli::main_types::Cli;
use chms_cli::storage::config::Config;
use chms_cli::utils::logging::init_logger;
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // Load Config
    let config_path = match Config::file_path(cli.config_dir.as_deref().map(Path::new)) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Error locating config: {}", err);
            std::process::exit(1);
        }
    };

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!("Verbose mode is enabled");
        eprintln!("Using config file: {}", config_path.display());

        if cli.token.as_ref().is_some_and(|token| !token.is_empty()) {
            eprintln!("Using session token provided via env or command line");
        }
    }

    let dispatcher = match Dispatcher::new(config, config_path, cli.profile, cli.token, cli.verbose)
    {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Error: {}", e.display_friendly());
            std::process::exit(1);
        }
    };

    // Execute the command
    match dispatcher.dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e.display_friendly());
            if let Some(hint) = e.troubleshooting_hint() {
                eprintln!("Hint: {}", hint);
            }
            std::process::exit(1);
        }
    }
}
