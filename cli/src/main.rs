mod cli;
mod commands;

use clap::Parser;
use log::LevelFilter;
use marktree::config;

fn main() {
    let args = cli::Cli::parse();

    // Initialize logger
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        logger.filter_module("marktree", LevelFilter::Debug);
    }
    logger.init();

    if args.version {
        println!("marktree {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    // Load configuration
    let mut cfg = if let Some(config_path) = &args.config {
        match config::Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        config::Config::load()
    };
    cli::apply_overrides(&mut cfg, &args);

    if let Err(e) = cli::handle_args(args, &cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
