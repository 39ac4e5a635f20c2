//! gorepl: an interactive environment for Go.

use clap::Parser as ClapParser;
use gorepl_cli::{colors, config::GoreplConfig, repl};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GOREPL_LOG";

#[derive(ClapParser)]
#[command(
    name = "gorepl",
    version,
    about = "Interactive Go REPL: type declarations and statements, see them run"
)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GoreplConfig::load();
    colors::set_enabled(config.repl.color && std::env::var_os("NO_COLOR").is_none());

    std::process::exit(repl::run_repl(&config));
}
