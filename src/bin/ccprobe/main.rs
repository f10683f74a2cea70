//! ccprobe CLI - Ask the host C/C++ toolchain what it can do

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ccprobe=debug")
    } else {
        EnvFilter::new("ccprobe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Flag(args) => commands::flag::execute(args),
        Commands::Header(args) => commands::header::execute(args),
        Commands::Compile(args) => commands::check::compile(args),
        Commands::Link(args) => commands::check::link(args),
        Commands::Run(args) => commands::check::run(args),
        Commands::Report(args) => commands::report::execute(args),
        Commands::Toolchain => commands::toolchain::execute(),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
