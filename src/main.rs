use clap::Parser;
use taskdeck::cli::commands::Cli;
use taskdeck::cli::handlers;
use taskdeck::io::logging::{self, LogTarget};

fn main() {
    let cli = Cli::parse();

    let Some(token) = cli.token().map(str::to_string) else {
        eprintln!("Unable to find auth token.");
        std::process::exit(1);
    };

    if let Err(e) = run(cli, &token) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.client_config(token)?;

    // The TUI owns the terminal, so it only logs when given a file
    let target = match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, None) => LogTarget::Off,
        (None, Some(_)) => LogTarget::Stderr,
    };
    logging::init(&target, cli.verbose)?;

    match cli.command {
        None => taskdeck::tui::run(&config),
        Some(_) => handlers::dispatch(cli, &config),
    }
}
