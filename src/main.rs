mod adapters;
mod cli;
mod config;
mod core;

use std::io::{self, Write};

use clap::Parser;

use cli::{Cli, Commands};
use config::app_config::AppConfig;

fn main() {
    let args = Cli::parse();
    cli::init_logging(args.verbose);

    let mut out = io::stdout().lock();
    // Left unlocked: the export spinner draws to stderr from its own thread.
    let mut err = io::stderr();

    let result = match &args.command {
        Commands::Compare(compare) => {
            let code =
                cli::commands::compare::execute(compare, args.config.as_deref(), &mut out, &mut err);
            let _ = out.flush();
            std::process::exit(code);
        }
        Commands::Render {
            path,
            dispatcher_config_dir,
        } => AppConfig::load(args.config.as_deref()).and_then(|config| {
            cli::commands::render::execute(path, dispatcher_config_dir.as_deref(), &config, &mut out)
        }),
        Commands::Dictionary { path, format } => {
            cli::commands::dictionary::execute(path, *format, &mut out)
        }
        Commands::Template { path, extends } => {
            cli::commands::template::execute(path, extends.as_deref(), &mut out, &mut err)
        }
    };

    if let Err(e) = result {
        let _ = out.flush();
        cli::output::error(&mut err, &format!("Error: {e}"));
        std::process::exit(1);
    }
}
