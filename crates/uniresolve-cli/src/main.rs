#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use commands::Context;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "uniresolve")]
#[command(author, version, about = "Resolve import specifiers across monorepo packages", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Use this configuration file instead of searching for one
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the resolution mode
    #[arg(long, global = true, value_parser = ["development", "production"])]
    mode: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a specifier as imported from a file
    Resolve {
        /// The specifier to resolve (e.g. "~/lib/x" or "other-pkg")
        target: String,

        /// The importing file
        #[arg(long, value_name = "FILE")]
        from: PathBuf,

        /// Print an absolute path instead of one relative to the importing file
        #[arg(long)]
        absolute: bool,
    },

    /// Show each decision taken while resolving a specifier
    Explain {
        /// The specifier to resolve
        target: String,

        /// The importing file
        #[arg(long, value_name = "FILE")]
        from: PathBuf,

        /// Resolve to an absolute path
        #[arg(long)]
        absolute: bool,
    },

    /// List configured packages
    Packages,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => std::env::current_dir()
            .map(|cur| cur.join(&dir))
            .unwrap_or(dir),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    logging::init(cli.verbose, cli.json);

    let ctx = Context {
        cwd,
        json: cli.json,
        config: cli.config,
        mode: cli.mode,
    };

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(ctx.json),
        Some(Commands::Resolve {
            target,
            from,
            absolute,
        }) => {
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %ctx.cwd.display());
            let _guard = span.enter();
            commands::resolve::run(&ctx, &target, &from, absolute)
        }
        Some(Commands::Explain {
            target,
            from,
            absolute,
        }) => {
            let span = tracing::info_span!("explain", cmd = "explain", cwd = %ctx.cwd.display());
            let _guard = span.enter();
            commands::explain::run(&ctx, &target, &from, absolute)
        }
        Some(Commands::Packages) => commands::packages::run(&ctx),
    }
}
