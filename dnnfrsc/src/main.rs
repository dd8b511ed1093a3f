use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader};

mod repl;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    None,
}

impl LogLevel {
    fn to_trace(&self) -> Option<tracing::Level> {
        Some(match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::None => return None,
        })
    }
}

/// Interactive shell for querying d-DNNF circuits: model counting,
/// model extraction, conditioning, and linear-objective minimization.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_help = repl::HELP)]
struct Cli {
    /// Read commands from a file instead of standard input.
    #[arg(short, long, value_name = "cmd-file")]
    cmd: Option<String>,

    /// Verbosity level. See `tracing::Level` for more information.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    verbosity: LogLevel,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(level) = args.verbosity.to_trace() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    }

    let mut stdout = io::stdout();
    match args.cmd {
        Some(path) => {
            let file =
                File::open(&path).with_context(|| format!("could not open command file {path:?}"))?;
            repl::run(&mut BufReader::new(file), &mut stdout, false)
        }
        None => repl::run(&mut io::stdin().lock(), &mut stdout, true),
    }
}
