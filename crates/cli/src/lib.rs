//! Command-line interface for the converter-registration generator.

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub mod generate;

#[derive(Parser, Debug)]
#[command(
    name = "widlgen",
    version,
    about = "Generate webidl converter registrations from a WebIDL document"
)]
struct Cli {
    #[command(flatten)]
    args: generate::GenerateArgs,
}

/// Parse arguments and run the generator. Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => generate::run(cli.args),
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Initialize logging to stderr.
///
/// WIDLGEN_LOG controls the log level: "trace", "debug", "info", "warn",
/// "error", or a full tracing filter spec like "widlgen_core=debug".
pub fn init_tracing() {
    let filter = match std::env::var("WIDLGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("widlgen={level},widlgen_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => "widlgen=info,widlgen_core=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(value, "trace" | "debug" | "info" | "warn" | "error")
}
