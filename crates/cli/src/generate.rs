//! The generate command: read an IDL file, write the registration script.

use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Input WebIDL file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file for the generated registrations
    #[arg(short, long, value_name = "PATH", default_value = "out.js")]
    pub out: PathBuf,
}

pub fn run(args: GenerateArgs) -> i32 {
    match generate_file(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn generate_file(args: &GenerateArgs) -> Result<(), String> {
    let idl = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read {}: {err}", args.input.display()))?;

    // Generate fully before touching the output path: a failed run must not
    // leave partial output behind.
    let script = widlgen_core::generate(&idl).map_err(|err| err.to_string())?;

    fs::write(&args.out, &script)
        .map_err(|err| format!("Failed to write {}: {err}", args.out.display()))?;

    debug!(
        out = %args.out.display(),
        script_len = script.len(),
        "converter registrations generated"
    );
    Ok(())
}
