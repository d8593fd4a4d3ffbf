//! Converter-registration generator entry point.
//!
//! The pipeline is:
//! 1. Parse: WebIDL text -> weedle2 AST
//! 2. Normalize: AST -> declaration IR
//! 3. Sort: dependency graph -> declaration order
//! 4. Emit: one registration statement group per declaration

use tracing::debug;

use crate::error::Error;
use crate::ir::{emit_module, normalize, DependencyGraph};

/// Generate the converter-registration source for a WebIDL document.
///
/// The output registers a converter for every non-partial interface, enum,
/// dictionary, and typedef, ordered so that every referenced converter is
/// registered before its referents.
pub fn generate(idl: &str) -> Result<String, Error> {
    let definitions = weedle::parse(idl).map_err(|err| Error::Parse(format!("{err:?}")))?;

    let declarations = normalize(&definitions)?;
    debug!(declarations = declarations.len(), "normalized WebIDL input");

    let sorted = DependencyGraph::build(declarations).sort()?;

    Ok(emit_module(&sorted))
}
