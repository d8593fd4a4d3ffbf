//! WebIDL converter-registration generator.
//!
//! Takes a WebIDL document and produces the JavaScript statements that
//! register a type converter for every interface, enum, dictionary, and
//! typedef with a runtime's `webidl.*` converter registry. Declarations are
//! emitted in dependency order: every converter a statement references is
//! registered by an earlier statement, and circular references fail the run.

mod emitter;
mod error;
mod ir;

pub use emitter::generate;
pub use error::Error;
