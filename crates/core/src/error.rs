//! Error taxonomy for the generator.

/// Failure of a whole generation run. None of these are recoverable: the
/// caller gets no partial output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The IDL text was rejected by the parser.
    #[error("Failed to parse WebIDL input: {0}")]
    Parse(String),

    /// A declaration transitively depends on itself. Carries the name of a
    /// declaration on the cycle.
    #[error("Discovered circular dependency on {0}!")]
    CircularDependency(String),

    /// The input used a default-value shape the generator does not support.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}
