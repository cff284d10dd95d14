//! Error types for configuration and force evaluation.

/// Reasons why a configuration value was rejected.
///
/// Parse failures are reported to the caller, which decides whether to keep
/// the previous value or abort.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    UnknownParameter(String),
    InvalidValue { param: String, value: String },
    UnknownEdgeStrategy(String),
    UnknownDistanceMeasure(String),
    UnknownForce(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownParameter(name) => write!(f, "unknown parameter '{name}'"),
            ConfigError::InvalidValue { param, value } => {
                write!(f, "invalid value '{value}' for parameter '{param}'")
            }
            ConfigError::UnknownEdgeStrategy(name) => write!(f, "unknown edge type '{name}'"),
            ConfigError::UnknownDistanceMeasure(name) => {
                write!(f, "unknown implicit surface distance measure '{name}'")
            }
            ConfigError::UnknownForce(name) => write!(f, "no force term registered as '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures while initializing or updating a force term.
#[derive(Clone, Debug, PartialEq)]
pub enum ForceError {
    /// A tissue mask does not share the lattice of the intensity image.
    GeometryMismatch { mask: &'static str },
    /// A per-vertex array does not match the number of surface points.
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// `update` or `evaluate_gradient` was called before `initialize`.
    NotInitialized,
}

impl std::fmt::Display for ForceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForceError::GeometryMismatch { mask } => write!(
                f,
                "attributes of {mask} mask differ from those of the intensity image"
            ),
            ForceError::LengthMismatch {
                what,
                expected,
                found,
            } => write!(f, "{what}: expected {expected} entries, found {found}"),
            ForceError::NotInitialized => write!(f, "force term used before initialization"),
        }
    }
}

impl std::error::Error for ForceError {}
