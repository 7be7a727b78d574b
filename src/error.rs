use thiserror::Error;

/// Failure of a strict operation (`safe_get`, `safe_set`, `safe_remove`).
///
/// Permissive operations never fail; pick the strict family when the
/// presence or absence of a key is a precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The key was expected to be present but is not.
    #[error("No value for key `{key}`")]
    NoValue { key: String },

    /// The key was expected to be absent but is already present.
    #[error("Key exists for key `{key}`")]
    KeyExists { key: String },
}

impl Error {
    /// The key the failed operation was addressed to.
    pub fn key(&self) -> &str {
        match self {
            Error::NoValue { key } | Error::KeyExists { key } => key,
        }
    }
}
