//! Error types for Scopegate

/// The main error type for authorization operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Module disabled or action not granted for the acting user
    Forbidden,
    /// A scoped single-entity lookup matched nothing; indistinguishable
    /// from the entity not existing at all
    NotFound,
    /// Storage or serialization failure from the config store or the
    /// ownership directory
    Store(String),
}

impl std::fmt::Display for AuthzError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthzError::Forbidden => write!(f, "Forbidden"),
            AuthzError::NotFound => write!(f, "Not found"),
            AuthzError::Store(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AuthzError {}

/// Result type alias for Scopegate operations
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Convert any error into a storage-side AuthzError
pub fn err<E: std::error::Error>(e: E) -> AuthzError {
    AuthzError::Store(e.to_string())
}

/// Map an optional row fetched under a scope filter to the row or NotFound.
///
/// Callers use this on single-entity reads so an out-of-scope record and a
/// truly missing record produce the same answer.
pub fn require_found<T>(row: Option<T>) -> Result<T> {
    row.ok_or(AuthzError::NotFound)
}
