use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Internal lock was poisoned during the named operation.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// An argument is missing or has the wrong type for where it is used.
    #[error("argument ${position}: {reason}")]
    Argument { position: usize, reason: String },

    /// The backend rejected or failed to run the query.
    #[error("query failed: {0}")]
    Query(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
