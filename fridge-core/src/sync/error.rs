//! Remote store error types.

/// Errors from the remote document store.
///
/// Reads cover snapshot fetches and live subscriptions; writes cover the
/// delete and insert steps of a replace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Snapshot read or subscription failed.
    #[error("failed to read '{path}': {reason}")]
    Read { path: String, reason: String },
    /// Delete or insert was rejected.
    #[error("failed to write '{path}': {reason}")]
    Write { path: String, reason: String },
}

impl StoreError {
    pub fn read(path: &str, reason: impl std::fmt::Display) -> Self {
        StoreError::Read {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: &str, reason: impl std::fmt::Display) -> Self {
        StoreError::Write {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The collection path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            StoreError::Read { path, .. } | StoreError::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::write("Fridge", "permission denied");
        assert_eq!(err.to_string(), "failed to write 'Fridge': permission denied");
        assert_eq!(err.path(), "Fridge");

        let err = StoreError::read("Grocery List", "timeout");
        assert_eq!(err.to_string(), "failed to read 'Grocery List': timeout");
    }
}
