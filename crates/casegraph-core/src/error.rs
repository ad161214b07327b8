use std::fmt;
use std::path::PathBuf;

/// Errors raised by the case store, the graph builder and the case manager.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    /// An edit or delete was requested while nothing is selected in the view.
    #[error("no case selected for {action}")]
    SelectionRequired { action: &'static str },

    /// The database file could not be opened, created, or brought to the
    /// current schema.
    #[error("case store unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// `SQLite` rejected a statement against an open store.
    #[error("case store rejected {operation}: {source}")]
    IntegrityFailure {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A config file exists but could not be read or parsed.
    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The parent directory of the database file could not be created.
    #[error("failed to create store directory {}: {source}", path.display())]
    StoreDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaseError {
    pub(crate) const fn integrity(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::IntegrityFailure { operation, source }
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::SelectionRequired { .. } => ErrorCode::SelectionRequired,
            Self::StorageUnavailable { .. } | Self::StoreDirectory { .. } => {
                ErrorCode::StorageUnavailable
            }
            Self::IntegrityFailure { .. } => ErrorCode::IntegrityFailure,
            Self::Config { .. } => ErrorCode::ConfigParseError,
        }
    }

    /// Remediation hint, falling back to a generic retry message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or("Retry once. If persistent, report a bug with logs.")
            .to_string()
    }
}

/// Machine-readable error codes shared by every front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SelectionRequired,
    ConfigParseError,
    StorageUnavailable,
    IntegrityFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SelectionRequired => "E1001",
            Self::ConfigParseError => "E2001",
            Self::StorageUnavailable => "E5001",
            Self::IntegrityFailure => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SelectionRequired => "No case selected",
            Self::ConfigParseError => "Config file parse error",
            Self::StorageUnavailable => "Case store unavailable",
            Self::IntegrityFailure => "Case store rejected the write",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SelectionRequired => Some("Select a case (or pass its ID) first."),
            Self::ConfigParseError => Some("Fix syntax in casegraph.toml and retry."),
            Self::StorageUnavailable => {
                Some("Check the --db path exists and is readable and writable.")
            }
            Self::IntegrityFailure => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::{CaseError, ErrorCode};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::SelectionRequired,
            ErrorCode::ConfigParseError,
            ErrorCode::StorageUnavailable,
            ErrorCode::IntegrityFailure,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::IntegrityFailure.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn integrity_failure_maps_to_its_code() {
        let err = CaseError::integrity("insert case", rusqlite::Error::InvalidQuery);
        assert_eq!(err.error_code(), ErrorCode::IntegrityFailure);
        assert!(err.to_string().contains("insert case"));
        assert_eq!(err.suggestion(), "Check disk space and write permissions.");
    }

    #[test]
    fn selection_required_names_the_action() {
        let err = CaseError::SelectionRequired { action: "edit" };
        assert_eq!(err.to_string(), "no case selected for edit");
    }
}
