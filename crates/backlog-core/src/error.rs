use std::fmt;

/// Machine-readable error codes shared by the library and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    EntityNotFound,
    NoSelection,
    ParentNotFound,
    InvalidEnumValue,
    NoCurrentUser,
    InvalidEstimate,
    StoreReadFailed,
    StoreWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EntityNotFound => "E2001",
            Self::NoSelection => "E2002",
            Self::ParentNotFound => "E2003",
            Self::InvalidEnumValue => "E2004",
            Self::NoCurrentUser => "E2005",
            Self::InvalidEstimate => "E2006",
            Self::StoreReadFailed => "E5001",
            Self::StoreWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Backlog not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::EntityNotFound => "No record with that id",
            Self::NoSelection => "Nothing selected",
            Self::ParentNotFound => "Selected parent does not exist",
            Self::InvalidEnumValue => "Invalid priority/status/role value",
            Self::NoCurrentUser => "No current user",
            Self::InvalidEstimate => "Invalid time estimate",
            Self::StoreReadFailed => "Store read failed",
            Self::StoreWriteFailed => "Store write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `bl init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .backlog/config.toml and retry."),
            Self::EntityNotFound => Some("List records to find a valid id."),
            Self::NoSelection => {
                Some("Select a parent first: `bl project select <id>` or `bl story select <id>`.")
            }
            Self::ParentNotFound => Some("The selected parent was deleted; select another one."),
            Self::InvalidEnumValue => {
                Some("Use low|medium|high for priority and todo|doing|done for status.")
            }
            Self::NoCurrentUser => Some("Run `bl user login <id>` to pick a user."),
            Self::InvalidEstimate => Some("Pass a non-negative number of hours, e.g. 2.5."),
            Self::StoreReadFailed => None,
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
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
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 11] = [
        ErrorCode::NotInitialized,
        ErrorCode::ConfigParseError,
        ErrorCode::EntityNotFound,
        ErrorCode::NoSelection,
        ErrorCode::ParentNotFound,
        ErrorCode::InvalidEnumValue,
        ErrorCode::NoCurrentUser,
        ErrorCode::InvalidEstimate,
        ErrorCode::StoreReadFailed,
        ErrorCode::StoreWriteFailed,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::NoSelection.to_string(), "E2002");
    }
}
