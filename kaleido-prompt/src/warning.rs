use std::fmt;

/// A recoverable problem found while reading user input.
///
/// Nothing in this crate aborts on bad input. Each offending fragment is
/// replaced by a default or dropped, and one of these records is returned
/// so the caller can decide whether to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    InvalidFlagValue {
        key: &'static str,
        value: String,
        default: &'static str,
    },
    MalformedFlag {
        fragment: String,
    },
    InvalidVariationCount {
        value: String,
        default: usize,
    },
    MissingVariationCount {
        default: usize,
    },
    EmptyCategory {
        name: String,
    },
    UnnamedCategory {
        line: String,
    },
    DuplicateCategory {
        name: String,
    },
    IgnoredVariationLine {
        line: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFlagValue {
                key,
                value,
                default,
            } => write!(f, "Invalid {key} '{value}', using default '{default}'"),
            Self::MalformedFlag { fragment } => {
                write!(f, "Skipping malformed flag '-{fragment}' (expected '-key value')")
            }
            Self::InvalidVariationCount { value, default } => write!(
                f,
                "Invalid variation count '{value}', using default {default}"
            ),
            Self::MissingVariationCount { default } => {
                write!(f, "No variation count given, using default {default}")
            }
            Self::EmptyCategory { name } => {
                write!(f, "Skipping variation category '{name}' with no options")
            }
            Self::UnnamedCategory { line } => {
                write!(f, "Skipping variation line '{line}' without a category name")
            }
            Self::DuplicateCategory { name } => write!(
                f,
                "Variation category '{name}' listed more than once, keeping the last options"
            ),
            Self::IgnoredVariationLine { line } => write!(
                f,
                "Ignoring variation line '{line}' (expected 'Name (option, option, ...)')"
            ),
        }
    }
}
