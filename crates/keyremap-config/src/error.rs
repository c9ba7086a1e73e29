use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse KDL")]
    #[diagnostic(code(keyremap::config::parse_error))]
    ParseError {
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source]
        source: kdl::KdlError,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(keyremap::config::invalid))]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    #[diagnostic(code(keyremap::config::missing_field))]
    MissingField {
        field: String,
        #[source_code]
        src: String,
        #[label("in this rule")]
        span: miette::SourceSpan,
    },

    #[error("{} invalid key(s) in rule set", invalid_keys.len())]
    #[diagnostic(
        code(keyremap::config::invalid_keys),
        help("Key names are case-insensitive, e.g. `Ctrl`, `LAlt`, `F5`, `CapsLock`, or a raw code such as `0x41`; shortcuts join keys with `+`")
    )]
    InvalidKeys {
        #[source_code]
        src: String,
        #[related]
        invalid_keys: Vec<InvalidKeyInfo>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of a rule an invalid key was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPosition {
    Source,
    Target,
}

impl fmt::Display for KeyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPosition::Source => write!(f, "source"),
            KeyPosition::Target => write!(f, "target"),
        }
    }
}

/// Position of a token in the rule-set file (1-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub len: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize, len: usize) -> Self {
        Self {
            line,
            column,
            offset,
            len,
        }
    }

    pub fn span(&self) -> miette::SourceSpan {
        (self.offset, self.len).into()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A key or shortcut that could not be parsed.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {position} '{key}' at {location}: {reason}")]
#[diagnostic(code(keyremap::config::invalid_key))]
pub struct InvalidKeyInfo {
    pub key: String,
    pub position: KeyPosition,
    pub reason: String,
    pub location: SourceLocation,
    #[label("{reason}")]
    span: miette::SourceSpan,
}

impl InvalidKeyInfo {
    pub fn new(key: impl Into<String>, position: KeyPosition, reason: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            key: key.into(),
            position,
            reason: reason.into(),
            location,
            span: location.span(),
        }
    }
}
