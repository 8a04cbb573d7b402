//! Error types for registry construction, argument parsing and dispatch.

use thiserror::Error;

use crate::value::CoercionError;

/// Errors produced while binding a record or dispatching a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Two fields (at any nesting depth) declare the same flag name.
    #[error("duplicate flag {0}")]
    DuplicateFlag(String),

    /// A field's tag could not be parsed.
    #[error("invalid tag \"{tag}\" on field `{field}`: {reason}")]
    TagSyntax {
        field: String,
        tag: String,
        reason: String,
    },

    /// A default literal failed to coerce into its field.
    #[error("default value of {flag} invalid: {source}")]
    InvalidDefault {
        flag: String,
        #[source]
        source: CoercionError,
    },

    /// A flag token, or one character of a grouped short-flag token, is not registered.
    #[error("undefined flag {0}")]
    UndefinedFlag(String),

    /// More values were supplied to one flag occurrence than it accepts.
    #[error("too many values ({count}) for flag {flag}")]
    TooManyValues { flag: String, count: usize },

    /// A value supplied for a default-seeded flag failed to coerce.
    #[error("assigned argument {flag} invalid: {source}")]
    InvalidAssignedArgument {
        flag: String,
        #[source]
        source: CoercionError,
    },

    /// A value supplied for a flag without a default failed to coerce.
    #[error("invalid value for flag {flag}: {source}")]
    InvalidValue {
        flag: String,
        #[source]
        source: CoercionError,
    },

    /// One or more required flags were never assigned, in declaration order.
    #[error("{}", required_message(.0))]
    RequiredMissing(Vec<String>),

    /// A process argument is not valid UTF-8; shown lossily.
    #[error("argument {0} is not valid UTF-8")]
    NonUtf8Argument(String),

    /// Two children of the same command share a name.
    #[error("duplicate command {name} under {parent}")]
    DuplicateCommand { parent: String, name: String },

    /// The handler of a dispatched command failed.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl Error {
    /// Names of the missing required flags, if this is a [`Error::RequiredMissing`].
    pub fn missing(&self) -> &[String] {
        match self {
            Self::RequiredMissing(names) => names.as_slice(),
            _ => &[],
        }
    }
}

fn required_message(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("required argument {name} missing"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
