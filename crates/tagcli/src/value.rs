//! Value coercion from raw argument tokens into field representations.
//!
//! The set of supported kinds is closed: [`Kind`] enumerates them and
//! [`coerce`] branches on it. Record fields participate through the sealed
//! [`Slot`] trait, which narrows a coerced [`Value`] into the concrete field
//! type and renders the field back to text.

use std::fmt;

use thiserror::Error;

/// The data representation a flag's field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    List,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "string",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coerced value, prior to being written back into its field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

/// A token could not be converted into the target kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", coercion_message(.token, .kind, .reason))]
pub struct CoercionError {
    pub token: String,
    pub kind: Kind,
    pub reason: String,
}

impl CoercionError {
    fn new(token: &str, kind: Kind, reason: impl Into<String>) -> Self {
        Self {
            token: token.to_string(),
            kind,
            reason: reason.into(),
        }
    }

    fn missing(kind: Kind) -> Self {
        Self::new("", kind, "missing value")
    }
}

fn coercion_message(token: &str, kind: &Kind, reason: &str) -> String {
    if token.is_empty() {
        format!("{kind} value expected: {reason}")
    } else {
        format!("invalid {kind} value \"{token}\": {reason}")
    }
}

/// Convert raw tokens into a value of `kind`.
///
/// A boolean with no token is `true`. Scalars take exactly one token.
/// Lists take every token, in order.
pub fn coerce(kind: Kind, tokens: &[&str]) -> Result<Value, CoercionError> {
    if kind == Kind::List {
        return Ok(Value::List(tokens.iter().map(|t| t.to_string()).collect()));
    }

    let token = match tokens {
        [] if kind == Kind::Bool => return Ok(Value::Bool(true)),
        [] => return Err(CoercionError::missing(kind)),
        [token] => *token,
        [_, extra, ..] => {
            return Err(CoercionError::new(
                extra,
                kind,
                format!("expected one value, got {}", tokens.len()),
            ));
        }
    };

    match kind {
        Kind::Bool => parse_bool(token)
            .map(Value::Bool)
            .ok_or_else(|| CoercionError::new(token, kind, "not a boolean")),
        Kind::Int => token
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| CoercionError::new(token, kind, e.to_string())),
        Kind::Uint => token
            .parse::<u64>()
            .map(Value::Uint)
            .map_err(|e| CoercionError::new(token, kind, e.to_string())),
        Kind::Float => token
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| CoercionError::new(token, kind, e.to_string())),
        Kind::Text => Ok(Value::Text(token.to_string())),
        Kind::List => Ok(Value::List(vec![token.to_string()])),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A record field that can be bound to a flag.
///
/// Implemented for `bool`, the primitive integers, `f32`, `f64`, `String`
/// and `Vec<String>`.
pub trait Slot: sealed::Sealed {
    fn kind(&self) -> Kind;

    /// Write `value` into the field. Integers are range-checked.
    fn store(&mut self, value: Value) -> Result<(), CoercionError>;

    /// Append to a list field. Scalars replace their contents.
    fn extend(&mut self, value: Value) -> Result<(), CoercionError> {
        self.store(value)
    }

    /// Textual representation of the current contents.
    fn render(&self) -> String;

    fn as_bool(&self) -> Option<bool> {
        None
    }
}

fn mismatch(kind: Kind, value: &Value) -> CoercionError {
    CoercionError::new(&format!("{value:?}"), kind, "value of the wrong kind")
}

impl sealed::Sealed for bool {}

impl Slot for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn store(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(mismatch(Kind::Bool, &other)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn as_bool(&self) -> Option<bool> {
        Some(*self)
    }
}

macro_rules! int_slot {
    ($kind:ident, $variant:ident, $($ty:ty),+) => {$(
        impl sealed::Sealed for $ty {}

        impl Slot for $ty {
            fn kind(&self) -> Kind {
                Kind::$kind
            }

            fn store(&mut self, value: Value) -> Result<(), CoercionError> {
                match value {
                    Value::$variant(n) => {
                        *self = <$ty>::try_from(n).map_err(|_| {
                            CoercionError::new(
                                &n.to_string(),
                                Kind::$kind,
                                concat!("out of range for ", stringify!($ty)),
                            )
                        })?;
                        Ok(())
                    }
                    other => Err(mismatch(Kind::$kind, &other)),
                }
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )+};
}

int_slot!(Int, Int, i8, i16, i32, i64, isize);
int_slot!(Uint, Uint, u8, u16, u32, u64, usize);

impl sealed::Sealed for f64 {}

impl Slot for f64 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn store(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Float(x) => {
                *self = x;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, &other)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl sealed::Sealed for f32 {}

impl Slot for f32 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn store(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Float(x) => {
                if x.is_finite() && !(f64::from(f32::MIN)..=f64::from(f32::MAX)).contains(&x) {
                    return Err(CoercionError::new(
                        &x.to_string(),
                        Kind::Float,
                        "out of range for f32",
                    ));
                }
                *self = x as f32;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, &other)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl sealed::Sealed for String {}

impl Slot for String {
    fn kind(&self) -> Kind {
        Kind::Text
    }

    fn store(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Text(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch(Kind::Text, &other)),
        }
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl sealed::Sealed for Vec<String> {}

impl Slot for Vec<String> {
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn store(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::List(items) => {
                *self = items;
                Ok(())
            }
            other => Err(mismatch(Kind::List, &other)),
        }
    }

    fn extend(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::List(items) => {
                Extend::extend(self, items);
                Ok(())
            }
            other => Err(mismatch(Kind::List, &other)),
        }
    }

    fn render(&self) -> String {
        format!("[{}]", self.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_without_token_is_true() {
        assert_eq!(coerce(Kind::Bool, &[]), Ok(Value::Bool(true)));
        assert_eq!(coerce(Kind::Bool, &["false"]), Ok(Value::Bool(false)));
        assert_eq!(coerce(Kind::Bool, &["Yes"]), Ok(Value::Bool(true)));
        assert!(coerce(Kind::Bool, &["maybe"]).is_err());
    }

    #[test]
    fn numbers_require_exactly_one_token() {
        assert_eq!(coerce(Kind::Int, &["-12"]), Ok(Value::Int(-12)));
        assert_eq!(coerce(Kind::Uint, &["8080"]), Ok(Value::Uint(8080)));
        assert_eq!(coerce(Kind::Float, &["1.5"]), Ok(Value::Float(1.5)));

        let err = coerce(Kind::Int, &[]).unwrap_err();
        assert_eq!(err.reason, "missing value");

        let err = coerce(Kind::Uint, &["abc"]).unwrap_err();
        assert_eq!(err.token, "abc");
        assert_eq!(err.kind, Kind::Uint);
        assert!(err.to_string().starts_with("invalid uint value \"abc\""));
    }

    #[test]
    fn text_is_verbatim_and_lists_keep_order() {
        assert_eq!(
            coerce(Kind::Text, &[" spaced out "]),
            Ok(Value::Text(" spaced out ".to_string()))
        );
        assert_eq!(
            coerce(Kind::List, &["b", "a"]),
            Ok(Value::List(vec!["b".to_string(), "a".to_string()]))
        );
        assert_eq!(coerce(Kind::List, &[]), Ok(Value::List(Vec::new())));
    }

    #[test]
    fn narrow_integers_are_range_checked() {
        let mut port: u16 = 0;
        port.store(Value::Uint(8080)).unwrap();
        assert_eq!(port, 8080);

        let err = port.store(Value::Uint(70_000)).unwrap_err();
        assert!(err.reason.contains("out of range for u16"));
        assert_eq!(port, 8080);
    }

    #[test]
    fn f32_rejects_finite_values_out_of_range() {
        let mut ratio: f32 = 0.5;
        let err = ratio.store(Value::Float(1e300)).unwrap_err();
        assert_eq!(err.kind, Kind::Float);
        assert!(err.reason.contains("out of range for f32"));
        assert_eq!(ratio, 0.5);

        ratio.store(Value::Float(2.25)).unwrap();
        assert_eq!(ratio, 2.25);
        ratio.store(Value::Float(f64::INFINITY)).unwrap();
        assert!(ratio.is_infinite());
    }

    #[test]
    fn coercion_error_messages() {
        let err = coerce(Kind::Int, &["x"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid int value \"x\": invalid digit found in string"
        );
        let err = coerce(Kind::Text, &[]).unwrap_err();
        assert_eq!(err.to_string(), "string value expected: missing value");
    }

    #[test]
    fn list_extend_appends() {
        let mut tags = vec!["a".to_string()];
        Slot::extend(&mut tags, Value::List(vec!["b".to_string()])).unwrap();
        assert_eq!(tags, ["a", "b"]);
        assert_eq!(tags.render(), "[a b]");
    }
}
