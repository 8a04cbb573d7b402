//! Flag descriptors: one bound record field plus its parse state.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::tag::Tag;
use crate::value::{self, CoercionError, Kind, Slot};

/// Description of a flag for usage rendering and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagInfo {
    pub field: String,
    pub names: Vec<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage: String,
    pub required: bool,
    pub help: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A bound record field.
pub struct Flag<'a> {
    field: &'static str,
    tag: Tag,
    usage: String,
    slot: &'a mut dyn Slot,
    assigned: bool,
    seen: bool,
    error: Option<CoercionError>,
}

impl std::fmt::Debug for Flag<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flag")
            .field("field", &self.field)
            .field("tag", &self.tag)
            .field("value", &self.slot.render())
            .field("assigned", &self.assigned)
            .field("error", &self.error)
            .finish()
    }
}

impl<'a> Flag<'a> {
    /// Build a descriptor from a field's tag, or `None` if the tag marks it ignored.
    ///
    /// A default literal is coerced into the field immediately.
    pub(crate) fn new(
        field: &'static str,
        raw_tag: &str,
        usage: &str,
        slot: &'a mut dyn Slot,
    ) -> Result<Option<Self>> {
        let tag = Tag::parse(field, raw_tag)?;
        if tag.ignored {
            return Ok(None);
        }
        if tag.is_help && slot.kind() != Kind::Bool {
            return Err(Error::TagSyntax {
                field: field.to_string(),
                tag: raw_tag.to_string(),
                reason: "`help` needs a bool field".to_string(),
            });
        }

        let mut flag = Flag {
            field,
            tag,
            usage: usage.trim().to_string(),
            slot,
            assigned: false,
            seen: false,
            error: None,
        };

        if let Some(literal) = flag.tag.default.clone() {
            let tokens = default_tokens(flag.slot.kind(), &literal);
            value::coerce(flag.slot.kind(), &tokens)
                .and_then(|v| flag.slot.store(v))
                .map_err(|source| Error::InvalidDefault {
                    flag: flag.name().to_string(),
                    source,
                })?;
            flag.assigned = true;
        }

        Ok(Some(flag))
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn kind(&self) -> Kind {
        self.slot.kind()
    }

    /// Every declared name, short names first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tag.names()
    }

    /// The first declared name; used in error messages.
    pub fn name(&self) -> &str {
        self.tag.names().next().unwrap_or(self.field)
    }

    pub fn is_required(&self) -> bool {
        self.tag.required
    }

    pub fn is_help(&self) -> bool {
        self.tag.is_help
    }

    /// Whether the field holds a default or a parsed value.
    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    /// Whether the field was given a default literal.
    pub fn has_default(&self) -> bool {
        self.tag.default.is_some()
    }

    /// The last coercion failure not yet superseded by a successful assignment.
    pub fn error(&self) -> Option<&CoercionError> {
        self.error.as_ref()
    }

    /// Current field contents as text.
    pub fn render(&self) -> String {
        self.slot.render()
    }

    pub(crate) fn is_set_true(&self) -> bool {
        self.slot.as_bool().unwrap_or(false)
    }

    /// Coerce `tokens` into the field.
    ///
    /// Repeated-text fields are replaced on the first occurrence in a parse
    /// and appended to afterwards. A failure is kept on the descriptor and
    /// returned; the field is left untouched.
    pub(crate) fn set(&mut self, tokens: &[&str]) -> std::result::Result<(), CoercionError> {
        let outcome = value::coerce(self.slot.kind(), tokens).and_then(|v| {
            if self.seen {
                self.slot.extend(v)
            } else {
                self.slot.store(v)
            }
        });
        match outcome {
            Ok(()) => {
                self.seen = true;
                self.assigned = true;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn info(&self) -> FlagInfo {
        FlagInfo {
            field: self.field.to_string(),
            names: self.names().map(str::to_string).collect(),
            kind: self.kind().to_string(),
            usage: self.usage.clone(),
            required: self.is_required(),
            help: self.is_help(),
            default: self.tag.default.clone(),
        }
    }
}

/// Lists take a whitespace-separated default; everything else takes the literal as one token.
fn default_tokens(kind: Kind, literal: &str) -> Vec<&str> {
    match kind {
        Kind::List => literal.split_whitespace().collect(),
        _ => vec![literal],
    }
}
