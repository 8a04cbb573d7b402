//! Field tag syntax.
//!
//! A tag is a comma-separated list of entries:
//!
//! ```text
//! -v, --verbose            short and long names
//! --name, required         must be supplied
//! -h, --help, help         marks the help-trigger boolean
//! -p, --port, default=80   default literal (consumes the rest of the tag)
//! -                        ignored field
//! ```

use crate::error::{Error, Result};

pub(crate) const DASH_ONE: &str = "-";
pub(crate) const DASH_TWO: &str = "--";

const REQUIRED: &str = "required";
const HELP: &str = "help";
const DEFAULT: &str = "default=";
const IGNORE: &str = "-";

/// Parsed binding metadata for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub short_names: Vec<String>,
    pub long_names: Vec<String>,
    pub required: bool,
    pub is_help: bool,
    pub default: Option<String>,
    pub ignored: bool,
}

impl Tag {
    /// Parse the tag attached to `field`.
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let fail = |reason: String| Error::TagSyntax {
            field: field.to_string(),
            tag: raw.to_string(),
            reason,
        };

        let mut tag = Tag::default();
        if raw.trim() == IGNORE {
            tag.ignored = true;
            return Ok(tag);
        }

        let mut rest = raw;
        while !rest.trim().is_empty() {
            let trimmed = rest.trim_start();
            if let Some(literal) = trimmed.strip_prefix(DEFAULT) {
                tag.default = Some(literal.trim().to_string());
                break;
            }

            let (entry, tail) = match rest.split_once(',') {
                Some((entry, tail)) => (entry.trim(), tail),
                None => (rest.trim(), ""),
            };
            rest = tail;

            match entry {
                "" => return Err(fail("empty entry".to_string())),
                IGNORE => return Err(fail("`-` must be the whole tag".to_string())),
                REQUIRED if tag.required => {
                    return Err(fail("`required` given twice".to_string()));
                }
                REQUIRED => tag.required = true,
                HELP if tag.is_help => return Err(fail("`help` given twice".to_string())),
                HELP => tag.is_help = true,
                _ => {
                    if let Some(name) = entry.strip_prefix(DASH_TWO) {
                        check_name(name).map_err(|reason| fail(format!("{entry}: {reason}")))?;
                        if name.chars().count() < 2 {
                            return Err(fail(format!(
                                "{entry}: long names need at least two characters"
                            )));
                        }
                        tag.long_names.push(entry.to_string());
                    } else if let Some(name) = entry.strip_prefix(DASH_ONE) {
                        check_name(name).map_err(|reason| fail(format!("{entry}: {reason}")))?;
                        if name.chars().count() != 1 {
                            return Err(fail(format!(
                                "{entry}: short names are a single character"
                            )));
                        }
                        tag.short_names.push(entry.to_string());
                    } else {
                        return Err(fail(format!("unknown entry `{entry}`")));
                    }
                }
            }
        }

        if tag.short_names.is_empty() && tag.long_names.is_empty() {
            return Err(fail("no flag names declared".to_string()));
        }
        Ok(tag)
    }

    /// Short names followed by long names, each in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.short_names
            .iter()
            .chain(self.long_names.iter())
            .map(String::as_str)
    }
}

fn check_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.starts_with('-') {
        return Err("too many leading dashes");
    }
    if name.contains('=') {
        return Err("names cannot contain `=`");
    }
    if name.chars().any(char::is_whitespace) {
        return Err("names cannot contain whitespace");
    }
    Ok(())
}
