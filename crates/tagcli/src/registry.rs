//! Flag registry and the introspector that builds it from a record.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::flag::{Flag, FlagInfo};
use crate::value::Slot;

/// A configuration record whose fields can be bound to flags.
///
/// Usually derived with `#[derive(Argv)]`. A hand-written implementation
/// registers each field with the binder, in declaration order:
///
/// ```
/// use tagcli::{Argv, Binder};
///
/// #[derive(Default)]
/// struct Opts {
///     verbose: bool,
///     name: String,
/// }
///
/// impl Argv for Opts {
///     fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> tagcli::Result<()> {
///         binder.flag("verbose", "-v, --verbose", "", &mut self.verbose)?;
///         binder.flag("name", "--name, required", "who to greet", &mut self.name)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Argv {
    fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()>;
}

impl Argv for () {
    fn bind<'a>(&'a mut self, _binder: &mut Binder<'a>) -> Result<()> {
        Ok(())
    }
}

/// Collects flags from a record's fields into a [`Registry`].
pub struct Binder<'a> {
    registry: Registry<'a>,
}

impl<'a> Binder<'a> {
    /// Bind a leaf field.
    pub fn flag<S: Slot>(
        &mut self,
        field: &'static str,
        tag: &str,
        usage: &str,
        slot: &'a mut S,
    ) -> Result<()> {
        match Flag::new(field, tag, usage, slot)? {
            Some(flag) => self.registry.insert(flag),
            None => Ok(()),
        }
    }

    /// Flatten an embedded record's flags into the same registry.
    pub fn nested<T: Argv>(&mut self, record: &'a mut T) -> Result<()> {
        record.bind(self)
    }
}

/// Every flag bound from one record, indexed by name.
///
/// A registry borrows its record exclusively and records per-parse
/// assignment state, so it is built fresh for every parse.
#[derive(Debug, Default)]
pub struct Registry<'a> {
    flags: Vec<Flag<'a>>,
    index: IndexMap<String, usize>,
    values: IndexMap<String, String>,
    skip_required_check: bool,
}

impl<'a> Registry<'a> {
    /// Walk `record`'s fields (recursing into flattened records) and index their flags.
    pub fn build<T: Argv>(record: &'a mut T) -> Result<Self> {
        let mut binder = Binder {
            registry: Registry::default(),
        };
        record.bind(&mut binder)?;
        let registry = binder.registry;
        tracing::trace!(flags = registry.flags.len(), "built flag registry");
        Ok(registry)
    }

    fn insert(&mut self, flag: Flag<'a>) -> Result<()> {
        let idx = self.flags.len();
        for (i, name) in flag.names().enumerate() {
            if self.index.contains_key(name) {
                return Err(Error::DuplicateFlag(name.to_string()));
            }
            self.index.insert(name.to_string(), idx);
            if i == 0 && flag.is_assigned() {
                self.values.insert(name.to_string(), flag.render());
            }
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Flags in declaration order.
    pub fn flags(&self) -> &[Flag<'a>] {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut [Flag<'a>] {
        &mut self.flags
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a flag by any of its names (`-v`, `--verbose`).
    pub fn get(&self, name: &str) -> Option<&Flag<'a>> {
        self.position(name).map(|idx| &self.flags[idx])
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Last textual value recorded under `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Recorded values by the name they were assigned under.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn record(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    /// Whether a triggered help flag suppressed the required-flag check.
    pub fn skip_required_check(&self) -> bool {
        self.skip_required_check
    }

    pub(crate) fn set_skip_required_check(&mut self, skip: bool) {
        self.skip_required_check = skip;
    }

    pub fn infos(&self) -> Vec<FlagInfo> {
        self.flags.iter().map(Flag::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Output {
        format: String,
        color: bool,
    }

    impl Argv for Output {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("format", "--format, default=plain", "", &mut self.format)?;
            binder.flag("color", "-c, --color", "", &mut self.color)?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Opts {
        verbose: bool,
        output: Output,
        scratch: String,
    }

    impl Argv for Opts {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("verbose", "-v, --verbose", "", &mut self.verbose)?;
            binder.nested(&mut self.output)?;
            binder.flag("scratch", "-", "", &mut self.scratch)?;
            Ok(())
        }
    }

    #[test]
    fn flattens_nested_records_in_declaration_order() {
        let mut opts = Opts::default();
        let registry = Registry::build(&mut opts).unwrap();
        let fields: Vec<_> = registry.flags().iter().map(|f| f.field()).collect();
        assert_eq!(fields, ["verbose", "format", "color"]);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["-v", "--verbose", "--format", "-c", "--color"]
        );
        assert_eq!(registry.get("--color").unwrap().field(), "color");
        assert!(registry.get("--scratch").is_none());
    }

    #[test]
    fn default_seeds_first_name_only() {
        let mut opts = Opts::default();
        let registry = Registry::build(&mut opts).unwrap();
        assert_eq!(registry.value("--format"), Some("plain"));
        assert_eq!(registry.values().count(), 1);
        drop(registry);
        assert_eq!(opts.output.format, "plain");
    }

    struct Clash {
        a: String,
        b: String,
    }

    impl Argv for Clash {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("a", "--out", "", &mut self.a)?;
            binder.flag("b", "-o, --out", "", &mut self.b)?;
            Ok(())
        }
    }

    #[test]
    fn duplicate_names_fail_the_build() {
        let mut clash = Clash {
            a: String::new(),
            b: String::new(),
        };
        let err = Registry::build(&mut clash).unwrap_err();
        assert!(matches!(err, Error::DuplicateFlag(ref name) if name == "--out"));
        assert_eq!(err.to_string(), "duplicate flag --out");
    }

    struct NestedClash {
        color: bool,
        output: Output,
    }

    impl Argv for NestedClash {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("color", "-c", "", &mut self.color)?;
            binder.nested(&mut self.output)
        }
    }

    #[test]
    fn duplicate_detection_spans_nesting_levels() {
        let mut rec = NestedClash {
            color: false,
            output: Output::default(),
        };
        let err = Registry::build(&mut rec).unwrap_err();
        assert!(matches!(err, Error::DuplicateFlag(ref name) if name == "-c"));
    }
}
