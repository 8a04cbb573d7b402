//! Tokenizing an argument vector against a [`Registry`].
//!
//! Scanning is left to right:
//! - tokens not starting with `-` are skipped;
//! - `name=value` splits once on `=`, the right side becoming the first value;
//! - every following token not starting with `-` is taken as a further value;
//! - an unknown `-abc` token is read as the grouped short flags `-a -b -c`,
//!   none of which take values.
//!
//! After scanning, unresolved coercion failures and unassigned required
//! flags are reported. A help flag set to `true` suppresses the latter.

use crate::error::{Error, Result};
use crate::registry::{Argv, Registry};
use crate::tag::{DASH_ONE, DASH_TWO};
use crate::value::Kind;

/// Parse `args` into the record behind `registry`.
///
/// Fatal errors (unknown flags, too many values, a bad value for a flag with
/// a default) stop the scan immediately. Other coercion failures are
/// reported once scanning is done.
pub fn parse<S: AsRef<str>>(args: &[S], registry: &mut Registry<'_>) -> Result<()> {
    tracing::debug!(args = args.len(), "parsing arguments");

    let size = args.len();
    let mut i = 0;
    while i < size {
        let arg = args[i].as_ref();
        i += 1;
        if !arg.starts_with(DASH_ONE) {
            continue;
        }

        let start = i;
        while i < size && !args[i].as_ref().starts_with(DASH_ONE) {
            i += 1;
        }
        let trailing = &args[start..i];

        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (arg, None),
        };

        if let Some(idx) = registry.position(name) {
            let values: Vec<&str> = inline
                .into_iter()
                .chain(trailing.iter().map(|s| s.as_ref()))
                .collect();
            if values.len() > 1 && registry.flags()[idx].kind() != Kind::List {
                return Err(Error::TooManyValues {
                    flag: name.to_string(),
                    count: values.len(),
                });
            }
            assign(registry, idx, name, &values)?;
            continue;
        }

        if name.starts_with(DASH_TWO) {
            return Err(Error::UndefinedFlag(name.to_string()));
        }

        // Grouped short flags: `-abc` is `-a -b -c`.
        for c in name[DASH_ONE.len()..].chars() {
            let short = format!("{DASH_ONE}{c}");
            let Some(idx) = registry.position(&short) else {
                return Err(Error::UndefinedFlag(short));
            };
            assign(registry, idx, &short, &[])?;
        }
    }

    finish(registry)
}

/// Build a registry for `record` and parse `args` into it.
pub fn parse_into<T: Argv, S: AsRef<str>>(record: &mut T, args: &[S]) -> Result<()> {
    let mut registry = Registry::build(record)?;
    parse(args, &mut registry)
}

fn assign(registry: &mut Registry<'_>, idx: usize, name: &str, values: &[&str]) -> Result<()> {
    let flag = &mut registry.flags_mut()[idx];
    match flag.set(values) {
        Ok(()) => {
            let rendered = flag.render();
            tracing::trace!(flag = name, value = %rendered, "assigned flag");
            registry.record(name, rendered);
            Ok(())
        }
        Err(source) if flag.has_default() => Err(Error::InvalidAssignedArgument {
            flag: flag.name().to_string(),
            source,
        }),
        Err(source) => {
            tracing::debug!(flag = name, error = %source, "deferring coercion failure");
            Ok(())
        }
    }
}

fn finish(registry: &mut Registry<'_>) -> Result<()> {
    let deferred = registry
        .flags()
        .iter()
        .find_map(|f| f.error().map(|e| (f.name().to_string(), e.clone())));
    if let Some((flag, source)) = deferred {
        return Err(Error::InvalidValue { flag, source });
    }

    let help = registry
        .flags()
        .iter()
        .any(|f| f.is_help() && f.is_set_true());
    registry.set_skip_required_check(help);

    let missing: Vec<String> = registry
        .flags()
        .iter()
        .filter(|f| f.is_required() && !f.is_assigned())
        .map(|f| f.name().to_string())
        .collect();
    if !missing.is_empty() && !help {
        return Err(Error::RequiredMissing(missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Binder;

    #[derive(Debug, Default)]
    struct Opts {
        name: String,
        v: bool,
        port: u16,
        a: bool,
        b: bool,
        c: bool,
        tags: Vec<String>,
        level: i32,
        help: bool,
    }

    impl Argv for Opts {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("name", "--name, required", "", &mut self.name)?;
            binder.flag("v", "-v", "", &mut self.v)?;
            binder.flag("port", "-p, --port", "", &mut self.port)?;
            binder.flag("a", "-a", "", &mut self.a)?;
            binder.flag("b", "-b", "", &mut self.b)?;
            binder.flag("c", "-c", "", &mut self.c)?;
            binder.flag("tags", "-t, --tag", "", &mut self.tags)?;
            binder.flag("level", "-l, --level, default=3", "", &mut self.level)?;
            binder.flag("help", "-h, --help, help", "", &mut self.help)?;
            Ok(())
        }
    }

    fn run(args: &[&str]) -> (Opts, Result<()>) {
        let mut opts = Opts::default();
        let result = parse_into(&mut opts, args);
        (opts, result)
    }

    #[test]
    fn empty_args_report_missing_required() {
        let (_, result) = run(&[]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "required argument --name missing");
    }

    #[test]
    fn sets_bool_and_text() {
        let (opts, result) = run(&["-v", "--name", "abc"]);
        result.unwrap();
        assert_eq!(opts.name, "abc");
        assert!(opts.v);
    }

    #[test]
    fn bool_takes_explicit_value() {
        let (opts, result) = run(&["--name", "x", "-v", "false"]);
        result.unwrap();
        assert!(!opts.v);
    }

    #[test]
    fn equals_value_and_too_many_values() {
        let (opts, result) = run(&["--name", "x", "--port=8080"]);
        result.unwrap();
        assert_eq!(opts.port, 8080);

        let (_, result) = run(&["--name", "x", "--port", "8080", "extra"]);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::TooManyValues { ref flag, count: 2 } if flag == "--port"));

        let (_, result) = run(&["--name", "x", "--port=8080", "extra"]);
        assert!(matches!(result, Err(Error::TooManyValues { count: 2, .. })));
    }

    #[test]
    fn equals_splits_once() {
        let (opts, result) = run(&["--name=a=b"]);
        result.unwrap();
        assert_eq!(opts.name, "a=b");
    }

    #[test]
    fn grouped_short_flags_match_separate_flags() {
        let (grouped, result) = run(&["--name", "x", "-abc"]);
        result.unwrap();
        let (separate, result) = run(&["--name", "x", "-a", "-b", "-c"]);
        result.unwrap();
        assert!(grouped.a && grouped.b && grouped.c);
        assert_eq!(
            (grouped.a, grouped.b, grouped.c),
            (separate.a, separate.b, separate.c)
        );
    }

    #[test]
    fn grouped_short_flags_discard_values() {
        let (opts, result) = run(&["--name", "x", "-ab", "ignored"]);
        result.unwrap();
        assert!(opts.a && opts.b);
    }

    #[test]
    fn unknown_flags_are_fatal() {
        let (_, result) = run(&["--nope"]);
        assert!(matches!(result, Err(Error::UndefinedFlag(ref f)) if f == "--nope"));

        let (_, result) = run(&["-abz", "--name", "x"]);
        assert!(matches!(result, Err(Error::UndefinedFlag(ref f)) if f == "-z"));
    }

    #[test]
    fn positional_tokens_are_inert() {
        let (opts, result) = run(&["file.txt", "--name", "x", "-v"]);
        result.unwrap();
        assert_eq!(opts.name, "x");
        assert!(opts.v);
    }

    #[test]
    fn list_takes_all_values_and_accumulates() {
        let (opts, result) = run(&["--name", "x", "--tag", "a", "b", "-t=c"]);
        result.unwrap();
        assert_eq!(opts.tags, ["a", "b", "c"]);
    }

    #[test]
    fn invalid_value_for_defaulted_flag_is_fatal() {
        let (_, result) = run(&["--level", "high", "--nope"]);
        match result {
            Err(Error::InvalidAssignedArgument { flag, source }) => {
                assert_eq!(flag, "-l");
                assert_eq!(source.token, "high");
            }
            other => panic!("expected InvalidAssignedArgument, got: {other:?}"),
        }
    }

    #[test]
    fn invalid_value_without_default_is_deferred() {
        // The scan continues past the bad value and reaches the unknown flag.
        let (_, result) = run(&["--port", "http", "--nope"]);
        assert!(matches!(result, Err(Error::UndefinedFlag(_))));

        let (_, result) = run(&["--port", "http", "--name", "x"]);
        match result {
            Err(Error::InvalidValue { flag, source }) => {
                assert_eq!(flag, "-p");
                assert_eq!(source.token, "http");
            }
            other => panic!("expected InvalidValue, got: {other:?}"),
        }

        let (opts, result) = run(&["--port", "http", "--port", "80", "--name", "x"]);
        result.unwrap();
        assert_eq!(opts.port, 80);
    }

    #[test]
    fn help_suppresses_required_check() {
        let mut opts = Opts::default();
        let mut registry = Registry::build(&mut opts).unwrap();
        parse(&["-h"], &mut registry).unwrap();
        assert!(registry.skip_required_check());
        drop(registry);
        assert!(opts.help);
    }

    #[test]
    fn help_does_not_hide_bad_values() {
        let (opts, result) = run(&["-h", "--port", "x"]);
        match result {
            Err(Error::InvalidValue { flag, source }) => {
                assert_eq!(flag, "-p");
                assert_eq!(source.token, "x");
            }
            other => panic!("expected InvalidValue, got: {other:?}"),
        }
        assert!(opts.help);
    }

    #[test]
    fn repeated_scalar_keeps_last_value() {
        let (opts, result) = run(&["--name", "x", "--port", "1", "--port", "2"]);
        result.unwrap();
        assert_eq!(opts.port, 2);
    }

    #[test]
    fn records_values_under_matched_name() {
        let mut opts = Opts::default();
        let mut registry = Registry::build(&mut opts).unwrap();
        assert_eq!(registry.value("-l"), Some("3"));
        parse(&["--name", "abc", "-va", "--port=9"], &mut registry).unwrap();
        assert_eq!(registry.value("--name"), Some("abc"));
        assert_eq!(registry.value("-v"), Some("true"));
        assert_eq!(registry.value("-a"), Some("true"));
        assert_eq!(registry.value("--port"), Some("9"));
        assert_eq!(registry.value("-p"), None);
    }

    #[test]
    fn negative_numbers_need_equals() {
        let (opts, result) = run(&["--name", "x", "--level=-2"]);
        result.unwrap();
        assert_eq!(opts.level, -2);

        let (_, result) = run(&["--name", "x", "--level", "-2"]);
        assert!(matches!(result, Err(Error::InvalidAssignedArgument { .. })));
    }

    #[derive(Default)]
    struct Many {
        host: String,
        user: String,
        id: u32,
    }

    impl Argv for Many {
        fn bind<'a>(&'a mut self, binder: &mut Binder<'a>) -> Result<()> {
            binder.flag("host", "-H, --host, required", "", &mut self.host)?;
            binder.flag("user", "--user", "", &mut self.user)?;
            binder.flag("id", "--id, required", "", &mut self.id)?;
            Ok(())
        }
    }

    #[test]
    fn missing_required_flags_accumulate_in_declaration_order() {
        let mut many = Many::default();
        let err = parse_into(&mut many, &["--user", "me"]).unwrap_err();
        assert_eq!(err.missing(), ["-H", "--id"]);
        assert_eq!(
            err.to_string(),
            "required argument -H missing\nrequired argument --id missing"
        );
    }
}
