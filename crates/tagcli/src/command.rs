//! Command trees: named commands with a record factory, a handler and children.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::flag::FlagInfo;
use crate::parse::parse_into;
use crate::registry::{Argv, Registry};

type Runner = Box<dyn Fn(&[&str]) -> Result<()> + Send + Sync>;
type Describe = Box<dyn Fn() -> Result<Vec<FlagInfo>> + Send + Sync>;

/// A command: parses its own record from the arguments left after
/// subcommand resolution and hands it to a handler.
///
/// Once built a tree is read-only; each dispatch builds its own record
/// and registry, so a tree can be shared across threads.
pub struct Command {
    name: String,
    about: String,
    runner: Runner,
    describe: Describe,
    children: Vec<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// The node selected by [`Command::resolve`].
#[derive(Debug)]
pub struct Resolved<'c> {
    pub command: &'c Command,
    /// Names from the root down to `command`.
    pub path: Vec<&'c str>,
    /// Leading arguments consumed as subcommand names.
    pub consumed: usize,
}

impl Command {
    /// A command whose record starts as `T::default()`.
    pub fn new<T, F>(name: impl Into<String>, handler: F) -> Self
    where
        T: Argv + Default + 'static,
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::with_factory(name, T::default, handler)
    }

    /// A command whose record is produced by `factory` on every dispatch.
    pub fn with_factory<T, M, F>(name: impl Into<String>, factory: M, handler: F) -> Self
    where
        T: Argv + 'static,
        M: Fn() -> T + Send + Sync + 'static,
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let make = Arc::clone(&factory);
        let runner: Runner = Box::new(move |args: &[&str]| -> Result<()> {
            let mut record = make();
            parse_into(&mut record, args)?;
            handler(record).map_err(Error::Handler)
        });
        let describe: Describe = Box::new(move || -> Result<Vec<FlagInfo>> {
            let mut record = factory();
            let infos = Registry::build(&mut record)?.infos();
            Ok(infos)
        });

        Self {
            name: name.into(),
            about: String::new(),
            runner,
            describe,
            children: Vec::new(),
        }
    }

    /// One-line description shown in command listings.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// Add a child subtree. Sibling names must be unique.
    pub fn subcommand(mut self, child: Command) -> Result<Self> {
        self.register(child)?;
        Ok(self)
    }

    /// Add several child subtrees.
    pub fn register_tree(&mut self, forest: impl IntoIterator<Item = Command>) -> Result<()> {
        for child in forest {
            self.register(child)?;
        }
        Ok(())
    }

    fn register(&mut self, child: Command) -> Result<()> {
        if self.find(&child.name).is_some() {
            return Err(Error::DuplicateCommand {
                parent: self.name.clone(),
                name: child.name,
            });
        }
        self.children.push(child);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.about
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Direct child named `name`.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Describe the flags of this command's record.
    pub fn flags(&self) -> Result<Vec<FlagInfo>> {
        (self.describe)()
    }

    /// Descend through leading arguments that name child commands.
    ///
    /// Stops at the first argument that is a flag or names no child.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Resolved<'_> {
        let mut command = self;
        let mut path = vec![self.name.as_str()];
        let mut consumed = 0;
        for arg in args {
            let Some(child) = command.find(arg.as_ref()) else {
                break;
            };
            command = child;
            path.push(child.name.as_str());
            consumed += 1;
        }
        Resolved {
            command,
            path,
            consumed,
        }
    }

    /// Resolve a command path from `args` and dispatch the rest to it.
    ///
    /// The handler runs only if the record was built and parsed successfully.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let resolved = self.resolve(args);
        tracing::debug!(command = %resolved.path.join(" "), "dispatching command");
        let rest: Vec<&str> = args[resolved.consumed..]
            .iter()
            .map(|s| s.as_ref())
            .collect();
        (resolved.command.runner)(&rest)
    }
}

/// Attach `forest` as children of `command`.
pub fn tree(mut command: Command, forest: impl IntoIterator<Item = Command>) -> Result<Command> {
    command.register_tree(forest)?;
    Ok(command)
}
