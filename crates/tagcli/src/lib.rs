//! Declarative command-line flag binding.
//!
//! A configuration record describes its flags with tags on its fields;
//! parsing fills the record in place or fails with a precise [`Error`].
//!
//! ```
//! use tagcli::Argv;
//!
//! #[derive(Argv, Default)]
//! struct Opts {
//!     /// Who to greet
//!     #[cli("-n, --name, required")]
//!     name: String,
//!     #[cli("-p, --port, default=8080")]
//!     port: u16,
//!     #[cli("-v, --verbose")]
//!     verbose: bool,
//! }
//!
//! let mut opts = Opts::default();
//! tagcli::parse_into(&mut opts, &["-v", "--name", "abc"]).unwrap();
//! assert_eq!(opts.name, "abc");
//! assert_eq!(opts.port, 8080);
//! assert!(opts.verbose);
//! ```
//!
//! Commands group records into a tree of subcommands:
//!
//! ```
//! use tagcli::{Argv, Command};
//!
//! #[derive(Argv, Default)]
//! struct Sub {
//!     #[cli("--id, required")]
//!     id: u64,
//! }
//!
//! let app = tagcli::tree(
//!     Command::new("app", |_: ()| Ok(())),
//!     [Command::new("sub", |sub: Sub| {
//!         println!("id = {}", sub.id);
//!         Ok(())
//!     })],
//! )
//! .unwrap();
//! app.run(&["sub", "--id", "42"]).unwrap();
//! assert!(app.run(&["sub"]).is_err());
//! ```

pub mod command;
pub mod error;
pub mod flag;
pub mod parse;
pub mod registry;
pub mod runner;
pub mod tag;
pub mod usage;
pub mod value;

pub use command::{Command, Resolved, tree};
pub use error::{Error, Result};
pub use flag::{Flag, FlagInfo};
pub use parse::{parse, parse_into};
pub use registry::{Argv, Binder, Registry};
pub use runner::{report, run};
pub use tag::Tag;
pub use usage::{Ansi, Highlight, Plain};
pub use value::{CoercionError, Kind, Slot, Value};

// Derive macro (compile-time only); shares its name with the trait.
pub use tagcli_macros::Argv;
