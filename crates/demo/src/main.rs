use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::IsTerminal;
use std::process::ExitCode;
use tagcli::{Ansi, Argv, Command, Highlight, Plain, usage};
use tracing_subscriber::{EnvFilter, fmt};

const NAME: &str = "tagcli-demo";

#[derive(Argv, Default)]
struct RootArgs {
    /// Show help information
    #[cli("-h, --help, help")]
    help: bool,

    /// Show version information
    #[cli("-V, --version")]
    version: bool,
}

#[derive(Argv, Default)]
struct GreetArgs {
    /// Show help information
    #[cli("-h, --help, help")]
    help: bool,

    /// Who to greet
    #[cli("--name, required")]
    name: String,

    /// How many times to greet
    #[cli("-n, --times, default=1")]
    times: u32,

    /// Shout the greeting
    #[cli("-u, --upper")]
    upper: bool,

    #[cli]
    output: OutputArgs,
}

/// Output options shared by several commands.
#[derive(Argv, Default)]
struct OutputArgs {
    /// Text printed before each line
    #[cli("--prefix")]
    prefix: String,

    /// Print JSON instead of text
    #[cli("-j, --json")]
    json: bool,
}

#[derive(Argv, Default)]
struct SumArgs {
    /// Show help information
    #[cli("-h, --help, help")]
    help: bool,

    /// Numbers to add up
    #[cli("-x, --values, required")]
    values: Vec<String>,

    /// Treat values as floating point
    #[cli("-f, --float")]
    float: bool,

    #[cli]
    output: OutputArgs,
}

#[derive(Argv, Default)]
struct SchemaArgs {
    /// Show help information
    #[cli("-h, --help, help")]
    help: bool,

    /// Subcommand to describe
    #[cli("-c, --command, required")]
    command: String,
}

#[derive(Serialize)]
struct Greeting {
    text: String,
    count: u32,
}

fn main() -> ExitCode {
    init_tracing();
    tagcli::report(app().and_then(|app| app.run_env()))
}

fn app() -> tagcli::Result<Command> {
    tagcli::tree(
        Command::new(NAME, root).about("Example command tree"),
        [
            Command::new("greet", greet).about("Print a greeting"),
            Command::new("sum", sum).about("Add numbers"),
            Command::new("schema", schema).about("Describe a command's flags as JSON"),
        ],
    )
}

fn highlight() -> &'static dyn Highlight {
    if std::io::stdout().is_terminal() {
        &Ansi
    } else {
        &Plain
    }
}

fn root(args: RootArgs) -> Result<()> {
    tracing::debug!("executing root command");

    if args.version {
        println!("{NAME} {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Bare invocation prints help as well.
    print!("{}", usage::help(&app()?, highlight())?);
    Ok(())
}

fn greet(args: GreetArgs) -> Result<()> {
    tracing::debug!("executing greet command");

    if args.help {
        print!("{}", usage::usage::<GreetArgs>(highlight())?);
        return Ok(());
    }

    let mut text = format!("Hello, {}!", args.name);
    if args.upper {
        text = text.to_uppercase();
    }

    if args.output.json {
        let greeting = Greeting {
            text,
            count: args.times,
        };
        println!("{}", serde_json::to_string(&greeting)?);
        return Ok(());
    }

    for _ in 0..args.times {
        println!("{}{text}", args.output.prefix);
    }
    Ok(())
}

fn sum(args: SumArgs) -> Result<()> {
    tracing::debug!("executing sum command");

    if args.help {
        print!("{}", usage::usage::<SumArgs>(highlight())?);
        return Ok(());
    }

    let total = if args.float {
        let mut total = 0f64;
        for v in &args.values {
            total += v
                .parse::<f64>()
                .with_context(|| format!("invalid number: {v}"))?;
        }
        total.to_string()
    } else {
        let mut total = 0i64;
        for v in &args.values {
            let n = v
                .parse::<i64>()
                .with_context(|| format!("invalid integer: {v}"))?;
            total = total.checked_add(n).context("sum overflows i64")?;
        }
        total.to_string()
    };

    if args.output.json {
        println!("{}", serde_json::json!({ "sum": total }));
    } else {
        println!("{}{total}", args.output.prefix);
    }
    Ok(())
}

fn schema(args: SchemaArgs) -> Result<()> {
    tracing::debug!("executing schema command");

    if args.help {
        print!("{}", usage::usage::<SchemaArgs>(highlight())?);
        return Ok(());
    }

    let app = app()?;
    let Some(command) = app.find(&args.command) else {
        bail!("unknown command: {}", args.command);
    };
    println!("{}", serde_json::to_string_pretty(&command.flags()?)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
