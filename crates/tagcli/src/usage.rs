//! Usage rendering over a registry's flag descriptions.
//!
//! The renderer never touches parse state; it works from [`FlagInfo`]
//! values, so it can describe a record without parsing anything.

use colored::Colorize;

use crate::command::Command;
use crate::error::Result;
use crate::flag::FlagInfo;
use crate::registry::{Argv, Registry};

/// Formatting capability injected into the renderer.
pub trait Highlight {
    fn heading(&self, text: &str) -> String;
    fn name(&self, text: &str) -> String;
    fn note(&self, text: &str) -> String;
}

/// No styling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Highlight for Plain {
    fn heading(&self, text: &str) -> String {
        text.to_string()
    }

    fn name(&self, text: &str) -> String {
        text.to_string()
    }

    fn note(&self, text: &str) -> String {
        text.to_string()
    }
}

/// ANSI terminal styling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Highlight for Ansi {
    fn heading(&self, text: &str) -> String {
        text.bold().underline().to_string()
    }

    fn name(&self, text: &str) -> String {
        text.bold().to_string()
    }

    fn note(&self, text: &str) -> String {
        text.dimmed().to_string()
    }
}

fn format_left(info: &FlagInfo) -> String {
    let mut out = info.names.join(", ");
    if info.kind != "bool" {
        out.push_str(&format!(" <{}>", info.kind));
    }
    out
}

fn format_help(info: &FlagInfo) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !info.usage.is_empty() {
        parts.push(info.usage.clone());
    }
    if info.required {
        parts.push("(required)".to_string());
    }
    if let Some(default) = &info.default {
        parts.push(format!("[default: {default}]"));
    }
    parts.join(" ")
}

fn push_rows(out: &mut String, rows: Vec<(String, String, String)>) {
    // Widths come from the unstyled text; escape codes take no columns.
    let width = rows
        .iter()
        .map(|(plain, _, _)| plain.chars().count())
        .max()
        .unwrap_or(0);
    for (plain, styled, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {styled}\n"));
        } else {
            let pad = " ".repeat(width - plain.chars().count());
            out.push_str(&format!("  {styled}{pad}  {help}\n"));
        }
    }
}

/// Render an `Options:` section for `infos`.
pub fn render(infos: &[FlagInfo], highlight: &dyn Highlight) -> String {
    if infos.is_empty() {
        return String::new();
    }
    let rows = infos
        .iter()
        .map(|info| {
            let plain = format_left(info);
            let styled = highlight.name(&plain);
            let help = format_help(info);
            let help = if info.help {
                highlight.note(&help)
            } else {
                help
            };
            (plain, styled, help)
        })
        .collect();

    let mut out = format!("{}\n", highlight.heading("Options:"));
    push_rows(&mut out, rows);
    out
}

/// Render the options of a record type from its default value.
pub fn usage<T: Argv + Default>(highlight: &dyn Highlight) -> Result<String> {
    let mut record = T::default();
    let infos = Registry::build(&mut record)?.infos();
    Ok(render(&infos, highlight))
}

/// Render a `Commands:` section listing `command`'s children.
pub fn commands(command: &Command, highlight: &dyn Highlight) -> String {
    if command.children().is_empty() {
        return String::new();
    }
    let rows = command
        .children()
        .iter()
        .map(|child| {
            let plain = child.name().to_string();
            let styled = highlight.name(&plain);
            (plain, styled, child.summary().to_string())
        })
        .collect();

    let mut out = format!("{}\n", highlight.heading("Commands:"));
    push_rows(&mut out, rows);
    out
}

/// Full help text for `command`: its summary, subcommands and options.
pub fn help(command: &Command, highlight: &dyn Highlight) -> Result<String> {
    let mut out = if command.summary().trim().is_empty() {
        format!("{}\n", highlight.name(command.name()))
    } else {
        format!(
            "{} - {}\n",
            highlight.name(command.name()),
            command.summary().trim()
        )
    };

    let usage_line = if command.children().is_empty() {
        format!("{} [OPTIONS]", command.name())
    } else {
        format!("{} [COMMAND] [OPTIONS]", command.name())
    };
    out.push_str(&format!("\n{} {usage_line}\n", highlight.heading("Usage:")));

    let listing = commands(command, highlight);
    if !listing.is_empty() {
        out.push('\n');
        out.push_str(&listing);
    }

    let options = render(&command.flags()?, highlight);
    if !options.is_empty() {
        out.push('\n');
        out.push_str(&options);
    }
    Ok(out)
}
