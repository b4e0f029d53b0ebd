// (c) 2024 Ross Younger
//! CLI output styling
//!
//! Anything printed with these should go through anstream's `println!` / `eprintln!`,
//! which strip the escapes when the output is not a terminal.

#[allow(clippy::enum_glob_use)]
use anstyle::AnsiColor::*;
use anstyle::{Color::Ansi, Style};
use clap::builder::styling::Styles;

pub(crate) const ERROR: Style = Style::new().bold().fg_color(Some(Ansi(Red)));
pub(crate) const WARNING: Style = Style::new().bold().fg_color(Some(Ansi(Yellow)));
pub(crate) const INFO: Style = Style::new().fg_color(Some(Ansi(Cyan)));
/// Field names in certificate summaries
pub(crate) const LABEL: Style = Style::new().bold();
/// Digest strings, which people will be squinting at
pub(crate) const DIGEST: Style = Style::new().fg_color(Some(Ansi(Green)));

const HEADING: Style = Style::new().underline().fg_color(Some(Ansi(Yellow)));

pub(crate) const CLAP_STYLES: Styles = Styles::styled()
    .usage(HEADING)
    .header(HEADING)
    .literal(LABEL)
    .invalid(WARNING)
    .error(ERROR)
    .valid(INFO.bold().underline())
    .placeholder(INFO);
