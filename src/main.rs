//! Purpose: `batchkit` CLI entry point and argument surface.
//! Role: Binary crate root; parses args, runs commands, emits results on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Notices go to stderr and never alter stdout payloads.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, json};

mod color_value;
mod command_dispatch;
mod notice;

use batchkit::api::{
    ConfOptions, Error, ErrorKind, Malformed, PlotOptions, Series, TableReadOptions, Value,
    load_value, plot_series, read_conf, read_conf_report, read_table, to_exit_code,
};
use color_value::colorize_value;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                let summary = err
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .to_string();
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(summary)
                    .with_hint("Run `batchkit --help` for the command surface."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command, cli.color)
}

fn emit_error(err: &Error) {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(kind_label(err.kind())));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    eprintln!("{}", json!({ "error": inner }));
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Internal => "internal",
        ErrorKind::Usage => "usage",
        ErrorKind::NotFound => "not-found",
        ErrorKind::Parse => "parse",
        ErrorKind::Permission => "permission",
        ErrorKind::Corrupt => "corrupt",
        ErrorKind::Serialize => "serialize",
        ErrorKind::Io => "io",
    }
}

#[derive(Parser)]
#[command(
    name = "batchkit",
    version,
    about = "Config, table, dump, and plot helpers for batch analysis scripts"
)]
struct Cli {
    /// When to colorize stdout output.
    #[arg(long, value_enum, global = true, default_value_t = ColorMode::Auto)]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn stdout_color(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Inspect `key = value` config files.
    Conf {
        #[command(subcommand)]
        command: ConfCommand,
    },
    /// Inspect delimited table files.
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
    /// Inspect framed binary dump files.
    Dump {
        #[command(subcommand)]
        command: DumpCommand,
    },
    /// Read a table and render selected columns to an image file.
    Plot(PlotArgs),
    /// Generate shell completions.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfCommand {
    /// Parse a config file and print the whole mapping.
    Show {
        file: PathBuf,
        /// Collapse multi-token values to their final token.
        #[arg(long)]
        strip_to_last: bool,
        /// Fail on lines without an assignment instead of skipping them.
        #[arg(long)]
        fail_malformed: bool,
        /// Emit the mapping as JSON instead of config lines.
        #[arg(long)]
        json: bool,
    },
    /// Print one key's value.
    Get {
        file: PathBuf,
        key: String,
        #[arg(long)]
        strip_to_last: bool,
    },
}

#[derive(Subcommand)]
enum TableCommand {
    /// Print a table's rows.
    Show {
        file: PathBuf,
        /// Cell delimiter; any whitespace run splits cells when omitted.
        #[arg(long)]
        delimiter: Option<char>,
        /// Comma-separated column indices to keep, all columns when omitted.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<usize>,
        /// Emit rows as a JSON array of arrays.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum DumpCommand {
    /// Reload a binary dump and print it as JSON.
    Show { file: PathBuf },
}

#[derive(Args)]
struct PlotArgs {
    /// Table file providing the data columns.
    file: PathBuf,
    /// Output image path; `.svg` renders SVG, anything else a bitmap.
    #[arg(long)]
    out: PathBuf,
    /// Column index holding x values.
    #[arg(long, default_value_t = 0)]
    x: usize,
    /// Column indices holding y values, one series each.
    #[arg(long = "y", default_values_t = [1usize])]
    y: Vec<usize>,
    /// Cell delimiter; any whitespace run splits cells when omitted.
    #[arg(long)]
    delimiter: Option<char>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long, default_value = "")]
    x_label: String,
    #[arg(long, default_value = "")]
    y_label: String,
    /// Figure size as WIDTHxHEIGHT pixels.
    #[arg(long, default_value = "900x600", value_parser = parse_size)]
    size: (u32, u32),
    /// Skip the mesh grid.
    #[arg(long)]
    no_grid: bool,
    /// Skip axes, tick labels, and axis descriptions.
    #[arg(long)]
    no_axes: bool,
    /// Draw markers only, no connecting line.
    #[arg(long)]
    no_line: bool,
    /// Point marker radius in pixels; 0 disables markers.
    #[arg(long, default_value_t = 3)]
    marker_size: u32,
}

fn parse_size(text: &str) -> Result<(u32, u32), String> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("`{text}` is not WIDTHxHEIGHT"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("`{width}` is not a pixel count"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("`{height}` is not a pixel count"))?;
    if width == 0 || height == 0 {
        return Err("size must be at least 1x1".to_string());
    }
    Ok((width, height))
}
