use std::io::{Stderr, Stdout};
use std::process::ExitCode;

use anyhow::anyhow;
use clap::Args;
use vitrine_engine::{ScanError, UrlDecorator};
use vitrine_protocol::{DaemonRequest, DaemonResponse, ListRequest, ListedFile};
use vitrine_runtime::default_socket_path;

use crate::commands::{CommandResult, EXIT_NOT_FOUND, ask_daemon, finish, local_scanner};
use crate::printer::{
    ColorChoice, HumanPrinter, JsonPrinter, ListPrintContext, ListPrinter, OutputFormat,
    PrinterConfig,
};

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output entries as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress the summary line
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    /// Create a printer based on the output options.
    pub fn make_printer(&self, limit: Option<usize>) -> Box<dyn ListPrinter> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let color = match self.color.as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };

        let cfg = PrinterConfig {
            format,
            color,
            limit,
            show_summary: !self.quiet,
        };

        match format {
            OutputFormat::Human => Box::new(HumanPrinter::<Stdout, Stderr>::stdout(cfg)),
            OutputFormat::Json => Box::new(JsonPrinter::<Stdout, Stderr>::stdout(cfg)),
        }
    }
}

#[derive(Debug, Args)]
pub struct LsArgs {
    /// Directory relative to the shared root
    #[arg(default_value = "")]
    pub path: String,

    /// Maximum number of entries to display
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output formatting options
    #[command(flatten)]
    pub output: OutputOptions,

    /// Ask the background daemon instead of scanning in-process
    #[arg(long)]
    pub daemon: bool,
}

pub fn run(args: LsArgs) -> ExitCode {
    finish("ls", execute(args))
}

fn execute(args: LsArgs) -> CommandResult<ExitCode> {
    let entries = if args.daemon {
        list_via_daemon(&args)?
    } else {
        list_local(&args)?
    };

    match entries {
        Some(entries) => {
            print_listing(&args, &entries)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("[ls] directory not found: {:?}", args.path);
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

fn list_local(args: &LsArgs) -> CommandResult<Option<Vec<ListedFile>>> {
    let (settings, scanner) = local_scanner()?;

    let mut entries = match scanner.scan(&args.path) {
        Ok(entries) => entries,
        Err(ScanError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    UrlDecorator::new(settings.public_url.as_str()).decorate_all(&mut entries);
    Ok(Some(entries.into_iter().map(ListedFile::from).collect()))
}

/// Daemon mode: send the request over the Unix socket.
fn list_via_daemon(args: &LsArgs) -> CommandResult<Option<Vec<ListedFile>>> {
    let req = DaemonRequest::List(ListRequest {
        path: args.path.clone(),
    });

    match ask_daemon(&default_socket_path(), &req)? {
        DaemonResponse::Listing(listing) => Ok(Some(listing.entries)),
        DaemonResponse::NotFound(_) => Ok(None),
        DaemonResponse::Error(msg) => Err(anyhow!("daemon error: {msg}").into()),
        other => Err(anyhow!("unexpected daemon response: {other:?}").into()),
    }
}

fn print_listing(args: &LsArgs, entries: &[ListedFile]) -> CommandResult<()> {
    let mut printer = args.output.make_printer(args.limit);

    let shown = args.limit.map_or(entries.len(), |n| n.min(entries.len()));
    let ctx = ListPrintContext {
        kind: "ls",
        path: &args.path,
        total: entries.len(),
        truncated: shown < entries.len(),
    };

    printer.begin(&ctx)?;
    for entry in &entries[..shown] {
        printer.print_entry(entry, &ctx)?;
    }
    printer.finish(&ctx)?;

    Ok(())
}
