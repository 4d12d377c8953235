use std::io::{self, Write};

use chrono::{Local, TimeZone};
use serde_json::Value;
use vitrine_protocol::ListedFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Automatically detect TTY and enable colors if appropriate.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Configuration for printing listings.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    /// Maximum number of entries to print, `None` for all.
    pub limit: Option<usize>,
    /// Whether to print the trailing summary.
    pub show_summary: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorChoice::Auto,
            limit: None,
            show_summary: true,
        }
    }
}

/// Local time for a unix timestamp, `-` for zero.
pub fn format_secs(secs: u64) -> String {
    if secs == 0 {
        return "-".to_owned();
    }

    i64::try_from(secs)
        .ok()
        .and_then(|s| Local.timestamp_opt(s, 0).single())
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_owned())
}

/// Byte count in the largest unit that keeps it above one.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        // Generic writers can't be probed for a TTY.
        let use_color = cfg.color == ColorChoice::Always;

        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }

    #[inline]
    fn format_name(&self, entry: &ListedFile) -> String {
        match (entry.is_directory, self.use_color) {
            (true, true) => format!("\x1b[34m{}/\x1b[0m", entry.name),
            (true, false) => format!("{}/", entry.name),
            (false, true) if entry.thumbnail.is_some() => {
                format!("\x1b[35m{}\x1b[0m", entry.name)
            }
            _ => entry.name.clone(),
        }
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    /// Create a printer that writes to stdout and stderr.
    pub fn stdout(cfg: PrinterConfig) -> JsonPrinter<io::Stdout, io::Stderr> {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
        }
    }
}

/// Static context about a print run.
#[derive(Debug)]
pub struct ListPrintContext<'a> {
    /// Label for the command producing the output
    pub kind: &'a str,
    /// Directory that was listed
    pub path: &'a str,
    /// Number of entries before the limit
    pub total: usize,
    /// Whether output was truncated due to limit.
    pub truncated: bool,
}

/// Receives a stream of listing entries and formats them.
pub trait ListPrinter {
    /// Called once before any entries are printed.
    fn begin(&mut self, ctx: &ListPrintContext) -> io::Result<()>;

    fn print_entry(&mut self, entry: &ListedFile, ctx: &ListPrintContext) -> io::Result<()>;

    /// Called once after all entries, for footers and summaries.
    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()>;
}

impl<W: Write, E: Write> ListPrinter for HumanPrinter<W, E> {
    fn begin(&mut self, _ctx: &ListPrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_entry(&mut self, entry: &ListedFile, _ctx: &ListPrintContext) -> io::Result<()> {
        let kind = if entry.is_directory {
            "dir"
        } else {
            entry.mime_type.as_deref().unwrap_or("?")
        };

        writeln!(
            self.out,
            "{:>8}  {:<16}  {:<24}  {}",
            human_size(entry.size),
            format_secs(entry.updated_at),
            kind,
            self.format_name(entry)
        )
    }

    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()> {
        if ctx.truncated {
            let shown = self.cfg.limit.unwrap_or(ctx.total);
            writeln!(
                self.out,
                "... and {} more entries",
                ctx.total.saturating_sub(shown)
            )?;
        }

        if self.cfg.show_summary {
            let shown = if ctx.path.is_empty() { "/" } else { ctx.path };
            writeln!(self.err, "\n[{}] {} entries in {}", ctx.kind, ctx.total, shown)?;
        }

        Ok(())
    }
}

/// JSON object for an entry with null fields removed.
pub fn entry_json(entry: &ListedFile) -> Value {
    let mut value = serde_json::to_value(entry).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.retain(|_, v| !v.is_null());
    }
    value
}

impl<W: Write, E: Write> ListPrinter for JsonPrinter<W, E> {
    fn begin(&mut self, _ctx: &ListPrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_entry(&mut self, entry: &ListedFile, _ctx: &ListPrintContext) -> io::Result<()> {
        writeln!(self.out, "{}", entry_json(entry))
    }

    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()> {
        if self.cfg.show_summary {
            let obj = serde_json::json!({
                "type": "summary",
                "kind": ctx.kind,
                "path": ctx.path,
                "total": ctx.total,
                "truncated": ctx.truncated,
            });
            writeln!(self.err, "{}", obj)?;
        }

        Ok(())
    }
}
