//! XEX Disasm CLI
//!
//! Command-line tool for listing the segments of 8-bit binary load files
//! and disassembling their 6502 code.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xex_disasm::formatter::{HumanFormatter, JsonFormatter, ListingFormatter, ShortFormatter};
use xex_disasm::{disassemble_file, DisasmOptions, InputFormat};

/// Segment loader and 6502 disassembler for binary load files.
///
/// Splits DOS binary load files into their address-tagged segments and
/// decodes each segment into 6502 assembly.
#[derive(Parser, Debug)]
#[command(name = "xex-disasm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to disassemble
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Treat input as a headerless image instead of a segmented load file
    #[arg(long)]
    raw: bool,

    /// Load address for --raw input ($1000, 0x1000 or 1000)
    #[arg(long, env = "XEX_DISASM_BASE", default_value = "0", value_parser = parse_address)]
    base: u16,

    /// Stop after this many segments
    #[arg(long)]
    max_segments: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only output essential info)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Assembler listing
    Human,
    /// JSON output
    Json,
    /// One line per segment, no decoding
    Short,
}

/// Parse a 16-bit address in `$hex`, `0xhex` or bare hex notation.
fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn init_logging(args: &Args) {
    let filter = if args.verbose {
        EnvFilter::new("xex_disasm=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let options = DisasmOptions {
        format: if args.raw {
            InputFormat::Raw { base: args.base }
        } else {
            InputFormat::Xex
        },
        max_segments: args.max_segments,
        decode: !matches!(args.format, OutputFormat::Short),
    };

    let formatter: Box<dyn ListingFormatter> = match args.format {
        OutputFormat::Human if args.verbose => Box::new(HumanFormatter::verbose()),
        OutputFormat::Human => Box::new(HumanFormatter::new()),
        OutputFormat::Json if args.pretty => Box::new(JsonFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::compact()),
        OutputFormat::Short => Box::new(ShortFormatter { quiet: args.quiet }),
    };

    let mut success = true;

    for path in &args.files {
        match disassemble_path(path, &options, formatter.as_ref()) {
            Ok(complete) => success &= complete,
            Err(e) => {
                if !args.quiet {
                    eprintln!("Error: {:#}", e);
                }
                success = false;
            }
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Disassemble one file and print it. Returns whether loading completed.
fn disassemble_path(
    path: &Path,
    options: &DisasmOptions,
    formatter: &dyn ListingFormatter,
) -> anyhow::Result<bool> {
    let result = disassemble_file(path, options)
        .with_context(|| format!("failed to disassemble {}", path.display()))?;

    print!("{}", formatter.format_listing(&result, path));

    Ok(result.is_complete())
}
