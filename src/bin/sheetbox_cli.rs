//! CLI tool for sheetbox - turns a JSON layout document into an XLSX file
//!
//! Usage:
//!   sheetbox_cli <doc.json>                 # Write doc.xlsx next to the input
//!   sheetbox_cli <doc.json> -o out.xlsx     # Write to a specific file
//!   sheetbox_cli <doc.json> --print         # Print the bound layout
//!   sheetbox_cli <doc.json> --json          # Bound boxes as JSON on stdout
//!
//! Set `RUST_LOG=sheetbox=debug` to trace grow resolution.

#![allow(clippy::exit)]

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sheetbox::{Document, Result};

enum Mode {
    Xlsx(PathBuf),
    Print,
    Json,
}

fn usage() -> ! {
    eprintln!("Usage: sheetbox_cli <doc.json> [-o output.xlsx] [--print] [--json]");
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> (PathBuf, Mode) {
    let Some(input) = args.get(1) else { usage() };
    let input = PathBuf::from(input);
    let mut mode = Mode::Xlsx(input.with_extension("xlsx"));

    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-o" => match rest.next() {
                Some(path) => mode = Mode::Xlsx(PathBuf::from(path)),
                None => usage(),
            },
            "--print" => mode = Mode::Print,
            "--json" => mode = Mode::Json,
            _ => usage(),
        }
    }
    (input, mode)
}

fn run(input: &Path, mode: &Mode) -> Result<()> {
    let book = Document::from_path(input)?.into_book()?;
    match mode {
        Mode::Xlsx(path) => {
            book.save(path)?;
            eprintln!("Written: {}", path.display());
        }
        Mode::Print => {
            let mut stdout = io::stdout().lock();
            for (idx, sheet) in book.sheets().iter().enumerate() {
                let name = sheet
                    .sheet_name()
                    .map_or_else(|| format!("Sheet{}", idx + 1), str::to_string);
                writeln!(stdout, "# {name}")?;
                sheet.print(&mut stdout)?;
            }
        }
        Mode::Json => {
            let snapshots = book
                .sheets()
                .iter()
                .map(sheetbox::Sheet::snapshot)
                .collect::<Result<Vec<_>>>()?;
            let json = serde_json::to_string_pretty(&snapshots)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (input, mode) = parse_args(&args);

    if let Err(e) = run(&input, &mode) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
