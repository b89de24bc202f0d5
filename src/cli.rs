// ============================================================================
// TriPaint CLI — headless grid transforms and export
// ============================================================================
//
// Usage examples:
//   TriPaint --input heart.json --format all --output-dir out/
//   TriPaint -i heart.json --invert --shift left --shift left -o moved.svg
//   TriPaint -i "designs/*.json" --resize 32 --output-dir out/ --format png
//   TriPaint -i old.json --legacy-json -o old_v1.json
//
// No window is opened in CLI mode and nothing is logged to the session file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::grid::{Grid, MAX_GRID_SIZE, ShiftDirection};
use crate::io::{self, DataVersion, ExportFormat};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// TriPaint headless exporter.
#[derive(Parser, Debug)]
#[command(
    name = "TriPaint",
    about = "TriPaint headless grid transformer and exporter",
    long_about = "Load TriPaint JSON grids, optionally transform them, and export\n\
                  PNG, SVG or JSON without opening the editor.\n\n\
                  Example:\n  \
                  TriPaint -i heart.json --format all --output-dir out/\n  \
                  TriPaint -i \"*.json\" --invert --output-dir inverted/ --format svg"
)]
pub struct CliArgs {
    /// Input grid file(s). Glob patterns accepted (e.g. "*.json").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Swap filled and empty cells and flip triangles to their opposite corner.
    #[arg(long)]
    pub invert: bool,

    /// Shift the grid with wraparound: up, down, left, right. Repeatable.
    #[arg(long, value_name = "DIR", value_parser = parse_shift)]
    pub shift: Vec<ShiftDirection>,

    /// Resize to N×N, keeping the top-left overlap.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_GRID_SIZE as i64))]
    pub resize: Option<u32>,

    /// Output format: png, svg, json, all.
    /// When omitted, inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Write JSON in the enumerated version-1 layout instead of compact version 2.
    #[arg(long)]
    pub legacy_json: bool,

    /// Output file path. Only valid for a single input and a single format.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory. Files are named by content hash (tripaint-<hash>.<ext>).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i" || a.starts_with("--input="))
    }

    fn version(&self) -> DataVersion {
        if self.legacy_json { DataVersion::V1 } else { DataVersion::V2 }
    }
}

fn parse_shift(s: &str) -> Result<ShiftDirection, String> {
    ShiftDirection::parse(s).ok_or_else(|| format!("unknown direction '{}' (up, down, left, right)", s))
}

/// Which formats one input is written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatChoice {
    One(ExportFormat),
    All,
}

impl FormatChoice {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatChoice::One(f) => vec![f],
            FormatChoice::All => ExportFormat::all().to_vec(),
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    let choice = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.output.is_some() && (inputs.len() > 1 || choice == FormatChoice::All) {
        eprintln!(
            "error: --output accepts a single file, but {} input(s) in {} format(s) were requested.\n\
             Use --output-dir instead.",
            inputs.len(),
            choice.formats().len()
        );
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        match run_one(input_path, &args, choice) {
            Ok(written) => {
                if args.verbose || multi {
                    for path in &written {
                        println!("  → {}", path.display());
                    }
                }
                if args.verbose {
                    println!("  ({:.0}ms)", file_start.elapsed().as_secs_f64() * 1000.0);
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

/// Load, transform and export one input. Returns the paths written.
pub fn run_one(input: &Path, args: &CliArgs, choice: FormatChoice) -> Result<Vec<PathBuf>, String> {
    // -- Step 1: Load ----------------------------------------------------
    let grid = io::load_grid(input).map_err(|e| format!("load failed: {}", e))?;

    // -- Step 2: Transform -----------------------------------------------
    let grid = transform(grid, args);

    // -- Step 3: Save ----------------------------------------------------
    let mut written = Vec::new();
    for format in choice.formats() {
        let path = match (&args.output, &args.output_dir) {
            (Some(out), _) => out.clone(),
            (None, Some(dir)) => dir.join(io::export_file_name(&grid, format)),
            (None, None) => input
                .parent()
                .unwrap_or(Path::new("."))
                .join(io::export_file_name(&grid, format)),
        };
        if format == ExportFormat::Json && path == input {
            return Err(format!("refusing to overwrite input '{}'", input.display()));
        }
        io::export(&grid, &path, format, args.version())
            .map_err(|e| format!("{} export failed: {}", format.extension(), e))?;
        written.push(path);
    }
    Ok(written)
}

/// Apply resize, then shifts in order, then inversion.
fn transform(mut grid: Grid, args: &CliArgs) -> Grid {
    if let Some(n) = args.resize {
        grid = grid.resized(n as usize);
    }
    for &dir in &args.shift {
        grid = grid.shifted(dir);
    }
    if args.invert {
        grid = grid.inverted();
    }
    grid
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose formats from `--format` or infer from the output file extension.
/// Defaults to PNG when neither is given.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<FormatChoice, String> {
    if let Some(f) = format_arg {
        let f = f.to_lowercase();
        if f == "all" {
            return Ok(FormatChoice::All);
        }
        return ExportFormat::from_extension(&f)
            .map(FormatChoice::One)
            .ok_or_else(|| format!("unknown format '{}' (png, svg, json, all)", f));
    }

    let inferred = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension)
        .unwrap_or(ExportFormat::Png);
    Ok(FormatChoice::One(inferred))
}
