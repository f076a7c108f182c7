// Tue Oct 13 2026 - Alex

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use df_structures_import::{
    config::ImportConfig,
    engine::Importer,
    output::ImportReport,
    program::{InMemoryProgram, Program},
    utils::{pluralize, LoggingUtils, ScopedTimer},
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Import df-structures type definitions and symbol addresses for a DF binary", long_about = None)]
struct Args {
    /// codegen.out.xml produced by df-structures
    #[arg(long)]
    codegen: PathBuf,

    /// symbols.xml with per-build vtable and global addresses
    #[arg(long)]
    symbols: PathBuf,

    /// The Dwarf Fortress executable to label
    #[arg(short, long)]
    binary: PathBuf,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report of every created type and label
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    polymorphic_pointers: bool,

    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if args.verbose > 0 {
        config = config.with_verbosity(args.verbose as usize);
    }
    if args.no_progress {
        config = config.with_progress(false);
    }
    if args.polymorphic_pointers {
        config = config.with_polymorphic_pointers(true);
    }

    let level = match &args.log_level {
        Some(level) => LoggingUtils::level_from_str(level),
        None => LoggingUtils::level_from_verbosity(config.verbosity),
    };
    match &config.log_file {
        Some(path) => LoggingUtils::init_file(level, path)
            .with_context(|| format!("failed to open log file {}", path.display()))?,
        None => LoggingUtils::init_stderr(level, true),
    }

    println!("{}", "df-structures importer".cyan().bold());
    println!("{}", "=".repeat(50).cyan());

    let start_time = Instant::now();

    println!("{} Loading binary: {}", "[*]".blue(), args.binary.display());
    let mut program = {
        let _timer = ScopedTimer::new("loading binary");
        InMemoryProgram::load(&args.binary)
            .with_context(|| format!("failed to load {}", args.binary.display()))?
    };
    println!(
        "{} {} ({}-bit)",
        "[+]".green(),
        program.executable_format(),
        program.pointer_size() * 8
    );

    let codegen = open(&args.codegen)?;
    let symbols = open(&args.symbols)?;

    let importer = Importer::new(config);
    let mut registry = Importer::registry_for(&program).context("unsupported binary")?;
    let summary = {
        let _timer = ScopedTimer::new("import");
        importer
            .run(&mut program, &mut registry, codegen, symbols)
            .context("import failed; types and labels created so far were kept")?
    };

    println!("{} Selected symbol table: {}", "[+]".green(), summary.symbol_table.bold());
    println!(
        "{} Created {} for {}",
        "[+]".green(),
        pluralize(summary.types_created, "data type", "data types"),
        pluralize(summary.types_defined, "definition", "definitions")
    );
    println!(
        "{} Labelled {} and {}, recovered {}",
        "[+]".green(),
        pluralize(summary.labels.vtables, "vtable", "vtables"),
        pluralize(summary.labels.globals, "global", "globals"),
        pluralize(summary.labels.functions.len(), "function", "functions")
    );
    if summary.labels.overlaps > 0 {
        println!(
            "{} {} left untouched, see the log",
            "[!]".yellow(),
            pluralize(summary.labels.overlaps, "overlapping range", "overlapping ranges")
        );
    }

    if let Some(path) = &args.output {
        ImportReport::build(&registry, &summary)
            .write_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("{} Report written to {}", "[+]".green(), path.display());
    }

    println!(
        "{} Done in {}",
        "[*]".blue(),
        df_structures_import::utils::format_duration(start_time.elapsed())
    );
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}
