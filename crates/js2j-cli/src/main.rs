//! js2j CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use js2j_core::{
    class_name_for, normalize, translate_named, Config, Diagnostic, Layout, RepairPipeline,
    Severity,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "js2j")]
#[command(about = "Convert JavaScript source to Java")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a .js file or a directory of them
    Convert {
        /// Input file or directory
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "java-output")]
        out: PathBuf,

        /// Output layout
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip the repair pass
        #[arg(long)]
        no_repair: bool,

        /// Skip syntax normalization
        #[arg(long)]
        no_normalize: bool,

        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Print the parsed tree of a normalized file as JSON
    Ast {
        file: PathBuf,
    },

    /// Print a file after syntax normalization
    Normalize {
        file: PathBuf,
    },

    /// Run the repair pass over a Java file
    Repair {
        file: PathBuf,

        /// Spaces per indentation level
        #[arg(long, default_value = "4")]
        indent_width: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Loose,
    Class,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Loose => Layout::Loose,
            LayoutArg::Class => Layout::Class,
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("js2j=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every input was processed.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Convert {
            input,
            out,
            layout,
            config,
            no_repair,
            no_normalize,
            jobs,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            if let Some(layout) = layout {
                config.layout = layout.into();
            }
            if no_repair {
                config.repair = false;
            }
            if no_normalize {
                config.normalize = false;
            }

            let sources = collect_sources(&input)?;
            info!(files = sources.len(), "converting");

            let mut pool = rayon::ThreadPoolBuilder::new();
            if let Some(jobs) = jobs {
                pool = pool.num_threads(jobs);
            }
            let pool = pool.build().context("failed to start worker threads")?;

            let results: Vec<(PathBuf, Result<(PathBuf, Vec<Diagnostic>)>)> = pool.install(|| {
                sources
                    .par_iter()
                    .map(|(source, relative)| {
                        let result = convert_file(source, &out.join(relative), &config);
                        (source.clone(), result)
                    })
                    .collect()
            });

            let mut ok = true;
            for (source, result) in results {
                match result {
                    Ok((dest, diagnostics)) => {
                        println!("{} -> {}", source.display(), dest.display());
                        report(&source, &diagnostics);
                    }
                    Err(err) => {
                        eprintln!("{}: {err:#}", source.display());
                        ok = false;
                    }
                }
            }
            Ok(ok)
        }

        Commands::Ast { file } => {
            let source = normalize(&read(&file)?);
            let unit = class_name_for(&file);
            let nodes = js2j_syntax_javascript::parse(&source, Some(unit.as_str()))?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
            Ok(true)
        }

        Commands::Normalize { file } => {
            print!("{}", normalize(&read(&file)?));
            Ok(true)
        }

        Commands::Repair { file, indent_width } => {
            print!("{}", RepairPipeline::standard(indent_width).run(&read(&file)?));
            Ok(true)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Source files under `input`, each with its output path relative to the
/// output directory.
fn collect_sources(input: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    if input.is_file() {
        let name = input
            .file_name()
            .with_context(|| format!("{} has no file name", input.display()))?;
        return Ok(vec![(input.to_path_buf(), PathBuf::from(name))]);
    }
    if !input.is_dir() {
        anyhow::bail!("{} does not exist", input.display());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "js") {
            continue;
        }
        let relative = path.strip_prefix(input)?.to_path_buf();
        sources.push((path.to_path_buf(), relative));
    }
    Ok(sources)
}

/// Convert `source` next to `target`, its mirrored path under the output
/// directory. Returns the path written.
fn convert_file(
    source: &Path,
    target: &Path,
    config: &Config,
) -> Result<(PathBuf, Vec<Diagnostic>)> {
    let text = read(source)?;
    debug!(file = %source.display(), "converting file");
    let translation = translate_named(&text, &class_name_for(source), config);
    let dest = match &translation.class_name {
        Some(class) => target.with_file_name(format!("{class}.java")),
        None => target.with_extension("java"),
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&dest, &translation.java)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok((dest, translation.diagnostics))
}

fn report(source: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Note => debug!(file = %source.display(), "{}", diagnostic.message),
            Severity::Warning | Severity::Error => {
                warn!(file = %source.display(), "{diagnostic}")
            }
        }
    }
}
