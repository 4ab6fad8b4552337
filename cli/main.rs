#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use glmreport::export::{OutputFormat, render_text, write_output};
use glmreport::{GlmSnapshot, build_output_tables};

type CliError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatCli {
    Text,
    Tsv,
    Json,
}

impl From<FormatCli> for OutputFormat {
    fn from(format: FormatCli) -> Self {
        match format {
            FormatCli::Text => OutputFormat::Text,
            FormatCli::Tsv => OutputFormat::Tsv,
            FormatCli::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "glmreport",
    about = "Builds presentation tables (coefficients, magnitudes, scoring history) for fitted GLMs.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the output tables of one or more model snapshots
    Render {
        /// Paths to model snapshot files (.toml)
        #[arg(value_name = "SNAPSHOT", required = true)]
        snapshots: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = FormatCli::Text)]
        format: FormatCli,

        /// Directory to write output files into. Text goes to stdout when omitted.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Check that model snapshots are internally consistent without rendering them
    Validate {
        /// Paths to model snapshot files (.toml)
        #[arg(value_name = "SNAPSHOT", required = true)]
        snapshots: Vec<PathBuf>,
    },
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

fn render_one(
    path: &Path,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<String, CliError> {
    log::info!("Loading model snapshot from: {}", path.display());
    let snapshot = GlmSnapshot::load(path)?;
    let output = build_output_tables(&snapshot)?;

    match output_dir {
        Some(dir) => {
            let written = write_output(&output, format, dir, &file_stem(path))?;
            for file in &written {
                log::info!("Wrote {}", file.display());
            }
            Ok(String::new())
        }
        None => Ok(render_text(&output)),
    }
}

fn run_render(
    snapshots: Vec<PathBuf>,
    format: FormatCli,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let format = OutputFormat::from(format);
    if output_dir.is_none() && format != OutputFormat::Text {
        return Err("--output-dir is required for tsv and json output".into());
    }

    let rendered: Vec<String> = snapshots
        .par_iter()
        .map(|path| {
            render_one(path, format, output_dir.as_deref())
                .map_err(|e| CliError::from(format!("{}: {e}", path.display())))
        })
        .collect::<Result<_, CliError>>()?;

    for text in rendered.iter().filter(|text| !text.is_empty()) {
        print!("{text}");
    }
    Ok(())
}

fn describe_one(path: &Path) -> Result<String, CliError> {
    let snapshot = GlmSnapshot::load(path)?;
    let output = build_output_tables(&snapshot)?;
    let layout = if snapshot.is_per_class() {
        "per-class"
    } else {
        "single-response"
    };
    let keys: Vec<&str> = output.tables().into_iter().map(|(key, _)| key).collect();
    Ok(format!(
        "{}: ok ({} {layout}; tables: {})",
        path.display(),
        snapshot.model_category,
        if keys.is_empty() {
            "none".to_string()
        } else {
            keys.join(", ")
        }
    ))
}

fn run_validate(snapshots: Vec<PathBuf>) -> Result<(), CliError> {
    let reports: Vec<Result<String, String>> = snapshots
        .par_iter()
        .map(|path| describe_one(path).map_err(|e| format!("{}: {e}", path.display())))
        .collect();

    let mut failures = Vec::new();
    for report in reports {
        match report {
            Ok(line) => println!("{line}"),
            Err(failure) => failures.push(failure),
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("\n").into())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Cli { command } = Cli::parse();
    let result = match command {
        Some(Commands::Render {
            snapshots,
            format,
            output_dir,
        }) => run_render(snapshots, format, output_dir),
        Some(Commands::Validate { snapshots }) => run_validate(snapshots),
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
