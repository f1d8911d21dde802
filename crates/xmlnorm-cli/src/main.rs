use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xmlnorm_core::parser::{self, precheck};
use xmlnorm_core::{
    normalize_all, normalize_pair, semantic_hash, ErrorKind, Input, LabeledError,
    NormalizeOptions,
};

/// Inputs of this many bytes or more are refused before normalization
const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

/// xmlnorm: semantic XML normalization
///
/// Rewrite XML into a canonical form so that a plain text diff shows only
/// differences that matter.
#[derive(Parser)]
#[command(name = "xmlnorm", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON settings file (camelCase keys, missing keys use defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print results only, no status lines
    #[arg(long, short, global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    overrides: OptionOverrides,
}

/// Command-line settings applied on top of defaults and `--config`
#[derive(Args)]
struct OptionOverrides {
    /// Single-line output
    #[arg(long, global = true)]
    compact: bool,

    /// Indentation per nesting level in pretty output
    #[arg(long, global = true, value_name = "STRING", allow_hyphen_values = true)]
    indent: Option<String>,

    /// Keep attributes in document order
    #[arg(long, global = true)]
    no_sort_attributes: bool,

    /// Keep whitespace-only text between tags
    #[arg(long, global = true)]
    keep_whitespace: bool,

    /// Keep leading and trailing whitespace of text
    #[arg(long, global = true)]
    preserve_edges: bool,

    /// Do not collapse whitespace runs inside text
    #[arg(long, global = true)]
    no_collapse: bool,
}

impl OptionOverrides {
    fn apply(&self, opts: &mut NormalizeOptions) {
        if self.compact {
            opts.pretty_print_output = false;
        }
        if let Some(indent) = &self.indent {
            opts.indentation_string = indent.clone();
        }
        if self.no_sort_attributes {
            opts.sort_attributes = false;
        }
        if self.keep_whitespace {
            opts.ignore_insignificant_whitespace = false;
        }
        if self.preserve_edges {
            opts.preserve_leading_trailing_whitespace_in_text = true;
        }
        if self.no_collapse {
            opts.normalize_whitespace_in_text_nodes = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize an XML file to canonical form
    Normalize {
        /// Path to the XML file
        file: PathBuf,
        /// Write the canonical form here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Normalize two XML files and report whether they are equivalent
    Compare {
        /// Left-hand XML file
        left: PathBuf,
        /// Right-hand XML file
        right: PathBuf,
        /// Write left.xml and right.xml here for an external diff viewer
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute semantic hash (SHA-256) of an XML file
    Hash {
        /// Path to the XML file
        file: PathBuf,
    },

    /// Check that an XML file is well-formed
    Validate {
        /// Path to the XML file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: file is {size} bytes, inputs must be smaller than {limit} bytes", limit = MAX_INPUT_BYTES)]
    TooLarge { path: String, size: u64 },

    #[error("config {path}: {message}")]
    Config { path: String, message: String },

    #[error(transparent)]
    Xml(#[from] LabeledError),
}

impl CliError {
    /// 1 for documents that are not usable XML, 2 for everything operational
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Xml(e) if e.kind() != ErrorKind::ResourceExhausted => 1,
            _ => 2,
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();
}

fn run(cli: &Cli) -> Result<i32, CliError> {
    let global = &cli.global;
    match &cli.command {
        Commands::Normalize { file, output } => {
            let opts = load_options(global)?;
            cmd_normalize(file, output.as_deref(), &opts, global.quiet)
        }
        Commands::Compare {
            left,
            right,
            out_dir,
            json,
        } => {
            let opts = load_options(global)?;
            cmd_compare(left, right, out_dir.as_deref(), *json, &opts, global.quiet)
        }
        Commands::Hash { file } => {
            let opts = load_options(global)?;
            let text = read_input(file)?;
            let hash = semantic_hash(&text, &opts).map_err(|e| LabeledError::new(label(file), e))?;
            println!("{}", hash);
            Ok(0)
        }
        Commands::Validate { file, json } => cmd_validate(file, *json, global.quiet),
        Commands::Version => {
            println!(
                "xmlnorm {} (xmlnorm-core {})",
                env!("CARGO_PKG_VERSION"),
                xmlnorm_core::VERSION
            );
            Ok(0)
        }
    }
}

// ── Commands ──────────────────────────────────────────────

fn cmd_normalize(
    file: &Path,
    output: Option<&Path>,
    opts: &NormalizeOptions,
    quiet: bool,
) -> Result<i32, CliError> {
    let text = read_input(file)?;
    let canonical = normalize_all(&text, opts).map_err(|e| LabeledError::new(label(file), e))?;

    match output {
        Some(path) => {
            write_output(path, &canonical)?;
            if !quiet {
                eprintln!("{} {}", "wrote".green(), path.display());
            }
        }
        None => println!("{}", canonical),
    }
    Ok(0)
}

fn cmd_compare(
    left: &Path,
    right: &Path,
    out_dir: Option<&Path>,
    as_json: bool,
    opts: &NormalizeOptions,
    quiet: bool,
) -> Result<i32, CliError> {
    let (left_label, right_label) = (label(left), label(right));
    let left_text = read_input(left)?;
    let right_text = read_input(right)?;

    let pair = normalize_pair(
        Input::new(&left_label, &left_text),
        Input::new(&right_label, &right_text),
        opts,
    )?;
    let equivalent = pair.is_equivalent();
    info!(left = %left_label, right = %right_label, equivalent, "compared");

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
        write_output(&dir.join("left.xml"), &pair.left)?;
        write_output(&dir.join("right.xml"), &pair.right)?;
        if !quiet && !as_json {
            eprintln!("{} left.xml and right.xml to {}", "wrote".green(), dir.display());
        }
    }

    if as_json {
        let report = json!({
            "equivalent": equivalent,
            "left": { "file": left_label, "hash": pair.left_hash() },
            "right": { "file": right_label, "hash": pair.right_hash() },
            "outDir": out_dir.map(|d| d.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if equivalent {
        println!("{}", "equivalent".green().bold());
    } else {
        println!("{}", "different".red().bold());
    }

    Ok(if equivalent { 0 } else { 1 })
}

fn cmd_validate(file: &Path, as_json: bool, quiet: bool) -> Result<i32, CliError> {
    let file_label = label(file);
    let text = read_input(file)?;

    let outcome = precheck::check(&text).and_then(|()| parser::parse(&text).map(|_| ()));
    if let Err(e) = &outcome {
        if e.kind() == ErrorKind::ResourceExhausted {
            return Err(LabeledError::new(file_label, e.clone()).into());
        }
    }

    if as_json {
        let error = outcome
            .as_ref()
            .err()
            .map(|e| json!({ "kind": e.kind(), "message": e.to_string() }));
        let report = json!({
            "file": file_label,
            "valid": outcome.is_ok(),
            "error": error,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if !quiet {
        match &outcome {
            Ok(()) => println!("{}: {}", file_label, "valid".green().bold()),
            Err(e) => println!("{}: {} ({})", file_label, "invalid".red().bold(), e),
        }
    }

    Ok(if outcome.is_ok() { 0 } else { 1 })
}

// ── Helpers ───────────────────────────────────────────────

fn label(path: &Path) -> String {
    path.display().to_string()
}

/// Defaults, then the `--config` file, then command-line overrides
fn load_options(global: &GlobalArgs) -> Result<NormalizeOptions, CliError> {
    let mut opts = match &global.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            NormalizeOptions::from_json(&text).map_err(|e| CliError::Config {
                path: label(path),
                message: e.to_string(),
            })?
        }
        None => NormalizeOptions::default(),
    };
    global.overrides.apply(&mut opts);
    debug!(options = %opts.to_json(), "effective options");
    Ok(opts)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    let size = fs::metadata(path).map_err(|e| CliError::io(path, e))?.len();
    if size >= MAX_INPUT_BYTES {
        return Err(CliError::TooLarge {
            path: label(path),
            size,
        });
    }
    debug!(path = %path.display(), bytes = size, "reading input");
    fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}

fn write_output(path: &Path, canonical: &str) -> Result<(), CliError> {
    fs::write(path, format!("{}\n", canonical)).map_err(|e| CliError::io(path, e))
}
