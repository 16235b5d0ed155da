// dtree - headless driver tree what-if scenarios

mod exit_codes;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use drivertree_cli::render;
use drivertree_config::Settings;
use drivertree_engine::format::FormatOptions;
use drivertree_engine::ripple::RippleConfig;
use drivertree_engine::{EditOp, NodeTree, TreeDocument, TreeError, TreeSession};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_INVALID_TREE, EXIT_OPS_PARSE, EXIT_PARSE, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "dtree")]
#[command(about = "Driver tree what-if scenarios (headless)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (TOML). Defaults to the user settings.json
    #[arg(long, global = true, value_name = "FILE", env = "DTREE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tree document (exit 0 = valid, exit 3 = violations)
    #[command(after_help = "\
Examples:
  dtree check plan.json
  dtree check plan.json --json | jq '.errors'")]
    Check {
        /// Tree document (object with id/name/nodes, or a bare node array)
        file: PathBuf,

        /// Emit a JSON report on stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the tree with formatted values and status
    #[command(after_help = "\
Examples:
  dtree show plan.json
  dtree show plan.json --all
  dtree show plan.json --json")]
    Show {
        file: PathBuf,

        /// Include nodes hidden behind collapsed branches
        #[arg(long)]
        all: bool,

        /// Emit JSON rows on stdout
        #[arg(long)]
        json: bool,
    },

    /// Apply newline-delimited edit operations and print the result
    #[command(after_help = "\
Operations, one JSON object per line:
  {\"op\":\"update_value\",\"id\":\"churn\",\"value\":-120}
  {\"op\":\"toggle_pin\",\"id\":\"net_new\"}
  {\"op\":\"toggle_collapse\",\"id\":\"net_new\"}
  {\"op\":\"select\",\"id\":\"churn\"}
  {\"op\":\"undo\"}
  {\"op\":\"redo\"}

Examples:
  dtree replay plan.json edits.jsonl
  dtree replay plan.json edits.jsonl -o scenario.json
  cat edits.jsonl | dtree replay plan.json - --json")]
    Replay {
        file: PathBuf,

        /// Operations file (JSONL), or - for stdin
        ops: String,

        /// Write the resulting tree document here
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Emit JSON on stdout
        #[arg(long)]
        json: bool,

        /// Include nodes hidden behind collapsed branches
        #[arg(long)]
        all: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ", env!("DTREE_BUILD_COMMIT"),
        "\nengine:  drivertree-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("DTREE_BUILD_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => return report(err),
    };
    init_tracing(&settings);

    let result = match cli.command {
        Commands::Check { file, json } => cmd_check(&file, json),
        Commands::Show { file, all, json } => cmd_show(&file, all, json, &settings),
        Commands::Replay { file, ops, output, json, all } => {
            cmd_replay(&file, &ops, output.as_deref(), json, all, &settings)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => report(err),
    }
}

fn report(err: CliError) -> ExitCode {
    if !err.message.is_empty() {
        eprintln!("error: {}", err.message);
    }
    if let Some(hint) = err.hint {
        eprintln!("hint:  {}", hint);
    }
    ExitCode::from(err.code)
}

/// Logs go to stderr so stdout stays a clean output contract.
/// `DTREE_LOG` overrides the configured filter.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env("DTREE_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_toml(path).map_err(|e| CliError {
            code: EXIT_CONFIG,
            message: e.to_string(),
            hint: None,
        }),
        None => Ok(Settings::load()),
    }
}

fn format_options(settings: &Settings) -> FormatOptions {
    FormatOptions {
        currency_symbol: settings.currency_symbol.clone(),
        currency_decimals: settings.currency_decimals,
        percent_decimals: settings.percent_decimals,
        count_decimals: settings.count_decimals,
    }
}

fn ripple_config(settings: &Settings) -> RippleConfig {
    RippleConfig {
        stagger: Duration::from_millis(settings.ripple_stagger_ms),
        clear_after: Duration::from_millis(settings.ripple_clear_after_ms),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn tree(err: TreeError) -> Self {
        let code = match err {
            TreeError::Parse(_) => EXIT_PARSE,
            TreeError::OpParse { .. } => EXIT_OPS_PARSE,
            _ => EXIT_INVALID_TREE,
        };
        let hint = match &err {
            TreeError::OpParse { .. } => {
                Some("each line must be a JSON object with an \"op\" field".to_string())
            }
            TreeError::Parse(_) => {
                Some("expected {\"id\",\"name\",\"nodes\"} or a bare node array".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Validation failures are already printed; exit with the code only.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }
}

// ============================================================================
// Loading
// ============================================================================

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        io::Read::read_to_string(&mut io::stdin(), &mut buf)
            .map_err(|e| CliError::io(format!("stdin: {e}")))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| CliError::args(format!("{path}: {e}")))
}

fn load_document(path: &Path) -> Result<TreeDocument, CliError> {
    let contents = read_input(&path.to_string_lossy())?;
    TreeDocument::from_json(&contents).map_err(CliError::tree)
}

fn load_tree(path: &Path) -> Result<(TreeDocument, NodeTree), CliError> {
    let doc = load_document(path)?;
    let tree = doc.to_tree().map_err(CliError::tree)?;
    tracing::debug!(id = %doc.id, nodes = tree.len(), "tree loaded");
    Ok((doc, tree))
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|e| CliError::io(e.to_string()))
}

fn to_json_line(value: &serde_json::Value) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(file: &Path, json: bool) -> Result<(), CliError> {
    let doc = load_document(file)?;
    let errors = doc.validate();

    if json {
        let value = json!({
            "id": doc.id,
            "name": doc.name,
            "nodes": doc.nodes.len(),
            "valid": errors.is_empty(),
            "errors": errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        });
        write_stdout(&to_json_line(&value)?)?;
    } else if errors.is_empty() {
        write_stdout(&format!("ok: {} ({} nodes)\n", doc.name, doc.nodes.len()))?;
    } else {
        for err in &errors {
            eprintln!("{}: {}", file.display(), err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_INVALID_TREE))
    }
}

// ============================================================================
// show
// ============================================================================

fn cmd_show(file: &Path, all: bool, json: bool, settings: &Settings) -> Result<(), CliError> {
    let (doc, tree) = load_tree(file)?;
    let opts = format_options(settings);
    let rows = render::rows(&tree, all);

    if json {
        let value = json!({
            "id": doc.id,
            "name": doc.name,
            "rows": render::rows_json(&rows, &opts),
        });
        write_stdout(&to_json_line(&value)?)
    } else {
        write_stdout(&render::render_table(&rows, &opts))
    }
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(
    file: &Path,
    ops_path: &str,
    output: Option<&Path>,
    json: bool,
    all: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    if ops_path == "-" && file.as_os_str() == "-" {
        return Err(CliError::args("tree and operations cannot both come from stdin"));
    }

    let (doc, tree) = load_tree(file)?;
    let ops = EditOp::parse_jsonl(&read_input(ops_path)?).map_err(CliError::tree)?;

    let mut session = TreeSession::with_limits(settings.history_limit, ripple_config(settings));
    session.set_nodes(tree);
    session.drain_events();

    let mut applied = 0;
    let mut skipped = 0;
    let mut events = 0;
    for (idx, op) in ops.iter().enumerate() {
        if !session.apply(op) {
            skipped += 1;
            tracing::info!(index = idx + 1, ?op, "operation had no effect");
            continue;
        }
        applied += 1;
        if let Some(report) = session.last_recalc().filter(|_| op.is_undoable()) {
            tracing::debug!("{}", report.log_line());
        }
        for event in session.drain_events() {
            tracing::trace!(index = idx + 1, ?event, "event");
            events += 1;
        }
    }

    let result = TreeDocument::from_tree(doc.id, doc.name, session.nodes());
    if let Some(path) = output {
        let contents = result.to_json_pretty().map_err(CliError::tree)?;
        fs::write(path, contents + "\n")
            .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    }

    let opts = format_options(settings);
    let rows = render::rows(session.nodes(), all);

    if json {
        let value = json!({
            "id": result.id,
            "name": result.name,
            "applied": applied,
            "skipped": skipped,
            "events": events,
            "revision": session.revision(),
            "canUndo": session.can_undo(),
            "canRedo": session.can_redo(),
            "selected": session.selected().map(|id| id.to_string()),
            "rows": render::rows_json(&rows, &opts),
            "nodes": result.nodes,
        });
        write_stdout(&to_json_line(&value)?)
    } else {
        let mut text = render::render_table(&rows, &opts);
        text.push_str(&format!("\n{applied} applied, {skipped} skipped\n"));
        write_stdout(&text)
    }
}
