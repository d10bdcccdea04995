use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use archflow_config::WorkflowDef;
use archflow_engine::{Services, WorkflowEngine, order_of};
use archflow_services::{ExecutionStore, FsExecutionStore};

/// Archflow - run block workflows from the command line
#[derive(Parser)]
#[command(name = "archflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.archflow)
  #[arg(long, global = true, env = "ARCHFLOW_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Do not record runs in the execution history
  #[arg(long, global = true)]
  no_history: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow or a single block
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },

  /// Print the execution order of a workflow
  Order {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// List recorded executions, newest first
  History {
    /// Only show executions of this workflow
    #[arg(long)]
    workflow: Option<String>,

    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run an entire workflow
  Workflow {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Run a single block from a workflow, with the stdin payload as its input
  Block {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".archflow"),
  };
  let history_dir = (!cli.no_history).then(|| data_dir.join("executions"));

  let rt = tokio::runtime::Runtime::new()?;
  match cli.command {
    Some(Commands::Run { target }) => match target {
      RunTarget::Workflow { workflow_file } => {
        rt.block_on(run_workflow(&workflow_file, history_dir))?;
      }
      RunTarget::Block {
        workflow_file,
        node,
      } => {
        rt.block_on(run_block(&workflow_file, &node))?;
      }
    },
    Some(Commands::Order { workflow_file }) => {
      rt.block_on(print_order(&workflow_file))?;
    }
    Some(Commands::History { workflow, limit }) => {
      rt.block_on(print_history(data_dir.join("executions"), workflow, limit))?;
    }
    None => {
      println!("archflow - use --help to see available commands");
    }
  }

  Ok(())
}

async fn load_workflow(workflow_file: &Path) -> Result<WorkflowDef> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

async fn run_workflow(workflow_file: &Path, history_dir: Option<PathBuf>) -> Result<()> {
  let workflow_def = load_workflow(workflow_file).await?;
  eprintln!("Loaded workflow: {}", workflow_def.name);

  let mut engine = WorkflowEngine::new(Services::mock());
  if let Some(dir) = history_dir {
    engine = engine.with_history(Arc::new(FsExecutionStore::new(dir)));
  }

  let report = engine
    .execute(&workflow_def)
    .await
    .context("workflow execution failed")?;

  eprintln!("Execution completed: {}", report.execution_id);
  eprintln!(
    "Blocks executed: {}/{} ({} failed, {} skipped)",
    report.summary.executed_blocks,
    report.summary.total_blocks,
    report.summary.failed_blocks,
    report.skipped.len()
  );

  println!("{}", serde_json::to_string_pretty(&report)?);

  Ok(())
}

async fn run_block(workflow_file: &Path, node_id: &str) -> Result<()> {
  let workflow_def = load_workflow(workflow_file).await?;

  let node = workflow_def
    .nodes
    .iter()
    .find(|n| n.id == node_id)
    .with_context(|| format!("node '{}' not found in workflow", node_id))?;

  eprintln!("Running node: {} (type: {})", node.id, node.kind);

  let payload = read_payload_from_stdin()?;

  let engine = WorkflowEngine::new(Services::mock());
  let result = engine.execute_node(node, &payload).await;

  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(())
}

async fn print_order(workflow_file: &Path) -> Result<()> {
  let workflow_def = load_workflow(workflow_file).await?;
  let order = order_of(&workflow_def).context("invalid workflow")?;

  let excluded: Vec<&str> = workflow_def
    .nodes
    .iter()
    .map(|n| n.id.as_str())
    .filter(|id| !order.iter().any(|o| o == id))
    .collect();
  if !excluded.is_empty() {
    eprintln!("Excluded by cycle: {}", excluded.join(", "));
  }

  for node_id in order {
    println!("{}", node_id);
  }

  Ok(())
}

async fn print_history(dir: PathBuf, workflow: Option<String>, limit: usize) -> Result<()> {
  let store = FsExecutionStore::new(dir);
  let records = store
    .list_executions(workflow.as_deref(), Some(limit))
    .await
    .context("failed to read execution history")?;

  println!("{}", serde_json::to_string_pretty(&records)?);

  Ok(())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(serde_json::Value::Null);
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Ok(serde_json::Value::Null);
  }
  // Plain text is accepted as-is.
  match serde_json::from_str(trimmed) {
    Ok(value) => Ok(value),
    Err(_) => Ok(serde_json::Value::String(trimmed.to_string())),
  }
}
