//! Workflow engine.
//!
//! The [`WorkflowEngine`] runs nodes one at a time in topological order.
//! Each node sees only the results of its live upstream nodes; a node whose
//! incoming edges are all dead is skipped and leaves no ledger entry, which in
//! turn kills its own outgoing edges. Handler failures are recorded and the
//! run continues.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use archflow_config::{NodeDef, WorkflowDef};
use archflow_services::{ExecutionRecord, ExecutionStatus, ExecutionStore};
use archflow_workflow::Workflow;
use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::blocks::{self, Services};
use crate::branch::BranchState;
use crate::error::{BlockError, EngineError};
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::input::{NodeInputs, inputs_for};
use crate::ledger::Ledger;
use crate::result::{ExecutionResult, RunReport, RunSummary, summary_of};

/// Topological order of a definition, after validating it.
pub fn order_of(def: &WorkflowDef) -> Result<Vec<String>, EngineError> {
  let workflow = Workflow::from_def(def.clone())?;
  Ok(workflow.execution_order())
}

/// Runs workflows against a set of collaborators.
pub struct WorkflowEngine<N: ExecutionNotifier = NoopNotifier> {
  services: Services,
  notifier: N,
  history: Option<Arc<dyn ExecutionStore>>,
}

impl WorkflowEngine<NoopNotifier> {
  pub fn new(services: Services) -> Self {
    Self::with_notifier(services, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> WorkflowEngine<N> {
  pub fn with_notifier(services: Services, notifier: N) -> Self {
    Self {
      services,
      notifier,
      history: None,
    }
  }

  /// Record every run in an execution store.
  pub fn with_history(mut self, store: Arc<dyn ExecutionStore>) -> Self {
    self.history = Some(store);
    self
  }

  /// Validate a definition and run it.
  ///
  /// Only graph validation can fail; node failures are reported in the
  /// ledger.
  pub async fn execute(&self, def: &WorkflowDef) -> Result<RunReport, EngineError> {
    let workflow = Workflow::from_def(def.clone())?;
    Ok(self.execute_workflow(&workflow).await)
  }

  /// Run an already validated workflow.
  #[instrument(
    name = "engine_execute",
    skip(self, workflow),
    fields(workflow_id = %workflow.workflow_id)
  )]
  pub async fn execute_workflow(&self, workflow: &Workflow) -> RunReport {
    let execution_id = uuid::Uuid::new_v4().to_string();
    let order = workflow.execution_order();
    let excluded = workflow.graph().unordered(&order);

    info!(
      execution_id = %execution_id,
      workflow_id = %workflow.workflow_id,
      nodes = workflow.nodes().len(),
      "workflow_started"
    );
    if !excluded.is_empty() {
      warn!(execution_id = %execution_id, excluded = ?excluded, "nodes_excluded_by_cycle");
    }
    self.notifier.notify(ExecutionEvent::WorkflowStarted {
      execution_id: execution_id.clone(),
      workflow_id: workflow.workflow_id.clone(),
    });

    let mut record = ExecutionRecord::started(&execution_id, &workflow.workflow_id);
    if let Some(store) = &self.history {
      if let Err(e) = store.create_execution(&record).await {
        warn!(execution_id = %execution_id, error = %e, "history_create_failed");
      }
    }

    let mut ledger = Ledger::new();
    let mut branches = BranchState::new();
    let mut skipped = Vec::new();

    for node_id in &order {
      let Some(node) = workflow.get_node(node_id) else {
        continue;
      };

      let inputs = inputs_for(workflow, node_id, &ledger, &branches);
      let has_incoming = workflow.incoming_edges(node_id).next().is_some();
      if has_incoming && inputs.is_empty() {
        info!(execution_id = %execution_id, node_id = %node_id, "node_skipped");
        self.notifier.notify(ExecutionEvent::NodeSkipped {
          execution_id: execution_id.clone(),
          node_id: node_id.clone(),
        });
        skipped.push(node_id.clone());
        continue;
      }

      self.notifier.notify(ExecutionEvent::NodeStarted {
        execution_id: execution_id.clone(),
        node_id: node_id.clone(),
      });

      let result = self.run_node(node, &inputs).await;
      self.report_node(&execution_id, node, &result);

      branches.record(node_id, &result);
      ledger.record(node_id.clone(), result);
    }

    let summary = summary_of(&ledger, workflow.nodes().len());
    info!(
      execution_id = %execution_id,
      executed = summary.executed_blocks,
      failed = summary.failed_blocks,
      skipped = skipped.len(),
      "workflow_completed"
    );
    self.notifier.notify(ExecutionEvent::WorkflowCompleted {
      execution_id: execution_id.clone(),
      summary,
    });

    if let Some(store) = &self.history {
      self
        .finish_record(store.as_ref(), &mut record, &ledger, &summary)
        .await;
    }

    RunReport {
      execution_id,
      workflow_id: workflow.workflow_id.clone(),
      order,
      ledger,
      summary,
      skipped,
      excluded,
    }
  }

  /// Run one node outside any graph.
  ///
  /// The payload stands in for a single upstream node: a string is used as
  /// its text, an object contributes its `content` field, anything else is
  /// rendered as JSON.
  #[instrument(
    name = "engine_execute_node",
    skip(self, node, payload),
    fields(node_id = %node.id, kind = %node.kind)
  )]
  pub async fn execute_node(&self, node: &NodeDef, payload: &Value) -> ExecutionResult {
    let inputs = NodeInputs::from_payload(payload_text(payload));
    let result = self.run_node(node, &inputs).await;
    self.report_node("single-node", node, &result);
    result
  }

  /// Dispatch a node and turn any error or panic into a failure entry.
  async fn run_node(&self, node: &NodeDef, inputs: &NodeInputs) -> ExecutionResult {
    let dispatch = blocks::run_block(&self.services, node, inputs, Utc::now());
    let outcome = match AssertUnwindSafe(dispatch).catch_unwind().await {
      Ok(outcome) => outcome,
      Err(panic) => Err(BlockError::Panicked {
        message: panic_message(panic.as_ref()),
      }),
    };

    match outcome {
      Ok(output) => ExecutionResult::completed(output),
      Err(e) => ExecutionResult::failed(e.to_string()),
    }
  }

  fn report_node(&self, execution_id: &str, node: &NodeDef, result: &ExecutionResult) {
    match &result.error {
      None => {
        info!(
          execution_id = %execution_id,
          node_id = %node.id,
          kind = %node.kind,
          "node_completed"
        );
        self.notifier.notify(ExecutionEvent::NodeCompleted {
          execution_id: execution_id.to_string(),
          node_id: node.id.clone(),
          result: result.clone(),
        });
      }
      Some(message) => {
        error!(
          execution_id = %execution_id,
          node_id = %node.id,
          kind = %node.kind,
          error = %message,
          "node_failed"
        );
        self.notifier.notify(ExecutionEvent::NodeFailed {
          execution_id: execution_id.to_string(),
          node_id: node.id.clone(),
          error: message.clone(),
        });
      }
    }
  }

  async fn finish_record(
    &self,
    store: &dyn ExecutionStore,
    record: &mut ExecutionRecord,
    ledger: &Ledger,
    summary: &RunSummary,
  ) {
    let status = if summary.failed_blocks > 0 {
      ExecutionStatus::CompletedWithErrors
    } else {
      ExecutionStatus::Succeeded
    };
    let results = serde_json::to_value(ledger).unwrap_or_else(|e| {
      warn!(error = %e, "ledger_serialization_failed");
      Value::Null
    });
    let summary = serde_json::to_value(summary).unwrap_or(Value::Null);
    record.complete(status, results, summary);

    if let Err(e) = store.update_execution(record).await {
      warn!(execution_id = %record.execution_id, error = %e, "history_update_failed");
    }
  }
}

fn payload_text(payload: &Value) -> String {
  match payload {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    Value::Object(map) => match map.get("content") {
      Some(Value::String(text)) => text.clone(),
      _ => payload.to_string(),
    },
    other => other.to_string(),
  }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic".to_string()
  }
}
