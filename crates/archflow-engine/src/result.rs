//! Execution result types.

use archflow_config::{ConditionOperator, PersistAction, RouteMode, ScheduleMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;

/// Block-specific output, tagged with the block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BlockOutput {
  Input {
    content: String,
  },
  Generate {
    model: String,
    prompt: String,
    response: String,
    input_tokens: u32,
    output_tokens: u32,
    /// Set when the model call failed and `response` is a placeholder.
    #[serde(default)]
    degraded: bool,
  },
  Persist {
    action: PersistAction,
    title: String,
    content: String,
    reference: String,
    page_url: String,
  },
  Condition {
    operator: ConditionOperator,
    value: String,
    result: bool,
    /// Text handed to downstream nodes.
    output: String,
  },
  Schedule {
    mode: ScheduleMode,
    next_run: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cron_expression: Option<String>,
  },
  Route {
    mode: RouteMode,
    selected_category: String,
    confidence: f64,
    reasoning: String,
    available_categories: Vec<String>,
    /// The text that was classified, passed through unchanged.
    content: String,
  },
}

impl BlockOutput {
  /// The textual payload downstream blocks consume, if any.
  ///
  /// Empty strings count as no payload.
  pub fn text(&self) -> Option<&str> {
    let text = match self {
      BlockOutput::Input { content } => content,
      BlockOutput::Generate { response, .. } => response,
      BlockOutput::Persist { content, .. } => content,
      BlockOutput::Condition { output, .. } => output,
      BlockOutput::Route { content, .. } => content,
      BlockOutput::Schedule { .. } => return None,
    };
    (!text.is_empty()).then_some(text.as_str())
  }

  /// The branch this output selects, for branching blocks.
  ///
  /// Conditions select `"true"` or `"false"`; routes select their category.
  pub fn branch_key(&self) -> Option<&str> {
    match self {
      BlockOutput::Condition { result: true, .. } => Some("true"),
      BlockOutput::Condition { result: false, .. } => Some("false"),
      BlockOutput::Route {
        selected_category, ..
      } => Some(selected_category),
      _ => None,
    }
  }
}

/// Result of a single node execution, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub success: bool,
  #[serde(flatten)]
  pub output: Option<BlockOutput>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub timestamp: DateTime<Utc>,
}

impl ExecutionResult {
  pub fn completed(output: BlockOutput) -> Self {
    Self {
      success: true,
      output: Some(output),
      error: None,
      timestamp: Utc::now(),
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      output: None,
      error: Some(error.into()),
      timestamp: Utc::now(),
    }
  }

  /// Textual payload of a successful result. Failures carry none.
  pub fn text(&self) -> Option<&str> {
    self.output.as_ref().and_then(BlockOutput::text)
  }

  pub fn branch_key(&self) -> Option<&str> {
    self.output.as_ref().and_then(BlockOutput::branch_key)
  }
}

/// Counts over a finished ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
  pub total_blocks: usize,
  pub executed_blocks: usize,
  pub successful_blocks: usize,
  pub failed_blocks: usize,
}

/// Summarize a ledger against the size of the node set it came from.
pub fn summary_of(ledger: &Ledger, total_blocks: usize) -> RunSummary {
  let successful_blocks = ledger.iter().filter(|(_, r)| r.success).count();
  RunSummary {
    total_blocks,
    executed_blocks: ledger.len(),
    successful_blocks,
    failed_blocks: ledger.len() - successful_blocks,
  }
}

/// Everything a workflow run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
  pub execution_id: String,
  pub workflow_id: String,
  /// Topological order the run walked.
  pub order: Vec<String>,
  pub ledger: Ledger,
  pub summary: RunSummary,
  /// Ordered nodes that had no live incoming edge.
  pub skipped: Vec<String>,
  /// Nodes left out of the order by a cycle.
  pub excluded: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_success_entry_flattens_output() {
    let result = ExecutionResult::completed(BlockOutput::Condition {
      operator: ConditionOperator::Contains,
      value: "great".to_string(),
      result: true,
      output: "a great day".to_string(),
    });

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["type"], json!("condition"));
    assert_eq!(value["result"], json!(true));
    assert_eq!(value["output"], json!("a great day"));
    assert!(value.get("error").is_none());
    assert_eq!(result.branch_key(), Some("true"));
  }

  #[test]
  fn test_failure_entry_shape() {
    let result = ExecutionResult::failed("boom");
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("boom"));
    assert!(value.get("type").is_none());
    assert!(value.get("timestamp").is_some());
    assert_eq!(result.text(), None);
  }

  #[test]
  fn test_generate_output_uses_camel_case() {
    let output = BlockOutput::Generate {
      model: "mock".to_string(),
      prompt: "p".to_string(),
      response: "r".to_string(),
      input_tokens: 1,
      output_tokens: 2,
      degraded: false,
    };
    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["inputTokens"], json!(1));
    assert_eq!(value["outputTokens"], json!(2));
    assert_eq!(output.text(), Some("r"));
  }

  #[test]
  fn test_empty_text_is_no_payload() {
    let output = BlockOutput::Input {
      content: String::new(),
    };
    assert_eq!(output.text(), None);
    assert_eq!(output.branch_key(), None);
  }

  #[test]
  fn test_summary_counts() {
    let mut ledger = Ledger::new();
    ledger.record(
      "a",
      ExecutionResult::completed(BlockOutput::Input {
        content: "x".to_string(),
      }),
    );
    ledger.record("b", ExecutionResult::failed("nope"));

    let summary = summary_of(&ledger, 4);
    assert_eq!(
      summary,
      RunSummary {
        total_blocks: 4,
        executed_blocks: 2,
        successful_blocks: 1,
        failed_blocks: 1,
      }
    );
  }
}
