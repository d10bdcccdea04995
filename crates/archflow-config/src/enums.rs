use std::fmt;

use serde::{Deserialize, Serialize};

/// Block type. The legacy editor names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
  #[serde(alias = "inputBlock")]
  Input,
  #[serde(alias = "aiAgentBlock")]
  Generate,
  #[serde(alias = "notionBlock")]
  Persist,
  #[serde(alias = "conditionBlock")]
  Condition,
  #[serde(alias = "scheduleBlock")]
  Schedule,
  #[serde(alias = "routeBlock")]
  Route,
}

impl BlockKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      BlockKind::Input => "input",
      BlockKind::Generate => "generate",
      BlockKind::Persist => "persist",
      BlockKind::Condition => "condition",
      BlockKind::Schedule => "schedule",
      BlockKind::Route => "route",
    }
  }

  /// Whether this block selects a subset of its outgoing edges.
  pub fn is_branching(&self) -> bool {
    matches!(self, BlockKind::Condition | BlockKind::Route)
  }
}

impl fmt::Display for BlockKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
  #[default]
  #[serde(rename = "contains")]
  Contains,
  #[serde(rename = "equals")]
  Equals,
  #[serde(rename = "startsWith", alias = "starts")]
  StartsWith,
  #[serde(rename = "endsWith")]
  EndsWith,
  #[serde(rename = "length_gt", alias = "length")]
  LengthGt,
  #[serde(rename = "length_lt")]
  LengthLt,
  #[serde(rename = "regex")]
  Regex,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
  Ai,
  #[default]
  Keyword,
  Hybrid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistAction {
  #[default]
  #[serde(rename = "create", alias = "create_page")]
  Create,
  #[serde(rename = "update", alias = "update_page")]
  Update,
  #[serde(rename = "addToCollection", alias = "add_to_db")]
  AddToCollection,
}

impl PersistAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      PersistAction::Create => "create",
      PersistAction::Update => "update",
      PersistAction::AddToCollection => "addToCollection",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
  #[default]
  Interval,
  Cron,
}
