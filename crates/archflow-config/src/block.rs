use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::{BlockKind, ConditionOperator, PersistAction, RouteMode, ScheduleMode};
use crate::error::ConfigError;

/// Typed configuration for a block, one variant per [`BlockKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockConfig {
  Input(InputConfig),
  Generate(GenerateConfig),
  Persist(PersistConfig),
  Condition(ConditionConfig),
  Schedule(ScheduleConfig),
  Route(RouteConfig),
}

impl BlockConfig {
  /// Parse and validate a raw config object for the given block kind.
  pub fn parse(kind: BlockKind, config: &Map<String, Value>) -> Result<Self, ConfigError> {
    let parsed = match kind {
      BlockKind::Input => BlockConfig::Input(from_map(kind, config)?),
      BlockKind::Generate => BlockConfig::Generate(from_map(kind, config)?),
      BlockKind::Persist => BlockConfig::Persist(from_map(kind, config)?),
      BlockKind::Condition => BlockConfig::Condition(from_map(kind, config)?),
      BlockKind::Schedule => BlockConfig::Schedule(from_map(kind, config)?),
      BlockKind::Route => BlockConfig::Route(from_map(kind, config)?),
    };
    parsed.validate()?;
    Ok(parsed)
  }

  pub fn kind(&self) -> BlockKind {
    match self {
      BlockConfig::Input(_) => BlockKind::Input,
      BlockConfig::Generate(_) => BlockKind::Generate,
      BlockConfig::Persist(_) => BlockKind::Persist,
      BlockConfig::Condition(_) => BlockKind::Condition,
      BlockConfig::Schedule(_) => BlockKind::Schedule,
      BlockConfig::Route(_) => BlockKind::Route,
    }
  }

  fn validate(&self) -> Result<(), ConfigError> {
    let kind = self.kind();
    match self {
      BlockConfig::Input(_) | BlockConfig::Condition(_) => Ok(()),
      BlockConfig::Generate(c) => {
        if !(0.0..=1.0).contains(&c.temperature) {
          return Err(ConfigError::invalid(
            kind,
            format!("temperature must be within [0, 1], got {}", c.temperature),
          ));
        }
        if c.max_tokens == 0 {
          return Err(ConfigError::invalid(kind, "maxTokens must be greater than 0"));
        }
        Ok(())
      }
      BlockConfig::Persist(c) => match c.action {
        PersistAction::Update if is_blank(&c.target_id) => Err(ConfigError::invalid(
          kind,
          "action 'update' requires targetId",
        )),
        PersistAction::AddToCollection if is_blank(&c.collection_id) => Err(
          ConfigError::invalid(kind, "action 'addToCollection' requires collectionId"),
        ),
        _ => Ok(()),
      },
      BlockConfig::Schedule(c) => match c.mode {
        ScheduleMode::Interval if c.interval_minutes.unwrap_or(0) == 0 => Err(
          ConfigError::invalid(kind, "interval mode requires intervalMinutes greater than 0"),
        ),
        _ => Ok(()),
      },
      BlockConfig::Route(c) => {
        if c.categories.len() < 2 {
          return Err(ConfigError::invalid(
            kind,
            format!(
              "at least two categories are required, got {}",
              c.categories.len()
            ),
          ));
        }
        if !(0.0..=1.0).contains(&c.confidence_threshold) {
          return Err(ConfigError::invalid(
            kind,
            format!(
              "confidenceThreshold must be within [0, 1], got {}",
              c.confidence_threshold
            ),
          ));
        }
        Ok(())
      }
    }
  }
}

fn from_map<T: DeserializeOwned>(
  kind: BlockKind,
  config: &Map<String, Value>,
) -> Result<T, ConfigError> {
  serde_json::from_value(Value::Object(config.clone()))
    .map_err(|source| ConfigError::Malformed { kind, source })
}

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().is_none_or(|v| v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
  #[serde(default)]
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateConfig {
  #[serde(default)]
  pub system_prompt: String,
  #[serde(default)]
  pub user_prompt: String,
  #[serde(alias = "model")]
  pub model_id: String,
  #[serde(default = "default_temperature")]
  pub temperature: f64,
  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,
}

fn default_temperature() -> f64 {
  0.7
}

fn default_max_tokens() -> u32 {
  1000
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistConfig {
  #[serde(default)]
  pub action: PersistAction,
  #[serde(default, alias = "pageTitle")]
  pub title: String,
  /// Static content written ahead of upstream text.
  #[serde(default)]
  pub content: String,
  #[serde(default, alias = "pageId")]
  pub target_id: Option<String>,
  #[serde(default, alias = "databaseId")]
  pub collection_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionConfig {
  #[serde(default)]
  pub operator: ConditionOperator,
  #[serde(default, alias = "condition")]
  pub value: String,
  /// Payload emitted when the predicate holds.
  #[serde(default)]
  pub true_value: Option<String>,
  /// Payload emitted when the predicate does not hold.
  #[serde(default)]
  pub false_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
  #[serde(default, alias = "scheduleType")]
  pub mode: ScheduleMode,
  #[serde(default, alias = "interval")]
  pub interval_minutes: Option<u64>,
  #[serde(default)]
  pub cron_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
  #[serde(default)]
  pub mode: RouteMode,
  /// Ordered category labels. The first one is the fallback.
  pub categories: Vec<String>,
  /// Comma-separated keyword lists keyed by category.
  #[serde(default)]
  pub rules: BTreeMap<String, String>,
  #[serde(default)]
  pub ai_model: String,
  #[serde(default)]
  pub confidence_threshold: f64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn object(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(map) => map,
      _ => panic!("expected object"),
    }
  }

  #[test]
  fn test_input_defaults_to_empty_content() {
    let config = BlockConfig::parse(BlockKind::Input, &Map::new()).unwrap();
    assert_eq!(config, BlockConfig::Input(InputConfig::default()));
  }

  #[test]
  fn test_generate_defaults_and_alias() {
    let config = BlockConfig::parse(
      BlockKind::Generate,
      &object(json!({ "userPrompt": "Summarize", "model": "mock" })),
    )
    .unwrap();

    let BlockConfig::Generate(generate) = config else {
      panic!("expected generate config");
    };
    assert_eq!(generate.model_id, "mock");
    assert_eq!(generate.temperature, 0.7);
    assert_eq!(generate.max_tokens, 1000);
  }

  #[test]
  fn test_generate_rejects_out_of_range_temperature() {
    let err = BlockConfig::parse(
      BlockKind::Generate,
      &object(json!({ "modelId": "mock", "temperature": 1.5 })),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
  }

  #[test]
  fn test_generate_requires_model() {
    let err = BlockConfig::parse(BlockKind::Generate, &object(json!({ "userPrompt": "hi" })))
      .unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }));
  }

  #[test]
  fn test_persist_legacy_names() {
    let config = BlockConfig::parse(
      BlockKind::Persist,
      &object(json!({
        "action": "add_to_db",
        "pageTitle": "Notes",
        "databaseId": "db-1"
      })),
    )
    .unwrap();

    let BlockConfig::Persist(persist) = config else {
      panic!("expected persist config");
    };
    assert_eq!(persist.action, PersistAction::AddToCollection);
    assert_eq!(persist.title, "Notes");
    assert_eq!(persist.collection_id.as_deref(), Some("db-1"));
  }

  #[test]
  fn test_persist_update_requires_target() {
    let err = BlockConfig::parse(
      BlockKind::Persist,
      &object(json!({ "action": "update", "title": "Notes" })),
    )
    .unwrap_err();
    assert!(err.to_string().contains("targetId"));
  }

  #[test]
  fn test_condition_operators() {
    let config = BlockConfig::parse(
      BlockKind::Condition,
      &object(json!({ "operator": "length_gt", "value": "5" })),
    )
    .unwrap();
    let BlockConfig::Condition(condition) = config else {
      panic!("expected condition config");
    };
    assert_eq!(condition.operator, ConditionOperator::LengthGt);

    let config =
      BlockConfig::parse(BlockKind::Condition, &object(json!({ "condition": "great" }))).unwrap();
    let BlockConfig::Condition(condition) = config else {
      panic!("expected condition config");
    };
    assert_eq!(condition.operator, ConditionOperator::Contains);
    assert_eq!(condition.value, "great");
  }

  #[test]
  fn test_schedule_interval_requires_minutes() {
    let err =
      BlockConfig::parse(BlockKind::Schedule, &object(json!({ "mode": "interval" }))).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));

    let ok = BlockConfig::parse(
      BlockKind::Schedule,
      &object(json!({ "scheduleType": "cron", "cronExpression": "0 9 * * *" })),
    );
    assert!(ok.is_ok());
  }

  #[test]
  fn test_route_requires_two_categories() {
    let err = BlockConfig::parse(BlockKind::Route, &object(json!({ "categories": ["only"] })))
      .unwrap_err();
    assert!(err.to_string().contains("two categories"));
  }

  #[test]
  fn test_block_kind_aliases() {
    let kind: BlockKind = serde_json::from_value(json!("aiAgentBlock")).unwrap();
    assert_eq!(kind, BlockKind::Generate);
    let kind: BlockKind = serde_json::from_value(json!("route")).unwrap();
    assert_eq!(kind, BlockKind::Route);
    assert!(kind.is_branching());
  }
}
