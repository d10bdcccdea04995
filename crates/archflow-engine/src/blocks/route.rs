//! Category routing.
//!
//! Keyword mode scores each category by the fraction of its keywords found in
//! the text. AI mode defers to the classifier. Hybrid mode blends the two,
//! with a perfect keyword match taking over the decision. The confidence
//! threshold does not apply to a keyword override.

use std::collections::BTreeMap;

use archflow_config::{RouteConfig, RouteMode};
use archflow_services::{Classification, ClassifierService};
use tracing::warn;

use crate::error::BlockError;
use crate::input::NodeInputs;
use crate::result::BlockOutput;

const AI_WEIGHT: f64 = 0.7;
const KEYWORD_WEIGHT: f64 = 0.3;
/// Confidence floor when a perfect keyword match overrides the classifier.
const OVERRIDE_FLOOR: f64 = 0.9;

/// Best keyword-scored category.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
  pub category: String,
  /// Fraction of the category's keywords present in the text.
  pub score: f64,
  pub matched: Vec<String>,
}

/// Split a comma-separated keyword list, dropping blanks.
pub fn keywords(rule: &str) -> Vec<String> {
  rule
    .split(',')
    .map(|k| k.trim().to_lowercase())
    .filter(|k| !k.is_empty())
    .collect()
}

/// Score every category against `text` and keep the best one.
///
/// Ties go to the earlier category. When nothing matches the first category
/// is returned with a score of zero.
pub fn classify_keywords(
  text: &str,
  categories: &[String],
  rules: &BTreeMap<String, String>,
) -> KeywordMatch {
  let text = text.to_lowercase();
  let mut best: Option<KeywordMatch> = None;

  for category in categories {
    let words = rules.get(category).map(String::as_str).map(keywords).unwrap_or_default();
    if words.is_empty() {
      continue;
    }
    let matched: Vec<String> = words
      .iter()
      .filter(|w| text.contains(w.as_str()))
      .cloned()
      .collect();
    let score = matched.len() as f64 / words.len() as f64;
    if score > 0.0 && best.as_ref().is_none_or(|b| score > b.score) {
      best = Some(KeywordMatch {
        category: category.clone(),
        score,
        matched,
      });
    }
  }

  best.unwrap_or_else(|| KeywordMatch {
    category: categories.first().cloned().unwrap_or_default(),
    score: 0.0,
    matched: Vec::new(),
  })
}

/// Blend a classifier verdict with the keyword result.
///
/// Returns the chosen category and its confidence.
pub fn combine_hybrid(ai: &Classification, keyword: &KeywordMatch) -> (String, f64) {
  let blended = AI_WEIGHT * ai.confidence.clamp(0.0, 1.0) + KEYWORD_WEIGHT * keyword.score;
  if keyword.score >= 1.0 {
    (keyword.category.clone(), blended.max(OVERRIDE_FLOOR))
  } else {
    (ai.category.clone(), blended)
  }
}

/// Classify the joined input text and select a category.
pub async fn run(
  classifier: &dyn ClassifierService,
  config: &RouteConfig,
  inputs: &NodeInputs,
) -> Result<BlockOutput, BlockError> {
  let text = inputs.joined_text(" ");
  let categories = &config.categories;
  let keyword = classify_keywords(&text, categories, &config.rules);

  let mut overridden = false;
  let (mut category, confidence, mut reasoning) = match config.mode {
    RouteMode::Keyword => (keyword.category.clone(), keyword.score, keyword_reasoning(&keyword)),
    RouteMode::Ai => {
      let ai = classifier
        .classify(&text, categories, &config.ai_model)
        .await
        .map_err(|source| BlockError::Service {
          service: "classifier",
          source,
        })?;
      if !categories.contains(&ai.category) {
        return Err(BlockError::UnknownCategory {
          category: ai.category,
        });
      }
      (ai.category, ai.confidence.clamp(0.0, 1.0), ai.reasoning)
    }
    RouteMode::Hybrid => match classifier.classify(&text, categories, &config.ai_model).await {
      Ok(ai) if categories.contains(&ai.category) => {
        let (category, confidence) = combine_hybrid(&ai, &keyword);
        overridden = keyword.score >= 1.0;
        let reasoning = format!("{} (keyword score {:.2})", ai.reasoning, keyword.score);
        (category, confidence, reasoning)
      }
      Ok(ai) => {
        warn!(category = %ai.category, "classifier_unknown_category, using keyword result");
        (keyword.category.clone(), keyword.score, keyword_reasoning(&keyword))
      }
      Err(e) => {
        warn!(error = %e, "classifier_failed, using keyword result");
        (keyword.category.clone(), keyword.score, keyword_reasoning(&keyword))
      }
    },
  };

  let thresholded = config.mode != RouteMode::Keyword && !overridden;
  if thresholded && confidence < config.confidence_threshold {
    if let Some(fallback) = categories.first() {
      reasoning = format!(
        "confidence {:.2} below threshold {:.2}, falling back to '{}'",
        confidence, config.confidence_threshold, fallback
      );
      category = fallback.clone();
    }
  }

  Ok(BlockOutput::Route {
    mode: config.mode,
    selected_category: category,
    confidence,
    reasoning,
    available_categories: categories.clone(),
    content: text,
  })
}

fn keyword_reasoning(keyword: &KeywordMatch) -> String {
  if keyword.matched.is_empty() {
    format!("no keywords matched, defaulting to '{}'", keyword.category)
  } else {
    format!("matched keywords: {}", keyword.matched.join(", "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use archflow_services::ServiceError;
  use async_trait::async_trait;

  /// Classifier returning a fixed verdict.
  struct Fixed(Result<Classification, ()>);

  #[async_trait]
  impl ClassifierService for Fixed {
    async fn classify(
      &self,
      _text: &str,
      _categories: &[String],
      _model: &str,
    ) -> Result<Classification, ServiceError> {
      self
        .0
        .clone()
        .map_err(|_| ServiceError::Unavailable("offline".to_string()))
    }
  }

  fn verdict(category: &str, confidence: f64) -> Fixed {
    Fixed(Ok(Classification {
      category: category.to_string(),
      confidence,
      reasoning: "model says so".to_string(),
    }))
  }

  fn config(mode: RouteMode) -> RouteConfig {
    RouteConfig {
      mode,
      categories: vec!["A".to_string(), "B".to_string()],
      rules: BTreeMap::from([
        ("A".to_string(), "refund, invoice".to_string()),
        ("B".to_string(), "bug, crash, error".to_string()),
      ]),
      ai_model: "mock".to_string(),
      confidence_threshold: 0.0,
    }
  }

  fn text(content: &str) -> NodeInputs {
    NodeInputs::from_payload(content)
  }

  fn selected(output: &BlockOutput) -> (&str, f64) {
    match output {
      BlockOutput::Route {
        selected_category,
        confidence,
        ..
      } => (selected_category.as_str(), *confidence),
      other => panic!("expected route output, got {:?}", other),
    }
  }

  #[test]
  fn test_keyword_scores_fraction() {
    let rules = config(RouteMode::Keyword).rules;
    let categories = vec!["A".to_string(), "B".to_string()];

    let result = classify_keywords("App CRASH with an error", &categories, &rules);
    assert_eq!(result.category, "B");
    assert!((result.score - 2.0 / 3.0).abs() < 1e-9);

    let result = classify_keywords("hello", &categories, &rules);
    assert_eq!(result.category, "A");
    assert_eq!(result.score, 0.0);
  }

  #[test]
  fn test_keyword_tie_keeps_first_category() {
    let rules = BTreeMap::from([
      ("A".to_string(), "alpha".to_string()),
      ("B".to_string(), "beta".to_string()),
    ]);
    let categories = vec!["B".to_string(), "A".to_string()];
    let result = classify_keywords("alpha beta", &categories, &rules);
    assert_eq!(result.category, "B");
  }

  #[test]
  fn test_perfect_keyword_match_overrides() {
    let ai = Classification {
      category: "B".to_string(),
      confidence: 0.4,
      reasoning: String::new(),
    };
    let keyword = KeywordMatch {
      category: "A".to_string(),
      score: 1.0,
      matched: vec![],
    };
    let (category, confidence) = combine_hybrid(&ai, &keyword);
    assert_eq!(category, "A");
    assert!(confidence >= 0.9);
  }

  #[test]
  fn test_partial_keyword_match_blends() {
    let ai = Classification {
      category: "B".to_string(),
      confidence: 0.5,
      reasoning: String::new(),
    };
    let keyword = KeywordMatch {
      category: "A".to_string(),
      score: 0.5,
      matched: vec![],
    };
    let (category, confidence) = combine_hybrid(&ai, &keyword);
    assert_eq!(category, "B");
    assert!((confidence - 0.5).abs() < 1e-9);
  }

  #[tokio::test]
  async fn test_hybrid_run_prefers_full_keyword_match() {
    let output = run(
      &verdict("B", 0.4),
      &config(RouteMode::Hybrid),
      &text("Refund request for invoice 42"),
    )
    .await
    .unwrap();
    let (category, confidence) = selected(&output);
    assert_eq!(category, "A");
    assert!(confidence >= 0.9);
    assert_eq!(output.branch_key(), Some("A"));
  }

  #[tokio::test]
  async fn test_keyword_override_ignores_confidence_threshold() {
    let mut config = config(RouteMode::Hybrid);
    config.confidence_threshold = 0.95;
    let output = run(&verdict("B", 0.4), &config, &text("Refund request for invoice 42"))
      .await
      .unwrap();
    let (category, confidence) = selected(&output);
    assert_eq!(category, "A");
    assert!(confidence < 0.95);

    // Without a perfect match the blended score is still held to the threshold.
    let output = run(&verdict("B", 0.4), &config, &text("a crash"))
      .await
      .unwrap();
    let BlockOutput::Route { reasoning, .. } = &output else {
      panic!("expected route output");
    };
    assert!(reasoning.contains("below threshold"));
  }

  #[tokio::test]
  async fn test_hybrid_falls_back_when_classifier_fails() {
    let output = run(&Fixed(Err(())), &config(RouteMode::Hybrid), &text("a crash"))
      .await
      .unwrap();
    assert_eq!(selected(&output).0, "B");
  }

  #[tokio::test]
  async fn test_ai_mode_rejects_unknown_category() {
    let err = run(&verdict("Z", 0.9), &config(RouteMode::Ai), &text("anything"))
      .await
      .unwrap_err();
    assert!(matches!(err, BlockError::UnknownCategory { category } if category == "Z"));
  }

  #[tokio::test]
  async fn test_ai_mode_propagates_service_failure() {
    let err = run(&Fixed(Err(())), &config(RouteMode::Ai), &text("anything"))
      .await
      .unwrap_err();
    assert!(matches!(err, BlockError::Service { .. }));
  }

  #[tokio::test]
  async fn test_low_confidence_falls_back_to_first_category() {
    let mut config = config(RouteMode::Ai);
    config.confidence_threshold = 0.6;
    let output = run(&verdict("B", 0.3), &config, &text("anything"))
      .await
      .unwrap();
    assert_eq!(selected(&output).0, "A");
  }

  #[tokio::test]
  async fn test_route_passes_text_through() {
    let output = run(&verdict("A", 0.9), &config(RouteMode::Keyword), &text("invoice"))
      .await
      .unwrap();
    assert_eq!(output.text(), Some("invoice"));
  }
}
