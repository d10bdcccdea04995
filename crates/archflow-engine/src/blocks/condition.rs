//! Text predicates.

use archflow_config::{ConditionConfig, ConditionOperator};
use regex::RegexBuilder;

use crate::input::NodeInputs;
use crate::result::BlockOutput;

/// Evaluate a predicate against `text`.
///
/// Comparisons are case-insensitive. Length operators read a leading integer
/// from `value` and never hold when there is none. An invalid pattern never
/// matches.
pub fn evaluate(text: &str, operator: ConditionOperator, value: &str) -> bool {
  let text = text.to_lowercase();
  let needle = value.to_lowercase();
  match operator {
    ConditionOperator::Contains => text.contains(&needle),
    ConditionOperator::Equals => text == needle,
    ConditionOperator::StartsWith => text.starts_with(&needle),
    ConditionOperator::EndsWith => text.ends_with(&needle),
    ConditionOperator::LengthGt => leading_int(value).is_some_and(|n| char_len(&text) > n),
    ConditionOperator::LengthLt => leading_int(value).is_some_and(|n| char_len(&text) < n),
    ConditionOperator::Regex => RegexBuilder::new(value)
      .case_insensitive(true)
      .build()
      .map(|re| re.is_match(&text))
      .unwrap_or(false),
  }
}

/// Join the inputs' text, evaluate, and pick the output payload.
pub fn run(config: &ConditionConfig, inputs: &NodeInputs) -> BlockOutput {
  let text = inputs.joined_text(" ");
  let result = evaluate(&text, config.operator, &config.value);
  let chosen = if result {
    config.true_value.as_ref()
  } else {
    config.false_value.as_ref()
  };

  BlockOutput::Condition {
    operator: config.operator,
    value: config.value.clone(),
    result,
    output: chosen.cloned().unwrap_or(text),
  }
}

fn char_len(text: &str) -> i64 {
  i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
}

/// Leading integer of a string: optional whitespace and sign, then digits.
/// Trailing garbage is ignored, as in `"10px"`.
fn leading_int(value: &str) -> Option<i64> {
  let trimmed = value.trim_start();
  let (sign, rest) = match trimmed.strip_prefix('-') {
    Some(rest) => (-1, rest),
    None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
  };
  let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
  digits.parse::<i64>().ok().map(|n| sign * n)
}
