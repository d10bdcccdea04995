//! Next-run computation.
//!
//! Cron expressions are read for their minute and hour fields only. The next
//! matching time today or tomorrow (UTC) is returned.

use archflow_config::{ScheduleConfig, ScheduleMode};
use chrono::{DateTime, TimeDelta, Utc};

use crate::result::BlockOutput;

/// Compute when the schedule fires next, relative to `now`.
///
/// Anything that cannot be interpreted falls back to one hour from now.
pub fn next_run(config: &ScheduleConfig, now: DateTime<Utc>) -> DateTime<Utc> {
  let next = match config.mode {
    ScheduleMode::Interval => config
      .interval_minutes
      .filter(|m| *m > 0)
      .and_then(|m| i64::try_from(m).ok())
      .and_then(TimeDelta::try_minutes)
      .and_then(|delta| now.checked_add_signed(delta)),
    ScheduleMode::Cron => config
      .cron_expression
      .as_deref()
      .and_then(|expr| next_cron_occurrence(expr, now)),
  };
  next.unwrap_or_else(|| now + TimeDelta::hours(1))
}

/// Next occurrence of a `minute hour * * *` expression.
///
/// A non-numeric minute field reads as minute 0. The hour field must be a
/// number below 24.
pub fn next_cron_occurrence(expression: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
  let fields: Vec<&str> = expression.split_whitespace().collect();
  if fields.len() != 5 {
    return None;
  }

  let hour = fields[1].parse::<u32>().ok().filter(|h| *h < 24)?;
  let minute = match fields[0].parse::<u32>() {
    Ok(m) if m < 60 => m,
    Ok(_) => return None,
    Err(_) => 0,
  };

  let today = now.date_naive().and_hms_opt(hour, minute, 0)?.and_utc();
  if today > now {
    Some(today)
  } else {
    today.checked_add_signed(TimeDelta::days(1))
  }
}

pub fn run(config: &ScheduleConfig, now: DateTime<Utc>) -> BlockOutput {
  BlockOutput::Schedule {
    mode: config.mode,
    next_run: next_run(config, now),
    interval_minutes: config.interval_minutes,
    cron_expression: config.cron_expression.clone(),
  }
}
