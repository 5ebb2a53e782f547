//! Elapsed-relationship snapshot — calendar math for the duration widget.
//!
//! All arithmetic is done on calendar dates ([`NaiveDate`]), never on raw
//! durations: "one year together" means the same month and day one calendar
//! year later, which is what a couple counts, and it keeps the maths immune
//! to DST shifts.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Immutable elapsed-time snapshot for a relationship start date.
///
/// Invariants: `years_total * 12 <= months_total`, and
/// `days_until_anniversary == 0` exactly when `is_anniversary_today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
  pub start_date:             NaiveDate,
  pub days_total:             i64,
  pub months_total:           u32,
  pub years_total:            u32,
  pub next_anniversary:       NaiveDate,
  pub days_until_anniversary: i64,
  pub is_anniversary_today:   bool,
  pub formatted_duration:     String,
  pub computed_at:            DateTime<Utc>,
}

impl RelationshipSnapshot {
  /// Compute the snapshot for `start_date` as seen on `today`.
  ///
  /// Fails with [`Error::InvalidStartDate`] when the start date lies in the
  /// future; this is the only error a calculator produces, and it is local
  /// to the relationship field of the widget snapshot.
  pub fn compute(
    start_date:  NaiveDate,
    today:       NaiveDate,
    computed_at: DateTime<Utc>,
  ) -> Result<Self> {
    if start_date > today {
      return Err(Error::InvalidStartDate { start: start_date, today });
    }

    let days_total = (today - start_date).num_days();

    // Calendar-year difference, borrowing one when this year's (month, day)
    // has not been reached yet.
    let mut years = today.year() - start_date.year();
    if (today.month(), today.day()) < (start_date.month(), start_date.day()) {
      years -= 1;
    }
    let years_total = years.max(0) as u32;

    // The day-of-month borrow applies to years only; months wrap the raw
    // month delta.
    let month_delta =
      (today.month() as i32 - start_date.month() as i32 + 12) % 12;
    let months_total = years_total * 12 + month_delta as u32;

    let next_anniversary = next_anniversary_on_or_after(start_date, today);
    let days_until_anniversary = (next_anniversary - today).num_days();

    Ok(Self {
      start_date,
      days_total,
      months_total,
      years_total,
      next_anniversary,
      days_until_anniversary,
      is_anniversary_today: days_until_anniversary == 0,
      formatted_duration: format_duration(years_total, months_total, days_total),
      computed_at,
    })
  }
}

// ─── Anniversary ─────────────────────────────────────────────────────────────

/// The next anniversary of `start_date` on or after `today`.
///
/// Today's (month, day) matching the start date IS the anniversary; only a
/// strictly-earlier date rolls to next year. A Feb 29 start is observed on
/// March 1 in non-leap years.
fn next_anniversary_on_or_after(start_date: NaiveDate, today: NaiveDate) -> NaiveDate {
  let this_year = observed_on(today.year(), start_date.month(), start_date.day());
  if this_year >= today {
    this_year
  } else {
    observed_on(today.year() + 1, start_date.month(), start_date.day())
  }
}

/// `(month, day)` in `year`, falling back to March 1 when the date does not
/// exist (Feb 29 in a non-leap year).
fn observed_on(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day)
    .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
    .unwrap_or_default()
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// French duration copy; first matching rule wins.
fn format_duration(years: u32, months: u32, days: i64) -> String {
  if years > 0 {
    let unit = if years == 1 { "an" } else { "ans" };
    let remainder = months % 12;
    if remainder > 0 {
      format!("{years} {unit} et {remainder} mois")
    } else {
      format!("{years} {unit}")
    }
  } else if months > 0 {
    format!("{months} mois")
  } else if days > 0 {
    if days == 1 {
      "1 jour".to_string()
    } else {
      format!("{days} jours")
    }
  } else {
    "Aujourd'hui".to_string()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  fn at() -> DateTime<Utc> {
    "2024-06-01T12:00:00Z".parse().unwrap()
  }

  fn compute(start: &str, today: &str) -> RelationshipSnapshot {
    RelationshipSnapshot::compute(date(start), date(today), at()).unwrap()
  }

  // ── Reference vector ──────────────────────────────────────────────────────

  #[test]
  fn one_full_year() {
    let snap = compute("2023-01-01", "2024-01-01");
    assert_eq!(snap.days_total, 365);
    assert_eq!(snap.years_total, 1);
    assert_eq!(snap.months_total, 12);
    assert_eq!(snap.formatted_duration, "1 an");
    assert!(snap.is_anniversary_today);
    assert_eq!(snap.days_until_anniversary, 0);
    assert_eq!(snap.next_anniversary, date("2024-01-01"));
  }

  // ── Invariants ────────────────────────────────────────────────────────────

  #[test]
  fn totals_are_consistent_over_many_dates() {
    let start = date("2020-03-15");
    let mut today = start;
    for _ in 0..1200 {
      let snap =
        RelationshipSnapshot::compute(start, today, at()).unwrap();
      assert!(snap.days_total >= 0);
      assert!(snap.years_total * 12 <= snap.months_total);
      assert!(snap.days_until_anniversary >= 0);
      assert_eq!(
        snap.is_anniversary_today,
        snap.days_until_anniversary == 0
      );
      today = today.succ_opt().unwrap();
    }
  }

  #[test]
  fn future_start_date_is_rejected() {
    let err =
      RelationshipSnapshot::compute(date("2025-01-01"), date("2024-01-01"), at())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStartDate { .. }));
  }

  // ── Borrow rule ───────────────────────────────────────────────────────────

  #[test]
  fn year_borrows_until_anniversary_passes() {
    let before = compute("2023-06-10", "2024-06-09");
    assert_eq!(before.years_total, 0);

    let on = compute("2023-06-10", "2024-06-10");
    assert_eq!(on.years_total, 1);

    let after = compute("2023-06-10", "2024-06-11");
    assert_eq!(after.years_total, 1);
  }

  #[test]
  fn months_wrap_negative_deltas() {
    // Oct 2023 → Feb 2024: delta (2 - 10 + 12) % 12 = 4.
    let snap = compute("2023-10-05", "2024-02-20");
    assert_eq!(snap.years_total, 0);
    assert_eq!(snap.months_total, 4);
    assert_eq!(snap.formatted_duration, "4 mois");
  }

  // ── Anniversary semantics ─────────────────────────────────────────────────

  #[test]
  fn anniversary_today_does_not_roll_to_next_year() {
    let snap = compute("2020-06-01", "2024-06-01");
    assert!(snap.is_anniversary_today);
    assert_eq!(snap.next_anniversary, date("2024-06-01"));
  }

  #[test]
  fn day_after_anniversary_rolls_to_next_year() {
    let snap = compute("2020-06-01", "2024-06-02");
    assert!(!snap.is_anniversary_today);
    assert_eq!(snap.next_anniversary, date("2025-06-01"));
    assert_eq!(snap.days_until_anniversary, 364);
  }

  #[test]
  fn upcoming_anniversary_counts_down() {
    let snap = compute("2020-06-10", "2024-06-09");
    assert_eq!(snap.days_until_anniversary, 1);
    assert!(!snap.is_anniversary_today);
  }

  #[test]
  fn leap_day_start_observes_march_first() {
    let snap = compute("2020-02-29", "2023-01-15");
    assert_eq!(snap.next_anniversary, date("2023-03-01"));

    // In a leap year the true date is kept.
    let leap = compute("2020-02-29", "2024-01-15");
    assert_eq!(leap.next_anniversary, date("2024-02-29"));
  }

  // ── Formatting ────────────────────────────────────────────────────────────

  #[test]
  fn duration_copy_picks_first_matching_rule() {
    assert_eq!(compute("2024-06-01", "2024-06-01").formatted_duration, "Aujourd'hui");
    assert_eq!(compute("2024-06-10", "2024-06-11").formatted_duration, "1 jour");
    assert_eq!(compute("2024-06-01", "2024-06-13").formatted_duration, "12 jours");
    // Cross-month dates always carry a month delta, even when fewer than
    // thirty days have elapsed.
    assert_eq!(compute("2024-05-31", "2024-06-01").formatted_duration, "1 mois");
    assert_eq!(compute("2024-01-01", "2024-06-01").formatted_duration, "5 mois");
    assert_eq!(compute("2022-06-01", "2024-06-01").formatted_duration, "2 ans");
    assert_eq!(
      compute("2022-03-01", "2024-06-01").formatted_duration,
      "2 ans et 3 mois"
    );
  }
}
