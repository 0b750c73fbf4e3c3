//! Daily aggregation of fixed-interval forecast samples.
//!
//! Samples are bucketed by weekday in arrival order: a weekday change closes
//! the open bucket. Input is expected to be time-ascending; a weekday that
//! reappears later opens a new bucket rather than merging into the old one.

use chrono::{Datelike, Weekday};

use crate::model::{DailySummary, RawSample};

struct Bucket<'a> {
    weekday: Weekday,
    temps: Vec<f64>,
    conditions: Vec<&'a str>,
}

impl<'a> Bucket<'a> {
    fn open(sample: &'a RawSample) -> Self {
        Self {
            weekday: sample.timestamp.weekday(),
            temps: vec![sample.temperature],
            conditions: vec![sample.condition.as_str()],
        }
    }

    fn push(&mut self, sample: &'a RawSample) {
        self.temps.push(sample.temperature);
        self.conditions.push(sample.condition.as_str());
    }

    fn close(self) -> DailySummary {
        let high = self.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let low = self.temps.iter().copied().fold(f64::INFINITY, f64::min);

        DailySummary {
            day: weekday_name(self.weekday).to_string(),
            high: round1(high),
            low: round1(low),
            condition: modal_condition(&self.conditions).to_string(),
        }
    }
}

/// Collapse `samples` into at most `max_days` daily summaries.
pub fn aggregate(samples: &[RawSample], max_days: usize) -> Vec<DailySummary> {
    let mut days = Vec::new();
    let mut open: Option<Bucket<'_>> = None;

    for sample in samples {
        match open.as_mut() {
            Some(bucket) if bucket.weekday == sample.timestamp.weekday() => bucket.push(sample),
            _ => {
                if let Some(done) = open.replace(Bucket::open(sample)) {
                    days.push(done.close());
                }
            }
        }
    }

    if let Some(done) = open {
        days.push(done.close());
    }

    days.truncate(max_days);
    days
}

/// Most frequent label; ties go to the label seen first.
fn modal_condition<'a>(conditions: &[&'a str]) -> &'a str {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &label in conditions {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((label, n));
        }
    }

    best.map(|(label, _)| label).unwrap_or("Unknown")
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
