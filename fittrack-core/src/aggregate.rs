//! Date partitioning and numeric reduction over dated records.
//!
//! Every function here truncates a record's `occurred_at` to a calendar date in
//! the caller-supplied time zone before comparing, so summary cards and charts
//! built on top of them always agree on which day a record belongs to.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{DatedRecord, Metric};

/// Count and per-metric sums over a set of records or line items.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Totals {
    pub count: usize,
    pub sums: BTreeMap<Metric, f64>,
}

impl Totals {
    /// Empty totals with every requested metric present and zero.
    pub fn zeroed(metrics: &[Metric]) -> Self {
        Self {
            count: 0,
            sums: metrics.iter().map(|m| (*m, 0.0)).collect(),
        }
    }

    pub fn add(&mut self, metric: Metric, value: f64) {
        *self.sums.entry(metric).or_insert(0.0) += value;
    }

    /// Sum for `metric`; zero if it was not requested.
    pub fn sum(&self, metric: Metric) -> f64 {
        self.sums.get(&metric).copied().unwrap_or(0.0)
    }
}

/// Records sharing a date window.
#[derive(Debug, Clone)]
pub struct Bucket<'a, R> {
    /// First calendar day covered by the bucket.
    pub key: NaiveDate,
    pub label: String,
    pub members: Vec<&'a R>,
}

impl<'a, R: DatedRecord> Bucket<'a, R> {
    pub fn totals(&self, metrics: &[Metric]) -> Totals {
        totals_of(self.members.iter().copied(), metrics)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Calendar date of `record` in `tz`.
pub fn local_date<R: DatedRecord, Tz: TimeZone>(record: &R, tz: &Tz) -> NaiveDate {
    record.occurred_at().with_timezone(tz).date_naive()
}

/// Fold records into a count plus the sum of each requested metric.
///
/// A metric absent on a record contributes zero; the record is still counted.
pub fn totals_of<'a, R, I>(records: I, metrics: &[Metric]) -> Totals
where
    R: DatedRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut totals = Totals::zeroed(metrics);
    for record in records {
        totals.count += 1;
        for metric in metrics {
            totals.add(*metric, record.metric(*metric).unwrap_or(0.0));
        }
    }
    totals
}

/// One bucket per calendar day starting at `window_start`, ascending, empty days included.
pub fn bucket_by_day<'a, R, Tz>(
    records: &'a [R],
    window_start: NaiveDate,
    window_days: usize,
    tz: &Tz,
) -> Vec<Bucket<'a, R>>
where
    R: DatedRecord,
    Tz: TimeZone,
{
    partition(records, window_start, window_days, 1, tz, |day, _| {
        day.format("%Y-%m-%d").to_string()
    })
}

/// Consecutive seven-day windows starting at `window_start`, labelled `Week 1..N`.
pub fn bucket_by_week<'a, R, Tz>(
    records: &'a [R],
    window_start: NaiveDate,
    weeks: usize,
    tz: &Tz,
) -> Vec<Bucket<'a, R>>
where
    R: DatedRecord,
    Tz: TimeZone,
{
    partition(records, window_start, weeks, 7, tz, |_, index| {
        format!("Week {}", index + 1)
    })
}

fn partition<'a, R, Tz, F>(
    records: &'a [R],
    window_start: NaiveDate,
    count: usize,
    span_days: u64,
    tz: &Tz,
    label: F,
) -> Vec<Bucket<'a, R>>
where
    R: DatedRecord,
    Tz: TimeZone,
    F: Fn(NaiveDate, usize) -> String,
{
    // Stops at the last representable date, so `count` may exceed what is returned.
    let mut buckets = Vec::new();
    for i in 0..count {
        let key = (i as u64)
            .checked_mul(span_days)
            .and_then(|offset| window_start.checked_add_days(Days::new(offset)));
        let Some(key) = key else {
            break;
        };
        buckets.push(Bucket {
            key,
            label: label(key, i),
            members: Vec::new(),
        });
    }

    for record in records {
        let offset = local_date(record, tz)
            .signed_duration_since(window_start)
            .num_days();
        let index = u64::try_from(offset)
            .ok()
            .and_then(|days| usize::try_from(days / span_days).ok());
        if let Some(bucket) = index.and_then(|i| buckets.get_mut(i)) {
            bucket.members.push(record);
        }
    }

    buckets
}

/// Records whose local date is the local date of `now`.
pub fn filter_today<'a, R, Tz>(records: &'a [R], now: DateTime<Utc>, tz: &Tz) -> Vec<&'a R>
where
    R: DatedRecord,
    Tz: TimeZone,
{
    let today = now.with_timezone(tz).date_naive();
    filter_range(records, today, today, tz)
}

/// Records whose local date falls within `from..=to`.
pub fn filter_range<'a, R, Tz>(
    records: &'a [R],
    from: NaiveDate,
    to: NaiveDate,
    tz: &Tz,
) -> Vec<&'a R>
where
    R: DatedRecord,
    Tz: TimeZone,
{
    records
        .iter()
        .filter(|r| {
            let day = local_date(*r, tz);
            day >= from && day <= to
        })
        .collect()
}

/// Records keyed by local date, input order kept within each date.
pub fn group_by_date<'a, R, Tz>(records: &'a [R], tz: &Tz) -> BTreeMap<NaiveDate, Vec<&'a R>>
where
    R: DatedRecord,
    Tz: TimeZone,
{
    let mut groups: BTreeMap<NaiveDate, Vec<&'a R>> = BTreeMap::new();
    for record in records {
        groups.entry(local_date(record, tz)).or_default().push(record);
    }
    groups
}
