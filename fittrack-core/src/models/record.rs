use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use super::metric::Metric;

/// A fetched record that happened at a point in time and carries numeric fields.
pub trait DatedRecord {
    fn id(&self) -> Uuid;

    fn owner_id(&self) -> &str;

    fn occurred_at(&self) -> DateTime<Utc>;

    /// Value of `metric` on this record, or `None` if the record has no such field.
    fn metric(&self, metric: Metric) -> Option<f64>;
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the SQLite `YYYY-MM-DD HH:MM:SS` form, the latter read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
