//! Wire formatting for content records.
//!
//! Derived fields (proficiency label, duration, expiry status) are pure
//! functions evaluated here, at the serialization boundary. They are never
//! stored, so they can never go stale.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::resource::{Derived, ResourceDescriptor};
use crate::store::ContentRecord;
use crate::validation::parse_date;

/// Convert a stored record into the public wire shape:
/// document fields first, then system columns under their wire names,
/// then derived fields.
pub fn record_to_api_value(desc: &ResourceDescriptor, record: &ContentRecord) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::String(record.id.to_string()));

    if let Value::Object(doc) = &record.doc {
        for (key, value) in doc {
            obj.insert(key.clone(), value.clone());
        }
    }

    for counter in desc.features.counters {
        obj.entry(counter.to_string()).or_insert(Value::from(0));
    }

    for derived in desc.derived {
        let (target, value) = compute_derived(derived, &obj);
        obj.insert(target.to_string(), value);
    }

    obj.insert("isActive".to_string(), Value::Bool(record.is_active));
    obj.insert("order".to_string(), Value::from(record.position));
    obj.insert(
        "createdAt".to_string(),
        Value::String(record.created_at.to_rfc3339()),
    );
    obj.insert(
        "updatedAt".to_string(),
        Value::String(record.updated_at.to_rfc3339()),
    );

    Value::Object(obj)
}

pub fn records_to_api_values(desc: &ResourceDescriptor, records: &[ContentRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|record| record_to_api_value(desc, record))
        .collect()
}

fn compute_derived(derived: &Derived, doc: &Map<String, Value>) -> (&'static str, Value) {
    match *derived {
        Derived::ProficiencyLabel { source, target } => {
            let value = doc
                .get(source)
                .and_then(Value::as_i64)
                .map(|level| Value::String(proficiency_label(level).to_string()))
                .unwrap_or(Value::Null);
            (target, value)
        }
        Derived::Duration { start, end, target } => {
            let start_date = doc.get(start).and_then(Value::as_str).and_then(parse_date);
            let end_date = doc.get(end).and_then(Value::as_str).and_then(parse_date);
            let value = start_date
                .map(|s| Value::String(duration_label(s, end_date)))
                .unwrap_or(Value::Null);
            (target, value)
        }
        Derived::Expired { source, target } => {
            let expired = doc
                .get(source)
                .and_then(Value::as_str)
                .and_then(parse_date)
                .map(|date| date < Utc::now().date_naive())
                .unwrap_or(false);
            (target, Value::Bool(expired))
        }
    }
}

/// Fixed thresholds over a 0-100 score
pub fn proficiency_label(level: i64) -> &'static str {
    match level {
        l if l >= 90 => "Expert",
        l if l >= 70 => "Advanced",
        l if l >= 50 => "Intermediate",
        l if l >= 30 => "Beginner",
        _ => "Learning",
    }
}

/// Human-readable span between two dates; an open end means "to now".
pub fn duration_label(start: NaiveDate, end: Option<NaiveDate>) -> String {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if months < 1 {
        months = 1;
    }

    let years = months / 12;
    let remainder = months % 12;
    match (years, remainder) {
        (0, m) => format!("{} mo{}", m, plural(m)),
        (y, 0) => format!("{} yr{}", y, plural(y)),
        (y, m) => format!("{} yr{} {} mo{}", y, plural(y), m, plural(m)),
    }
}

fn plural(n: i32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
