use serde_json::{Map, Value};

pub mod catalog;

/// Static validity constraints for one document field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Bounded string
    Text { max: usize },
    /// Bounded integer score
    Integer { min: i64, max: i64 },
    /// Boolean
    Flag,
    /// `YYYY-MM-DD` or RFC 3339
    Date,
    /// Fixed value set
    Enum { values: &'static [&'static str] },
    Url,
    Email,
    /// Array of bounded strings; optionally must be non-empty
    TextArray { max_item: usize, non_empty: bool },
    /// Array of UUID strings referencing another resource
    RefArray,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(n) => Value::from(n),
            DefaultValue::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Human-readable name used in violation messages
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

/// List-endpoint ordering, applied left to right
#[derive(Debug, Clone, Copy)]
pub enum SortKey {
    PositionAsc,
    CreatedDesc,
    /// Descending order over a date field stored in the document
    DocDateDesc(&'static str),
}

impl SortKey {
    pub fn to_sql(self) -> String {
        match self {
            SortKey::PositionAsc => "position ASC".to_string(),
            SortKey::CreatedDesc => "created_at DESC".to_string(),
            SortKey::DocDateDesc(field) => format!("doc->>'{}' DESC NULLS LAST", field),
        }
    }
}

/// Read-only fields computed at the serialization boundary, never stored
#[derive(Debug, Clone, Copy)]
pub enum Derived {
    /// Proficiency label from a 0-100 score
    ProficiencyLabel { source: &'static str, target: &'static str },
    /// Human-readable span between two dates; open end means "to now"
    Duration { start: &'static str, end: &'static str, target: &'static str },
    /// Whether a date field lies in the past
    Expired { source: &'static str, target: &'static str },
}

impl Derived {
    pub fn target(&self) -> &'static str {
        match *self {
            Derived::ProficiencyLabel { target, .. } => target,
            Derived::Duration { target, .. } => target,
            Derived::Expired { target, .. } => target,
        }
    }
}

/// What `PUT /:id/toggle`-style endpoints flip
#[derive(Debug, Clone, Copy)]
pub enum ToggleTarget {
    /// The record's visibility column
    ActiveFlag,
    /// A boolean field inside the document
    DocFlag(&'static str),
}

/// Read-time join: an id array resolved into `{id, <label_field>}` stubs
#[derive(Debug, Clone, Copy)]
pub struct RefJoin {
    pub field: &'static str,
    pub resource: &'static str,
    pub label_field: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Features {
    pub reorder: bool,
    pub toggle: Option<ToggleTarget>,
    pub like_counter: bool,
    pub view_counter: bool,
    pub category_routes: bool,
    /// Counter fields surfaced with a zero default before first increment
    pub counters: &'static [&'static str],
}

/// The declarative contract one resource type instantiates. Everything the
/// generic router, validation layer and store need is data here, not code.
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
    pub search_fields: &'static [&'static str],
    /// Query parameters accepted as equality filters over document fields
    pub filters: &'static [&'static str],
    pub sort: &'static [SortKey],
    pub derived: &'static [Derived],
    pub reference: Option<RefJoin>,
    /// Pure pre-persist hook run by the create/update path
    pub prepare: Option<fn(&mut Map<String, Value>)>,
    pub features: Features,
}

impl ResourceDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn enum_values(&self, field: &str) -> Option<&'static [&'static str]> {
        match self.field(field).map(|f| f.kind) {
            Some(FieldKind::Enum { values }) => Some(values),
            _ => None,
        }
    }

    pub fn is_derived_field(&self, name: &str) -> bool {
        self.derived.iter().any(|d| d.target() == name)
    }

    pub fn order_by_sql(&self) -> String {
        self.sort
            .iter()
            .map(|k| k.to_sql())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_render_expected_sql() {
        assert_eq!(SortKey::PositionAsc.to_sql(), "position ASC");
        assert_eq!(SortKey::CreatedDesc.to_sql(), "created_at DESC");
        assert_eq!(
            SortKey::DocDateDesc("issueDate").to_sql(),
            "doc->>'issueDate' DESC NULLS LAST"
        );
    }

    #[test]
    fn descriptor_lookups_resolve_fields() {
        let skills = catalog::by_name("skills").unwrap();
        assert!(skills.field("level").is_some());
        assert!(skills.field("nonexistent").is_none());
        assert!(skills.enum_values("category").unwrap().contains(&"Frontend Development"));
        assert!(skills.is_derived_field("proficiencyLabel"));
        assert_eq!(skills.order_by_sql(), "position ASC, created_at DESC");
    }
}
