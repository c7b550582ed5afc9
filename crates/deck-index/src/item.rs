#![forbid(unsafe_code)]

//! Data items and their sort keys.

use std::cmp::Ordering;
use std::rc::Rc;

use deck_core::{ItemId, ValidationError};
use serde_json::{Map, Value};

/// Key/value payload of an item.
pub type Data = Map<String, Value>;

/// Filter predicate: `true` keeps the item on display.
pub type Filter = Rc<dyn Fn(&Item) -> bool>;

/// Derives the value an item is ordered by.
pub type SortKeyFn = Rc<dyn Fn(&Item) -> SortKey>;

/// A data item with stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    data: Data,
    display_index: Option<usize>,
    /// Insertion sequence, the base order before sorting.
    pub(crate) seq: u64,
}

impl Item {
    /// Create an item with an explicit id.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, data: Data) -> Self {
        Self {
            id: id.into(),
            data,
            display_index: None,
            seq: 0,
        }
    }

    /// Build an item from an item-like JSON value.
    ///
    /// The id comes from a string `id` field, a numeric `id` field, or
    /// `fallback` when `id` is absent or null.
    pub fn from_value(
        value: Value,
        fallback: impl FnOnce() -> ItemId,
    ) -> Result<Self, ValidationError> {
        let Value::Object(data) = value else {
            return Err(ValidationError::NotAnObject {
                found: json_type_name(&value),
            });
        };
        let id = match data.get("id") {
            None | Some(Value::Null) => fallback(),
            Some(Value::String(s)) if s.is_empty() => return Err(ValidationError::EmptyId),
            Some(Value::String(s)) => ItemId::new(s.as_str()),
            Some(Value::Number(n)) => ItemId::new(n.to_string()),
            Some(other) => {
                return Err(ValidationError::MalformedId {
                    found: json_type_name(other),
                });
            }
        };
        Ok(Self::new(id, data))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// A single data value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Position in the display order, or `None` when filtered out.
    #[inline]
    #[must_use]
    pub fn display_index(&self) -> Option<usize> {
        self.display_index
    }

    #[inline]
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        self.display_index.is_some()
    }

    pub(crate) fn set_display_index(&mut self, index: Option<usize>) -> bool {
        let changed = self.display_index != index;
        self.display_index = index;
        changed
    }

    pub(crate) fn replace_data(&mut self, data: Data) {
        self.data = data;
    }

    pub(crate) fn set_value(&mut self, key: String, value: Value) {
        self.data.insert(key, value);
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Value an item is sorted by.
///
/// Keys of different kinds order as `None < Bool < Number < Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    None,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&Value> for SortKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::None, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::None,
        }
    }
}

/// Sort by the value stored under `key` (missing values sort first).
#[must_use]
pub fn sort_by_field(key: impl Into<String>) -> SortKeyFn {
    let key = key.into();
    Rc::new(move |item: &Item| item.get(&key).map_or(SortKey::None, SortKey::from))
}

/// Keep items whose `key` equals `expected`.
#[must_use]
pub fn filter_by_field(key: impl Into<String>, expected: Value) -> Filter {
    let key = key.into();
    Rc::new(move |item: &Item| item.get(&key) == Some(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_fallback() -> ItemId {
        panic!("fallback should not be used")
    }

    #[test]
    fn id_from_string_field() {
        let item = Item::from_value(json!({"id": "a", "name": "x"}), no_fallback).unwrap();
        assert_eq!(item.id().as_str(), "a");
        assert_eq!(item.get("name"), Some(&json!("x")));
        assert_eq!(item.display_index(), None);
    }

    #[test]
    fn id_from_number_field() {
        let item = Item::from_value(json!({"id": 42}), no_fallback).unwrap();
        assert_eq!(item.id().as_str(), "42");
    }

    #[test]
    fn generated_fallback_when_absent() {
        let item = Item::from_value(json!({"name": "x"}), || ItemId::new("item-7")).unwrap();
        assert_eq!(item.id().as_str(), "item-7");
    }

    #[test]
    fn rejects_non_objects_and_bad_ids() {
        assert_eq!(
            Item::from_value(json!([1, 2]), no_fallback),
            Err(ValidationError::NotAnObject { found: "array" })
        );
        assert_eq!(
            Item::from_value(json!({"id": true}), no_fallback),
            Err(ValidationError::MalformedId { found: "boolean" })
        );
        assert_eq!(
            Item::from_value(json!({"id": ""}), no_fallback),
            Err(ValidationError::EmptyId)
        );
    }

    #[test]
    fn sort_key_ordering_across_kinds() {
        let mut keys = vec![
            SortKey::Text("b".into()),
            SortKey::Number(2.0),
            SortKey::None,
            SortKey::Bool(true),
            SortKey::Number(-1.0),
            SortKey::Text("a".into()),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SortKey::None,
                SortKey::Bool(true),
                SortKey::Number(-1.0),
                SortKey::Number(2.0),
                SortKey::Text("a".into()),
                SortKey::Text("b".into()),
            ]
        );
    }

    #[test]
    fn field_helpers() {
        let item = Item::from_value(json!({"id": "1", "kind": "fruit", "rank": 3}), no_fallback)
            .unwrap();
        assert_eq!(sort_by_field("rank")(&item), SortKey::Number(3.0));
        assert_eq!(sort_by_field("missing")(&item), SortKey::None);
        assert!(filter_by_field("kind", json!("fruit"))(&item));
        assert!(!filter_by_field("kind", json!("veg"))(&item));
    }
}
