use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::{DatasetError, Result};
use crate::mapper::MapperSlot;

// ---------------------------------------------------------------------------
// AttrValue – a single cell of an attribute array
// ---------------------------------------------------------------------------

/// A dynamically-typed attribute value.
/// Unique-value sets are kept in `BTreeSet`, so `AttrValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Position of a feature in a multi-dimensional original space.
    Coordinate(Vec<usize>),
    #[default]
    Null,
}

// -- Manual Eq/Ord so we can put AttrValue in BTreeSet --

impl Eq for AttrValue {}

impl PartialOrd for AttrValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use AttrValue::*;
        fn discriminant(v: &AttrValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Coordinate(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Coordinate(a), Coordinate(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for AttrValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttrValue::String(s) => s.hash(state),
            AttrValue::Integer(i) => i.hash(state),
            AttrValue::Float(f) => f.to_bits().hash(state),
            AttrValue::Bool(b) => b.hash(state),
            AttrValue::Coordinate(c) => c.hash(state),
            AttrValue::Null => {}
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) => write!(f, "{s}"),
            AttrValue::Integer(i) => write!(f, "{i}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Coordinate(c) => write!(f, "{c:?}"),
            AttrValue::Null => write!(f, "<null>"),
        }
    }
}

impl AttrValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Integer(i64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

// ---------------------------------------------------------------------------
// Attribute – what a collection stores under one name
// ---------------------------------------------------------------------------

/// Value stored in an attribute collection.
///
/// Observation and variable collections only accept [`Attribute::Array`];
/// the dataset collection accepts any variant.
#[derive(Debug, Clone)]
pub enum Attribute {
    Array(Vec<AttrValue>),
    Scalar(AttrValue),
    Mapper(MapperSlot),
}

impl Attribute {
    /// Length of an array attribute, `None` for scalars and mappers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Attribute::Array(values) => Some(values.len()),
            _ => None,
        }
    }

    /// True only for an array attribute without entries.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn as_array(&self) -> Option<&[AttrValue]> {
        match self {
            Attribute::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_mapper(&self) -> Option<&MapperSlot> {
        match self {
            Attribute::Mapper(slot) => Some(slot),
            _ => None,
        }
    }

    /// Sorted set of distinct values of an array attribute.
    pub fn unique(&self) -> BTreeSet<AttrValue> {
        match self {
            Attribute::Array(values) => values.iter().cloned().collect(),
            Attribute::Scalar(v) => std::iter::once(v.clone()).collect(),
            Attribute::Mapper(_) => BTreeSet::new(),
        }
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for Attribute {
    fn from(values: Vec<T>) -> Self {
        Attribute::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<AttrValue> for Attribute {
    fn from(v: AttrValue) -> Self {
        Attribute::Scalar(v)
    }
}

impl From<MapperSlot> for Attribute {
    fn from(slot: MapperSlot) -> Self {
        Attribute::Mapper(slot)
    }
}

// ---------------------------------------------------------------------------
// AttrInput – observation-level input given to the factories
// ---------------------------------------------------------------------------

/// Targets/chunks as handed to a factory: either one value for every
/// observation or one value per observation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrInput {
    Scalar(AttrValue),
    Vector(Vec<AttrValue>),
}

impl AttrInput {
    /// Expand into a full observation attribute of `length` entries.
    pub fn expand(self, length: usize, name: &str) -> Result<Vec<AttrValue>> {
        match self {
            AttrInput::Scalar(v) => Ok(vec![v; length]),
            AttrInput::Vector(values) if values.len() == length => Ok(values),
            AttrInput::Vector(values) => Err(DatasetError::shape_mismatch(
                format!("attribute '{name}'"),
                [length],
                [values.len()],
            )),
        }
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrInput {
    fn from(values: Vec<T>) -> Self {
        AttrInput::Vector(values.into_iter().map(Into::into).collect())
    }
}

impl From<AttrValue> for AttrInput {
    fn from(v: AttrValue) -> Self {
        AttrInput::Scalar(v)
    }
}

impl From<&str> for AttrInput {
    fn from(v: &str) -> Self {
        AttrInput::Scalar(v.into())
    }
}

impl From<i64> for AttrInput {
    fn from(v: i64) -> Self {
        AttrInput::Scalar(v.into())
    }
}

impl From<i32> for AttrInput {
    fn from(v: i32) -> Self {
        AttrInput::Scalar(v.into())
    }
}

impl From<f64> for AttrInput {
    fn from(v: f64) -> Self {
        AttrInput::Scalar(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_groups_by_variant() {
        let mut set = BTreeSet::new();
        set.insert(AttrValue::from("b"));
        set.insert(AttrValue::from(2));
        set.insert(AttrValue::Null);
        set.insert(AttrValue::from(1.5));
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered[0], AttrValue::Null);
        assert_eq!(ordered[1], AttrValue::Integer(2));
        assert_eq!(ordered[2], AttrValue::Float(1.5));
        assert_eq!(ordered[3], AttrValue::String("b".into()));
    }

    #[test]
    fn only_empty_arrays_are_empty() {
        assert_eq!(AttrValue::default(), AttrValue::Null);
        assert!(Attribute::Array(Vec::new()).is_empty());
        assert!(!Attribute::from(vec![1]).is_empty());
        assert!(!Attribute::Scalar(AttrValue::Null).is_empty());
    }

    #[test]
    fn scalar_input_is_broadcast() {
        let expanded = AttrInput::from(3).expand(4, "chunks").unwrap();
        assert_eq!(expanded, vec![AttrValue::Integer(3); 4]);
    }

    #[test]
    fn vector_input_must_match_length() {
        let ok = AttrInput::from(vec!["a", "b"]).expand(2, "targets").unwrap();
        assert_eq!(ok.len(), 2);

        let err = AttrInput::from(vec!["a", "b", "c"])
            .expand(2, "targets")
            .unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }
}
