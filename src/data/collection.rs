use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::Attribute;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// CollectionKind
// ---------------------------------------------------------------------------

/// The three attribute scopes of a dataset, in lookup precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CollectionKind {
    /// One value per observation (row), identifier `sa`.
    Samples,
    /// One value per variable (column), identifier `fa`.
    Features,
    /// Dataset-wide values, identifier `a`.
    Dataset,
}

impl CollectionKind {
    /// All kinds in lookup precedence order.
    pub const PRECEDENCE: [CollectionKind; 3] = [
        CollectionKind::Samples,
        CollectionKind::Features,
        CollectionKind::Dataset,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CollectionKind::Samples => "sa",
            CollectionKind::Features => "fa",
            CollectionKind::Dataset => "a",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CollectionKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sa" => Ok(CollectionKind::Samples),
            "fa" => Ok(CollectionKind::Features),
            "a" => Ok(CollectionKind::Dataset),
            other => Err(DatasetError::UnknownCollection(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AttributeCollection
// ---------------------------------------------------------------------------

/// Name → attribute mapping that enforces its per-attribute length.
///
/// Observation and variable collections carry a fixed `length`; every array
/// stored in them must have exactly that many entries. The dataset
/// collection has no length and accepts any [`Attribute`].
#[derive(Debug, Clone)]
pub struct AttributeCollection {
    kind: CollectionKind,
    length: Option<usize>,
    attrs: BTreeMap<String, Attribute>,
}

impl AttributeCollection {
    pub fn new(kind: CollectionKind, length: Option<usize>) -> Self {
        Self {
            kind,
            length,
            attrs: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Required array length, `None` for the dataset collection.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Insert or replace an attribute after validating it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        self.validate(&name, &value)?;
        self.attrs.insert(name, value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.attrs.remove(name)
    }

    /// Attribute names in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn validate(&self, name: &str, value: &Attribute) -> Result<()> {
        let Some(expected) = self.length else {
            return Ok(());
        };
        match value.len() {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(DatasetError::shape_mismatch(
                format!("{}.{name}", self.kind),
                [expected],
                [actual],
            )),
            None => Err(DatasetError::config(format!(
                "collection '{}' only stores arrays, '{name}' is not one",
                self.kind
            ))),
        }
    }

    /// Build a collection of the same kind holding only the array entries
    /// at `indices`.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        let attrs = self
            .attrs
            .iter()
            .map(|(name, attr)| {
                let attr = match attr {
                    Attribute::Array(values) => {
                        Attribute::Array(indices.iter().map(|&i| values[i].clone()).collect())
                    }
                    other => other.clone(),
                };
                (name.clone(), attr)
            })
            .collect();
        Self {
            kind: self.kind,
            length: self.length.map(|_| indices.len()),
            attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AttrValue;

    #[test]
    fn parses_collection_ids() {
        assert_eq!("sa".parse::<CollectionKind>().unwrap(), CollectionKind::Samples);
        assert_eq!("fa".parse::<CollectionKind>().unwrap(), CollectionKind::Features);
        assert_eq!("a".parse::<CollectionKind>().unwrap(), CollectionKind::Dataset);
        assert!(matches!(
            "xa".parse::<CollectionKind>(),
            Err(DatasetError::UnknownCollection(_))
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let mut sa = AttributeCollection::new(CollectionKind::Samples, Some(3));
        assert!(sa.set("targets", vec![1, 2, 3]).is_ok());
        let err = sa.set("chunks", vec![1, 2]).unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
        assert!(!sa.contains("chunks"));
    }

    #[test]
    fn rejects_scalar_in_sized_collection() {
        let mut fa = AttributeCollection::new(CollectionKind::Features, Some(2));
        let err = fa.set("unit", AttrValue::from("mV")).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn dataset_collection_accepts_anything() {
        let mut a = AttributeCollection::new(CollectionKind::Dataset, None);
        a.set("unit", AttrValue::from("mV")).unwrap();
        a.set("labels", vec!["x", "y", "z", "w"]).unwrap();
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["labels", "unit"]);
    }

    #[test]
    fn select_subsets_arrays() {
        let mut sa = AttributeCollection::new(CollectionKind::Samples, Some(4));
        sa.set("targets", vec!["a", "b", "c", "d"]).unwrap();
        let sub = sa.select(&[3, 1]);
        assert_eq!(sub.length(), Some(2));
        assert_eq!(
            sub.get("targets").and_then(Attribute::as_array).unwrap(),
            &[AttrValue::from("d"), AttrValue::from("b")]
        );
    }
}
