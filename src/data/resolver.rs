use super::collection::{AttributeCollection, CollectionKind};
use super::dataset::Dataset;
use super::model::Attribute;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Attribute lookup across collections
// ---------------------------------------------------------------------------

/// Where a bare attribute name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Collection that wins by precedence (`sa` > `fa` > `a`).
    pub kind: CollectionKind,
    /// Lower-precedence collections that hold the same name too.
    pub shadowed: Vec<CollectionKind>,
}

/// Split `"sa.targets"` into an explicit collection and a name. Only the
/// first two dot-separated parts count.
fn split_name(name: &str) -> Result<(Option<CollectionKind>, &str)> {
    match name.split_once('.') {
        Some((collection, rest)) => {
            let kind = collection.parse::<CollectionKind>()?;
            let attr = rest.split('.').next().unwrap_or(rest);
            Ok((Some(kind), attr))
        }
        None => Ok((None, name)),
    }
}

impl Dataset {
    /// Find the collection holding `name`, searching `sa`, then `fa`, then
    /// `a`. A name also present further down the order is reported in
    /// [`Resolution::shadowed`] and logged as a warning.
    pub fn find_collection(&self, name: &str) -> Result<Resolution> {
        let mut hits = CollectionKind::PRECEDENCE
            .into_iter()
            .filter(|&kind| self.collection(kind).contains(name));
        let kind = hits.next().ok_or_else(|| {
            DatasetError::lookup(format!(
                "cannot find '{name}' attribute in any dataset collection"
            ))
        })?;
        let shadowed: Vec<CollectionKind> = hits.collect();
        if !shadowed.is_empty() {
            log::warn!(
                "An attribute with name '{name}' is present in '{kind}' and also in {shadowed:?}; \
                 using '{kind}' (prefix the name with a collection to be explicit)"
            );
        }
        Ok(Resolution { kind, shadowed })
    }

    /// Resolve a bare or dotted (`"fa.channels"`) name to a collection kind.
    pub fn resolve_attr(&self, name: &str) -> Result<(CollectionKind, String)> {
        let (explicit, attr) = split_name(name)?;
        let kind = match explicit {
            Some(kind) => kind,
            None => self.find_collection(attr)?.kind,
        };
        Ok((kind, attr.to_string()))
    }

    /// Attribute value and the collection it lives in.
    pub fn get_attr(&self, name: &str) -> Result<(&Attribute, &AttributeCollection)> {
        let (kind, attr) = self.resolve_attr(name)?;
        let collection = self.collection(kind);
        let value = collection.get(&attr).ok_or_else(|| {
            DatasetError::lookup(format!("no attribute '{attr}' in collection '{kind}'"))
        })?;
        Ok((value, collection))
    }

    /// Store `value` in the resolved collection. Dotted names may create a
    /// new attribute; the collection validates the length.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Attribute>) -> Result<()> {
        let (kind, attr) = self.resolve_attr(name)?;
        self.collection_mut(kind).set(attr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AttrValue;
    use ndarray::array;

    fn dataset() -> Dataset {
        let mut ds =
            Dataset::from_dense(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]].into_dyn()).unwrap();
        ds.sa_mut().set("targets", vec!["a", "b", "a"]).unwrap();
        ds.fa_mut().set("roi", vec!["x", "y"]).unwrap();
        ds.a_mut().set("unit", AttrValue::from("mV")).unwrap();
        ds
    }

    #[test]
    fn finds_each_collection() {
        let ds = dataset();
        assert_eq!(ds.find_collection("targets").unwrap().kind, CollectionKind::Samples);
        assert_eq!(ds.find_collection("roi").unwrap().kind, CollectionKind::Features);
        assert_eq!(ds.find_collection("unit").unwrap().kind, CollectionKind::Dataset);
        assert!(matches!(
            ds.find_collection("missing"),
            Err(DatasetError::Lookup(_))
        ));
    }

    #[test]
    fn precedence_wins_and_reports_shadowing() {
        let mut ds = dataset();
        ds.fa_mut().set("targets", vec![1, 2]).unwrap();
        ds.a_mut().set("roi", AttrValue::from("whole brain")).unwrap();

        let res = ds.find_collection("targets").unwrap();
        assert_eq!(res.kind, CollectionKind::Samples);
        assert_eq!(res.shadowed, vec![CollectionKind::Features]);

        let res = ds.find_collection("roi").unwrap();
        assert_eq!(res.kind, CollectionKind::Features);
        assert_eq!(res.shadowed, vec![CollectionKind::Dataset]);

        assert!(ds.find_collection("unit").unwrap().shadowed.is_empty());
    }

    #[test]
    fn dotted_names_bypass_search() {
        let mut ds = dataset();
        ds.fa_mut().set("targets", vec![1, 2]).unwrap();
        let (value, collection) = ds.get_attr("fa.targets").unwrap();
        assert_eq!(collection.kind(), CollectionKind::Features);
        assert_eq!(value.len(), Some(2));

        assert!(matches!(
            ds.get_attr("xa.targets"),
            Err(DatasetError::UnknownCollection(_))
        ));
        assert!(matches!(ds.get_attr("a.targets"), Err(DatasetError::Lookup(_))));
    }

    #[test]
    fn set_attr_creates_and_validates() {
        let mut ds = dataset();
        ds.set_attr("sa.chunks", vec![0, 0, 1]).unwrap();
        assert_eq!(ds.chunks().unwrap().len(), 3);

        let err = ds.set_attr("sa.chunks", vec![0, 1]).unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
        assert_eq!(ds.chunks().unwrap().len(), 3);

        ds.set_attr("targets", vec!["c", "c", "c"]).unwrap();
        assert_eq!(ds.unique_targets().len(), 1);

        assert!(matches!(
            ds.set_attr("novel", vec![1, 2, 3]),
            Err(DatasetError::Lookup(_))
        ));
    }
}
