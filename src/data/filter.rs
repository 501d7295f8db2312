use std::collections::{BTreeMap, BTreeSet};

use super::dataset::Dataset;
use super::model::{AttrValue, Attribute};
use super::samples::Selector;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per observation attribute
// ---------------------------------------------------------------------------

/// Per-attribute selection state: maps attribute name → set of accepted values.
/// An attribute absent from the map is not constrained; an empty set rejects
/// every observation.
pub type FilterState = BTreeMap<String, BTreeSet<AttrValue>>;

/// Initialise a [`FilterState`] that accepts everything.
pub fn init_filter_state(dataset: &Dataset) -> FilterState {
    dataset
        .sa()
        .iter()
        .map(|(name, attr)| (name.to_string(), attr.unique()))
        .collect()
}

/// Return indices of observations that pass all active filters.
///
/// An observation passes an attribute filter when:
/// * The attribute is not present in `filters` → passes (no constraint)
/// * The filter set for that attribute is empty → nothing accepted → fails
/// * The observation's value is in the accepted set → passes
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    (0..dataset.nsamples())
        .filter(|&row| {
            for (name, accepted) in filters {
                if accepted.is_empty() {
                    return false;
                }
                match dataset.sa().get(name).and_then(Attribute::as_array) {
                    Some(values) => {
                        if !accepted.contains(&values[row]) {
                            return false;
                        }
                    }
                    None => {
                        // attribute missing → include only if Null is accepted
                        if !accepted.contains(&AttrValue::Null) {
                            return false;
                        }
                    }
                }
            }
            true
        })
        .collect()
}

impl Dataset {
    /// Observations passing `filters`, as a new dataset.
    pub fn select_where(&self, filters: &FilterState) -> Result<Dataset> {
        self.select_samples(Selector::Indices(filtered_indices(self, filters)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dataset() -> Dataset {
        let mut ds = Dataset::from_dense(Array2::<f64>::zeros((4, 2)).into_dyn()).unwrap();
        ds.sa_mut().set("targets", vec!["a", "b", "a", "c"]).unwrap();
        ds.sa_mut().set("chunks", vec![0, 0, 1, 1]).unwrap();
        ds
    }

    #[test]
    fn initial_state_accepts_all() {
        let ds = dataset();
        let state = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &state), vec![0, 1, 2, 3]);
    }

    #[test]
    fn combines_attribute_filters() {
        let ds = dataset();
        let mut state = init_filter_state(&ds);
        state.insert("targets".into(), [AttrValue::from("a")].into_iter().collect());
        state.insert("chunks".into(), [AttrValue::from(1)].into_iter().collect());
        assert_eq!(filtered_indices(&ds, &state), vec![2]);

        let sub = ds.select_where(&state).unwrap();
        assert_eq!(sub.nsamples(), 1);
        assert_eq!(sub.targets().unwrap(), &[AttrValue::from("a")]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let ds = dataset();
        let mut state = FilterState::new();
        state.insert("targets".into(), BTreeSet::new());
        assert!(filtered_indices(&ds, &state).is_empty());
    }

    #[test]
    fn missing_attribute_matches_null_only() {
        let ds = dataset();
        let mut state = FilterState::new();
        state.insert("subject".into(), [AttrValue::Null].into_iter().collect());
        assert_eq!(filtered_indices(&ds, &state).len(), 4);
        state.insert("subject".into(), [AttrValue::from("s1")].into_iter().collect());
        assert!(filtered_indices(&ds, &state).is_empty());
    }
}
