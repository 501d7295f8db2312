use std::sync::Arc;

use super::Mapper;
use crate::data::dataset::Dataset;
use crate::data::features::FeatureArray;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// ChainMapper
// ---------------------------------------------------------------------------

/// Ordered sequence of mappers applied one after another.
///
/// Elements are shared read-only (`Arc`); merging replaces the tail with a
/// new mapper instead of mutating the old one, so datasets derived from the
/// same base never observe each other's bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ChainMapper {
    mappers: Vec<Arc<dyn Mapper>>,
}

impl ChainMapper {
    pub fn new(mappers: Vec<Arc<dyn Mapper>>) -> Self {
        Self { mappers }
    }

    pub fn mappers(&self) -> &[Arc<dyn Mapper>] {
        &self.mappers
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Append without attempting a merge.
    pub fn push(&mut self, mapper: Arc<dyn Mapper>) {
        self.mappers.push(mapper);
    }

    /// Append `mapper`, folding it into the tail when the tail is a static
    /// feature selection that can absorb it.
    pub fn append(&mut self, mapper: Arc<dyn Mapper>) {
        if let Some(last) = self.mappers.last_mut() {
            if last.as_feature_selection().is_some() && last.can_merge_with(mapper.as_ref()) {
                match last.merged_with(mapper.as_ref()) {
                    Ok(merged) => {
                        log::debug!("merged {} into chain tail", mapper.describe());
                        *last = merged;
                        return;
                    }
                    Err(e) => log::debug!("merge refused ({e}), appending instead"),
                }
            }
        }
        log::debug!("appending {} to chain", mapper.describe());
        self.mappers.push(mapper);
    }
}

impl Mapper for ChainMapper {
    fn describe(&self) -> String {
        let inner: Vec<String> = self.mappers.iter().map(|m| m.describe()).collect();
        format!("chain[{}]", inner.join(" -> "))
    }

    fn as_chain(&self) -> Option<&ChainMapper> {
        Some(self)
    }

    /// Train every element on the output of its predecessor. Elements must
    /// not be shared yet.
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        let mut current = dataset.clone();
        let n = self.mappers.len();
        for (i, mapper) in self.mappers.iter_mut().enumerate() {
            let mapper = Arc::get_mut(mapper).ok_or_else(|| {
                DatasetError::mapper("cannot train a chain element that is already shared")
            })?;
            mapper.train(&current)?;
            if i + 1 < n {
                current = mapper.forward(&current)?;
            }
        }
        Ok(())
    }

    fn forward(&self, dataset: &Dataset) -> Result<Dataset> {
        let mut current = dataset.clone();
        for mapper in &self.mappers {
            current = mapper.forward(&current)?;
        }
        Ok(current)
    }

    fn forward_samples(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.mappers
            .iter()
            .try_fold(data.clone(), |acc, m| m.forward_samples(&acc))
    }

    fn reverse(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.mappers
            .iter()
            .rev()
            .try_fold(data.clone(), |acc, m| m.reverse(&acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{FlattenMapper, StaticFeatureSelection};
    use ndarray::array;

    fn flatten_then_select() -> ChainMapper {
        let flatten: Arc<dyn Mapper> = Arc::new(FlattenMapper::new(Some(vec![2, 2]), None));
        let select: Arc<dyn Mapper> =
            Arc::new(StaticFeatureSelection::from_indices(vec![1, 3], 4).unwrap());
        ChainMapper::new(vec![flatten, select])
    }

    #[test]
    fn forward_applies_in_order() {
        let chain = flatten_then_select();
        let out = chain
            .forward1(&FeatureArray::from(array![[1.0, 2.0], [3.0, 4.0]]))
            .unwrap();
        assert_eq!(out, FeatureArray::from(array![2.0, 4.0]));
    }

    #[test]
    fn reverse_applies_backwards() {
        let chain = flatten_then_select();
        let back = chain.reverse1(&FeatureArray::from(array![2.0, 4.0])).unwrap();
        assert_eq!(back, FeatureArray::from(array![[0.0, 2.0], [0.0, 4.0]]));
    }

    #[test]
    fn describe_lists_elements() {
        assert_eq!(
            flatten_then_select().describe(),
            "chain[flatten([2, 2]) -> select(2 of 4)]"
        );
    }
}
