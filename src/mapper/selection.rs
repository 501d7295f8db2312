use std::sync::{Arc, OnceLock};

use super::Mapper;
use crate::data::dataset::Dataset;
use crate::data::features::FeatureArray;
use crate::data::samples::Selector;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// StaticFeatureSelection
// ---------------------------------------------------------------------------

/// Keeps a fixed subset of the variable axis.
///
/// `in_features` is the column count the selection was built for. The
/// output shape is learned on the first forward pass and cached.
#[derive(Debug, Clone)]
pub struct StaticFeatureSelection {
    indices: Vec<usize>,
    in_features: usize,
    out_shape: OnceLock<Vec<usize>>,
}

impl StaticFeatureSelection {
    /// Build from any flat selector over `in_features` columns.
    pub fn new(selector: &Selector, in_features: usize) -> Result<Self> {
        Ok(Self {
            indices: selector.resolve(in_features)?,
            in_features,
            out_shape: OnceLock::new(),
        })
    }

    pub fn from_indices(indices: Vec<usize>, in_features: usize) -> Result<Self> {
        Self::new(&Selector::Indices(indices), in_features)
    }

    pub fn from_mask(mask: Vec<bool>) -> Result<Self> {
        let n = mask.len();
        Self::new(&Selector::Mask(mask), n)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Per-sample output shape, once a forward pass has happened.
    pub fn out_shape(&self) -> Option<&[usize]> {
        self.out_shape.get().map(Vec::as_slice)
    }

    fn check_input(&self, shape: &[usize]) -> Result<()> {
        if shape.get(1) != Some(&self.in_features) {
            return Err(DatasetError::shape_mismatch(
                "feature selection input",
                format!("[_, {}, ..]", self.in_features),
                shape,
            ));
        }
        Ok(())
    }

    fn learn_shape(&self, stacked_shape: &[usize]) {
        let _ = self.out_shape.set(stacked_shape[1..].to_vec());
    }
}

impl Mapper for StaticFeatureSelection {
    fn describe(&self) -> String {
        format!("select({} of {})", self.indices.len(), self.in_features)
    }

    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        self.check_input(&dataset.shape())
    }

    fn forward(&self, dataset: &Dataset) -> Result<Dataset> {
        self.check_input(&dataset.shape())?;
        let cols = Selector::Indices(self.indices.clone());
        let out = dataset.slice_raw(&Selector::All, Some(&cols))?;
        self.learn_shape(&out.shape());
        Ok(out)
    }

    fn forward_samples(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.check_input(data.shape())?;
        let out = data.select(1, &self.indices)?;
        self.learn_shape(out.shape());
        Ok(out)
    }

    fn reverse(&self, data: &FeatureArray) -> Result<FeatureArray> {
        data.scatter(1, &self.indices, self.in_features)
    }

    fn as_feature_selection(&self) -> Option<&StaticFeatureSelection> {
        Some(self)
    }

    fn can_merge_with(&self, next: &dyn Mapper) -> bool {
        next.as_feature_selection()
            .is_some_and(|next| next.in_features == self.indices.len())
    }

    fn merged_with(&self, next: &dyn Mapper) -> Result<Arc<dyn Mapper>> {
        let next = next
            .as_feature_selection()
            .filter(|next| next.in_features == self.indices.len())
            .ok_or_else(|| {
                DatasetError::IncompatibleMappers(format!(
                    "{} cannot absorb {}",
                    self.describe(),
                    next.describe()
                ))
            })?;
        let merged = Self {
            indices: next.indices.iter().map(|&j| self.indices[j]).collect(),
            in_features: self.in_features,
            out_shape: next.out_shape.clone(),
        };
        Ok(Arc::new(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::samples::{ElementType, PlaceholderSampleSource};
    use ndarray::array;

    #[test]
    fn learns_shape_from_placeholder() {
        let sel = StaticFeatureSelection::from_mask(vec![true, false, true, true]).unwrap();
        assert!(sel.out_shape().is_none());

        let template = Dataset::new(
            PlaceholderSampleSource::new(&[1, 4], ElementType::Bool)
                .unwrap()
                .into(),
        );
        let out = sel.forward(&template).unwrap();
        assert_eq!(out.shape(), vec![1, 3]);
        assert_eq!(sel.out_shape(), Some(&[3][..]));
    }

    #[test]
    fn rejects_wrong_input_width() {
        let sel = StaticFeatureSelection::from_indices(vec![0], 3).unwrap();
        let data = FeatureArray::from(array![[1.0, 2.0]]);
        assert!(matches!(
            sel.forward_samples(&data),
            Err(DatasetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn merge_composes_indices() {
        let first = StaticFeatureSelection::from_indices(vec![5, 1, 3], 6).unwrap();
        let second = StaticFeatureSelection::from_indices(vec![2, 0], 3).unwrap();
        assert!(first.can_merge_with(&second));

        let merged = first.merged_with(&second).unwrap();
        let merged = merged.as_feature_selection().unwrap();
        assert_eq!(merged.indices(), &[3, 5]);
        assert_eq!(merged.in_features(), 6);

        let data = FeatureArray::from(array![[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]]);
        let sequential = second
            .forward_samples(&first.forward_samples(&data).unwrap())
            .unwrap();
        assert_eq!(merged.forward_samples(&data).unwrap(), sequential);
    }

    #[test]
    fn refuses_mismatched_merge() {
        let first = StaticFeatureSelection::from_indices(vec![0, 1], 4).unwrap();
        let second = StaticFeatureSelection::from_indices(vec![0], 3).unwrap();
        assert!(!first.can_merge_with(&second));
        assert!(matches!(
            first.merged_with(&second),
            Err(DatasetError::IncompatibleMappers(_))
        ));
    }
}
