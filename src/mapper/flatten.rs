use std::sync::Arc;

use ndarray::ArrayD;

use super::{ChainMapper, Mapper, StaticFeatureSelection};
use crate::data::collection::{AttributeCollection, CollectionKind};
use crate::data::dataset::Dataset;
use crate::data::features::FeatureArray;
use crate::data::model::{AttrValue, Attribute};
use crate::data::samples::{DenseSampleSource, Samples};
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// FlattenMapper
// ---------------------------------------------------------------------------

/// Collapses every non-observation axis into one variable axis (row-major).
///
/// If `space` is set, each output variable gets a `Coordinate` attribute of
/// that name holding its position in the original per-sample shape.
#[derive(Debug, Clone)]
pub struct FlattenMapper {
    shape: Option<Vec<usize>>,
    space: Option<String>,
}

impl FlattenMapper {
    /// `shape` is the per-sample input shape; `None` learns it in `train`.
    pub fn new(shape: Option<Vec<usize>>, space: Option<String>) -> Self {
        Self { shape, space }
    }

    pub fn in_shape(&self) -> Result<&[usize]> {
        self.shape
            .as_deref()
            .ok_or_else(|| DatasetError::mapper("flatten mapper is not trained"))
    }

    pub fn out_features(&self) -> Result<usize> {
        Ok(self.in_shape()?.iter().product())
    }

    fn check_input(&self, stacked_shape: &[usize]) -> Result<()> {
        let shape = self.in_shape()?;
        if stacked_shape.get(1..) != Some(shape) {
            return Err(DatasetError::shape_mismatch(
                "flatten input",
                shape,
                stacked_shape.get(1..).unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Broadcast each variable attribute over the collapsed trailing axes
    /// and add the coordinate space if requested.
    fn map_feature_attributes(&self, fa: &AttributeCollection) -> Result<AttributeCollection> {
        let shape = self.in_shape()?;
        let n_out = self.out_features()?;
        let inner: usize = shape.get(1..).unwrap_or_default().iter().product();
        let mut out = AttributeCollection::new(CollectionKind::Features, Some(n_out));
        for (name, attr) in fa.iter() {
            let Attribute::Array(values) = attr else {
                continue;
            };
            let broadcast: Vec<AttrValue> = (0..n_out)
                .map(|k| values[k / inner.max(1)].clone())
                .collect();
            out.set(name, Attribute::Array(broadcast))?;
        }
        if let Some(space) = &self.space {
            let coords = (0..n_out)
                .map(|k| AttrValue::Coordinate(unravel(k, shape)))
                .collect::<Vec<_>>();
            out.set(space.clone(), Attribute::Array(coords))?;
        }
        Ok(out)
    }
}

/// Row-major multi-index of flat position `k` in `shape`.
fn unravel(mut k: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    for (axis, &len) in shape.iter().enumerate().rev() {
        if len > 0 {
            coord[axis] = k % len;
            k /= len;
        }
    }
    coord
}

impl Mapper for FlattenMapper {
    fn describe(&self) -> String {
        match &self.shape {
            Some(shape) => format!("flatten({shape:?})"),
            None => "flatten(untrained)".to_string(),
        }
    }

    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        let ds_shape = dataset.shape();
        match &self.shape {
            None => {
                self.shape = Some(ds_shape[1..].to_vec());
                Ok(())
            }
            Some(_) => self.check_input(&ds_shape),
        }
    }

    fn forward(&self, dataset: &Dataset) -> Result<Dataset> {
        let ds_shape = dataset.shape();
        self.check_input(&ds_shape)?;
        let samples = match dataset.samples() {
            Samples::Dense(dense) => {
                let flat = self
                    .forward_samples(&FeatureArray::Float(dense.data().clone()))?
                    .into_float()?;
                Samples::Dense(DenseSampleSource::new(flat)?)
            }
            // placeholders are two-dimensional already
            Samples::Placeholder(p) => Samples::Placeholder(p.clone()),
        };
        let fa = self.map_feature_attributes(dataset.fa())?;
        Dataset::from_parts(samples, dataset.sa().clone(), fa, dataset.a().clone())
    }

    fn forward_samples(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.check_input(data.shape())?;
        data.reshape(&[data.shape()[0], self.out_features()?])
    }

    fn reverse(&self, data: &FeatureArray) -> Result<FeatureArray> {
        let n_out = self.out_features()?;
        if data.shape().len() != 2 || data.shape()[1] != n_out {
            return Err(DatasetError::shape_mismatch(
                "flatten reverse input",
                format!("[_, {n_out}]"),
                data.shape(),
            ));
        }
        let mut shape = vec![data.shape()[0]];
        shape.extend_from_slice(self.in_shape()?);
        data.reshape(&shape)
    }
}

// ---------------------------------------------------------------------------
// mask_mapper
// ---------------------------------------------------------------------------

/// Flatten samples shaped like `mask` and keep the variables where `mask`
/// is true.
pub fn mask_mapper(mask: &ArrayD<bool>, space: Option<String>) -> Result<ChainMapper> {
    let flatten = FlattenMapper::new(Some(mask.shape().to_vec()), space);
    let flat_mask: Vec<bool> = mask.iter().copied().collect();
    let selection = StaticFeatureSelection::from_mask(flat_mask)?;
    let flatten: Arc<dyn Mapper> = Arc::new(flatten);
    let selection: Arc<dyn Mapper> = Arc::new(selection);
    Ok(ChainMapper::new(vec![flatten, selection]))
}
