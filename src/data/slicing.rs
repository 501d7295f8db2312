use std::sync::Arc;

use super::dataset::Dataset;
use super::features::FeatureArray;
use super::samples::{ElementType, PlaceholderSampleSource, Selector};
use crate::error::{DatasetError, Result};
use crate::mapper::{Mapper, StaticFeatureSelection};

// ---------------------------------------------------------------------------
// SliceArgs – a row selector plus an optional feature selector
// ---------------------------------------------------------------------------

/// Index expression for [`Dataset::slice`]. A lone selector applies to
/// observations; the second one, if present, to variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceArgs {
    pub rows: Selector,
    pub features: Option<Selector>,
}

impl SliceArgs {
    pub fn rows(rows: impl Into<Selector>) -> Self {
        Self {
            rows: rows.into(),
            features: None,
        }
    }

    pub fn new(rows: impl Into<Selector>, features: impl Into<Selector>) -> Self {
        Self {
            rows: rows.into(),
            features: Some(features.into()),
        }
    }
}

impl From<Selector> for SliceArgs {
    fn from(rows: Selector) -> Self {
        Self::rows(rows)
    }
}

impl From<(Selector, Selector)> for SliceArgs {
    fn from((rows, features): (Selector, Selector)) -> Self {
        Self::new(rows, features)
    }
}

// ---------------------------------------------------------------------------
// Slicing
// ---------------------------------------------------------------------------

impl Dataset {
    /// Subset observations and/or variables.
    ///
    /// A multi-dimensional feature selector is first translated through the
    /// mapper chain into the current flat feature space. Whenever variables
    /// were selected on a dataset that carries a mapper chain, a matching
    /// [`StaticFeatureSelection`] is recorded on the result.
    pub fn slice(&self, args: impl Into<SliceArgs>) -> Result<Dataset> {
        let SliceArgs { rows, features } = args.into();

        let features = match features {
            Some(sel) if !sel.is_flat() && !self.mapper_slot().is_empty() => {
                Some(self.translate_selector(sel)?)
            }
            other => other,
        };

        let mut ds = self.slice_raw(&rows, features.as_ref())?;

        if let Some(sel) = features {
            if !ds.mapper_slot().is_empty() {
                let n_features = self.nfeatures();
                let subset = StaticFeatureSelection::new(&sel, n_features)?;
                // charge the output shape without touching real data
                let template = Dataset::new(
                    PlaceholderSampleSource::new(&[1, n_features], ElementType::Bool)?.into(),
                );
                subset.forward(&template)?;
                ds.append_mapper(Arc::new(subset));
            }
        }
        Ok(ds)
    }

    /// Keep only the variables picked by `features`.
    pub fn select_features(&self, features: impl Into<Selector>) -> Result<Dataset> {
        self.slice(SliceArgs::new(Selector::All, features))
    }

    /// Keep only the observations picked by `rows`.
    pub fn select_samples(&self, rows: impl Into<Selector>) -> Result<Dataset> {
        self.slice(SliceArgs::rows(rows))
    }

    fn translate_selector(&self, sel: Selector) -> Result<Selector> {
        let Selector::MaskNd(mask) = sel else {
            return Ok(sel);
        };
        let flat = self
            .mapper_slot()
            .forward1(&FeatureArray::Bool(mask))?
            .into_bool()?;
        if flat.ndim() != 1 {
            return Err(DatasetError::shape_mismatch(
                "translated feature selector",
                "1-D",
                flat.shape(),
            ));
        }
        log::debug!("translated original-space selector into {} features", flat.len());
        Ok(Selector::Mask(flat.into_iter().collect()))
    }
}
