use std::sync::Arc;

use ndarray::{Array, Array2, ArrayD, Dimension, IxDyn};

use super::dataset::Dataset;
use super::features::FeatureArray;
use super::model::{AttrInput, AttrValue, Attribute};
use crate::error::{DatasetError, Result};
use crate::mapper::{mask_mapper, FlattenMapper, Mapper};

// ---------------------------------------------------------------------------
// Sample input coercion
// ---------------------------------------------------------------------------

/// Anything a factory accepts as raw samples.
///
/// One-dimensional input becomes a single-column matrix.
pub trait IntoSampleArray {
    fn into_sample_array(self) -> Result<ArrayD<f64>>;
}

impl<D: Dimension> IntoSampleArray for Array<f64, D> {
    fn into_sample_array(self) -> Result<ArrayD<f64>> {
        coerce(self.into_dyn())
    }
}

impl IntoSampleArray for Vec<f64> {
    fn into_sample_array(self) -> Result<ArrayD<f64>> {
        coerce(ArrayD::from_shape_vec(IxDyn(&[self.len()]), self).map_err(|e| {
            DatasetError::config(format!("cannot build samples array: {e}"))
        })?)
    }
}

impl IntoSampleArray for Vec<Vec<f64>> {
    fn into_sample_array(self) -> Result<ArrayD<f64>> {
        let rows = self.len();
        let cols = self.first().map_or(0, Vec::len);
        if let Some(bad) = self.iter().find(|row| row.len() != cols) {
            return Err(DatasetError::shape_mismatch("sample row", [cols], [bad.len()]));
        }
        let flat: Vec<f64> = self.into_iter().flatten().collect();
        Array2::from_shape_vec((rows, cols), flat)
            .map(|a| a.into_dyn())
            .map_err(|e| DatasetError::config(format!("cannot build samples array: {e}")))
    }
}

fn coerce(data: ArrayD<f64>) -> Result<ArrayD<f64>> {
    match data.ndim() {
        0 => Err(DatasetError::shape_mismatch(
            "samples",
            "at least 1 dimension",
            data.shape(),
        )),
        1 => {
            let n = data.len();
            data.into_shape_with_order(IxDyn(&[n, 1]))
                .map_err(|e| DatasetError::config(format!("cannot reshape samples: {e}")))
        }
        _ => Ok(data),
    }
}

// ---------------------------------------------------------------------------
// from_wizard
// ---------------------------------------------------------------------------

/// Options for [`Dataset::from_wizard`]. Every field defaults to "not given".
#[derive(Debug, Clone, Default)]
pub struct WizardOptions {
    pub targets: Option<AttrInput>,
    pub chunks: Option<AttrInput>,
    /// Shaped like one sample; true entries are kept.
    pub mask: Option<ArrayD<bool>>,
    /// Trained mapper applied last.
    pub mapper: Option<Arc<dyn Mapper>>,
    /// `None` flattens >2-D input unless a mapper is given.
    pub flatten: Option<bool>,
    /// Name of the coordinate attribute added by the flattening step.
    pub space: Option<String>,
}

impl WizardOptions {
    pub fn targets(mut self, targets: impl Into<AttrInput>) -> Self {
        self.targets = Some(targets.into());
        self
    }

    pub fn chunks(mut self, chunks: impl Into<AttrInput>) -> Self {
        self.chunks = Some(chunks.into());
        self
    }

    pub fn mask<D: Dimension>(mut self, mask: Array<bool, D>) -> Self {
        self.mask = Some(mask.into_dyn());
        self
    }

    pub fn mapper(mut self, mapper: Arc<dyn Mapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = Some(flatten);
        self
    }

    pub fn space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }
}

impl Dataset {
    /// Build a dataset from raw N-dimensional samples.
    ///
    /// Input with more than two dimensions is flattened (first axis kept)
    /// unless `flatten` is `Some(false)`, or `flatten` is `None` and a
    /// mapper is given. A mask flattens and selects in one step instead.
    /// A user mapper, if any, is applied last. Every step is recorded in
    /// the mapper chain.
    pub fn from_wizard(samples: impl IntoSampleArray, options: WizardOptions) -> Result<Dataset> {
        let WizardOptions {
            targets,
            chunks,
            mask,
            mapper,
            flatten,
            space,
        } = options;

        let samples = samples.into_sample_array()?;
        let raw_shape = samples.shape().to_vec();
        let n = raw_shape[0];

        let mut ds = Dataset::from_dense(samples)?;
        if let Some(targets) = targets {
            ds.sa_mut()
                .set("targets", Attribute::Array(targets.expand(n, "targets")?))?;
        }
        if let Some(chunks) = chunks {
            ds.sa_mut()
                .set("chunks", Attribute::Array(chunks.expand(n, "chunks")?))?;
        }

        match mask {
            None => {
                if raw_shape.len() > 2 && flatten.unwrap_or(mapper.is_none()) {
                    log::debug!("flattening samples of shape {raw_shape:?}");
                    let fm = FlattenMapper::new(Some(raw_shape[1..].to_vec()), space);
                    ds = ds.apply_and_record(Arc::new(fm))?;
                }
            }
            Some(mask) => {
                log::debug!("masking samples with mask of shape {:?}", mask.shape());
                let mut mm = mask_mapper(&mask, space)?;
                mm.train(&ds)?;
                ds = ds.apply_and_record(Arc::new(mm))?;
            }
        }

        if let Some(mapper) = mapper {
            ds = ds.apply_and_record(mapper)?;
        }
        Ok(ds)
    }

    // -----------------------------------------------------------------------
    // from_channeltimeseries
    // -----------------------------------------------------------------------

    /// Build a dataset from (observations × channels × timepoints) data and
    /// attach `timepoints`/`channels` variable attributes when `t0`+`dt`
    /// and channel ids are given.
    pub fn from_channeltimeseries(
        samples: impl IntoSampleArray,
        options: ChannelTimeseriesOptions,
    ) -> Result<Dataset> {
        let ChannelTimeseriesOptions {
            targets,
            chunks,
            t0,
            dt,
            channel_ids,
        } = options;

        let samples = samples.into_sample_array()?;
        if samples.ndim() != 3 {
            return Err(DatasetError::shape_mismatch(
                "channel timeseries (samples x channels x timepoints)",
                "3 dimensions",
                samples.shape(),
            ));
        }
        let (n_channels, n_timepoints) = (samples.shape()[1], samples.shape()[2]);

        let timepoints = match (t0, dt) {
            (Some(t0), Some(dt)) => Some(Array2::from_shape_fn(
                (n_channels, n_timepoints),
                |(_, t)| t0 + t as f64 * dt,
            )),
            _ => None,
        };

        let channels = match channel_ids {
            Some(ids) if ids.len() != n_channels => {
                return Err(DatasetError::count_mismatch("channel ids", n_channels, ids.len()));
            }
            Some(ids) => Some(Array2::from_shape_fn((n_channels, n_timepoints), |(c, _)| {
                AttrValue::String(ids[c].clone())
            })),
            None => None,
        };

        let wizard = WizardOptions {
            targets,
            chunks,
            ..WizardOptions::default()
        };
        let mut ds = Dataset::from_wizard(samples, wizard)?;

        let first = ds
            .mapper_slot()
            .first()
            .cloned()
            .ok_or_else(|| DatasetError::mapper("channel timeseries were not flattened"))?;
        if let Some(timepoints) = timepoints {
            let values = first.forward1(&FeatureArray::from(timepoints))?.into_attr_values()?;
            ds.fa_mut().set("timepoints", Attribute::Array(values))?;
        }
        if let Some(channels) = channels {
            let values = first.forward1(&FeatureArray::from(channels))?.into_attr_values()?;
            ds.fa_mut().set("channels", Attribute::Array(values))?;
        }
        Ok(ds)
    }
}

/// Options for [`Dataset::from_channeltimeseries`].
#[derive(Debug, Clone, Default)]
pub struct ChannelTimeseriesOptions {
    pub targets: Option<AttrInput>,
    pub chunks: Option<AttrInput>,
    /// Time of the first timepoint.
    pub t0: Option<f64>,
    /// Distance between two timepoints.
    pub dt: Option<f64>,
    pub channel_ids: Option<Vec<String>>,
}

impl ChannelTimeseriesOptions {
    pub fn targets(mut self, targets: impl Into<AttrInput>) -> Self {
        self.targets = Some(targets.into());
        self
    }

    pub fn chunks(mut self, chunks: impl Into<AttrInput>) -> Self {
        self.chunks = Some(chunks.into());
        self
    }

    pub fn timing(mut self, t0: f64, dt: f64) -> Self {
        self.t0 = Some(t0);
        self.dt = Some(dt);
        self
    }

    pub fn channel_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.channel_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}
