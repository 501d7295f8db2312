use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use ndarray::{Array, ArrayD, Dimension, IxDyn};

use super::features::{select_axis, FeatureArray};
use super::model::AttrValue;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Selector – one index expression for one axis
// ---------------------------------------------------------------------------

/// Selection along a single axis.
///
/// `Index` always keeps the axis (it behaves like a one-element `Indices`),
/// so selecting never drops a dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    All,
    Index(usize),
    Indices(Vec<usize>),
    Mask(Vec<bool>),
    /// Python-style slice; bounds are clamped to the axis length.
    Slice {
        start: usize,
        stop: Option<usize>,
        step: usize,
    },
    /// Boolean selector shaped like the original (pre-mapper) feature space.
    MaskNd(ArrayD<bool>),
}

impl Selector {
    /// Whether the selector addresses a flat axis directly.
    pub fn is_flat(&self) -> bool {
        !matches!(self, Selector::MaskNd(m) if m.ndim() > 1)
    }

    /// Translate into explicit positions on an axis of length `len`.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            Selector::All => Ok((0..len).collect()),
            Selector::Index(i) => check_bounds(vec![*i], len),
            Selector::Indices(indices) => check_bounds(indices.clone(), len),
            Selector::Mask(mask) => mask_positions(mask.iter().copied(), mask.len(), len),
            Selector::Slice { start, stop, step } => {
                if *step == 0 {
                    return Err(DatasetError::config("slice step cannot be zero"));
                }
                let stop = stop.unwrap_or(len).min(len);
                let start = (*start).min(stop);
                Ok((start..stop).step_by(*step).collect())
            }
            Selector::MaskNd(mask) if mask.ndim() <= 1 => {
                mask_positions(mask.iter().copied(), mask.len(), len)
            }
            Selector::MaskNd(mask) => Err(DatasetError::shape_mismatch(
                "feature selector",
                "1-D selector (or a mapper to translate it)",
                mask.shape(),
            )),
        }
    }
}

fn check_bounds(indices: Vec<usize>, len: usize) -> Result<Vec<usize>> {
    if let Some(&index) = indices.iter().find(|&&i| i >= len) {
        return Err(DatasetError::IndexOutOfBounds { index, len });
    }
    Ok(indices)
}

fn mask_positions(
    mask: impl Iterator<Item = bool>,
    mask_len: usize,
    len: usize,
) -> Result<Vec<usize>> {
    if mask_len != len {
        return Err(DatasetError::shape_mismatch("boolean mask", [len], [mask_len]));
    }
    Ok(mask
        .enumerate()
        .filter_map(|(i, keep)| keep.then_some(i))
        .collect())
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Index(i)
    }
}

impl From<Vec<usize>> for Selector {
    fn from(indices: Vec<usize>) -> Self {
        Selector::Indices(indices)
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Selector::Mask(mask)
    }
}

impl From<Range<usize>> for Selector {
    fn from(r: Range<usize>) -> Self {
        Selector::Slice {
            start: r.start,
            stop: Some(r.end),
            step: 1,
        }
    }
}

impl From<RangeFrom<usize>> for Selector {
    fn from(r: RangeFrom<usize>) -> Self {
        Selector::Slice {
            start: r.start,
            stop: None,
            step: 1,
        }
    }
}

impl From<RangeTo<usize>> for Selector {
    fn from(r: RangeTo<usize>) -> Self {
        Selector::Slice {
            start: 0,
            stop: Some(r.end),
            step: 1,
        }
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}

impl<D: Dimension> From<Array<bool, D>> for Selector {
    fn from(mask: Array<bool, D>) -> Self {
        Selector::MaskNd(mask.into_dyn())
    }
}

// ---------------------------------------------------------------------------
// SampleSource – what a dataset keeps as its samples
// ---------------------------------------------------------------------------

/// Shape/select/materialize contract shared by real and placeholder samples.
pub trait SampleSource: Sized {
    /// Full shape; the first axis separates observations.
    fn shape(&self) -> Vec<usize>;

    /// Select observations (axis 0) and variables (axis 1).
    fn select(&self, rows: &Selector, cols: &Selector) -> Result<Self>;

    /// A real array of the current shape.
    fn materialize(&self) -> FeatureArray;

    fn view(&self) -> &Self {
        self
    }
}

/// Element type a placeholder pretends to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementType {
    #[default]
    Float,
    Bool,
    Value,
}

// ---------------------------------------------------------------------------
// DenseSampleSource
// ---------------------------------------------------------------------------

/// Real sample values; at least two-dimensional.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSampleSource {
    data: ArrayD<f64>,
}

impl DenseSampleSource {
    pub fn new(data: ArrayD<f64>) -> Result<Self> {
        if data.ndim() < 2 {
            return Err(DatasetError::shape_mismatch(
                "samples",
                "at least 2 dimensions",
                data.shape(),
            ));
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ArrayD<f64> {
        &mut self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }
}

impl SampleSource for DenseSampleSource {
    fn shape(&self) -> Vec<usize> {
        self.data.shape().to_vec()
    }

    fn select(&self, rows: &Selector, cols: &Selector) -> Result<Self> {
        let shape = self.data.shape();
        let row_idx = rows.resolve(shape[0])?;
        let mut data = select_axis(&self.data, 0, &row_idx)?;
        if *cols != Selector::All {
            let col_idx = cols.resolve(shape[1])?;
            data = select_axis(&data, 1, &col_idx)?;
        }
        Ok(Self { data })
    }

    fn materialize(&self) -> FeatureArray {
        FeatureArray::Float(self.data.clone())
    }
}

// ---------------------------------------------------------------------------
// PlaceholderSampleSource
// ---------------------------------------------------------------------------

/// Sample matrix that only stores observation and variable ids.
///
/// Lets a dataset be pushed through mappers to learn output shapes without
/// allocating real data. Every selection returns a new instance; `Clone`
/// serves as both shallow and deep copy since the ids are owned.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSampleSource {
    sid: Vec<usize>,
    fid: Vec<usize>,
    dtype: ElementType,
}

impl PlaceholderSampleSource {
    /// Placeholder of a given (observations, variables) shape with
    /// sequential ids.
    pub fn new(shape: &[usize], dtype: ElementType) -> Result<Self> {
        Self::from_parts(Some(shape), None, None, dtype)
    }

    /// General constructor: an explicit shape, explicit id vectors, or both.
    pub fn from_parts(
        shape: Option<&[usize]>,
        sid: Option<Vec<usize>>,
        fid: Option<Vec<usize>>,
        dtype: ElementType,
    ) -> Result<Self> {
        if let Some(shape) = shape {
            if shape.len() != 2 {
                return Err(DatasetError::config(format!(
                    "only two-dimensional shapes are supported, got {shape:?}"
                )));
            }
        }
        let (sid, fid) = match (shape, sid, fid) {
            (_, Some(sid), Some(fid)) => (sid, fid),
            (Some(shape), sid, fid) => (
                sid.unwrap_or_else(|| (0..shape[0]).collect()),
                fid.unwrap_or_else(|| (0..shape[1]).collect()),
            ),
            (None, _, _) => {
                return Err(DatasetError::config(
                    "either a shape or both id vectors have to be given",
                ))
            }
        };
        if let Some(shape) = shape {
            if sid.len() != shape[0] || fid.len() != shape[1] {
                return Err(DatasetError::config(format!(
                    "id vectors ({} x {}) do not match shape {shape:?}",
                    sid.len(),
                    fid.len()
                )));
            }
        }
        Ok(Self { sid, fid, dtype })
    }

    pub fn sid(&self) -> &[usize] {
        &self.sid
    }

    pub fn fid(&self) -> &[usize] {
        &self.fid
    }

    pub fn dtype(&self) -> ElementType {
        self.dtype
    }
}

impl SampleSource for PlaceholderSampleSource {
    fn shape(&self) -> Vec<usize> {
        vec![self.sid.len(), self.fid.len()]
    }

    fn select(&self, rows: &Selector, cols: &Selector) -> Result<Self> {
        let sid = rows
            .resolve(self.sid.len())?
            .into_iter()
            .map(|i| self.sid[i])
            .collect();
        let fid = cols
            .resolve(self.fid.len())?
            .into_iter()
            .map(|i| self.fid[i])
            .collect();
        Ok(Self {
            sid,
            fid,
            dtype: self.dtype,
        })
    }

    fn materialize(&self) -> FeatureArray {
        let shape = IxDyn(&[self.sid.len(), self.fid.len()]);
        match self.dtype {
            ElementType::Float => FeatureArray::Float(ArrayD::zeros(shape)),
            ElementType::Bool => FeatureArray::Bool(ArrayD::from_elem(shape, false)),
            ElementType::Value => FeatureArray::Values(ArrayD::from_elem(shape, AttrValue::Null)),
        }
    }
}

// ---------------------------------------------------------------------------
// Samples – either variant, as stored in a dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Dense(DenseSampleSource),
    Placeholder(PlaceholderSampleSource),
}

impl Samples {
    pub fn as_dense(&self) -> Option<&ArrayD<f64>> {
        match self {
            Samples::Dense(d) => Some(d.data()),
            Samples::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Samples::Placeholder(_))
    }
}

impl SampleSource for Samples {
    fn shape(&self) -> Vec<usize> {
        match self {
            Samples::Dense(d) => d.shape(),
            Samples::Placeholder(p) => p.shape(),
        }
    }

    fn select(&self, rows: &Selector, cols: &Selector) -> Result<Self> {
        Ok(match self {
            Samples::Dense(d) => Samples::Dense(d.select(rows, cols)?),
            Samples::Placeholder(p) => Samples::Placeholder(p.select(rows, cols)?),
        })
    }

    fn materialize(&self) -> FeatureArray {
        match self {
            Samples::Dense(d) => d.materialize(),
            Samples::Placeholder(p) => p.materialize(),
        }
    }
}

impl From<DenseSampleSource> for Samples {
    fn from(d: DenseSampleSource) -> Self {
        Samples::Dense(d)
    }
}

impl From<PlaceholderSampleSource> for Samples {
    fn from(p: PlaceholderSampleSource) -> Self {
        Samples::Placeholder(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn placeholder_materializes_zeros() {
        for (rows, cols) in [(0, 0), (1, 5), (7, 3)] {
            let p = PlaceholderSampleSource::new(&[rows, cols], ElementType::Float).unwrap();
            let FeatureArray::Float(m) = p.materialize() else {
                panic!("expected float array");
            };
            assert_eq!(m.shape(), &[rows, cols]);
            assert!(m.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn placeholder_keeps_declared_dtype() {
        let p = PlaceholderSampleSource::new(&[2, 2], ElementType::Bool).unwrap();
        assert_eq!(p.materialize(), FeatureArray::Bool(ArrayD::from_elem(IxDyn(&[2, 2]), false)));
        // repeated materialization is fine
        assert_eq!(p.materialize().shape(), &[2, 2]);
    }

    #[test]
    fn placeholder_requires_shape_or_ids() {
        let err =
            PlaceholderSampleSource::from_parts(None, Some(vec![0, 1]), None, ElementType::Float)
                .unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));

        let err = PlaceholderSampleSource::new(&[2, 3, 4], ElementType::Float).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));

        let err = PlaceholderSampleSource::from_parts(
            Some(&[2, 3]),
            Some(vec![0, 1, 2]),
            None,
            ElementType::Float,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn placeholder_from_ids_only() {
        let p = PlaceholderSampleSource::from_parts(
            None,
            Some(vec![10, 11]),
            Some(vec![5, 6, 7]),
            ElementType::Float,
        )
        .unwrap();
        assert_eq!(p.shape(), vec![2, 3]);
    }

    #[test]
    fn placeholder_selection_keeps_both_axes() {
        let p = PlaceholderSampleSource::new(&[4, 5], ElementType::Float).unwrap();
        let row = p.select(&Selector::Index(2), &Selector::All).unwrap();
        assert_eq!(row.shape(), vec![1, 5]);
        assert_eq!(row.sid(), &[2]);

        let sub = p
            .select(&Selector::from(1..3), &Selector::from(vec![true, false, true, false, true]))
            .unwrap();
        assert_eq!(sub.sid(), &[1, 2]);
        assert_eq!(sub.fid(), &[0, 2, 4]);
        // the original is untouched
        assert_eq!(p.shape(), vec![4, 5]);
        assert!(std::ptr::eq(p.view(), &p));
    }

    #[test]
    fn slice_selector_clamps_and_steps() {
        let s = Selector::Slice {
            start: 1,
            stop: Some(100),
            step: 2,
        };
        assert_eq!(s.resolve(6).unwrap(), vec![1, 3, 5]);
        let zero = Selector::Slice {
            start: 0,
            stop: None,
            step: 0,
        };
        assert!(zero.resolve(3).is_err());
    }

    #[test]
    fn dense_select_rows_and_columns() {
        let d =
            DenseSampleSource::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn()).unwrap();
        let sub = d.select(&Selector::Index(1), &Selector::from(vec![0, 2])).unwrap();
        assert_eq!(sub.data(), &array![[4.0, 6.0]].into_dyn());
    }

    #[test]
    fn multidimensional_mask_needs_translation() {
        let s = Selector::from(array![[true, false], [false, true]]);
        assert!(!s.is_flat());
        assert!(s.resolve(4).is_err());
    }
}
