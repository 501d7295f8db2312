use ndarray::{Array, ArrayD, Axis, Dimension, IxDyn};

use super::model::AttrValue;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// FeatureArray – element-typed array handed through mappers
// ---------------------------------------------------------------------------

/// An n-dimensional array in one of the element types mappers have to carry:
/// sample values, boolean selectors and attribute values.
///
/// Mappers only move elements around, so every operation here is generic
/// over the element type and dispatched per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureArray {
    Float(ArrayD<f64>),
    Bool(ArrayD<bool>),
    Values(ArrayD<AttrValue>),
}

macro_rules! each_variant {
    ($self:expr, $arr:ident => $body:expr) => {
        match $self {
            FeatureArray::Float($arr) => FeatureArray::Float($body),
            FeatureArray::Bool($arr) => FeatureArray::Bool($body),
            FeatureArray::Values($arr) => FeatureArray::Values($body),
        }
    };
}

impl FeatureArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            FeatureArray::Float(a) => a.shape(),
            FeatureArray::Bool(a) => a.shape(),
            FeatureArray::Values(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Keep the entries at `indices` along `axis`.
    pub fn select(&self, axis: usize, indices: &[usize]) -> Result<Self> {
        Ok(each_variant!(self, a => select_axis(a, axis, indices)?))
    }

    /// Reshape in row-major order.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        Ok(each_variant!(self, a => reshape(a, shape)?))
    }

    /// Inverse of [`select`](Self::select): place the entries along `axis`
    /// at `indices` of a new axis of length `len`, everything else zero.
    pub fn scatter(&self, axis: usize, indices: &[usize], len: usize) -> Result<Self> {
        Ok(each_variant!(self, a => scatter_axis(a, axis, indices, len)?))
    }

    /// Add a leading axis of length one.
    pub fn stacked(self) -> Self {
        each_variant!(self, a => a.insert_axis(Axis(0)))
    }

    /// Drop a leading axis of length one.
    pub fn unstacked(self) -> Result<Self> {
        if self.shape().first() != Some(&1) {
            return Err(DatasetError::shape_mismatch(
                "stacked single sample",
                "[1, ..]",
                self.shape(),
            ));
        }
        Ok(each_variant!(self, a => a.index_axis_move(Axis(0), 0)))
    }

    /// Flat attribute values of a one-dimensional array.
    pub fn into_attr_values(self) -> Result<Vec<AttrValue>> {
        if self.ndim() != 1 {
            return Err(DatasetError::shape_mismatch(
                "attribute vector",
                "1-D",
                self.shape(),
            ));
        }
        Ok(match self {
            FeatureArray::Float(a) => a.into_iter().map(AttrValue::Float).collect(),
            FeatureArray::Bool(a) => a.into_iter().map(AttrValue::Bool).collect(),
            FeatureArray::Values(a) => a.into_iter().collect(),
        })
    }

    pub fn as_float(&self) -> Option<&ArrayD<f64>> {
        match self {
            FeatureArray::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_float(self) -> Result<ArrayD<f64>> {
        match self {
            FeatureArray::Float(a) => Ok(a),
            other => Err(DatasetError::mapper(format!(
                "expected numeric array, got {}",
                other.kind()
            ))),
        }
    }

    pub fn into_bool(self) -> Result<ArrayD<bool>> {
        match self {
            FeatureArray::Bool(a) => Ok(a),
            other => Err(DatasetError::mapper(format!(
                "expected boolean array, got {}",
                other.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FeatureArray::Float(_) => "float",
            FeatureArray::Bool(_) => "bool",
            FeatureArray::Values(_) => "attribute values",
        }
    }
}

impl<D: Dimension> From<Array<f64, D>> for FeatureArray {
    fn from(a: Array<f64, D>) -> Self {
        FeatureArray::Float(a.into_dyn())
    }
}

impl<D: Dimension> From<Array<bool, D>> for FeatureArray {
    fn from(a: Array<bool, D>) -> Self {
        FeatureArray::Bool(a.into_dyn())
    }
}

impl<D: Dimension> From<Array<AttrValue, D>> for FeatureArray {
    fn from(a: Array<AttrValue, D>) -> Self {
        FeatureArray::Values(a.into_dyn())
    }
}

// -- generic element helpers --

fn check_axis(ndim: usize, axis: usize) -> Result<()> {
    if axis >= ndim {
        return Err(DatasetError::shape_mismatch(
            "axis",
            format!("< {ndim}"),
            axis,
        ));
    }
    Ok(())
}

pub(crate) fn select_axis<A: Clone>(
    a: &ArrayD<A>,
    axis: usize,
    indices: &[usize],
) -> Result<ArrayD<A>> {
    check_axis(a.ndim(), axis)?;
    let len = a.len_of(Axis(axis));
    if let Some(&index) = indices.iter().find(|&&i| i >= len) {
        return Err(DatasetError::IndexOutOfBounds { index, len });
    }
    Ok(a.select(Axis(axis), indices))
}

fn reshape<A: Clone>(a: &ArrayD<A>, shape: &[usize]) -> Result<ArrayD<A>> {
    a.to_shape(IxDyn(shape))
        .map(|view| view.into_owned())
        .map_err(|_| DatasetError::shape_mismatch("reshape", shape, a.shape()))
}

fn scatter_axis<A: Clone + Default>(
    a: &ArrayD<A>,
    axis: usize,
    indices: &[usize],
    len: usize,
) -> Result<ArrayD<A>> {
    check_axis(a.ndim(), axis)?;
    if a.len_of(Axis(axis)) != indices.len() {
        return Err(DatasetError::count_mismatch(
            "scattered entries",
            indices.len(),
            a.len_of(Axis(axis)),
        ));
    }
    let mut shape = a.shape().to_vec();
    shape[axis] = len;
    let mut out = ArrayD::from_elem(IxDyn(&shape), A::default());
    for (src, &dst) in indices.iter().enumerate() {
        if dst >= len {
            return Err(DatasetError::IndexOutOfBounds { index: dst, len });
        }
        out.index_axis_mut(Axis(axis), dst)
            .assign(&a.index_axis(Axis(axis), src));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn select_then_scatter_restores_positions() {
        let a = FeatureArray::from(array![[1.0, 2.0, 3.0, 4.0]]);
        let picked = a.select(1, &[3, 1]).unwrap();
        assert_eq!(picked, FeatureArray::from(array![[4.0, 2.0]]));

        let back = picked.scatter(1, &[3, 1], 4).unwrap();
        assert_eq!(back, FeatureArray::from(array![[0.0, 2.0, 0.0, 4.0]]));
    }

    #[test]
    fn select_rejects_out_of_range() {
        let a = FeatureArray::from(array![true, false]);
        assert!(matches!(
            a.select(0, &[2]),
            Err(DatasetError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn stacking_round_trip_keeps_shape() {
        let a = FeatureArray::from(array![[1.0, 2.0], [3.0, 4.0]]);
        let stacked = a.clone().stacked();
        assert_eq!(stacked.shape(), &[1, 2, 2]);
        assert_eq!(stacked.unstacked().unwrap(), a);
    }

    #[test]
    fn reshape_is_row_major() {
        let a = FeatureArray::from(array![[1.0, 2.0], [3.0, 4.0]]);
        let flat = a.reshape(&[4]).unwrap();
        assert_eq!(flat, FeatureArray::from(array![1.0, 2.0, 3.0, 4.0]));
    }
}
