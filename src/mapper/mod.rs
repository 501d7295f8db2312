//! Mapper layer: reversible transforms between array representations.
//!
//! ```text
//!   original space (obs × d1 × d2 …)
//!        │ FlattenMapper          collapse all non-observation axes
//!        ▼
//!   obs × (d1·d2·…)
//!        │ StaticFeatureSelection keep a fixed subset of columns
//!        ▼
//!   obs × k
//! ```
//!
//! A dataset records the transforms that produced it in a [`MapperSlot`]
//! stored under the reserved dataset attribute [`MAPPER_ATTR`].
use std::fmt;
use std::sync::Arc;

use crate::data::dataset::Dataset;
use crate::data::features::FeatureArray;
use crate::error::{DatasetError, Result};

pub mod chain;
pub mod flatten;
pub mod selection;

pub use chain::ChainMapper;
pub use flatten::{mask_mapper, FlattenMapper};
pub use selection::StaticFeatureSelection;

/// Dataset attribute holding the mapper chain.
pub const MAPPER_ATTR: &str = "mapper";

// ---------------------------------------------------------------------------
// Mapper trait
// ---------------------------------------------------------------------------

/// A trained, reversible transform.
///
/// Array operations work on stacked samples: the first axis separates
/// observations and is never touched. `forward1`/`reverse1` handle a single
/// sample without that axis.
pub trait Mapper: fmt::Debug + Send + Sync {
    /// Short human-readable description.
    fn describe(&self) -> String;

    /// Learn whatever the mapper needs from `dataset`.
    fn train(&mut self, _dataset: &Dataset) -> Result<()> {
        Ok(())
    }

    /// Map a whole dataset, including its variable attributes.
    fn forward(&self, dataset: &Dataset) -> Result<Dataset>;

    /// Map stacked samples.
    fn forward_samples(&self, data: &FeatureArray) -> Result<FeatureArray>;

    /// Map stacked samples back into the input space.
    fn reverse(&self, data: &FeatureArray) -> Result<FeatureArray>;

    fn forward1(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.forward_samples(&data.clone().stacked())?.unstacked()
    }

    fn reverse1(&self, data: &FeatureArray) -> Result<FeatureArray> {
        self.reverse(&data.clone().stacked())?.unstacked()
    }

    fn as_feature_selection(&self) -> Option<&StaticFeatureSelection> {
        None
    }

    /// `Some` if this mapper is itself a chain of mappers.
    fn as_chain(&self) -> Option<&ChainMapper> {
        None
    }

    /// Whether `next` can be folded into this mapper.
    fn can_merge_with(&self, _next: &dyn Mapper) -> bool {
        false
    }

    /// A single mapper equivalent to applying `self` then `next`.
    fn merged_with(&self, next: &dyn Mapper) -> Result<Arc<dyn Mapper>> {
        Err(DatasetError::IncompatibleMappers(format!(
            "{} cannot absorb {}",
            self.describe(),
            next.describe()
        )))
    }
}

// ---------------------------------------------------------------------------
// MapperSlot – what a dataset records
// ---------------------------------------------------------------------------

/// The recorded transform history of a dataset.
///
/// A lone mapper is kept bare; it is promoted to a [`ChainMapper`] only when
/// a second one is appended. A recorded chain is the chain itself and is
/// never nested inside another one.
#[derive(Debug, Clone, Default)]
pub enum MapperSlot {
    #[default]
    Empty,
    Single(Arc<dyn Mapper>),
    Chain(ChainMapper),
}

impl MapperSlot {
    /// Record `mapper` after everything already in the slot.
    pub fn push(self, mapper: Arc<dyn Mapper>) -> MapperSlot {
        let mut chain = match self {
            MapperSlot::Empty => {
                let recorded = mapper.as_chain().cloned();
                return recorded.map_or(MapperSlot::Single(mapper), MapperSlot::Chain);
            }
            MapperSlot::Single(previous) => {
                let unwrapped = previous.as_chain().cloned();
                unwrapped.unwrap_or_else(|| ChainMapper::new(vec![previous]))
            }
            MapperSlot::Chain(chain) => chain,
        };
        chain.append(mapper);
        MapperSlot::Chain(chain)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MapperSlot::Empty)
    }

    /// Number of recorded chain elements.
    pub fn len(&self) -> usize {
        match self {
            MapperSlot::Empty => 0,
            MapperSlot::Single(_) => 1,
            MapperSlot::Chain(chain) => chain.len(),
        }
    }

    pub fn first(&self) -> Option<&Arc<dyn Mapper>> {
        match self {
            MapperSlot::Empty => None,
            MapperSlot::Single(m) => Some(m),
            MapperSlot::Chain(chain) => chain.mappers().first(),
        }
    }

    pub fn last(&self) -> Option<&Arc<dyn Mapper>> {
        match self {
            MapperSlot::Empty => None,
            MapperSlot::Single(m) => Some(m),
            MapperSlot::Chain(chain) => chain.mappers().last(),
        }
    }

    /// The slot as one mapper, `None` when nothing was recorded.
    pub fn as_mapper(&self) -> Option<&dyn Mapper> {
        match self {
            MapperSlot::Empty => None,
            MapperSlot::Single(m) => Some(m.as_ref()),
            MapperSlot::Chain(chain) => Some(chain as &dyn Mapper),
        }
    }

    pub fn describe(&self) -> Vec<String> {
        match self {
            MapperSlot::Empty => Vec::new(),
            MapperSlot::Single(m) => vec![m.describe()],
            MapperSlot::Chain(chain) => chain.mappers().iter().map(|m| m.describe()).collect(),
        }
    }

    /// Forward a single original-space sample; identity when empty.
    pub fn forward1(&self, data: &FeatureArray) -> Result<FeatureArray> {
        match self.as_mapper() {
            Some(m) => m.forward1(data),
            None => Ok(data.clone()),
        }
    }

    /// Reverse stacked samples into original space; identity when empty.
    pub fn reverse(&self, data: &FeatureArray) -> Result<FeatureArray> {
        match self.as_mapper() {
            Some(m) => m.reverse(data),
            None => Ok(data.clone()),
        }
    }

    pub fn reverse1(&self, data: &FeatureArray) -> Result<FeatureArray> {
        match self.as_mapper() {
            Some(m) => m.reverse1(data),
            None => Ok(data.clone()),
        }
    }
}
