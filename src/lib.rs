//! Annotated dataset container for multivariate pattern analysis.
//!
//! A [`Dataset`] pairs a sample matrix (observations × variables) with
//! per-observation, per-variable and dataset-wide attributes, and records the
//! chain of reversible [`Mapper`]s that led from the original measurement
//! space to the current view.
//!
//! ```
//! use rusty_mvpa::{ChannelTimeseriesOptions, Dataset};
//! use ndarray::Array3;
//!
//! let ds = Dataset::from_channeltimeseries(
//!     Array3::<f64>::zeros((10, 3, 4)),
//!     ChannelTimeseriesOptions::default()
//!         .timing(0.0, 0.5)
//!         .channel_ids(["Fz", "Cz", "Pz"])
//!         .targets("rest"),
//! )
//! .unwrap();
//! assert_eq!(ds.shape(), vec![10, 12]);
//! assert!(ds.fa().contains("timepoints"));
//! ```

pub mod data;
pub mod error;
pub mod mapper;
pub mod synth;

pub use data::collection::{AttributeCollection, CollectionKind};
pub use data::dataset::{Dataset, DatasetSummary};
pub use data::factory::{ChannelTimeseriesOptions, IntoSampleArray, WizardOptions};
pub use data::features::FeatureArray;
pub use data::filter::{filtered_indices, init_filter_state, FilterState};
pub use data::model::{AttrInput, AttrValue, Attribute};
pub use data::resolver::Resolution;
pub use data::samples::{
    DenseSampleSource, ElementType, PlaceholderSampleSource, SampleSource, Samples, Selector,
};
pub use data::slicing::SliceArgs;
pub use error::{DatasetError, Result};
pub use mapper::{
    mask_mapper, ChainMapper, FlattenMapper, Mapper, MapperSlot, StaticFeatureSelection,
    MAPPER_ATTR,
};
