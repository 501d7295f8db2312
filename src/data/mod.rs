//! Data layer: the annotated dataset container.
//!
//! Architecture:
//! ```text
//!   raw N-d array (+ targets / chunks / mask / mapper)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ factory   │  from_wizard / from_channeltimeseries
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐   sa / fa / a collections,  resolver: get_attr / set_attr
//!   │  Dataset   │──────────────────────────────────────────────────────────
//!   └───────────┘   mapper chain in a["mapper"], tracker: append_mapper
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ slicing   │  select rows/features → record StaticFeatureSelection
//!   └──────────┘
//! ```

pub mod collection;
pub mod dataset;
pub mod factory;
pub mod features;
pub mod filter;
pub mod model;
pub mod resolver;
pub mod samples;
pub mod slicing;
pub mod tracker;
