use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{ArrayD, ArrayViewMutD};
use serde::Serialize;

use super::collection::{AttributeCollection, CollectionKind};
use super::features::FeatureArray;
use super::model::{AttrValue, Attribute};
use super::samples::{DenseSampleSource, SampleSource, Samples, Selector};
use crate::error::{DatasetError, Result};
use crate::mapper::{MapperSlot, MAPPER_ATTR};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static EMPTY_SLOT: MapperSlot = MapperSlot::Empty;

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Sample matrix plus observation (`sa`), variable (`fa`) and dataset (`a`)
/// attributes.
///
/// Every `sa` array has one entry per observation and every `fa` array one
/// entry per variable. The mapper chain that produced the current feature
/// space lives in `a` under [`MAPPER_ATTR`].
#[derive(Debug)]
pub struct Dataset {
    id: u64,
    samples: Samples,
    sa: AttributeCollection,
    fa: AttributeCollection,
    a: AttributeCollection,
}

impl Clone for Dataset {
    /// A clone is a distinct object and gets its own identity.
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            samples: self.samples.clone(),
            sa: self.sa.clone(),
            fa: self.fa.clone(),
            a: self.a.clone(),
        }
    }
}

impl Dataset {
    /// Dataset without any attributes.
    pub fn new(samples: Samples) -> Self {
        let shape = samples.shape();
        Self {
            id: next_id(),
            sa: AttributeCollection::new(CollectionKind::Samples, Some(shape[0])),
            fa: AttributeCollection::new(CollectionKind::Features, Some(shape[1])),
            a: AttributeCollection::new(CollectionKind::Dataset, None),
            samples,
        }
    }

    /// Dataset over real values; `data` needs at least two dimensions.
    pub fn from_dense(data: ArrayD<f64>) -> Result<Self> {
        Ok(Self::new(Samples::Dense(DenseSampleSource::new(data)?)))
    }

    /// Assemble a dataset from prepared collections, checking that each
    /// collection is declared for the right axis length.
    pub fn from_parts(
        samples: Samples,
        sa: AttributeCollection,
        fa: AttributeCollection,
        a: AttributeCollection,
    ) -> Result<Self> {
        let shape = samples.shape();
        for (collection, kind, expected) in [
            (&sa, CollectionKind::Samples, Some(shape[0])),
            (&fa, CollectionKind::Features, Some(shape[1])),
            (&a, CollectionKind::Dataset, None),
        ] {
            if collection.kind() != kind || collection.length() != expected {
                return Err(DatasetError::shape_mismatch(
                    format!("{kind} collection"),
                    expected,
                    collection.length(),
                ));
            }
        }
        Ok(Self {
            id: next_id(),
            samples,
            sa,
            fa,
            a,
        })
    }

    // -- shape --

    pub fn shape(&self) -> Vec<usize> {
        self.samples.shape()
    }

    pub fn nsamples(&self) -> usize {
        self.shape()[0]
    }

    pub fn nfeatures(&self) -> usize {
        self.shape()[1]
    }

    // -- samples --

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Mutable view on real sample values; shape cannot change through it.
    pub fn samples_mut(&mut self) -> Option<ArrayViewMutD<'_, f64>> {
        match &mut self.samples {
            Samples::Dense(d) => Some(d.data_mut().view_mut()),
            Samples::Placeholder(_) => None,
        }
    }

    /// First sample value.
    pub fn item(&self) -> Option<f64> {
        self.samples.as_dense().and_then(|d| d.iter().next().copied())
    }

    // -- collections --

    pub fn sa(&self) -> &AttributeCollection {
        &self.sa
    }

    pub fn fa(&self) -> &AttributeCollection {
        &self.fa
    }

    pub fn a(&self) -> &AttributeCollection {
        &self.a
    }

    pub fn sa_mut(&mut self) -> &mut AttributeCollection {
        &mut self.sa
    }

    pub fn fa_mut(&mut self) -> &mut AttributeCollection {
        &mut self.fa
    }

    pub fn a_mut(&mut self) -> &mut AttributeCollection {
        &mut self.a
    }

    pub fn collection(&self, kind: CollectionKind) -> &AttributeCollection {
        match kind {
            CollectionKind::Samples => &self.sa,
            CollectionKind::Features => &self.fa,
            CollectionKind::Dataset => &self.a,
        }
    }

    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut AttributeCollection {
        match kind {
            CollectionKind::Samples => &mut self.sa,
            CollectionKind::Features => &mut self.fa,
            CollectionKind::Dataset => &mut self.a,
        }
    }

    // -- shortcuts --

    pub fn targets(&self) -> Option<&[AttrValue]> {
        self.sa.get("targets").and_then(Attribute::as_array)
    }

    pub fn chunks(&self) -> Option<&[AttrValue]> {
        self.sa.get("chunks").and_then(Attribute::as_array)
    }

    /// Sorted distinct values of an observation attribute.
    pub fn unique(&self, name: &str) -> BTreeSet<AttrValue> {
        self.sa.get(name).map(Attribute::unique).unwrap_or_default()
    }

    pub fn unique_targets(&self) -> BTreeSet<AttrValue> {
        self.unique("targets")
    }

    pub fn unique_chunks(&self) -> BTreeSet<AttrValue> {
        self.unique("chunks")
    }

    /// The recorded mapper chain, [`MapperSlot::Empty`] if none.
    pub fn mapper_slot(&self) -> &MapperSlot {
        self.a
            .get(MAPPER_ATTR)
            .and_then(Attribute::as_mapper)
            .unwrap_or(&EMPTY_SLOT)
    }

    /// Samples projected back into the original measurement space.
    pub fn original_samples(&self) -> Result<FeatureArray> {
        self.mapper_slot().reverse(&self.samples.materialize())
    }

    // -- slicing primitive --

    /// Select observations and (optionally) variables together, carrying
    /// `sa`/`fa` along. Does not touch the mapper chain.
    pub(crate) fn slice_raw(&self, rows: &Selector, cols: Option<&Selector>) -> Result<Dataset> {
        let shape = self.shape();
        let cols = cols.unwrap_or(&Selector::All);
        let row_idx = rows.resolve(shape[0])?;
        let col_idx = cols.resolve(shape[1])?;
        let samples = self
            .samples
            .select(&Selector::Indices(row_idx.clone()), &Selector::Indices(col_idx.clone()))?;
        Ok(Dataset {
            id: next_id(),
            samples,
            sa: self.sa.select(&row_idx),
            fa: self.fa.select(&col_idx),
            a: self.a.clone(),
        })
    }

    // -- fingerprint --

    /// Identity + content digest. Stable while the dataset is unchanged;
    /// any change of samples or of an attribute value changes it.
    pub fn idhash(&self) -> String {
        let mut res = format!("self@{:x} samples@{:016x}", self.id, samples_digest(&self.samples));
        for collection in [&self.a, &self.sa, &self.fa] {
            let mut keys: Vec<&str> = collection.keys().collect();
            keys.sort_unstable();
            for key in keys {
                if let Some(attr) = collection.get(key) {
                    res.push_str(&format!(" {key}@{:016x}", attribute_digest(attr)));
                }
            }
        }
        res
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            shape: self.shape(),
            placeholder: self.samples.is_placeholder(),
            sample_attributes: self.sa.keys().map(str::to_string).collect(),
            feature_attributes: self.fa.keys().map(str::to_string).collect(),
            dataset_attributes: self.a.keys().map(str::to_string).collect(),
            mapper_chain: self.mapper_slot().describe(),
            unique_targets: self.unique_targets().into_iter().collect(),
        }
    }
}

fn samples_digest(samples: &Samples) -> u64 {
    let mut hasher = DefaultHasher::new();
    match samples {
        Samples::Dense(d) => {
            d.data().shape().hash(&mut hasher);
            for v in d.data().iter() {
                v.to_bits().hash(&mut hasher);
            }
        }
        Samples::Placeholder(p) => {
            p.sid().hash(&mut hasher);
            p.fid().hash(&mut hasher);
            p.dtype().hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn attribute_digest(attr: &Attribute) -> u64 {
    let mut hasher = DefaultHasher::new();
    match attr {
        Attribute::Array(values) => values.hash(&mut hasher),
        Attribute::Scalar(value) => value.hash(&mut hasher),
        Attribute::Mapper(slot) => format!("{slot:?}").hash(&mut hasher),
    }
    hasher.finish()
}

// ---------------------------------------------------------------------------
// DatasetSummary
// ---------------------------------------------------------------------------

/// Serializable overview of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub shape: Vec<usize>,
    pub placeholder: bool,
    pub sample_attributes: Vec<String>,
    pub feature_attributes: Vec<String>,
    pub dataset_attributes: Vec<String>,
    pub mapper_chain: Vec<String>,
    pub unique_targets: Vec<AttrValue>,
}
