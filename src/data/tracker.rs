use std::sync::Arc;

use super::dataset::Dataset;
use super::model::Attribute;
use crate::error::Result;
use crate::mapper::{Mapper, MapperSlot, MAPPER_ATTR};

// ---------------------------------------------------------------------------
// Mapper chain bookkeeping
// ---------------------------------------------------------------------------

impl Dataset {
    /// Record `mapper` as the newest transform of this dataset. This is the
    /// only place the chain attribute is written.
    pub fn append_mapper(&mut self, mapper: Arc<dyn Mapper>) {
        let slot = match self.a_mut().remove(MAPPER_ATTR) {
            Some(Attribute::Mapper(slot)) => slot,
            Some(other) => {
                log::warn!("dataset attribute '{MAPPER_ATTR}' held {other:?}, replacing it");
                MapperSlot::Empty
            }
            None => MapperSlot::Empty,
        };
        let slot = slot.push(mapper);
        log::debug!("mapper chain is now {:?}", slot.describe());
        // the dataset collection has no length constraint, this cannot fail
        let _ = self.a_mut().set(MAPPER_ATTR, Attribute::Mapper(slot));
    }

    /// Forward this dataset through an already trained `mapper` and record
    /// it on the result.
    pub fn apply_and_record(&self, mapper: Arc<dyn Mapper>) -> Result<Dataset> {
        let mut mapped = mapper.forward(self)?;
        mapped.append_mapper(mapper);
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::features::FeatureArray;
    use crate::mapper::{FlattenMapper, StaticFeatureSelection};
    use ndarray::Array3;

    #[test]
    fn first_mapper_is_stored_bare() {
        let ds = Dataset::from_dense(Array3::<f64>::zeros((2, 2, 3)).into_dyn()).unwrap();
        let mapped = ds
            .apply_and_record(Arc::new(FlattenMapper::new(Some(vec![2, 3]), None)))
            .unwrap();
        assert!(matches!(mapped.mapper_slot(), MapperSlot::Single(_)));
        assert_eq!(mapped.shape(), vec![2, 6]);
        // the source is left alone
        assert!(ds.mapper_slot().is_empty());
    }

    #[test]
    fn two_mappers_equal_sequential_application() {
        let data =
            Array3::from_shape_fn((2, 2, 3), |(i, j, k)| (i * 6 + j * 3 + k) as f64).into_dyn();
        let ds = Dataset::from_dense(data.clone()).unwrap();
        let flatten: Arc<dyn Mapper> = Arc::new(FlattenMapper::new(Some(vec![2, 3]), None));
        let select: Arc<dyn Mapper> =
            Arc::new(StaticFeatureSelection::from_indices(vec![5, 0], 6).unwrap());

        let mapped = ds
            .apply_and_record(flatten.clone())
            .and_then(|d| d.apply_and_record(select.clone()))
            .unwrap();
        assert_eq!(mapped.mapper_slot().len(), 2);

        let sequential = select
            .forward_samples(&flatten.forward_samples(&FeatureArray::Float(data.clone())).unwrap())
            .unwrap();
        let chained = mapped
            .mapper_slot()
            .as_mapper()
            .unwrap()
            .forward_samples(&FeatureArray::Float(data))
            .unwrap();
        assert_eq!(chained, sequential);
        assert_eq!(&FeatureArray::Float(mapped.samples().as_dense().unwrap().clone()), &chained);
    }
}
