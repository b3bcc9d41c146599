use super::ClassId;
use crate::basic_types::Partition;
use crate::model::ResourceId;
use crate::storage_key;

storage_key!(
    /// Identifies a [`SplitLayer`] of a [`SplitForest`](super::SplitForest).
    LayerId,
    "Layer"
);

/// The children of a class which need the same resource, and so cannot overlap in time.
///
/// The layer may also stand for the owning class's own need of the resource; it then
/// contributes one part of size one per time unit of the class.
#[derive(Clone, Debug)]
pub struct SplitLayer {
    resource: ResourceId,
    pub(crate) state: LayerState,
    saved: Option<Box<LayerState>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayerState {
    pub(crate) classes: Vec<ClassId>,
    /// The sum of the minimal partitions of the classes, plus the owner's occupation.
    pub(crate) min_partition: Partition,
    /// Whether the owning class itself needs the resource.
    pub(crate) holds_own: bool,
}

impl SplitLayer {
    pub(crate) fn new(resource: ResourceId) -> Self {
        SplitLayer {
            resource,
            state: LayerState {
                classes: Vec::new(),
                min_partition: Partition::new(),
                holds_own: false,
            },
            saved: None,
        }
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn classes(&self) -> &[ClassId] {
        &self.state.classes
    }

    pub fn min_partition(&self) -> &Partition {
        &self.state.min_partition
    }

    pub fn holds_own(&self) -> bool {
        self.state.holds_own
    }

    pub fn contains(&self, class: ClassId) -> bool {
        self.state.classes.contains(&class)
    }

    /// The layer is no longer needed once nothing occupies its resource.
    pub(crate) fn is_vacant(&self) -> bool {
        self.state.classes.is_empty() && !self.state.holds_own
    }

    /// Records the owner's own occupation of the resource, a class of `duration`.
    pub(crate) fn occupy(&mut self, duration: usize) {
        if !self.state.holds_own {
            self.state.holds_own = true;
            self.state.min_partition.add_parts(1, duration);
        }
    }

    pub(crate) fn add_class(&mut self, class: ClassId, min_partition: &Partition) {
        self.state.classes.push(class);
        self.state.min_partition.extend_from(min_partition);
    }

    pub(crate) fn remove_class(&mut self, class: ClassId, min_partition: &Partition) {
        self.state.classes.retain(|&member| member != class);
        self.state.min_partition.subtract(min_partition);
    }

    /// Swaps the contribution of one member whose minimal partition changed.
    pub(crate) fn min_partition_change(&mut self, old: &Partition, new: &Partition) {
        self.state.min_partition.subtract(old);
        self.state.min_partition.extend_from(new);
    }

    /// Absorbs the members and aggregate of `other`.
    pub(crate) fn absorb(&mut self, other: &LayerState) {
        self.state.classes.extend_from_slice(&other.classes);
        self.state.min_partition.extend_from(&other.min_partition);
        self.state.holds_own |= other.holds_own;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    pub(crate) fn snapshot(&mut self) -> bool {
        if self.saved.is_some() {
            return false;
        }
        self.saved = Some(Box::new(self.state.clone()));
        true
    }

    pub(crate) fn finish(&mut self, success: bool) {
        if let Some(saved) = self.saved.take() {
            if !success {
                self.state = *saved;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn aggregate_follows_members() {
        let mut layer = SplitLayer::new(ResourceId::create_from_index(0));
        let first = ClassId::create_from_index(1);
        let second = ClassId::create_from_index(2);
        layer.add_class(first, &Partition::from_parts([2, 1]));
        layer.add_class(second, &Partition::from_parts([1]));

        assert_eq!(layer.min_partition(), &Partition::from_parts([2, 1, 1]));

        layer.min_partition_change(&Partition::from_parts([1]), &Partition::from_parts([3]));
        assert_eq!(layer.min_partition(), &Partition::from_parts([3, 2, 1]));

        layer.remove_class(first, &Partition::from_parts([2, 1]));
        assert_eq!(layer.min_partition(), &Partition::from_parts([3]));
        assert_eq!(layer.classes(), &[second]);
    }

    #[test]
    fn own_occupation_keeps_the_layer() {
        let mut layer = SplitLayer::new(ResourceId::create_from_index(0));
        let class = ClassId::create_from_index(1);
        layer.occupy(2);
        layer.occupy(2);
        layer.add_class(class, &Partition::from_parts([1]));
        layer.remove_class(class, &Partition::from_parts([1]));

        assert!(!layer.is_vacant());
        assert_eq!(layer.min_partition(), &Partition::unitary(2));
    }

    #[test]
    fn failed_trial_restores_members() {
        let mut layer = SplitLayer::new(ResourceId::create_from_index(0));
        assert!(layer.snapshot());
        layer.add_class(ClassId::create_from_index(3), &Partition::from_parts([2]));
        layer.finish(false);

        assert!(layer.is_vacant());
        assert!(layer.min_partition().is_empty());
        assert!(!layer.is_active());
    }
}
