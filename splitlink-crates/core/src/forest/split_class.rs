use std::rc::Rc;

use super::LayerId;
use crate::basic_types::Partition;
use crate::model::EventId;
use crate::model::TimeGroup;
use crate::splitlink_assert_simple;
use crate::storage_key;

storage_key!(
    /// Identifies a [`SplitClass`] of a [`SplitForest`](super::SplitForest).
    ClassId,
    "Class"
);

/// An equivalence class of events which will be split identically and kept together.
///
/// A class is either the root of the forest, standing for the cycle, or holds one or more
/// events of equal duration. Its children are the classes whose events will be assigned to the
/// events of this class.
#[derive(Clone, Debug)]
pub struct SplitClass {
    duration: usize,
    pub(crate) state: ClassState,
    /// The state at the start of the current trial, if a trial is active.
    saved: Option<Box<ClassState>>,
}

/// The part of a class which may change during a trial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClassState {
    pub(crate) parent: Option<ClassId>,
    pub(crate) children: Vec<ClassId>,
    pub(crate) layers: Vec<LayerId>,
    pub(crate) events: Vec<EventId>,
    pub(crate) leader: Option<EventId>,
    pub(crate) min_total: usize,
    pub(crate) max_total: usize,
    /// Indexed by part size minus one.
    pub(crate) min_amount: Vec<usize>,
    /// Indexed by part size minus one.
    pub(crate) max_amount: Vec<usize>,
    pub(crate) upper_partitions: Vec<Partition>,
    pub(crate) min_partition: Partition,
    /// Indexed by part size minus one.
    pub(crate) domains: Vec<Rc<TimeGroup>>,
}

impl SplitClass {
    /// Creates the class of a single event of duration `duration`.
    ///
    /// Every split is allowed: between one and `duration` parts, at most `duration / k` parts of
    /// size `k`, starting anywhere in `full_domain`.
    pub(crate) fn leaf(event: EventId, duration: usize, full_domain: &Rc<TimeGroup>) -> Self {
        SplitClass {
            duration,
            state: ClassState {
                parent: None,
                children: Vec::new(),
                layers: Vec::new(),
                events: vec![event],
                leader: Some(event),
                min_total: 1,
                max_total: duration,
                min_amount: vec![0; duration],
                max_amount: (1..=duration).map(|size| duration / size).collect(),
                upper_partitions: Vec::new(),
                min_partition: Partition::unitary(duration),
                domains: vec![Rc::clone(full_domain); duration],
            },
            saved: None,
        }
    }

    /// Creates the class of the cycle, which is split exactly like `cycle_partition`.
    pub(crate) fn root(cycle_partition: Partition, full_domain: &Rc<TimeGroup>) -> Self {
        let duration = cycle_partition.size();
        let counts: Vec<usize> = (1..=duration)
            .map(|size| cycle_partition.parts_with_size(size))
            .collect();
        SplitClass {
            duration,
            state: ClassState {
                parent: None,
                children: Vec::new(),
                layers: Vec::new(),
                events: Vec::new(),
                leader: None,
                min_total: cycle_partition.parts(),
                max_total: cycle_partition.parts(),
                min_amount: counts.clone(),
                max_amount: counts,
                upper_partitions: Vec::new(),
                min_partition: cycle_partition,
                domains: vec![Rc::clone(full_domain); duration],
            },
            saved: None,
        }
    }

    pub fn duration(&self) -> usize {
        self.duration
    }

    pub fn parent(&self) -> Option<ClassId> {
        self.state.parent
    }

    pub fn children(&self) -> &[ClassId] {
        &self.state.children
    }

    pub fn layers(&self) -> &[LayerId] {
        &self.state.layers
    }

    pub fn events(&self) -> &[EventId] {
        &self.state.events
    }

    pub fn leader(&self) -> Option<EventId> {
        self.state.leader
    }

    pub fn min_total_amount(&self) -> usize {
        self.state.min_total
    }

    pub fn max_total_amount(&self) -> usize {
        self.state.max_total
    }

    /// The minimum number of parts of size `size`.
    pub fn min_amount(&self, size: usize) -> usize {
        self.state.min_amount[size - 1]
    }

    /// The maximum number of parts of size `size`.
    pub fn max_amount(&self, size: usize) -> usize {
        self.state.max_amount[size - 1]
    }

    pub fn upper_partitions(&self) -> &[Partition] {
        &self.state.upper_partitions
    }

    /// The first partition found acceptable the last time the class was checked.
    pub fn min_partition(&self) -> &Partition {
        &self.state.min_partition
    }

    /// The times at which parts of size `size` may start.
    pub fn domain(&self, size: usize) -> &Rc<TimeGroup> {
        &self.state.domains[size - 1]
    }

    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Saves the current state; returns false if a trial was already active.
    pub(crate) fn snapshot(&mut self) -> bool {
        if self.saved.is_some() {
            return false;
        }
        self.saved = Some(Box::new(self.state.clone()));
        true
    }

    /// Ends the trial, restoring the saved state unless it was successful.
    pub(crate) fn finish(&mut self, success: bool) {
        if let Some(saved) = self.saved.take() {
            if !success {
                self.state = *saved;
            }
        }
    }

    fn assert_active(&self, operation: &str) {
        splitlink_assert_simple!(
            self.is_active(),
            "{operation} requires an active trial"
        );
    }

    pub(crate) fn try_total_amount(&mut self, minimum: usize, maximum: usize) {
        self.assert_active("try_total_amount");
        self.state.min_total = self.state.min_total.max(minimum);
        self.state.max_total = self.state.max_total.min(maximum);
    }

    /// Tightens the bounds on the number of parts of size `size`; sizes above the duration are
    /// ignored.
    pub(crate) fn try_durn_amount(&mut self, size: usize, minimum: usize, maximum: usize) {
        self.assert_active("try_durn_amount");
        if size == 0 || size > self.duration {
            return;
        }
        let index = size - 1;
        self.state.min_amount[index] = self.state.min_amount[index].max(minimum);
        self.state.max_amount[index] = self.state.max_amount[index].min(maximum);
    }

    pub(crate) fn try_unsplittable(&mut self) {
        self.assert_active("try_unsplittable");
        self.try_total_amount(1, 1);
        for size in 1..self.duration {
            self.try_durn_amount(size, 0, 0);
        }
        self.try_durn_amount(self.duration, 1, 1);
    }

    pub(crate) fn try_packable_into(&mut self, partition: Partition) {
        self.assert_active("try_packable_into");
        if self.state.upper_partitions.contains(&partition) {
            return;
        }

        let largest = partition.max();
        let largest_count = partition.parts_with_size(largest);
        self.state.upper_partitions.push(partition);

        for size in largest + 1..=self.duration {
            self.try_durn_amount(size, 0, 0);
        }
        if largest >= 1 {
            self.try_durn_amount(largest, 0, largest_count);
        }
    }

    /// Intersects the domain of parts of size `size` with `time_group`.
    ///
    /// Returns true if the domain became empty.
    pub(crate) fn intersect_domain(&mut self, size: usize, time_group: &Rc<TimeGroup>) -> bool {
        self.assert_active("try_event_domain");
        let current = &self.state.domains[size - 1];
        let intersection = if time_group.is_subset(current) {
            Rc::clone(time_group)
        } else if current.is_subset(time_group) {
            Rc::clone(current)
        } else if time_group.is_disjoint(current) {
            Rc::new(TimeGroup::empty())
        } else {
            Rc::new(time_group.intersection(current))
        };
        let emptied = intersection.is_empty();
        self.state.domains[size - 1] = intersection;
        emptied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    fn leaf(duration: usize) -> SplitClass {
        let full = Rc::new(TimeGroup::full(10));
        SplitClass::leaf(EventId::create_from_index(0), duration, &full)
    }

    #[test]
    fn leaf_allows_every_split() {
        let class = leaf(4);

        assert_eq!(class.min_total_amount(), 1);
        assert_eq!(class.max_total_amount(), 4);
        assert_eq!(class.max_amount(1), 4);
        assert_eq!(class.max_amount(3), 1);
        assert_eq!(class.min_partition(), &Partition::unitary(4));
    }

    #[test]
    fn root_is_fixed_to_the_cycle_partition() {
        let full = Rc::new(TimeGroup::full(10));
        let class = SplitClass::root(Partition::from_parts([5, 5]), &full);

        assert_eq!(class.duration(), 10);
        assert_eq!(class.min_total_amount(), 2);
        assert_eq!(class.max_total_amount(), 2);
        assert_eq!(class.min_amount(5), 2);
        assert_eq!(class.max_amount(4), 0);
        assert_eq!(class.leader(), None);
    }

    #[test]
    fn unsplittable_allows_only_the_full_duration() {
        let mut class = leaf(3);
        assert!(class.snapshot());
        class.try_unsplittable();

        assert_eq!((class.min_total_amount(), class.max_total_amount()), (1, 1));
        assert_eq!(class.max_amount(1), 0);
        assert_eq!(class.max_amount(2), 0);
        assert_eq!((class.min_amount(3), class.max_amount(3)), (1, 1));
    }

    #[test]
    fn packable_into_limits_large_parts() {
        let mut class = leaf(6);
        assert!(class.snapshot());
        class.try_packable_into(Partition::from_parts([3, 3, 1]));
        class.try_packable_into(Partition::from_parts([3, 3, 1]));

        assert_eq!(class.upper_partitions().len(), 1);
        assert_eq!(class.max_amount(6), 0);
        assert_eq!(class.max_amount(4), 0);
        assert_eq!(class.max_amount(3), 2);
        assert_eq!(class.max_amount(2), 3);
    }

    #[test]
    fn durations_above_the_class_duration_are_ignored() {
        let mut class = leaf(2);
        assert!(class.snapshot());
        class.try_durn_amount(5, 1, 1);

        assert_eq!(class.min_amount(2), 0);
    }

    #[test]
    fn domain_intersection_special_cases() {
        let mut class = leaf(2);
        assert!(class.snapshot());
        let low = Rc::new(TimeGroup::new([0, 1, 2]));
        let high = Rc::new(TimeGroup::new([5, 6]));

        assert!(!class.intersect_domain(1, &low));
        assert!(Rc::ptr_eq(class.domain(1), &low));
        assert!(class.intersect_domain(1, &high));
        assert!(class.domain(1).is_empty());
    }

    #[test]
    fn failed_trial_restores_the_state() {
        let mut class = leaf(4);
        let before = class.state.clone();
        assert!(class.snapshot());
        assert!(!class.snapshot());
        class.try_total_amount(2, 2);
        class.try_packable_into(Partition::from_parts([2, 2]));
        class.finish(false);

        assert_eq!(class.state, before);
        assert!(!class.is_active());
    }

    #[test]
    #[should_panic(expected = "requires an active trial")]
    fn mutation_outside_a_trial_halts() {
        let mut class = leaf(2);
        class.try_total_amount(1, 1);
    }
}
