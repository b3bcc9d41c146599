use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use log::trace;

use super::partition_search::first_acceptable_partition;
use super::trial::TrialLog;
use super::ClassId;
use super::LayerId;
use super::SplitClass;
use super::SplitLayer;
use crate::basic_types::Partition;
use crate::containers::KeyedVec;
use crate::model::EventId;
use crate::model::Instance;
use crate::model::ResourceId;
use crate::model::SegmentId;
use crate::model::TimeGroup;
use crate::model::Timetable;
use crate::splitlink_assert_moderate;
use crate::splitlink_assert_simple;
use crate::statistics::ForestStatistics;

/// Where the segments of an event were already assigned before the forest was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AssignmentTarget {
    Cycle,
    Event(EventId),
}

/// A forest of [`SplitClass`]es deciding how events are split and linked.
///
/// The root class stands for the cycle; initially every event has its own class directly
/// below it. Each `try_*` operation tentatively adds a requirement, checks that every affected
/// class can still be split acceptably, and keeps the requirement only if so. A `false` result
/// means that the requirement was not enforced; the forest is then unchanged.
#[derive(Debug)]
pub struct SplitForest {
    classes: KeyedVec<ClassId, Option<SplitClass>>,
    layers: KeyedVec<LayerId, Option<SplitLayer>>,
    root: ClassId,
    class_by_event: KeyedVec<EventId, ClassId>,
    assignment_targets: KeyedVec<EventId, Option<AssignmentTarget>>,
    full_domain: Rc<TimeGroup>,
    trial: TrialLog,
    statistics: ForestStatistics,
}

/// The cycle segments which together cover the times of the instance.
pub(crate) fn covering_cycle_segments(
    time_count: usize,
    timetable: &impl Timetable,
) -> Vec<SegmentId> {
    let mut covered = 0;
    timetable
        .cycle_segments()
        .into_iter()
        .take_while(|&segment| {
            let take = covered < time_count;
            covered += timetable.segment_duration(segment);
            take
        })
        .collect()
}

/// The target of the first assigned segment of `event`, if any.
pub(crate) fn assignment_target(
    timetable: &impl Timetable,
    event: EventId,
) -> Option<AssignmentTarget> {
    timetable
        .event_segments(event)
        .into_iter()
        .find_map(|segment| timetable.segment_assignment(segment))
        .map(|(target, _)| match timetable.segment_event(target) {
            Some(target_event) => AssignmentTarget::Event(target_event),
            None => AssignmentTarget::Cycle,
        })
}

impl SplitForest {
    pub fn new(instance: &Instance, timetable: &impl Timetable) -> SplitForest {
        let full_domain = Rc::new(instance.full_time_group());
        let cycle_partition = Partition::from_parts(
            covering_cycle_segments(instance.time_count(), timetable)
                .into_iter()
                .map(|segment| timetable.segment_duration(segment)),
        );

        let mut classes = KeyedVec::default();
        let root = classes.push(Some(SplitClass::root(cycle_partition, &full_domain)));
        let mut class_by_event = KeyedVec::default();
        let mut assignment_targets = KeyedVec::default();
        let mut children = Vec::new();
        for (event_id, event) in instance.events() {
            let mut leaf = SplitClass::leaf(event_id, event.duration, &full_domain);
            leaf.state.parent = Some(root);
            let class = classes.push(Some(leaf));
            children.push(class);
            let _ = class_by_event.push(class);
            let _ = assignment_targets.push(assignment_target(timetable, event_id));
        }
        classes[root]
            .as_mut()
            .expect("the root was just created")
            .state
            .children = children;

        SplitForest {
            classes,
            layers: KeyedVec::default(),
            root,
            class_by_event,
            assignment_targets,
            full_domain,
            trial: TrialLog::default(),
            statistics: ForestStatistics::default(),
        }
    }

    /// The class standing for the cycle.
    pub fn root(&self) -> ClassId {
        self.root
    }

    pub fn class_of(&self, event: EventId) -> ClassId {
        self.class_by_event[event]
    }

    pub fn class(&self, class: ClassId) -> &SplitClass {
        self.classes[class]
            .as_ref()
            .expect("classes are only freed once merged away")
    }

    fn class_mut(&mut self, class: ClassId) -> &mut SplitClass {
        self.classes[class]
            .as_mut()
            .expect("classes are only freed once merged away")
    }

    pub fn layer(&self, layer: LayerId) -> &SplitLayer {
        self.layers[layer]
            .as_ref()
            .expect("layers are only freed once removed from their class")
    }

    fn layer_mut(&mut self, layer: LayerId) -> &mut SplitLayer {
        self.layers[layer]
            .as_mut()
            .expect("layers are only freed once removed from their class")
    }

    /// Iterates over the classes which have not been merged away.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &'_ SplitClass)> {
        self.classes
            .iter_with_keys()
            .filter_map(|(id, class)| class.as_ref().map(|class| (id, class)))
    }

    pub fn class_count(&self) -> usize {
        self.classes().count()
    }

    /// The layer of `class` for `resource`, if any.
    pub fn layer_for(&self, class: ClassId, resource: ResourceId) -> Option<LayerId> {
        self.class(class)
            .layers()
            .iter()
            .copied()
            .find(|&layer| self.layer(layer).resource() == resource)
    }

    /// Returns true if `ancestor` is `class` or lies above it.
    pub fn is_ancestor_or_self(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.class(id).parent();
        }
        false
    }

    pub fn statistics(&self) -> ForestStatistics {
        self.statistics
    }

    pub(crate) fn assignment_target_of(&self, event: EventId) -> Option<AssignmentTarget> {
        self.assignment_targets[event]
    }

    pub(crate) fn full_domain(&self) -> &Rc<TimeGroup> {
        &self.full_domain
    }

    fn resources_of(&self, class: ClassId) -> Vec<ResourceId> {
        self.class(class)
            .layers()
            .iter()
            .map(|&layer| self.layer(layer).resource())
            .collect()
    }

    /// Starts a trial on `class`, saving it, its layers and its ancestors.
    fn begin(&mut self, class: ClassId) {
        let mut current = Some(class);
        while let Some(id) = current {
            if !self.class_mut(id).snapshot() {
                break;
            }
            self.trial.classes.push(id);
            let layers = self.class(id).layers().to_vec();
            for layer in layers {
                if self.layer_mut(layer).snapshot() {
                    self.trial.layers.push(layer);
                }
            }
            current = self.class(id).parent();
        }
    }

    /// Ends the current trial, keeping its changes only if `success`; returns `success`.
    fn end(&mut self, success: bool) -> bool {
        let trial = std::mem::take(&mut self.trial);
        for class in trial.classes {
            if let Some(split_class) = self.classes[class].as_mut() {
                split_class.finish(success);
            }
        }
        for layer in trial.layers {
            if let Some(split_layer) = self.layers[layer].as_mut() {
                split_layer.finish(success);
            }
        }
        let dropped = if success {
            trial.removed_layers
        } else {
            trial.created_layers
        };
        for layer in dropped {
            self.layers[layer] = None;
        }

        if success {
            self.statistics.num_successful_tries += 1;
        } else {
            self.statistics.num_failed_tries += 1;
        }
        success
    }

    /// Checks that `class` and each of its ancestors can be split acceptably, caching the
    /// partition found for each of them.
    fn is_alive(&mut self, class: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            let split_class = self.class(id);
            if !split_class.events().is_empty() && split_class.leader().is_none() {
                return false;
            }

            let found = {
                let inner: Vec<&Partition> = split_class
                    .layers()
                    .iter()
                    .map(|&layer| self.layer(layer).min_partition())
                    .chain(
                        split_class
                            .children()
                            .iter()
                            .map(|&child| self.class(child).min_partition()),
                    )
                    .collect();
                first_acceptable_partition(&split_class.state, split_class.duration(), &inner)
            };
            let Some(found) = found else {
                return false;
            };

            let parent = split_class.parent();
            if &found != split_class.min_partition() {
                self.change_min_partition(id, found);
            }
            current = parent;
        }
        true
    }

    fn change_min_partition(&mut self, class: ClassId, partition: Partition) {
        splitlink_assert_simple!(self.class(class).is_active());
        let old = std::mem::replace(
            &mut self.class_mut(class).state.min_partition,
            partition.clone(),
        );
        if let Some(parent) = self.class(class).parent() {
            let layers = self.class(parent).layers().to_vec();
            for layer in layers {
                if self.layer(layer).contains(class) {
                    self.layer_mut(layer).min_partition_change(&old, &partition);
                    splitlink_assert_moderate!(
                        self.layer(layer).min_partition().covers(&partition),
                        "{layer} of {parent} lost the parts of its member {class}"
                    );
                }
            }
        }
    }

    fn create_layer(&mut self, resource: ResourceId) -> LayerId {
        let layer = self.layers.push(Some(SplitLayer::new(resource)));
        self.trial.created_layers.push(layer);
        layer
    }

    /// Records that `child` needs `resource` within `class`.
    fn add_child_to_resource(&mut self, class: ClassId, child: ClassId, resource: ResourceId) {
        let child_partition = self.class(child).min_partition().clone();
        if let Some(layer) = self.layer_for(class, resource) {
            self.layer_mut(layer).add_class(child, &child_partition);
            return;
        }

        let layer = self.create_layer(resource);
        self.layer_mut(layer).add_class(child, &child_partition);
        self.class_mut(class).state.layers.push(layer);
        if let Some(parent) = self.class(class).parent() {
            self.add_child_to_resource(parent, class, resource);
        }
    }

    fn delete_child_from_resource(
        &mut self,
        class: ClassId,
        child: ClassId,
        resource: ResourceId,
    ) {
        let layer = self
            .layer_for(class, resource)
            .expect("a class lies in its parent's layer for each of its resources");
        let child_partition = self.class(child).min_partition().clone();
        self.layer_mut(layer).remove_class(child, &child_partition);

        if self.layer(layer).is_vacant() {
            self.class_mut(class).state.layers.retain(|&l| l != layer);
            self.trial.removed_layers.push(layer);
            if let Some(parent) = self.class(class).parent() {
                self.delete_child_from_resource(parent, class, resource);
            }
        }
    }

    fn add_child_class(&mut self, class: ClassId, child: ClassId) {
        splitlink_assert_simple!(
            self.class(child).parent().is_none(),
            "{child} already has a parent"
        );
        self.class_mut(class).state.children.push(child);
        self.class_mut(child).state.parent = Some(class);
        for resource in self.resources_of(child) {
            self.add_child_to_resource(class, child, resource);
        }
    }

    fn delete_child_class(&mut self, class: ClassId, child: ClassId) {
        splitlink_assert_simple!(
            self.class(child).parent() == Some(class),
            "{child} is not a child of {class}"
        );
        self.class_mut(class)
            .state
            .children
            .retain(|&other| other != child);
        self.class_mut(child).state.parent = None;
        for resource in self.resources_of(child) {
            self.delete_child_from_resource(class, child, resource);
        }
    }

    /// Records that the events of `class` themselves need `resource`.
    fn occupy_resource(&mut self, class: ClassId, resource: ResourceId) {
        let duration = self.class(class).duration();
        if let Some(layer) = self.layer_for(class, resource) {
            self.layer_mut(layer).occupy(duration);
            return;
        }

        let layer = self.create_layer(resource);
        self.layer_mut(layer).occupy(duration);
        self.class_mut(class).state.layers.push(layer);
        if let Some(parent) = self.class(class).parent() {
            self.add_child_to_resource(parent, class, resource);
        }
    }

    /// Restricts the start times of parts of size `size`; a parent of the same duration is
    /// restricted as well.
    fn restrict_domain(&mut self, class: ClassId, time_group: &Rc<TimeGroup>, size: usize) {
        let split_class = self.class_mut(class);
        let duration = split_class.duration();
        if size == 0 || size > duration {
            return;
        }
        if split_class.intersect_domain(size, time_group) {
            split_class.try_durn_amount(size, 0, 0);
        }
        if let Some(parent) = split_class.parent() {
            if self.class(parent).duration() == duration {
                self.restrict_domain(parent, time_group, size);
            }
        }
    }

    /// Returns true if `event` has to stay a leader when `first` and `second` are merged: its
    /// segments are assigned to the cycle, or to an event outside both classes.
    fn must_lead(&self, event: Option<EventId>, first: ClassId, second: ClassId) -> bool {
        let Some(event) = event else {
            return false;
        };
        match self.assignment_target_of(event) {
            None => false,
            Some(AssignmentTarget::Cycle) => true,
            Some(AssignmentTarget::Event(target)) => {
                let target_class = self.class_of(target);
                target_class != first && target_class != second
            }
        }
    }

    fn merged_leader(&self, destination: ClassId, source: ClassId) -> Option<EventId> {
        let destination_leader = self.class(destination).leader();
        let source_leader = self.class(source).leader();
        if !self.must_lead(source_leader, destination, source) {
            destination_leader
        } else if !self.must_lead(destination_leader, destination, source) {
            source_leader
        } else {
            None
        }
    }

    /// Absorbs `source` into `destination`; both must be in the current trial, as must the
    /// children of `source`.
    fn merge_classes(&mut self, destination: ClassId, source: ClassId) {
        let absorbed = self.class(source).state.clone();
        let duration = self.class(destination).duration();
        splitlink_assert_simple!(
            self.class(source).duration() == duration,
            "only classes of equal duration can be merged"
        );

        let leader = self.merged_leader(destination, source);
        let target = self.class_mut(destination);
        target.state.leader = leader;
        target.try_total_amount(absorbed.min_total, absorbed.max_total);
        for size in 1..=duration {
            target.try_durn_amount(
                size,
                absorbed.min_amount[size - 1],
                absorbed.max_amount[size - 1],
            );
        }
        for partition in &absorbed.upper_partitions {
            target.try_packable_into(partition.clone());
        }
        for size in 1..=duration {
            self.restrict_domain(destination, &absorbed.domains[size - 1], size);
        }

        if let Some(parent) = absorbed.parent {
            self.delete_child_class(parent, source);
        }
        for &child in &absorbed.children {
            self.delete_child_class(source, child);
        }

        self.class_mut(destination)
            .state
            .events
            .extend_from_slice(&absorbed.events);
        self.class_mut(source).state.events.clear();

        // Without its children, the layers left in the source only hold its own occupation.
        let remaining = std::mem::take(&mut self.class_mut(source).state.layers);
        for layer in remaining {
            let resource = self.layer(layer).resource();
            match self.layer_for(destination, resource) {
                Some(existing) => {
                    let layer_state = self.layer(layer).state.clone();
                    self.layer_mut(existing).absorb(&layer_state);
                    self.trial.removed_layers.push(layer);
                }
                None => {
                    self.class_mut(destination).state.layers.push(layer);
                    if let Some(parent) = self.class(destination).parent() {
                        self.add_child_to_resource(parent, destination, resource);
                    }
                }
            }
        }

        for child in absorbed.children {
            self.add_child_class(destination, child);
        }
    }

    /// Applies `operation` to the class of `event` within a trial, keeping the result only if
    /// the class stays alive.
    fn try_on_class(&mut self, event: EventId, operation: impl FnOnce(&mut Self, ClassId)) -> bool {
        splitlink_assert_simple!(self.trial.is_empty());
        let class = self.class_of(event);
        self.begin(class);
        operation(self, class);
        let alive = self.is_alive(class);
        self.end(alive)
    }

    /// Tries to accept that `event` holds a preassignment of `resource`.
    pub fn try_add_to_resource(&mut self, event: EventId, resource: ResourceId) -> bool {
        let result =
            self.try_on_class(event, |forest, class| forest.occupy_resource(class, resource));
        trace!("try_add_to_resource({event}, {resource}) = {result}");
        result
    }

    /// Tries to accept that `event` is split into between `minimum` and `maximum` segments.
    pub fn try_total_amount(&mut self, event: EventId, minimum: usize, maximum: usize) -> bool {
        let result = self.try_on_class(event, |forest, class| {
            forest.class_mut(class).try_total_amount(minimum, maximum)
        });
        trace!("try_total_amount({event}, {minimum}-{maximum}) = {result}");
        result
    }

    /// Tries to accept that `event` has between `minimum` and `maximum` segments of size
    /// `size`.
    pub fn try_durn_amount(
        &mut self,
        event: EventId,
        size: usize,
        minimum: usize,
        maximum: usize,
    ) -> bool {
        let result = self.try_on_class(event, |forest, class| {
            forest.class_mut(class).try_durn_amount(size, minimum, maximum)
        });
        trace!("try_durn_amount({event}, {size}, {minimum}-{maximum}) = {result}");
        result
    }

    /// Tries to accept that the segments of `event` can be packed into `partition`.
    pub fn try_packable_into(&mut self, event: EventId, partition: &Partition) -> bool {
        let result = self.try_on_class(event, |forest, class| {
            forest.class_mut(class).try_packable_into(partition.clone())
        });
        trace!("try_packable_into({event}, {partition}) = {result}");
        result
    }

    /// Tries to accept that segments of `event` of size `size` start at a time of `time_group`.
    pub fn try_event_domain(
        &mut self,
        event: EventId,
        time_group: &Rc<TimeGroup>,
        size: usize,
    ) -> bool {
        let result = self.try_on_class(event, |forest, class| {
            forest.restrict_domain(class, time_group, size)
        });
        trace!("try_event_domain({event}, {time_group}, {size}) = {result}");
        result
    }

    /// Tries to accept that `event` is not split and starts at `time`.
    pub fn try_preassigned_time(&mut self, event: EventId, time: usize) -> bool {
        let singleton = Rc::new(TimeGroup::singleton(time));
        let result = self.try_on_class(event, |forest, class| {
            for size in 1..=forest.class(class).duration() {
                forest.restrict_domain(class, &singleton, size);
            }
            forest.class_mut(class).try_unsplittable();
        });
        trace!("try_preassigned_time({event}, {time}) = {result}");
        result
    }

    /// Tries to accept that `first` and `second`, of equal duration, run simultaneously.
    ///
    /// This is only possible when the parent of one class lies above (or is) the other class.
    pub fn try_event_merge(&mut self, first: EventId, second: EventId) -> bool {
        let first_class = self.class_of(first);
        let second_class = self.class_of(second);
        splitlink_assert_simple!(
            self.class(first_class).duration() == self.class(second_class).duration(),
            "cannot merge {first} and {second} of different durations"
        );
        if first_class == second_class {
            trace!("try_event_merge({first}, {second}) = true (same class)");
            return true;
        }

        let first_parent = self
            .class(first_class)
            .parent()
            .expect("event classes lie below the root");
        let second_parent = self
            .class(second_class)
            .parent()
            .expect("event classes lie below the root");
        let (destination, source) = if self.is_ancestor_or_self(first_class, second_parent)
            && !self.is_ancestor_or_self(first_class, second_class)
        {
            (first_class, second_class)
        } else if self.is_ancestor_or_self(second_class, first_parent)
            && !self.is_ancestor_or_self(second_class, first_class)
        {
            (second_class, first_class)
        } else {
            trace!("try_event_merge({first}, {second}) = false (unrelated classes)");
            return false;
        };

        splitlink_assert_simple!(self.trial.is_empty());
        self.begin(destination);
        self.begin(source);
        for child in self.class(source).children().to_vec() {
            self.begin(child);
        }
        self.merge_classes(destination, source);
        let alive = self.is_alive(destination);
        let result = self.end(alive);

        if result {
            self.classes[source] = None;
            for event in self.class(destination).events().to_vec() {
                self.class_by_event[event] = destination;
            }
            self.statistics.num_merges += 1;
        }
        trace!("try_event_merge({first}, {second}) = {result}");
        result
    }

    /// Tries to accept that `child` runs within the time of `parent`.
    ///
    /// Only a class still lying directly below the root can be moved.
    pub fn try_event_assign(&mut self, child: EventId, parent: EventId) -> bool {
        let child_class = self.class_of(child);
        let parent_class = self.class_of(parent);
        if self.class(child_class).duration() > self.class(parent_class).duration() {
            return false;
        }
        if child_class == parent_class {
            trace!("try_event_assign({child}, {parent}) = true (same class)");
            return true;
        }

        let current_parent = self
            .class(child_class)
            .parent()
            .expect("event classes lie below the root");
        if self.class(current_parent).leader().is_some()
            || self.is_ancestor_or_self(parent_class, child_class)
        {
            trace!("try_event_assign({child}, {parent}) = false (already placed)");
            return false;
        }

        splitlink_assert_simple!(self.trial.is_empty());
        self.begin(child_class);
        self.begin(parent_class);
        self.delete_child_class(current_parent, child_class);
        self.add_child_class(parent_class, child_class);
        let alive = self.is_alive(child_class) && self.is_alive(parent_class);
        let result = self.end(alive);

        if result {
            self.statistics.num_assignments += 1;
        }
        trace!("try_event_assign({child}, {parent}) = {result}");
        result
    }

    /// Tries to accept that the events together have between `minimum` and `maximum`
    /// segments, moving the total segment bounds of one event at a time by one.
    ///
    /// Partial progress is kept; returns true if the whole range was reached.
    pub fn try_spread(&mut self, events: &[EventId], minimum: usize, maximum: usize) -> bool {
        let (mut current_min, mut current_max) =
            events.iter().fold((0, 0), |(low, high), &event| {
                let class = self.class(self.class_of(event));
                (
                    low + class.min_total_amount(),
                    high + class.max_total_amount(),
                )
            });

        let mut progressing = true;
        while progressing && current_min < minimum {
            progressing = false;
            for &event in events {
                if current_min >= minimum {
                    break;
                }
                let class = self.class(self.class_of(event));
                let (low, high) = (class.min_total_amount(), class.max_total_amount());
                if low < high && self.try_total_amount(event, low + 1, high) {
                    current_min += 1;
                    progressing = true;
                }
            }
        }

        let mut progressing = true;
        while progressing && current_max > maximum {
            progressing = false;
            for &event in events {
                if current_max <= maximum {
                    break;
                }
                let class = self.class(self.class_of(event));
                let (low, high) = (class.min_total_amount(), class.max_total_amount());
                if low < high && self.try_total_amount(event, low, high - 1) {
                    current_max -= 1;
                    progressing = true;
                }
            }
        }

        let result = current_min >= minimum && current_max <= maximum;
        trace!("try_spread({} events, {minimum}-{maximum}) = {result}", events.len());
        result
    }

    fn fmt_class(&self, f: &mut Formatter<'_>, class: ClassId, depth: usize) -> std::fmt::Result {
        let split_class = self.class(class);
        write!(f, "{:indent$}[{class}", "", indent = 2 * depth)?;
        for event in split_class.events() {
            let marker = if Some(*event) == split_class.leader() {
                "*"
            } else {
                ""
            };
            write!(f, " {marker}{event}")?;
        }
        writeln!(
            f,
            "] durn {} amount {}-{} min {}",
            split_class.duration(),
            split_class.min_total_amount(),
            split_class.max_total_amount(),
            split_class.min_partition().brief()
        )?;
        for &layer in split_class.layers() {
            let split_layer = self.layer(layer);
            writeln!(
                f,
                "{:indent$}{layer} {}{}: {}",
                "",
                split_layer.resource(),
                if split_layer.holds_own() { " (own)" } else { "" },
                split_layer.min_partition().brief(),
                indent = 2 * depth + 2
            )?;
        }
        for &child in split_class.children() {
            self.fmt_class(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Display for SplitForest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_class(f, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;
    use crate::model::InstanceBuilder;
    use crate::model::Solution;

    fn forest_for(builder: InstanceBuilder) -> (Instance, SplitForest) {
        let instance = builder.build();
        let solution = Solution::new(&instance);
        let forest = SplitForest::new(&instance, &solution);
        (instance, forest)
    }

    fn sorted_events(forest: &SplitForest, event: EventId) -> Vec<EventId> {
        let mut events = forest.class(forest.class_of(event)).events().to_vec();
        events.sort();
        events
    }

    #[test]
    fn every_event_starts_in_its_own_class_below_the_root() {
        let mut builder = InstanceBuilder::new(10);
        let _ = builder.add_cycle_break(5);
        let first = builder.add_event(Event::new("first", 4));
        let second = builder.add_event(Event::new("second", 2));
        let (_, forest) = forest_for(builder);

        assert_eq!(forest.class_count(), 3);
        let root = forest.class(forest.root());
        assert_eq!(root.min_partition(), &Partition::from_parts([5, 5]));
        assert_eq!(root.children().len(), 2);
        for event in [first, second] {
            let class = forest.class(forest.class_of(event));
            assert_eq!(class.parent(), Some(forest.root()));
            assert_eq!(class.leader(), Some(event));
        }
    }

    #[test]
    fn failed_try_leaves_the_forest_unchanged() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 4));
        let (_, mut forest) = forest_for(builder);
        let before = forest.to_string();

        assert!(!forest.try_total_amount(event, 5, 6));

        assert_eq!(forest.to_string(), before);
        assert_eq!(forest.class(forest.class_of(event)).min_total_amount(), 1);
        assert!(!forest.class(forest.class_of(event)).is_active());
        assert_eq!(forest.statistics().num_failed_tries, 1);
    }

    #[test]
    fn total_amount_updates_the_minimal_partition() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 4));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_total_amount(event, 1, 1));

        let class = forest.class(forest.class_of(event));
        assert_eq!(class.min_partition(), &Partition::from_parts([4]));
        assert_eq!(forest.statistics().num_successful_tries, 1);
    }

    #[test]
    fn resource_overload_is_refused_and_rolled_back() {
        let mut builder = InstanceBuilder::new(6);
        let room = builder.add_resource("room");
        let first = builder.add_event(Event::new("first", 4).with_resource(Some(room)));
        let second = builder.add_event(Event::new("second", 4).with_resource(Some(room)));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_add_to_resource(first, room));
        assert!(forest.try_add_to_resource(first, room));
        let layer = forest
            .layer_for(forest.root(), room)
            .expect("the root needs the room");
        assert_eq!(forest.layer(layer).min_partition(), &Partition::unitary(4));

        assert!(!forest.try_add_to_resource(second, room));

        assert_eq!(forest.class(forest.root()).layers(), &[layer]);
        assert_eq!(forest.layer(layer).classes(), &[forest.class_of(first)]);
        assert_eq!(forest.layer(layer).min_partition(), &Partition::unitary(4));
        assert!(forest.class(forest.class_of(second)).layers().is_empty());
    }

    #[test]
    fn layer_aggregate_follows_a_member_partition() {
        let mut builder = InstanceBuilder::new(10);
        let room = builder.add_resource("room");
        let event = builder.add_event(Event::new("event", 4).with_resource(Some(room)));
        let (_, mut forest) = forest_for(builder);
        assert!(forest.try_add_to_resource(event, room));

        assert!(forest.try_total_amount(event, 1, 1));

        let layer = forest
            .layer_for(forest.root(), room)
            .expect("the root needs the room");
        assert_eq!(forest.layer(layer).min_partition(), &Partition::from_parts([4]));
        let own_layer = forest
            .layer_for(forest.class_of(event), room)
            .expect("the event needs the room itself");
        assert_eq!(forest.layer(own_layer).min_partition(), &Partition::unitary(4));
    }

    #[test]
    #[should_panic(expected = "holds events but has no leader")]
    fn finalizing_a_leaderless_class_halts() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 2));
        let (instance, mut forest) = forest_for(builder);
        let class = forest.class_of(event);
        forest.class_mut(class).state.leader = None;
        let mut solution = Solution::new(&instance);

        let _ = forest.finalize(&instance, &mut solution, &mut Default::default());
    }

    #[test]
    fn merging_is_symmetric() {
        let build = || {
            let mut builder = InstanceBuilder::new(10);
            let first = builder.add_event(Event::new("first", 2));
            let second = builder.add_event(Event::new("second", 2));
            let (_, forest) = forest_for(builder);
            (forest, first, second)
        };
        let (mut forward, first, second) = build();
        let (mut backward, _, _) = build();

        assert!(forward.try_total_amount(first, 2, 2));
        assert!(backward.try_total_amount(first, 2, 2));
        assert!(forward.try_event_merge(first, second));
        assert!(backward.try_event_merge(second, first));

        for forest in [&forward, &backward] {
            assert_eq!(forest.class_of(first), forest.class_of(second));
            assert_eq!(forest.class_count(), 2);
            assert_eq!(sorted_events(forest, first), vec![first, second]);
            let class = forest.class(forest.class_of(first));
            assert_eq!(class.min_total_amount(), 2);
            assert_eq!(class.min_partition(), &Partition::unitary(2));
            assert_eq!(forest.statistics().num_merges, 1);
        }
        assert!(forward.try_event_merge(first, second));
    }

    #[test]
    fn merging_two_cycle_assigned_events_needs_two_leaders() {
        let mut builder = InstanceBuilder::new(10);
        let first = builder.add_event(Event::new("first", 2));
        let second = builder.add_event(Event::new("second", 2));
        let instance = builder.build();
        let mut solution = Solution::new(&instance);
        let cycle = solution.cycle_segments()[0];
        for (event, offset) in [(first, 0), (second, 4)] {
            let segment = solution.event_segments(event)[0];
            solution.assign(segment, cycle, offset).unwrap();
        }
        let mut forest = SplitForest::new(&instance, &solution);

        assert!(!forest.try_event_merge(first, second));
        assert_ne!(forest.class_of(first), forest.class_of(second));
    }

    #[test]
    fn assignment_moves_a_class_below_another() {
        let mut builder = InstanceBuilder::new(10);
        let long = builder.add_event(Event::new("long", 4));
        let short = builder.add_event(Event::new("short", 2));
        let (_, mut forest) = forest_for(builder);

        assert!(!forest.try_event_assign(long, short));
        assert!(forest.try_event_assign(short, long));

        let short_class = forest.class(forest.class_of(short));
        assert_eq!(short_class.parent(), Some(forest.class_of(long)));
        assert_eq!(forest.class(forest.root()).children(), &[forest.class_of(long)]);
        assert!(!forest.try_event_assign(short, long));
        assert_eq!(forest.statistics().num_assignments, 1);
    }

    #[test]
    fn assigned_child_resources_reach_the_ancestors() {
        let mut builder = InstanceBuilder::new(10);
        let room = builder.add_resource("room");
        let long = builder.add_event(Event::new("long", 4));
        let short = builder.add_event(Event::new("short", 2).with_resource(Some(room)));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_add_to_resource(short, room));
        assert!(forest.try_event_assign(short, long));

        let long_layer = forest
            .layer_for(forest.class_of(long), room)
            .expect("the parent needs the room through its child");
        assert!(!forest.layer(long_layer).holds_own());
        let root_layer = forest
            .layer_for(forest.root(), room)
            .expect("the root needs the room through the parent");
        assert_eq!(forest.layer(root_layer).classes(), &[forest.class_of(long)]);
    }

    #[test]
    fn empty_domain_forbids_the_size() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 2));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_event_domain(event, &Rc::new(TimeGroup::empty()), 2));
        let class = forest.class(forest.class_of(event));
        assert_eq!(class.max_amount(2), 0);
        assert!(class.domain(2).is_empty());

        assert!(!forest.try_total_amount(event, 1, 1));
    }

    #[test]
    fn preassigned_time_pins_an_unsplit_event() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 4));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_preassigned_time(event, 3));

        let class = forest.class(forest.class_of(event));
        assert_eq!(class.min_partition(), &Partition::from_parts([4]));
        assert_eq!(**class.domain(4), TimeGroup::singleton(3));
        assert_eq!(**class.domain(1), TimeGroup::singleton(3));
    }

    #[test]
    fn spread_raises_minimum_amounts_round_robin() {
        let mut builder = InstanceBuilder::new(10);
        let first = builder.add_event(Event::new("first", 3));
        let second = builder.add_event(Event::new("second", 3));
        let (_, mut forest) = forest_for(builder);

        assert!(forest.try_spread(&[first, second], 4, 6));

        for event in [first, second] {
            assert_eq!(forest.class(forest.class_of(event)).min_total_amount(), 2);
        }
        assert!(!forest.try_spread(&[first, second], 7, 8));
    }
}
