use std::rc::Rc;

use super::EventGroupId;
use super::EventId;
use super::ResourceGroupId;
use super::ResourceId;
use super::TimeGroup;
use crate::basic_types::combined_cost;
use crate::basic_types::Cost;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// An activity which needs a fixed total duration in the timetable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub duration: usize,
    /// The time at which the event is required to start, if any.
    pub preassigned_time: Option<usize>,
    pub resources: Vec<EventResource>,
    /// The durations of the segments the event starts out with. When empty, the event starts
    /// out as a single segment of its full duration.
    pub initial_segments: Vec<usize>,
}

impl Event {
    pub fn new(name: impl Into<String>, duration: usize) -> Event {
        Event {
            name: name.into(),
            duration,
            preassigned_time: None,
            resources: Vec::new(),
            initial_segments: Vec::new(),
        }
    }

    pub fn with_preassigned_time(mut self, time: usize) -> Event {
        self.preassigned_time = Some(time);
        self
    }

    /// Adds an event resource, optionally preassigned to `resource`.
    pub fn with_resource(mut self, resource: Option<ResourceId>) -> Event {
        self.resources.push(EventResource {
            preassigned: resource,
        });
        self
    }

    pub fn with_initial_segments(mut self, durations: Vec<usize>) -> Event {
        self.initial_segments = durations;
        self
    }

    /// The resources this event is preassigned to.
    pub fn preassigned_resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resources
            .iter()
            .filter_map(|event_resource| event_resource.preassigned)
    }
}

/// A demand of an event for one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventResource {
    pub preassigned: Option<ResourceId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventGroup {
    pub name: String,
    pub events: Vec<EventId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
    pub resources: Vec<ResourceId>,
}

/// The events a constraint applies to: single events followed by the members of event groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventSelection {
    pub events: Vec<EventId>,
    pub event_groups: Vec<EventGroupId>,
}

impl EventSelection {
    /// Expands the selection into the events it covers, single events first.
    pub fn events<'a>(&'a self, instance: &'a Instance) -> impl Iterator<Item = EventId> + 'a {
        self.events.iter().copied().chain(
            self.event_groups
                .iter()
                .flat_map(|&group| instance.event_group(group).events.iter().copied()),
        )
    }
}

/// A time group together with bounds on the number of event groups' segments starting in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitedTimeGroup {
    pub time_group: Rc<TimeGroup>,
    pub minimum: usize,
    pub maximum: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Bounds the durations and the number of segments of each event.
    SplitEvents {
        applies_to: EventSelection,
        min_duration: usize,
        max_duration: usize,
        min_amount: usize,
        max_amount: usize,
    },
    /// Bounds the number of segments of one particular duration.
    DistributeSplitEvents {
        applies_to: EventSelection,
        duration: usize,
        minimum: usize,
        maximum: usize,
    },
    /// Restricts the start times of segments, of one duration or of any duration.
    PreferTimes {
        applies_to: EventSelection,
        domain: Rc<TimeGroup>,
        duration: Option<usize>,
    },
    SpreadEvents {
        event_groups: Vec<EventGroupId>,
        time_spread: Vec<LimitedTimeGroup>,
    },
    /// Requires the events of each group to run simultaneously.
    LinkEvents { event_groups: Vec<EventGroupId> },
    AvoidClashes {
        resources: Vec<ResourceId>,
        resource_groups: Vec<ResourceGroupId>,
    },
    AvoidSplitAssignments { event_groups: Vec<EventGroupId> },
    OrderEvents { first: EventId, second: EventId },
    /// A constraint family which has no influence on how events are split.
    Other { family: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub required: bool,
    pub weight: i64,
    pub kind: ConstraintKind,
}

impl Constraint {
    /// The weight as a [`Cost`]; required constraints weigh in as hard cost.
    pub fn combined_weight(&self) -> Cost {
        if self.required {
            combined_cost(self.weight, 0)
        } else {
            combined_cost(0, self.weight)
        }
    }
}

/// A timetabling instance: the cycle of times, events, resources, groups and constraints.
#[derive(Clone, Debug)]
pub struct Instance {
    time_count: usize,
    cycle_breaks: Vec<usize>,
    events: KeyedVec<EventId, Event>,
    resources: KeyedVec<ResourceId, Resource>,
    event_groups: KeyedVec<EventGroupId, EventGroup>,
    resource_groups: KeyedVec<ResourceGroupId, ResourceGroup>,
    constraints: Vec<Constraint>,
}

impl Instance {
    pub fn time_count(&self) -> usize {
        self.time_count
    }

    pub fn full_time_group(&self) -> TimeGroup {
        TimeGroup::full(self.time_count)
    }

    /// The cycle segments as `(start, duration)` pairs, in chronological order.
    pub fn cycle_segments(&self) -> Vec<(usize, usize)> {
        let mut starts = vec![0];
        starts.extend(
            self.cycle_breaks
                .iter()
                .copied()
                .filter(|&time| time > 0 && time < self.time_count),
        );
        starts.sort_unstable();
        starts.dedup();

        if self.time_count == 0 {
            return Vec::new();
        }
        starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let end = starts.get(index + 1).copied().unwrap_or(self.time_count);
                (start, end - start)
            })
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn event(&self, event: EventId) -> &Event {
        &self.events[event]
    }

    pub fn events(&self) -> impl Iterator<Item = (EventId, &'_ Event)> {
        self.events.iter_with_keys()
    }

    pub fn event_by_name(&self, name: &str) -> Option<EventId> {
        self.events
            .iter_with_keys()
            .find(|(_, event)| event.name == name)
            .map(|(id, _)| id)
    }

    pub fn resource(&self, resource: ResourceId) -> &Resource {
        &self.resources[resource]
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &'_ Resource)> {
        self.resources.iter_with_keys()
    }

    pub fn event_group(&self, group: EventGroupId) -> &EventGroup {
        &self.event_groups[group]
    }

    pub fn event_groups(&self) -> impl Iterator<Item = (EventGroupId, &'_ EventGroup)> {
        self.event_groups.iter_with_keys()
    }

    pub fn resource_group(&self, group: ResourceGroupId) -> &ResourceGroup {
        &self.resource_groups[group]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The events holding a preassignment of `resource`, in increasing order.
    pub fn events_preassigned_to(&self, resource: ResourceId) -> Vec<EventId> {
        self.events
            .iter_with_keys()
            .filter(|(_, event)| event.preassigned_resources().any(|r| r == resource))
            .map(|(id, _)| id)
            .collect()
    }
}

/// Builds an [`Instance`] incrementally.
///
/// Identifiers returned by the builder are only meaningful for the instance it builds.
#[derive(Debug)]
pub struct InstanceBuilder {
    instance: Instance,
}

impl InstanceBuilder {
    pub fn new(time_count: usize) -> InstanceBuilder {
        InstanceBuilder {
            instance: Instance {
                time_count,
                cycle_breaks: Vec::new(),
                events: KeyedVec::default(),
                resources: KeyedVec::default(),
                event_groups: KeyedVec::default(),
                resource_groups: KeyedVec::default(),
                constraints: Vec::new(),
            },
        }
    }

    pub fn time_count(&self) -> usize {
        self.instance.time_count
    }

    /// Divides the cycle at `time`: a new cycle segment starts there.
    pub fn add_cycle_break(&mut self, time: usize) -> &mut Self {
        self.instance.cycle_breaks.push(time);
        self
    }

    pub fn add_resource(&mut self, name: impl Into<String>) -> ResourceId {
        self.instance.resources.push(Resource { name: name.into() })
    }

    pub fn add_event(&mut self, event: Event) -> EventId {
        self.instance.events.push(event)
    }

    pub fn add_event_group(
        &mut self,
        name: impl Into<String>,
        events: Vec<EventId>,
    ) -> EventGroupId {
        self.instance.event_groups.push(EventGroup {
            name: name.into(),
            events,
        })
    }

    pub fn add_resource_group(
        &mut self,
        name: impl Into<String>,
        resources: Vec<ResourceId>,
    ) -> ResourceGroupId {
        self.instance.resource_groups.push(ResourceGroup {
            name: name.into(),
            resources,
        })
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> &mut Self {
        self.instance.constraints.push(constraint);
        self
    }

    pub fn event_count(&self) -> usize {
        self.instance.events.len()
    }

    pub fn event_id(&self, index: usize) -> Option<EventId> {
        (index < self.instance.events.len()).then(|| EventId::create_from_index(index))
    }

    pub fn build(self) -> Instance {
        self.instance
    }
}
