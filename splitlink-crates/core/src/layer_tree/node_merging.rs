use itertools::Itertools;
use log::trace;

use crate::model::ConstraintKind;
use crate::model::EventGroupId;
use crate::model::EventId;
use crate::model::Instance;
use crate::model::ResourceId;
use crate::model::SegmentId;
use crate::model::Timetable;
use crate::model::TimetableError;

/// Merges the nodes of pairs of events which should be spread or assigned alike, when both
/// events reduce to movable segments in distinct nodes with the same preassigned resources.
///
/// Returns the number of merges.
pub(crate) fn merge_resource_nodes(
    instance: &Instance,
    timetable: &mut impl Timetable,
) -> Result<usize, TimetableError> {
    let mut merges = 0;
    for constraint in instance.constraints() {
        let event_groups: &[EventGroupId] = match &constraint.kind {
            ConstraintKind::SpreadEvents { event_groups, .. }
            | ConstraintKind::AvoidSplitAssignments { event_groups } => event_groups,
            _ => continue,
        };
        for &group in event_groups {
            let events = &instance.event_group(group).events;
            for (&first, &second) in events.iter().tuple_combinations() {
                if merge_event_nodes(instance, timetable, first, second)? {
                    merges += 1;
                }
            }
        }
    }
    Ok(merges)
}

fn merge_event_nodes(
    instance: &Instance,
    timetable: &mut impl Timetable,
    first: EventId,
    second: EventId,
) -> Result<bool, TimetableError> {
    let (Some(first_segment), Some(second_segment)) = (
        first_movable_segment(timetable, first),
        first_movable_segment(timetable, second),
    ) else {
        return Ok(false);
    };
    let (Some(first_node), Some(second_node)) = (
        timetable.segment_node(first_segment),
        timetable.segment_node(second_segment),
    ) else {
        return Ok(false);
    };
    if first_node == second_node
        || timetable.node_parent(first_node) != timetable.node_parent(second_node)
    {
        return Ok(false);
    }

    let footprint = resource_footprint(instance, timetable, first_segment);
    if footprint.is_empty() || footprint != resource_footprint(instance, timetable, second_segment)
    {
        return Ok(false);
    }
    trace!("merging {first_node} and {second_node}");
    let _ = timetable.merge_nodes(first_node, second_node)?;
    Ok(true)
}

/// Follows fixed assignments up from the first segment of `event` to the first segment which
/// may still be moved; [`None`] when the chain ends in the cycle.
fn first_movable_segment(timetable: &impl Timetable, event: EventId) -> Option<SegmentId> {
    let mut current = timetable.event_segments(event).first().copied()?;
    loop {
        let _ = timetable.segment_event(current)?;
        match timetable.segment_assignment(current) {
            Some((target, _)) if timetable.segment_is_fixed(current) => current = target,
            _ => return Some(current),
        }
    }
}

/// The sorted preassigned resources of the event of `segment` and of every segment assigned
/// to it, recursively.
fn resource_footprint(
    instance: &Instance,
    timetable: &impl Timetable,
    segment: SegmentId,
) -> Vec<ResourceId> {
    let mut resources = Vec::new();
    let mut pending = vec![segment];
    while let Some(current) = pending.pop() {
        if let Some(event) = timetable.segment_event(current) {
            resources.extend(instance.event(event).preassigned_resources());
        }
        pending.extend(timetable.segments_assigned_to(current));
    }
    resources.sort();
    resources.dedup();
    resources
}
