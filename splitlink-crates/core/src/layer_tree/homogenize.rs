use log::debug;

use crate::forest::assignment_target;
use crate::forest::AssignmentTarget;
use crate::model::EventId;
use crate::model::Instance;
use crate::model::SegmentId;
use crate::model::Timetable;
use crate::model::TimetableError;

/// Unassigns the segments of each event which are not assigned to the same kind of target as
/// its first assigned segment: the cycle, or one particular event.
pub(crate) fn homogenize_assignments(
    instance: &Instance,
    timetable: &mut impl Timetable,
) -> Result<(), TimetableError> {
    for (event, data) in instance.events() {
        let Some(target) = assignment_target(&*timetable, event) else {
            continue;
        };
        for segment in timetable.event_segments(event) {
            let Some((assigned_to, _)) = timetable.segment_assignment(segment) else {
                continue;
            };
            if target_of(&*timetable, assigned_to) != target {
                debug!("unassigning a segment of {} from {assigned_to}", data.name);
                timetable.unfix(segment);
                timetable.unassign(segment)?;
            }
        }
    }
    Ok(())
}

fn target_of(timetable: &impl Timetable, segment: SegmentId) -> AssignmentTarget {
    match timetable.segment_event(segment) {
        Some(event) => AssignmentTarget::Event(event),
        None => AssignmentTarget::Cycle,
    }
}

/// Splits the segments of `event` which are longer than the cycle.
pub(crate) fn split_long_segments(
    timetable: &mut impl Timetable,
    event: EventId,
    time_count: usize,
) -> Result<usize, TimetableError> {
    let mut splits = 0;
    for segment in timetable.event_segments(event) {
        let mut current = segment;
        while timetable.segment_duration(current) > time_count {
            current = timetable.split_segment(current, time_count)?;
            splits += 1;
        }
    }
    Ok(splits)
}
