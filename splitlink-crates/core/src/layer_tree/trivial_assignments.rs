use log::trace;

use crate::model::NodeId;
use crate::model::Timetable;
use crate::model::TimetableError;

/// Assigns, below `node`, each child node which fits its parent exactly, and deletes it.
///
/// Returns the number of child nodes removed.
pub(crate) fn make_trivial_assignments(
    timetable: &mut impl Timetable,
    node: NodeId,
) -> Result<usize, TimetableError> {
    let mut removed = 0;
    for child in timetable.node_children(node) {
        if is_trivially_assignable(timetable, child, node) {
            let pairs = timetable
                .node_segments(child)
                .into_iter()
                .zip(timetable.node_segments(node));
            for (segment, target) in pairs {
                timetable.assign(segment, target, 0)?;
                timetable.fix(segment);
            }
            trace!("assigned {child} to {node}");
            timetable.delete_node(child)?;
            removed += 1;
        } else {
            removed += make_trivial_assignments(timetable, child)?;
        }
    }
    Ok(removed)
}

fn is_trivially_assignable(timetable: &impl Timetable, child: NodeId, parent: NodeId) -> bool {
    if !timetable.node_children(child).is_empty()
        || timetable.node_duration(child) != timetable.node_duration(parent)
    {
        return false;
    }
    let child_segments = timetable.node_segments(child);
    let parent_segments = timetable.node_segments(parent);
    child_segments.len() == parent_segments.len()
        && child_segments
            .iter()
            .zip(&parent_segments)
            .all(|(&segment, &target)| {
                timetable.segment_assignment(segment).is_none()
                    && timetable.segment_duration(segment) == timetable.segment_duration(target)
                    && timetable.assign_check(segment, target, 0)
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;
    use crate::model::InstanceBuilder;
    use crate::model::Solution;

    #[test]
    fn exact_fit_is_assigned_and_removed() {
        let mut builder = InstanceBuilder::new(10);
        let long = builder.add_event(Event::new("long", 4));
        let same = builder.add_event(Event::new("same", 4));
        let short = builder.add_event(Event::new("short", 2));
        let instance = builder.build();
        let mut solution = Solution::new(&instance);
        let parent = solution.make_node();
        let fitting = solution.make_node();
        let other = solution.make_node();
        let long_segment = solution.event_segments(long)[0];
        let same_segment = solution.event_segments(same)[0];
        solution.add_segment_to_node(long_segment, parent).unwrap();
        solution.add_segment_to_node(same_segment, fitting).unwrap();
        solution
            .add_segment_to_node(solution.event_segments(short)[0], other)
            .unwrap();
        solution.add_node_parent(fitting, parent).unwrap();
        solution.add_node_parent(other, parent).unwrap();

        let removed = make_trivial_assignments(&mut solution, parent).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(
            solution.segment_assignment(same_segment),
            Some((long_segment, 0))
        );
        assert!(solution.segment_is_fixed(same_segment));
        assert_eq!(solution.node_children(parent), vec![other]);
    }
}
