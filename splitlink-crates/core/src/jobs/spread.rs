use log::trace;

use crate::forest::SplitForest;
use crate::model::EventGroupId;
use crate::model::Instance;
use crate::model::LimitedTimeGroup;
use crate::model::TimeGroup;

/// The bounds on the total number of segments implied by a time spread.
///
/// The minima only add up when the time groups are pairwise disjoint, and the maxima only
/// bound the total when the time groups cover the whole cycle.
pub(crate) fn spread_bounds(time_count: usize, time_spread: &[LimitedTimeGroup]) -> (usize, usize) {
    let disjoint = time_spread.iter().enumerate().all(|(i, first)| {
        time_spread[i + 1..]
            .iter()
            .all(|second| first.time_group.is_disjoint(&second.time_group))
    });
    let covered = time_spread
        .iter()
        .fold(TimeGroup::empty(), |union, limited| {
            union.union(&limited.time_group)
        });

    let minimum = if disjoint {
        time_spread.iter().map(|limited| limited.minimum).sum()
    } else {
        0
    };
    let maximum = if covered.len() == time_count {
        time_spread
            .iter()
            .fold(0_usize, |sum, limited| sum.saturating_add(limited.maximum))
    } else {
        usize::MAX
    };
    (minimum, maximum)
}

pub(super) fn try_spread(
    instance: &Instance,
    forest: &mut SplitForest,
    event_groups: &[EventGroupId],
    time_spread: &[LimitedTimeGroup],
) {
    let (minimum, maximum) = spread_bounds(instance.time_count(), time_spread);
    if minimum == 0 && maximum == usize::MAX {
        return;
    }
    for &group in event_groups {
        let event_group = instance.event_group(group);
        trace!(
            "spreading {} over {minimum}-{maximum} segments",
            event_group.name
        );
        let _ = forest.try_spread(&event_group.events, minimum, maximum);
    }
}
