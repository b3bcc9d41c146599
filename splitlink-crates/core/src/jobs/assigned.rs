use crate::forest::SplitForest;
use crate::model::EventId;

/// Keeps `child` within `parent`, which one of its segments is already assigned to.
pub(super) fn try_assigned(forest: &mut SplitForest, child: EventId, parent: EventId) {
    let _ = forest.try_event_assign(child, parent);
}
