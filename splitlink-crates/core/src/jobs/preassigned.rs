use crate::forest::SplitForest;
use crate::model::EventId;

pub(super) fn try_preassigned(forest: &mut SplitForest, event: EventId, time: usize) {
    let _ = forest.try_preassigned_time(event, time);
}
