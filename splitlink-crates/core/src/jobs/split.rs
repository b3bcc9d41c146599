use crate::forest::SplitForest;
use crate::model::EventSelection;
use crate::model::Instance;

/// Bounds the number of segments of each selected event, and forbids segment durations
/// outside `min_duration..=max_duration`.
pub(super) fn try_split(
    instance: &Instance,
    forest: &mut SplitForest,
    applies_to: &EventSelection,
    (min_duration, max_duration): (usize, usize),
    (min_amount, max_amount): (usize, usize),
) {
    for event in applies_to.events(instance) {
        let _ = forest.try_total_amount(event, min_amount, max_amount);
        for size in 1..min_duration {
            let _ = forest.try_durn_amount(event, size, 0, 0);
        }
        for size in max_duration + 1..=instance.event(event).duration {
            let _ = forest.try_durn_amount(event, size, 0, 0);
        }
    }
}
