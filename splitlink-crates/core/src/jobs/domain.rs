use std::rc::Rc;

use crate::forest::SplitForest;
use crate::model::EventSelection;
use crate::model::Instance;
use crate::model::TimeGroup;

/// Restricts the start times of the segments of `duration`, or of every duration when
/// [`None`].
pub(super) fn try_domain(
    instance: &Instance,
    forest: &mut SplitForest,
    applies_to: &EventSelection,
    domain: &Rc<TimeGroup>,
    duration: Option<usize>,
) {
    for event in applies_to.events(instance) {
        match duration {
            Some(size) => {
                let _ = forest.try_event_domain(event, domain, size);
            }
            None => {
                for size in 1..=instance.event(event).duration {
                    let _ = forest.try_event_domain(event, domain, size);
                }
            }
        }
    }
}
