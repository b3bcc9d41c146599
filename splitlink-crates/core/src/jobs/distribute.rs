use std::cmp::Reverse;

use log::trace;

use super::SplitJob;
use super::SplitJobKind;
use crate::containers::StorageKey;
use crate::forest::SplitForest;
use crate::model::EventId;
use crate::model::Instance;

/// Applies a batch of distribute jobs.
///
/// The events of the whole batch are handled longest first, and each event only takes on the
/// bounds of the first job which selected it.
pub(super) fn try_distribute(instance: &Instance, forest: &mut SplitForest, batch: &[SplitJob<'_>]) {
    let mut event_jobs: Vec<(EventId, (usize, usize, usize))> = batch
        .iter()
        .filter_map(|job| match &job.kind {
            SplitJobKind::Distribute {
                applies_to,
                duration,
                minimum,
                maximum,
            } => Some((applies_to, (*duration, *minimum, *maximum))),
            _ => None,
        })
        .flat_map(|(applies_to, bounds)| {
            applies_to
                .events(instance)
                .map(move |event| (event, bounds))
        })
        .collect();
    event_jobs.sort_by_key(|&(event, _)| {
        (
            Reverse(instance.event(event).duration),
            Reverse(event.index()),
        )
    });
    event_jobs.dedup_by_key(|&mut (event, _)| event);

    for (event, (duration, minimum, maximum)) in event_jobs {
        trace!(
            "distributing {}: {minimum}-{maximum} segments of duration {duration}",
            instance.event(event).name
        );
        let _ = forest.try_durn_amount(event, duration, minimum, maximum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Partition;
    use crate::model::Event;
    use crate::model::EventSelection;
    use crate::model::InstanceBuilder;
    use crate::model::Solution;

    fn distribute<'a>(selection: &'a EventSelection, minimum: usize) -> SplitJob<'a> {
        SplitJob {
            priority: 1,
            kind: SplitJobKind::Distribute {
                applies_to: selection,
                duration: 2,
                minimum,
                maximum: minimum,
            },
            origin: None,
        }
    }

    #[test]
    fn each_event_takes_the_first_job_selecting_it() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 4));
        let instance = builder.build();
        let solution = Solution::new(&instance);
        let mut forest = SplitForest::new(&instance, &solution);
        let selection = EventSelection {
            events: vec![event],
            event_groups: Vec::new(),
        };

        try_distribute(
            &instance,
            &mut forest,
            &[distribute(&selection, 2), distribute(&selection, 1)],
        );

        let class = forest.class(forest.class_of(event));
        assert_eq!(class.min_amount(2), 2);
        assert_eq!(class.max_amount(2), 2);
        assert_eq!(class.min_partition(), &Partition::from_parts([2, 2]));
    }
}
