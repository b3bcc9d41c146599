use log::trace;

use crate::forest::SplitForest;
use crate::model::EventGroupId;
use crate::model::Instance;

/// Merges the events of equal duration in each group; when the durations of a group differ,
/// also tries to place each event within each other event of the group.
pub(super) fn try_link(instance: &Instance, forest: &mut SplitForest, event_groups: &[EventGroupId]) {
    for &group in event_groups {
        let events = &instance.event_group(group).events;
        trace!("linking {} events of {}", events.len(), instance.event_group(group).name);
        let durations: Vec<usize> = events
            .iter()
            .map(|&event| instance.event(event).duration)
            .collect();
        let (Some(&min_duration), Some(&max_duration)) =
            (durations.iter().min(), durations.iter().max())
        else {
            continue;
        };

        for duration in min_duration..=max_duration {
            for (i, &first) in events.iter().enumerate() {
                if durations[i] != duration {
                    continue;
                }
                for (j, &second) in events.iter().enumerate().skip(i + 1) {
                    if durations[j] == duration {
                        let _ = forest.try_event_merge(first, second);
                    }
                }
            }
        }

        if min_duration != max_duration {
            for &child in events {
                for &parent in events {
                    if child != parent {
                        let _ = forest.try_event_assign(child, parent);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;
    use crate::model::InstanceBuilder;
    use crate::model::Solution;

    #[test]
    fn equal_durations_merge_and_unequal_durations_nest() {
        let mut builder = InstanceBuilder::new(10);
        let first = builder.add_event(Event::new("first", 2));
        let second = builder.add_event(Event::new("second", 2));
        let long = builder.add_event(Event::new("long", 3));
        let group = builder.add_event_group("linked", vec![first, second, long]);
        let instance = builder.build();
        let solution = Solution::new(&instance);
        let mut forest = SplitForest::new(&instance, &solution);

        try_link(&instance, &mut forest, &[group]);

        assert_eq!(forest.class_of(first), forest.class_of(second));
        let pair = forest.class(forest.class_of(first));
        assert_eq!(pair.parent(), Some(forest.class_of(long)));
        assert_eq!(forest.statistics().num_merges, 1);
        assert_eq!(forest.statistics().num_assignments, 1);
    }
}
