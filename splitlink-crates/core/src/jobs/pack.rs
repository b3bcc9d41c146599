use crate::basic_types::Partition;
use crate::forest::SplitForest;
use crate::model::EventId;
use crate::model::Instance;

pub(super) fn try_pack(
    instance: &Instance,
    forest: &mut SplitForest,
    event: Option<EventId>,
    partition: &Partition,
) {
    match event {
        Some(event) => {
            let _ = forest.try_packable_into(event, partition);
        }
        None => {
            for (event, _) in instance.events() {
                let _ = forest.try_packable_into(event, partition);
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
    fn pack_without_event_applies_to_all() {
        let mut builder = InstanceBuilder::new(10);
        let first = builder.add_event(Event::new("first", 2));
        let second = builder.add_event(Event::new("second", 2));
        let instance = builder.build();
        let solution = Solution::new(&instance);
        let mut forest = SplitForest::new(&instance, &solution);

        try_pack(&instance, &mut forest, None, &Partition::unitary(2));

        for event in [first, second] {
            let class = forest.class(forest.class_of(event));
            assert_eq!(class.max_amount(2), 0);
            assert_eq!(class.upper_partitions(), &[Partition::unitary(2)]);
        }
    }
}
