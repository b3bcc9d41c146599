use log::trace;

use crate::forest::SplitForest;
use crate::model::Instance;
use crate::model::ResourceGroupId;
use crate::model::ResourceId;

/// Registers each event preassigned one of the resources with the forest; resource groups are
/// handled before single resources.
pub(super) fn try_avoid_clashes(
    instance: &Instance,
    forest: &mut SplitForest,
    resources: &[ResourceId],
    resource_groups: &[ResourceGroupId],
) {
    let grouped = resource_groups
        .iter()
        .flat_map(|&group| instance.resource_group(group).resources.iter().copied());
    for resource in grouped.chain(resources.iter().copied()) {
        trace!("avoiding clashes at {}", instance.resource(resource).name);
        for event in instance.events_preassigned_to(resource) {
            let _ = forest.try_add_to_resource(event, resource);
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
    fn grouped_resources_are_registered() {
        let mut builder = InstanceBuilder::new(10);
        let room = builder.add_resource("room");
        let teacher = builder.add_resource("teacher");
        let rooms = builder.add_resource_group("rooms", vec![room]);
        let lesson = builder.add_event(
            Event::new("lesson", 2)
                .with_resource(Some(room))
                .with_resource(Some(teacher)),
        );
        let instance = builder.build();
        let solution = Solution::new(&instance);
        let mut forest = SplitForest::new(&instance, &solution);

        try_avoid_clashes(&instance, &mut forest, &[], &[rooms]);

        let class = forest.class_of(lesson);
        assert!(forest.layer_for(class, room).is_some());
        assert!(forest.layer_for(class, teacher).is_none());
    }
}
