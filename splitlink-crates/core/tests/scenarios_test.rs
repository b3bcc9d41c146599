#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use enumset::EnumSet;
use splitlink_core::basic_types::Partition;
use splitlink_core::jobs::apply_jobs;
use splitlink_core::jobs::constraint_jobs;
use splitlink_core::jobs::sort_jobs;
use splitlink_core::jobs::SplitJob;
use splitlink_core::model::Constraint;
use splitlink_core::model::ConstraintKind;
use splitlink_core::model::Event;
use splitlink_core::model::EventSelection;
use splitlink_core::model::Instance;
use splitlink_core::model::InstanceBuilder;
use splitlink_core::model::Solution;
use splitlink_core::model::TimeGroup;
use splitlink_core::model::Timetable;
use splitlink_core::SplitForest;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn required(name: &str, kind: ConstraintKind) -> Constraint {
    Constraint {
        name: name.to_owned(),
        required: true,
        weight: 1,
        kind,
    }
}

/// Builds a forest for `instance` and applies the jobs of its constraints together with
/// `extra_jobs`.
fn apply_constraints<'a>(instance: &'a Instance, extra_jobs: Vec<SplitJob<'a>>) -> SplitForest {
    let solution = Solution::new(instance);
    let mut forest = SplitForest::new(instance, &solution);
    let mut jobs = constraint_jobs(instance);
    jobs.extend(extra_jobs);
    sort_jobs(&mut jobs);
    let _ = apply_jobs(&jobs, instance, &mut forest, EnumSet::empty());
    forest
}

#[test]
fn distribution_gives_two_double_segments() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let event = builder.add_event(Event::new("event", 4));
    let _ = builder.add_constraint(required(
        "doubles",
        ConstraintKind::DistributeSplitEvents {
            applies_to: EventSelection {
                events: vec![event],
                event_groups: Vec::new(),
            },
            duration: 2,
            minimum: 2,
            maximum: 2,
        },
    ));
    let instance = builder.build();

    let forest = apply_constraints(&instance, Vec::new());
    let class = forest.class(forest.class_of(event));
    assert_eq!(class.min_partition(), &Partition::from_parts([2, 2]));

    let mut solution = Solution::new(&instance);
    let root = splitlink_core::build_layer_tree(&instance, &mut solution, Default::default())
        .expect("no nodes exist yet");
    let children = solution.node_children(root);
    assert_eq!(children.len(), 1);
    assert_eq!(solution.node_segments(children[0]).len(), 2);
    assert!(solution.node_children(children[0]).is_empty());
}

#[test]
fn linked_events_of_equal_duration_merge() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let first = builder.add_event(Event::new("first", 2));
    let second = builder.add_event(Event::new("second", 2));
    let group = builder.add_event_group("linked", vec![first, second]);
    let _ = builder.add_constraint(required(
        "link",
        ConstraintKind::LinkEvents {
            event_groups: vec![group],
        },
    ));
    let instance = builder.build();

    let forest = apply_constraints(&instance, Vec::new());

    let class_id = forest.class_of(first);
    assert_eq!(class_id, forest.class_of(second));
    let class = forest.class(class_id);
    assert_eq!(class.duration(), 2);
    assert_eq!(class.events().len(), 2);
    assert_eq!(forest.statistics().num_merges, 1);
    assert_eq!(forest.statistics().num_assignments, 0);
}

#[test]
fn linked_events_of_different_durations_nest() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let short = builder.add_event(Event::new("short", 2));
    let long = builder.add_event(Event::new("long", 3));
    let group = builder.add_event_group("linked", vec![short, long]);
    let _ = builder.add_constraint(required(
        "link",
        ConstraintKind::LinkEvents {
            event_groups: vec![group],
        },
    ));
    let instance = builder.build();

    let forest = apply_constraints(&instance, Vec::new());

    assert_ne!(forest.class_of(short), forest.class_of(long));
    assert_eq!(
        forest.class(forest.class_of(short)).parent(),
        Some(forest.class_of(long))
    );
    assert_eq!(forest.statistics().num_merges, 0);
    assert_eq!(forest.statistics().num_assignments, 1);
}

#[test]
fn shared_resource_gives_one_layer_per_class() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let room = builder.add_resource("room");
    let events: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| builder.add_event(Event::new(name, 1).with_resource(Some(room))))
        .collect();
    let _ = builder.add_constraint(required(
        "clashes",
        ConstraintKind::AvoidClashes {
            resources: vec![room],
            resource_groups: Vec::new(),
        },
    ));
    let instance = builder.build();

    let forest = apply_constraints(&instance, Vec::new());

    assert_eq!(forest.statistics().num_failed_tries, 0);
    for &event in &events {
        let layer = forest
            .layer_for(forest.class_of(event), room)
            .expect("each class needs the room itself");
        assert!(forest.layer(layer).holds_own());
    }
    let root_layer = forest
        .layer_for(forest.root(), room)
        .expect("the root collects the room's users");
    let layer = forest.layer(root_layer);
    assert_eq!(layer.classes().len(), 3);
    assert_eq!(layer.min_partition(), &Partition::unitary(3));
}

#[test]
fn preassigned_time_pins_the_event() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let event = builder.add_event(Event::new("event", 3).with_preassigned_time(4));
    let instance = builder.build();

    let forest = apply_constraints(&instance, vec![SplitJob::preassigned(event, 4)]);

    let class = forest.class(forest.class_of(event));
    assert_eq!(class.min_total_amount(), 1);
    assert_eq!(class.max_total_amount(), 1);
    assert_eq!(class.min_partition(), &Partition::from_parts([3]));
    for size in 1..=3 {
        assert_eq!(**class.domain(size), TimeGroup::singleton(4));
    }
}
