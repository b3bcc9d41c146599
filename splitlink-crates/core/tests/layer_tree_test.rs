#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use splitlink_core::build_layer_tree;
use splitlink_core::build_layer_tree_with_statistics;
use splitlink_core::jobs::JobTag;
use splitlink_core::model::Constraint;
use splitlink_core::model::ConstraintKind;
use splitlink_core::model::Event;
use splitlink_core::model::EventSelection;
use splitlink_core::model::Instance;
use splitlink_core::model::InstanceBuilder;
use splitlink_core::model::Solution;
use splitlink_core::model::Timetable;
use splitlink_core::LayerTreeError;
use splitlink_core::LayerTreeOptions;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single_lesson_instance(duration: usize) -> Instance {
    let mut builder = InstanceBuilder::new(10);
    let lesson = builder.add_event(Event::new("lesson", duration));
    let _ = builder.add_constraint(Constraint {
        name: "unsplit".to_owned(),
        required: true,
        weight: 1,
        kind: ConstraintKind::SplitEvents {
            applies_to: EventSelection {
                events: vec![lesson],
                event_groups: Vec::new(),
            },
            min_duration: 1,
            max_duration: duration,
            min_amount: 1,
            max_amount: 1,
        },
    });
    builder.build()
}

#[test]
fn event_filling_the_cycle_is_assigned_trivially() {
    init_logging();
    let instance = single_lesson_instance(10);
    let mut solution = Solution::new(&instance);

    let (root, statistics) =
        build_layer_tree_with_statistics(&instance, &mut solution, LayerTreeOptions::default())
            .expect("no nodes exist yet");

    assert!(solution.node_children(root).is_empty());
    assert_eq!(solution.node_count(), 1);
    let lesson = instance.event_by_name("lesson").expect("lesson exists");
    let segment = solution.event_segments(lesson)[0];
    assert_eq!(
        solution.segment_assignment(segment),
        Some((solution.cycle_segments()[0], 0))
    );
    assert!(solution.segment_is_fixed(segment));
    assert_eq!(statistics.tree.num_trivial_assignments, 1);
    assert_eq!(statistics.tree.num_nodes, 2);
    assert_eq!(statistics.jobs_per_tag[JobTag::Split], 1);
}

#[test]
fn trivial_assignments_can_be_disabled() {
    init_logging();
    let instance = single_lesson_instance(10);
    let mut solution = Solution::new(&instance);
    let options = LayerTreeOptions {
        make_trivial_assignments: false,
        ..Default::default()
    };

    let root = build_layer_tree(&instance, &mut solution, options).expect("no nodes exist yet");

    assert_eq!(solution.node_children(root).len(), 1);
    let lesson = instance.event_by_name("lesson").expect("lesson exists");
    assert_eq!(
        solution.segment_assignment(solution.event_segments(lesson)[0]),
        None
    );
}

#[test]
fn skipped_jobs_leave_events_fully_split() {
    init_logging();
    let instance = single_lesson_instance(3);
    let mut solution = Solution::new(&instance);
    let options = LayerTreeOptions {
        skipped_jobs: JobTag::Split.into(),
        ..Default::default()
    };

    let (_, statistics) =
        build_layer_tree_with_statistics(&instance, &mut solution, options).expect("no nodes");

    let lesson = instance.event_by_name("lesson").expect("lesson exists");
    assert_eq!(solution.event_segments(lesson).len(), 3);
    assert_eq!(statistics.jobs_per_tag[JobTag::Split], 0);
    assert_eq!(statistics.tree.num_segment_splits, 2);
}

#[test]
fn existing_assignment_to_another_event_is_kept() {
    init_logging();
    let mut builder = InstanceBuilder::new(10);
    let host = builder.add_event(Event::new("host", 4));
    let guest = builder.add_event(Event::new("guest", 2));
    let instance = builder.build();
    let mut solution = Solution::new(&instance);
    let host_segment = solution.event_segments(host)[0];
    let guest_segment = solution.event_segments(guest)[0];
    solution
        .assign(guest_segment, host_segment, 1)
        .expect("the guest fits into the host");
    let options = LayerTreeOptions {
        make_trivial_assignments: false,
        ..Default::default()
    };

    let (root, statistics) =
        build_layer_tree_with_statistics(&instance, &mut solution, options).expect("no nodes");

    assert_eq!(statistics.jobs_per_tag[JobTag::Assigned], 1);
    assert_eq!(statistics.forest.num_assignments, 1);
    let host_node = solution
        .segment_node(solution.event_segments(host)[0])
        .expect("the host has a node");
    assert_eq!(solution.node_parent(host_node), Some(root));
    let guest_node = solution
        .segment_node(solution.event_segments(guest)[0])
        .expect("the guest has a node");
    assert_eq!(solution.node_parent(guest_node), Some(host_node));
}

#[test]
fn second_build_is_refused() {
    init_logging();
    let instance = single_lesson_instance(2);
    let mut solution = Solution::new(&instance);
    let _ = build_layer_tree(&instance, &mut solution, LayerTreeOptions::default())
        .expect("no nodes exist yet");

    assert!(matches!(
        build_layer_tree(&instance, &mut solution, LayerTreeOptions::default()),
        Err(LayerTreeError::NodesAlreadyExist(_))
    ));
}
