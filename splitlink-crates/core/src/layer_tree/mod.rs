//! Builds the layer tree of a timetable: decides how events are split and which events run
//! within which, and records the result as a tree of assignment nodes.
mod homogenize;
mod node_merging;
mod trivial_assignments;

use log::debug;
use log::info;
use thiserror::Error;

use self::homogenize::homogenize_assignments;
use self::homogenize::split_long_segments;
use self::node_merging::merge_resource_nodes;
use self::trivial_assignments::make_trivial_assignments;
use crate::basic_types::Partition;
use crate::forest::SplitForest;
use crate::jobs::apply_jobs;
use crate::jobs::constraint_jobs;
use crate::jobs::sort_jobs;
use crate::jobs::SplitJob;
use crate::model::Instance;
use crate::model::NodeId;
use crate::model::Timetable;
use crate::model::TimetableError;
use crate::options::LayerTreeOptions;
use crate::statistics::LayerTreeStatistics;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayerTreeError {
    #[error("the timetable already holds {0} assignment nodes")]
    NodesAlreadyExist(usize),
    #[error("the timetable refused a change: {0}")]
    Timetable(#[from] TimetableError),
}

/// Builds the layer tree of `timetable`, returning its root node.
///
/// See [`build_layer_tree_with_statistics`].
pub fn build_layer_tree<T: Timetable>(
    instance: &Instance,
    timetable: &mut T,
    options: LayerTreeOptions,
) -> Result<NodeId, LayerTreeError> {
    build_layer_tree_with_statistics(instance, timetable, options).map(|(root, _)| root)
}

/// Builds the layer tree of `timetable`, which may not hold any assignment nodes yet.
///
/// The segments of each event are cut to sizes which satisfy as many of the constraints of
/// `instance` as possible, most important constraints first. Every event gets a node; the node
/// of an event which should run within another event lies below that event's node, and the
/// nodes of events which should run independently lie below the returned node of the cycle.
pub fn build_layer_tree_with_statistics<T: Timetable>(
    instance: &Instance,
    timetable: &mut T,
    options: LayerTreeOptions,
) -> Result<(NodeId, LayerTreeStatistics), LayerTreeError> {
    let existing_nodes = timetable.node_count();
    if existing_nodes > 0 {
        return Err(LayerTreeError::NodesAlreadyExist(existing_nodes));
    }
    info!(
        "building a layer tree for {} events over {} times",
        instance.event_count(),
        instance.time_count()
    );
    let mut statistics = LayerTreeStatistics::default();

    homogenize_assignments(instance, timetable)?;
    for (event, _) in instance.events() {
        statistics.tree.num_segment_splits +=
            split_long_segments(timetable, event, instance.time_count())?;
    }

    let mut jobs = constraint_jobs(instance);
    jobs.extend(pre_existing_jobs(instance, &*timetable));
    sort_jobs(&mut jobs);

    let mut forest = SplitForest::new(instance, &*timetable);
    statistics.jobs_per_tag = apply_jobs(&jobs, instance, &mut forest, options.skipped_jobs);
    statistics.forest = forest.statistics();
    info!(
        "applied {} jobs, leaving {} classes",
        statistics.num_jobs(),
        forest.class_count()
    );
    debug!("split forest:\n{forest}");

    let root = forest.finalize(instance, timetable, &mut statistics.tree)?;

    if options.make_trivial_assignments {
        statistics.tree.num_trivial_assignments = make_trivial_assignments(timetable, root)?;
    }
    if options.merge_resource_nodes {
        statistics.tree.num_node_merges = merge_resource_nodes(instance, timetable)?;
    }
    info!("built a layer tree of {} nodes", timetable.node_count());
    Ok((root, statistics))
}

/// The jobs which keep what the timetable already holds: the existing segment sizes,
/// preassigned times, and assignments to other events.
fn pre_existing_jobs<'a>(instance: &'a Instance, timetable: &impl Timetable) -> Vec<SplitJob<'a>> {
    let mut jobs = Vec::new();
    for (event, data) in instance.events() {
        let segments = timetable.event_segments(event);
        let durations = Partition::from_parts(
            segments
                .iter()
                .map(|&segment| timetable.segment_duration(segment)),
        );
        if segments.len() != 1 || durations.max() != data.duration {
            jobs.push(SplitJob::pack(event, durations));
        }
    }
    for (event, data) in instance.events() {
        if let Some(time) = data.preassigned_time {
            jobs.push(SplitJob::preassigned(event, time));
        }
    }
    for (event, _) in instance.events() {
        let parent = timetable
            .event_segments(event)
            .into_iter()
            .filter_map(|segment| timetable.segment_assignment(segment))
            .find_map(|(target, _)| timetable.segment_event(target));
        if let Some(parent) = parent {
            jobs.push(SplitJob::assigned(event, parent));
        }
    }
    jobs
}
