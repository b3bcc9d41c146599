use enum_map::EnumMap;

use super::log_statistic;
use super::Statistic;
use super::StatisticLogger;
use crate::create_statistics_struct;
use crate::jobs::JobTag;

create_statistics_struct!(
    /// Counters of the trials performed on the split forest.
    ForestStatistics {
        /// The number of forest operations whose requirement was accepted
        num_successful_tries: usize,
        /// The number of forest operations which were rolled back
        num_failed_tries: usize,
        /// The number of classes absorbed by another class
        num_merges: usize,
        /// The number of classes moved below the class of another event
        num_assignments: usize,
});

create_statistics_struct!(
    /// Counters of the changes made to the timetable.
    TreeStatistics {
        /// The number of segments created by splitting
        num_segment_splits: usize,
        /// The number of assignment nodes created when finalizing the forest
        num_nodes: usize,
        /// The number of child nodes collapsed into their parent
        num_trivial_assignments: usize,
        /// The number of pairs of nodes merged because they share their resources
        num_node_merges: usize,
});

/// Statistics of one layer tree build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerTreeStatistics {
    pub forest: ForestStatistics,
    pub tree: TreeStatistics,
    /// The number of jobs created for each job family
    pub jobs_per_tag: EnumMap<JobTag, usize>,
}

impl LayerTreeStatistics {
    pub fn num_jobs(&self) -> usize {
        self.jobs_per_tag.values().sum()
    }
}

impl Statistic for LayerTreeStatistics {
    fn log(&self, statistic_logger: StatisticLogger) {
        self.forest
            .log(statistic_logger.attach_to_prefix("forest"));
        self.tree.log(statistic_logger.attach_to_prefix("tree"));
        for (tag, count) in &self.jobs_per_tag {
            log_statistic(
                statistic_logger.attach_to_prefix(format!("jobs{tag:?}")).name(),
                count,
            );
        }
    }
}
