use enumset::EnumSet;

use crate::jobs::JobTag;

/// Options which determine how [`build_layer_tree`](crate::layer_tree::build_layer_tree)
/// behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerTreeOptions {
    /// Whether a child node which fits its parent node exactly is assigned to it and removed.
    pub make_trivial_assignments: bool,
    /// Whether the nodes of events which should be spread or assigned alike are merged when
    /// their preassigned resources agree.
    pub merge_resource_nodes: bool,
    /// The job families which are not applied to the split forest.
    pub skipped_jobs: EnumSet<JobTag>,
}

impl Default for LayerTreeOptions {
    fn default() -> Self {
        LayerTreeOptions {
            make_trivial_assignments: true,
            merge_resource_nodes: true,
            skipped_jobs: EnumSet::empty(),
        }
    }
}
