//! The split forest: classes of events which are split alike, the layers recording which of
//! their children share a resource, and the trials through which requirements are added.
mod finalize;
mod partition_search;
mod split_class;
mod split_forest;
mod split_layer;
mod trial;

pub use split_class::ClassId;
pub use split_class::SplitClass;
pub(crate) use split_forest::assignment_target;
pub(crate) use split_forest::AssignmentTarget;
pub use split_forest::SplitForest;
pub use split_layer::LayerId;
pub use split_layer::SplitLayer;
