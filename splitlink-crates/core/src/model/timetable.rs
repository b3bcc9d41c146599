use std::rc::Rc;

use thiserror::Error;

use super::EventId;
use super::NodeId;
use super::SegmentId;
use super::TimeGroup;

/// Restricts the start time of a segment according to its duration.
///
/// A duration which is not listed is unrestricted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentBound {
    pub domains: Vec<(usize, Rc<TimeGroup>)>,
}

impl SegmentBound {
    pub fn domain(&self, duration: usize) -> Option<&TimeGroup> {
        self.domains
            .iter()
            .find(|(bound_duration, _)| *bound_duration == duration)
            .map(|(_, domain)| domain.as_ref())
    }
}

/// The mutation interface of a timetable under construction.
///
/// A timetable holds segments (of events, or of the cycle itself), assignments of segments to
/// other segments at an offset, and a forest of assignment nodes grouping segments.
pub trait Timetable {
    /// The segments representing the cycle, in chronological order.
    fn cycle_segments(&self) -> Vec<SegmentId>;
    /// The segments of `event`, in creation order.
    fn event_segments(&self, event: EventId) -> Vec<SegmentId>;
    fn segment_duration(&self, segment: SegmentId) -> usize;
    /// The event owning `segment`, [`None`] for cycle segments.
    fn segment_event(&self, segment: SegmentId) -> Option<EventId>;
    /// The segment `segment` is assigned to, with the offset into it.
    fn segment_assignment(&self, segment: SegmentId) -> Option<(SegmentId, usize)>;
    fn segment_is_fixed(&self, segment: SegmentId) -> bool;
    /// The segments assigned to `segment`.
    fn segments_assigned_to(&self, segment: SegmentId) -> Vec<SegmentId>;

    /// Splits `segment` in two, returning the newly created second part.
    ///
    /// The first part keeps `first_duration`; the second part inherits the assignment (shifted
    /// by `first_duration`), fixedness, bounds and node of the original.
    fn split_segment(
        &mut self,
        segment: SegmentId,
        first_duration: usize,
    ) -> Result<SegmentId, TimetableError>;
    /// Returns true iff assigning `segment` to `target` at `offset` would succeed.
    fn assign_check(&self, segment: SegmentId, target: SegmentId, offset: usize) -> bool;
    fn assign(
        &mut self,
        segment: SegmentId,
        target: SegmentId,
        offset: usize,
    ) -> Result<(), TimetableError>;
    fn unassign(&mut self, segment: SegmentId) -> Result<(), TimetableError>;
    fn fix(&mut self, segment: SegmentId);
    fn unfix(&mut self, segment: SegmentId);
    fn add_segment_bound(
        &mut self,
        segment: SegmentId,
        bound: Rc<SegmentBound>,
    ) -> Result<(), TimetableError>;

    fn segment_node(&self, segment: SegmentId) -> Option<NodeId>;
    /// The number of nodes which have not been deleted.
    fn node_count(&self) -> usize;
    fn make_node(&mut self) -> NodeId;
    fn add_segment_to_node(&mut self, segment: SegmentId, node: NodeId)
        -> Result<(), TimetableError>;
    fn node_segments(&self, node: NodeId) -> Vec<SegmentId>;
    fn node_parent(&self, node: NodeId) -> Option<NodeId>;
    fn node_children(&self, node: NodeId) -> Vec<NodeId>;
    /// The total duration of the segments of `node`.
    fn node_duration(&self, node: NodeId) -> usize {
        self.node_segments(node)
            .into_iter()
            .map(|segment| self.segment_duration(segment))
            .sum()
    }
    fn add_node_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), TimetableError>;
    /// Deletes `node`; its segments leave the node and its children lose their parent.
    fn delete_node(&mut self, node: NodeId) -> Result<(), TimetableError>;
    /// Moves the segments and children of `other` into `node` and deletes `other`.
    ///
    /// Both nodes must have the same parent.
    fn merge_nodes(&mut self, node: NodeId, other: NodeId) -> Result<NodeId, TimetableError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimetableError {
    #[error("{0} does not exist")]
    UnknownSegment(SegmentId),
    #[error("{0} does not exist")]
    UnknownNode(NodeId),
    #[error("{0} is already assigned")]
    AlreadyAssigned(SegmentId),
    #[error("{0} is not assigned")]
    NotAssigned(SegmentId),
    #[error("{0} is fixed")]
    SegmentFixed(SegmentId),
    #[error("{segment} cannot be assigned to {target} at offset {offset}")]
    AssignmentRejected {
        segment: SegmentId,
        target: SegmentId,
        offset: usize,
    },
    #[error("{segment} of duration {duration} cannot be split at {first_duration}")]
    SplitOutOfRange {
        segment: SegmentId,
        duration: usize,
        first_duration: usize,
    },
    #[error("{0} is a cycle segment")]
    CycleSegment(SegmentId),
    #[error("splitting {segment} would cut through assigned {child}")]
    SplitThroughAssigned { segment: SegmentId, child: SegmentId },
    #[error("{segment} already lies in {node}")]
    SegmentInNode { segment: SegmentId, node: NodeId },
    #[error("{0} already has a parent")]
    NodeHasParent(NodeId),
    #[error("making {parent} the parent of {child} would create a cycle")]
    NodeCycle { child: NodeId, parent: NodeId },
    #[error("{0} and {1} have different parents")]
    NodesWithDifferentParents(NodeId, NodeId),
}
