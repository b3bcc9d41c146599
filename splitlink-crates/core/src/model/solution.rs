use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use super::EventId;
use super::Instance;
use super::NodeId;
use super::SegmentBound;
use super::SegmentId;
use super::Timetable;
use super::TimetableError;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

#[derive(Clone, Debug)]
struct Segment {
    event: Option<EventId>,
    duration: usize,
    /// The first time covered by a cycle segment.
    cycle_start: Option<usize>,
    assignment: Option<(SegmentId, usize)>,
    assigned: Vec<SegmentId>,
    fixed: bool,
    node: Option<NodeId>,
    bounds: Vec<Rc<SegmentBound>>,
}

impl Segment {
    fn new(event: Option<EventId>, duration: usize, cycle_start: Option<usize>) -> Segment {
        Segment {
            event,
            duration,
            cycle_start,
            assignment: None,
            assigned: Vec::new(),
            fixed: false,
            node: None,
            bounds: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Node {
    segments: Vec<SegmentId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory [`Timetable`] for an [`Instance`].
///
/// On creation the cycle is represented by one segment per cycle segment of the instance, and
/// every event has the segments it was declared with (one segment of its full duration when it
/// declares none). Nothing is assigned and no nodes exist.
#[derive(Clone, Debug)]
pub struct Solution {
    segments: KeyedVec<SegmentId, Segment>,
    cycle_segments: Vec<SegmentId>,
    event_segments: KeyedVec<EventId, Vec<SegmentId>>,
    event_names: KeyedVec<EventId, String>,
    nodes: KeyedVec<NodeId, Option<Node>>,
}

impl Solution {
    pub fn new(instance: &Instance) -> Solution {
        let mut segments = KeyedVec::default();
        let cycle_segments = instance
            .cycle_segments()
            .into_iter()
            .map(|(start, duration)| segments.push(Segment::new(None, duration, Some(start))))
            .collect();

        let mut event_segments = KeyedVec::default();
        let mut event_names = KeyedVec::default();
        for (event_id, event) in instance.events() {
            let durations = if event.initial_segments.is_empty() {
                vec![event.duration]
            } else {
                event.initial_segments.clone()
            };
            let ids = durations
                .into_iter()
                .map(|duration| segments.push(Segment::new(Some(event_id), duration, None)))
                .collect();
            let _ = event_segments.push(ids);
            let _ = event_names.push(event.name.clone());
        }

        Solution {
            segments,
            cycle_segments,
            event_segments,
            event_names,
            nodes: KeyedVec::default(),
        }
    }

    fn segment(&self, segment: SegmentId) -> Result<&Segment, TimetableError> {
        self.segments
            .get(segment)
            .ok_or(TimetableError::UnknownSegment(segment))
    }

    fn node(&self, node: NodeId) -> Result<&Node, TimetableError> {
        self.nodes
            .get(node)
            .and_then(Option::as_ref)
            .ok_or(TimetableError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, TimetableError> {
        self.nodes
            .get_mut(node)
            .and_then(Option::as_mut)
            .ok_or(TimetableError::UnknownNode(node))
    }

    /// The time at which `segment` starts, if its chain of assignments ends in the cycle.
    pub fn start_time(&self, segment: SegmentId) -> Option<usize> {
        let data = self.segments.get(segment)?;
        if let Some(start) = data.cycle_start {
            return Some(start);
        }
        let (target, offset) = data.assignment?;
        self.start_time(target).map(|start| start + offset)
    }

    /// Returns true if `ancestor` is reached by following assignments upwards from `segment`.
    fn is_assigned_under(&self, segment: SegmentId, ancestor: SegmentId) -> bool {
        let mut current = Some(segment);
        while let Some(s) = current {
            if s == ancestor {
                return true;
            }
            current = self.segments[s].assignment.map(|(target, _)| target);
        }
        false
    }

    fn segment_label(&self, segment: SegmentId) -> String {
        let data = &self.segments[segment];
        match (data.event, data.cycle_start) {
            (Some(event), _) => format!("{}:{}", self.event_names[event], data.duration),
            (None, Some(start)) => format!("cycle@{start}:{}", data.duration),
            (None, None) => format!("{segment}"),
        }
    }

    fn fmt_node(&self, f: &mut Formatter<'_>, node: NodeId, depth: usize) -> std::fmt::Result {
        let Some(data) = self.nodes[node].as_ref() else {
            return Ok(());
        };
        write!(f, "{:indent$}[{}]", "", node, indent = 2 * depth)?;
        for &segment in &data.segments {
            write!(f, " {}", self.segment_label(segment))?;
            if let Some((target, offset)) = self.segments[segment].assignment {
                write!(f, "->{}+{offset}", self.segment_label(target))?;
            }
        }
        writeln!(f)?;
        for &child in &data.children {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Timetable for Solution {
    fn cycle_segments(&self) -> Vec<SegmentId> {
        self.cycle_segments.clone()
    }

    fn event_segments(&self, event: EventId) -> Vec<SegmentId> {
        self.event_segments
            .get(event)
            .cloned()
            .unwrap_or_default()
    }

    fn segment_duration(&self, segment: SegmentId) -> usize {
        self.segments[segment].duration
    }

    fn segment_event(&self, segment: SegmentId) -> Option<EventId> {
        self.segments[segment].event
    }

    fn segment_assignment(&self, segment: SegmentId) -> Option<(SegmentId, usize)> {
        self.segments[segment].assignment
    }

    fn segment_is_fixed(&self, segment: SegmentId) -> bool {
        self.segments[segment].fixed
    }

    fn segments_assigned_to(&self, segment: SegmentId) -> Vec<SegmentId> {
        self.segments[segment].assigned.clone()
    }

    fn split_segment(
        &mut self,
        segment: SegmentId,
        first_duration: usize,
    ) -> Result<SegmentId, TimetableError> {
        let data = self.segment(segment)?;
        let Some(event) = data.event else {
            return Err(TimetableError::CycleSegment(segment));
        };
        if first_duration == 0 || first_duration >= data.duration {
            return Err(TimetableError::SplitOutOfRange {
                segment,
                duration: data.duration,
                first_duration,
            });
        }
        for &child in &data.assigned {
            let (_, offset) = self.segments[child]
                .assignment
                .ok_or(TimetableError::NotAssigned(child))?;
            let end = offset + self.segments[child].duration;
            if offset < first_duration && end > first_duration {
                return Err(TimetableError::SplitThroughAssigned { segment, child });
            }
        }

        let mut second = Segment::new(Some(event), data.duration - first_duration, None);
        second.assignment = data
            .assignment
            .map(|(target, offset)| (target, offset + first_duration));
        second.fixed = data.fixed;
        second.node = data.node;
        second.bounds = data.bounds.iter().map(Rc::clone).collect();

        let (moving, staying): (Vec<SegmentId>, Vec<SegmentId>) = data
            .assigned
            .iter()
            .partition(|&&child| {
                self.segments[child]
                    .assignment
                    .is_some_and(|(_, offset)| offset >= first_duration)
            });
        second.assigned = moving.clone();

        let second_id = self.segments.push(second);
        self.segments[segment].duration = first_duration;
        self.segments[segment].assigned = staying;
        for child in moving {
            if let Some((_, offset)) = self.segments[child].assignment {
                self.segments[child].assignment = Some((second_id, offset - first_duration));
            }
        }
        if let Some((target, _)) = self.segments[second_id].assignment {
            self.segments[target].assigned.push(second_id);
        }
        if let Some(node) = self.segments[second_id].node {
            self.node_mut(node)?.segments.push(second_id);
        }
        self.event_segments[event].push(second_id);

        Ok(second_id)
    }

    fn assign_check(&self, segment: SegmentId, target: SegmentId, offset: usize) -> bool {
        let (Some(data), Some(target_data)) = (self.segments.get(segment), self.segments.get(target))
        else {
            return false;
        };
        if data.event.is_none() || data.assignment.is_some() {
            return false;
        }
        if self.is_assigned_under(target, segment) {
            return false;
        }
        if offset + data.duration > target_data.duration {
            return false;
        }
        match self.start_time(target) {
            Some(start) => data.bounds.iter().all(|bound| {
                bound
                    .domain(data.duration)
                    .map_or(true, |domain| domain.contains(start + offset))
            }),
            None => true,
        }
    }

    fn assign(
        &mut self,
        segment: SegmentId,
        target: SegmentId,
        offset: usize,
    ) -> Result<(), TimetableError> {
        if self.segment(segment)?.assignment.is_some() {
            return Err(TimetableError::AlreadyAssigned(segment));
        }
        if !self.assign_check(segment, target, offset) {
            return Err(TimetableError::AssignmentRejected {
                segment,
                target,
                offset,
            });
        }
        self.segments[segment].assignment = Some((target, offset));
        self.segments[target].assigned.push(segment);
        Ok(())
    }

    fn unassign(&mut self, segment: SegmentId) -> Result<(), TimetableError> {
        let data = self.segment(segment)?;
        if data.fixed {
            return Err(TimetableError::SegmentFixed(segment));
        }
        let (target, _) = data
            .assignment
            .ok_or(TimetableError::NotAssigned(segment))?;
        self.segments[target].assigned.retain(|&s| s != segment);
        self.segments[segment].assignment = None;
        Ok(())
    }

    fn fix(&mut self, segment: SegmentId) {
        self.segments[segment].fixed = true;
    }

    fn unfix(&mut self, segment: SegmentId) {
        self.segments[segment].fixed = false;
    }

    fn add_segment_bound(
        &mut self,
        segment: SegmentId,
        bound: Rc<SegmentBound>,
    ) -> Result<(), TimetableError> {
        let _ = self.segment(segment)?;
        self.segments[segment].bounds.push(bound);
        Ok(())
    }

    fn segment_node(&self, segment: SegmentId) -> Option<NodeId> {
        self.segments[segment].node
    }

    fn node_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    fn make_node(&mut self) -> NodeId {
        self.nodes.push(Some(Node::default()))
    }

    fn add_segment_to_node(
        &mut self,
        segment: SegmentId,
        node: NodeId,
    ) -> Result<(), TimetableError> {
        if let Some(existing) = self.segment(segment)?.node {
            return Err(TimetableError::SegmentInNode {
                segment,
                node: existing,
            });
        }
        self.node_mut(node)?.segments.push(segment);
        self.segments[segment].node = Some(node);
        Ok(())
    }

    fn node_segments(&self, node: NodeId) -> Vec<SegmentId> {
        self.node(node)
            .map(|data| data.segments.clone())
            .unwrap_or_default()
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok().and_then(|data| data.parent)
    }

    fn node_children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn add_node_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), TimetableError> {
        if self.node(child)?.parent.is_some() {
            return Err(TimetableError::NodeHasParent(child));
        }
        let mut current = Some(parent);
        while let Some(node) = current {
            if node == child {
                return Err(TimetableError::NodeCycle { child, parent });
            }
            current = self.node(node)?.parent;
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), TimetableError> {
        let data = self.node(node)?.clone();
        if let Some(parent) = data.parent {
            self.node_mut(parent)?.children.retain(|&c| c != node);
        }
        for child in data.children {
            self.node_mut(child)?.parent = None;
        }
        for segment in data.segments {
            self.segments[segment].node = None;
        }
        self.nodes[node] = None;
        Ok(())
    }

    fn merge_nodes(&mut self, node: NodeId, other: NodeId) -> Result<NodeId, TimetableError> {
        let parent = self.node(node)?.parent;
        let other_data = self.node(other)?.clone();
        if node == other || parent != other_data.parent {
            return Err(TimetableError::NodesWithDifferentParents(node, other));
        }

        self.delete_node(other)?;
        for segment in other_data.segments {
            self.add_segment_to_node(segment, node)?;
        }
        for child in other_data.children {
            self.add_node_parent(child, node)?;
        }
        Ok(node)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.as_ref().is_some_and(|data| data.parent.is_none()) {
                self.fmt_node(f, NodeId::create_from_index(index), 0)?;
            }
        }
        Ok(())
    }
}
