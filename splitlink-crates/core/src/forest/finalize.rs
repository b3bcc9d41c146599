use std::cmp::Reverse;
use std::rc::Rc;

use log::debug;
use log::warn;

use super::split_forest::covering_cycle_segments;
use super::split_forest::AssignmentTarget;
use super::ClassId;
use super::SplitClass;
use super::SplitForest;
use crate::basic_types::bin_pack_and_how;
use crate::basic_types::Partition;
use crate::containers::HashMap;
use crate::model::EventId;
use crate::model::Instance;
use crate::model::NodeId;
use crate::model::SegmentBound;
use crate::model::SegmentId;
use crate::model::Timetable;
use crate::model::TimetableError;
use crate::splitlink_assert_simple;
use crate::statistics::TreeStatistics;

impl SplitForest {
    /// Turns the forest into assignment nodes of `timetable`, returning the node of the cycle.
    ///
    /// The segments of every event are cut according to the minimal partition of its class, and
    /// each event gets a node of its own. The node of a class leader is placed below the node of
    /// the leader of the parent class; other members go below their leader, or below the event
    /// they are already assigned to.
    pub fn finalize<T: Timetable>(
        self,
        instance: &Instance,
        timetable: &mut T,
        statistics: &mut TreeStatistics,
    ) -> Result<NodeId, TimetableError> {
        let root_node = timetable.make_node();
        statistics.num_nodes += 1;
        for segment in covering_cycle_segments(instance.time_count(), &*timetable) {
            timetable.add_segment_to_node(segment, root_node)?;
        }

        let mut finalizer = Finalizer {
            forest: &self,
            instance,
            timetable,
            statistics,
            event_nodes: HashMap::default(),
            pending_links: Vec::new(),
        };
        for &child in self.class(self.root()).children() {
            finalizer.finalize_class(child, root_node)?;
        }
        finalizer.link_pending()?;

        Ok(root_node)
    }
}

/// A node whose parent is the node of another event, once that node exists.
#[derive(Clone, Copy, Debug)]
struct PendingLink {
    node: NodeId,
    target: EventId,
    fallback: NodeId,
}

struct Finalizer<'a, T> {
    forest: &'a SplitForest,
    instance: &'a Instance,
    timetable: &'a mut T,
    statistics: &'a mut TreeStatistics,
    event_nodes: HashMap<EventId, NodeId>,
    pending_links: Vec<PendingLink>,
}

impl<T: Timetable> Finalizer<'_, T> {
    fn finalize_class(&mut self, class: ClassId, parent_node: NodeId) -> Result<(), TimetableError> {
        let forest = self.forest;
        let split_class = forest.class(class);
        splitlink_assert_simple!(
            split_class.leader().is_some(),
            "{class} holds events but has no leader"
        );
        let Some(leader) = split_class.leader() else {
            return Ok(());
        };
        debug!(
            "finalizing {class} of {} events into {}",
            split_class.events().len(),
            split_class.min_partition()
        );

        let bound = self.segment_bound(split_class);
        let leader_node = self.finalize_event(split_class, leader, bound.as_ref())?;
        self.timetable.add_node_parent(leader_node, parent_node)?;

        for &event in split_class.events() {
            if event == leader {
                continue;
            }
            let node = self.finalize_event(split_class, event, bound.as_ref())?;
            match forest.assignment_target_of(event) {
                Some(AssignmentTarget::Event(target)) => self.pending_links.push(PendingLink {
                    node,
                    target,
                    fallback: leader_node,
                }),
                _ => self.timetable.add_node_parent(node, leader_node)?,
            }
        }

        for &child in split_class.children() {
            self.finalize_class(child, leader_node)?;
        }
        Ok(())
    }

    /// The bound restricting the segments of `class`, unless every size may start anywhere.
    fn segment_bound(&self, class: &SplitClass) -> Option<Rc<SegmentBound>> {
        let time_count = self.forest.full_domain().len();
        let domains: Vec<_> = (1..=class.duration())
            .filter(|&size| class.domain(size).len() != time_count)
            .map(|size| (size, Rc::clone(class.domain(size))))
            .collect();
        if domains.is_empty() {
            None
        } else {
            Some(Rc::new(SegmentBound { domains }))
        }
    }

    fn finalize_event(
        &mut self,
        class: &SplitClass,
        event: EventId,
        bound: Option<&Rc<SegmentBound>>,
    ) -> Result<NodeId, TimetableError> {
        let mut segments = self.timetable.event_segments(event);
        let durations = Partition::from_parts(
            segments
                .iter()
                .map(|&segment| self.timetable.segment_duration(segment)),
        );
        match bin_pack_and_how(class.min_partition(), &durations) {
            Some(packings) => {
                segments.sort_by_key(|&segment| Reverse(self.timetable.segment_duration(segment)));
                for (segment, packing) in segments.into_iter().zip(packings) {
                    self.cut_segment(event, segment, &packing);
                }
            }
            None => warn!(
                "segments {durations} of {} cannot be cut to {}",
                self.instance.event(event).name,
                class.min_partition()
            ),
        }

        let node = self.timetable.make_node();
        self.statistics.num_nodes += 1;
        for segment in self.timetable.event_segments(event) {
            if let Some(bound) = bound {
                self.timetable.add_segment_bound(segment, Rc::clone(bound))?;
            }
            self.timetable.add_segment_to_node(segment, node)?;
        }
        let _ = self.event_nodes.insert(event, node);
        Ok(node)
    }

    /// Splits `segment` into the parts of `packing`, largest parts last.
    fn cut_segment(&mut self, event: EventId, segment: SegmentId, packing: &Partition) {
        let mut remaining = self.timetable.segment_duration(segment);
        for part in packing.iter_parts().take(packing.parts().saturating_sub(1)) {
            match self.timetable.split_segment(segment, remaining - part) {
                Ok(_) => {
                    remaining -= part;
                    self.statistics.num_segment_splits += 1;
                }
                Err(error) => {
                    warn!(
                        "leaving a segment of {} uncut: {error}",
                        self.instance.event(event).name
                    );
                    return;
                }
            }
        }
    }

    fn link_pending(&mut self) -> Result<(), TimetableError> {
        for link in std::mem::take(&mut self.pending_links) {
            let linked = match self.event_nodes.get(&link.target) {
                Some(&target_node) if target_node != link.node => self
                    .timetable
                    .add_node_parent(link.node, target_node)
                    .is_ok(),
                _ => false,
            };
            if !linked {
                self.timetable.add_node_parent(link.node, link.fallback)?;
            }
        }
        Ok(())
    }
}
