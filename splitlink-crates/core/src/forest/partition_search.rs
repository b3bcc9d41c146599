//! The search for the first partition acceptable to a class.
use super::split_class::ClassState;
use crate::basic_types::bin_pack;
use crate::basic_types::Partition;

/// Returns the first partition of `duration` which satisfies the bounds of `state`, packs into
/// each of its upper partitions, and into which each of `inner` packs.
///
/// Partitions are generated from the largest part size down; for each size the number of parts
/// counts up from its minimum. So the result has as few large parts as the requirements allow,
/// and an unconstrained class yields `duration` parts of size one.
pub(crate) fn first_acceptable_partition(
    state: &ClassState,
    duration: usize,
    inner: &[&Partition],
) -> Option<Partition> {
    if !bounds_are_consistent(state, duration) {
        return None;
    }

    let mut search = PartitionSearch {
        state,
        duration,
        inner,
        stem: Partition::new(),
    };
    let mut stem_duration = 0;
    let mut stem_parts = 0;
    for (index, &minimum) in state.min_amount.iter().enumerate() {
        search.stem.add_parts(index + 1, minimum);
        stem_duration += (index + 1) * minimum;
        stem_parts += minimum;
    }
    if search.extend(duration, stem_duration, stem_parts) {
        Some(search.stem)
    } else {
        None
    }
}

/// The arithmetic tests which rule out any acceptable partition.
fn bounds_are_consistent(state: &ClassState, duration: usize) -> bool {
    if state.min_total > state.max_total || state.min_total > duration {
        return false;
    }
    let mut min_parts = 0;
    let mut min_duration = 0;
    let mut max_parts = 0;
    for (index, (&minimum, &maximum)) in state
        .min_amount
        .iter()
        .zip(state.max_amount.iter())
        .enumerate()
    {
        if minimum > maximum {
            return false;
        }
        min_parts += minimum;
        min_duration += (index + 1) * minimum;
        max_parts += maximum;
    }
    min_parts <= state.max_total && min_duration <= duration && max_parts >= state.min_total
}

struct PartitionSearch<'a> {
    state: &'a ClassState,
    duration: usize,
    inner: &'a [&'a Partition],
    stem: Partition,
}

impl PartitionSearch<'_> {
    /// Adds parts of size `size` and below to the stem; leaves the stem holding the first
    /// acceptable partition and returns true, or restores the stem and returns false.
    fn extend(&mut self, size: usize, stem_duration: usize, stem_parts: usize) -> bool {
        if stem_duration > self.duration || stem_parts > self.state.max_total {
            return false;
        }
        if size == 0 {
            return self.is_acceptable(stem_duration, stem_parts);
        }

        let minimum = self.state.min_amount[size - 1];
        let maximum = self.state.max_amount[size - 1];
        let mut extra = 0;
        loop {
            if self.extend(size - 1, stem_duration + extra * size, stem_parts + extra) {
                return true;
            }
            if minimum + extra >= maximum || stem_duration + (extra + 1) * size > self.duration {
                break;
            }
            extra += 1;
            self.stem.add(size);
        }
        for _ in 0..extra {
            self.stem.remove(size);
        }
        false
    }

    fn is_acceptable(&self, stem_duration: usize, stem_parts: usize) -> bool {
        stem_parts >= self.state.min_total
            && stem_duration == self.duration
            && self
                .state
                .upper_partitions
                .iter()
                .all(|upper| bin_pack(&self.stem, upper))
            && self.inner.iter().all(|inner| bin_pack(inner, &self.stem))
    }
}
