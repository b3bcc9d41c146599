use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use thiserror::Error;

use crate::splitlink_assert_simple;

/// The largest part size and the largest amount of a grouped token accepted when parsing.
pub const MAX_PARSED_VALUE: usize = 1 << 16;

/// A multiset of positive integers, used to describe how a duration is cut into segments.
///
/// The partition is stored as a count per part size; `counts[i]` holds the number of parts of
/// size `i + 1`. The vector never has trailing zeros, so two partitions holding the same parts
/// compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Partition {
    counts: Vec<usize>,
}

impl Partition {
    /// Creates the empty partition.
    pub fn new() -> Partition {
        Partition::default()
    }

    /// Creates the partition holding `n` parts of size one.
    pub fn unitary(n: usize) -> Partition {
        let mut partition = Partition::new();
        partition.add_parts(1, n);
        partition
    }

    /// Creates the partition holding exactly the given parts.
    pub fn from_parts(parts: impl IntoIterator<Item = usize>) -> Partition {
        let mut partition = Partition::new();
        parts.into_iter().for_each(|part| partition.add(part));
        partition
    }

    /// Adds one part of size `part`.
    pub fn add(&mut self, part: usize) {
        self.add_parts(part, 1);
    }

    /// Adds `amount` parts of size `part`.
    pub fn add_parts(&mut self, part: usize, amount: usize) {
        splitlink_assert_simple!(part > 0, "partitions only hold positive parts");
        if amount == 0 {
            return;
        }
        if self.counts.len() < part {
            self.counts.resize(part, 0);
        }
        self.counts[part - 1] += amount;
    }

    /// Removes one part of size `part`, which must be present.
    pub fn remove(&mut self, part: usize) {
        splitlink_assert_simple!(
            self.contains(part),
            "cannot remove part {part} from {self}"
        );
        self.counts[part - 1] -= 1;
        self.trim();
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    fn trim(&mut self) {
        while self.counts.last() == Some(&0) {
            let _ = self.counts.pop();
        }
    }

    /// The sum of the parts.
    pub fn size(&self) -> usize {
        self.counts
            .iter()
            .enumerate()
            .map(|(index, count)| (index + 1) * count)
            .sum()
    }

    /// The number of parts.
    pub fn parts(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The number of parts of size exactly `part`.
    pub fn parts_with_size(&self, part: usize) -> usize {
        if part == 0 {
            return 0;
        }
        self.counts.get(part - 1).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The largest part, or zero when the partition is empty.
    pub fn max(&self) -> usize {
        self.counts.len()
    }

    /// The smallest part, or zero when the partition is empty.
    pub fn min(&self) -> usize {
        self.counts
            .iter()
            .position(|&count| count > 0)
            .map_or(0, |index| index + 1)
    }

    pub fn contains(&self, part: usize) -> bool {
        self.parts_with_size(part) > 0
    }

    /// Returns true if `self` has at least as many parts of every size as `other`.
    pub fn covers(&self, other: &Partition) -> bool {
        other
            .counts
            .iter()
            .enumerate()
            .all(|(index, &count)| self.parts_with_size(index + 1) >= count)
    }

    /// Iterates over the parts in decreasing order, repeating a part once per occurrence.
    pub fn iter_parts(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts
            .iter()
            .enumerate()
            .rev()
            .flat_map(|(index, &count)| std::iter::repeat(index + 1).take(count))
    }

    /// Iterates over the distinct parts in decreasing order, together with their counts.
    pub fn iter_counts(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, &count)| count > 0)
            .map(|(index, &count)| (index + 1, count))
    }

    /// Multiset union: adds every part of `other` to `self`.
    pub fn extend_from(&mut self, other: &Partition) {
        other
            .iter_counts()
            .for_each(|(part, count)| self.add_parts(part, count));
    }

    /// Multiset difference: removes the parts of `other` from `self`, saturating at zero.
    pub fn subtract(&mut self, other: &Partition) {
        for (part, count) in other.iter_counts() {
            if let Some(current) = self.counts.get_mut(part - 1) {
                *current = current.saturating_sub(count);
            }
        }
        self.trim();
    }

    pub fn sum(&self, other: &Partition) -> Partition {
        let mut result = self.clone();
        result.extend_from(other);
        result
    }

    pub fn difference(&self, other: &Partition) -> Partition {
        let mut result = self.clone();
        result.subtract(other);
        result
    }

    /// Returns a [`Display`]able form which groups repeated parts, e.g. `2x2 1` for `(2 2 1)`.
    pub fn brief(&self) -> impl Display + '_ {
        Brief(self)
    }

    /// Parses a partition from its raw text form, e.g. `3 2 2`.
    ///
    /// The text `None` and the empty string both denote the empty partition. Grouped tokens
    /// such as `2x3` (two parts of size three) are accepted as well. A part above `limit`, or
    /// above [`MAX_PARSED_VALUE`] when no limit is given, is rejected, as is an amount above
    /// [`MAX_PARSED_VALUE`].
    pub fn parse_with_limit(
        text: &str,
        limit: Option<usize>,
    ) -> Result<Partition, PartitionParseError> {
        let text = text.trim();
        let mut partition = Partition::new();
        if text.is_empty() || text == "None" {
            return Ok(partition);
        }

        for token in text.split_whitespace() {
            let (amount, part) = match token.split_once('x') {
                Some((amount, part)) => (parse_number(amount, token)?, parse_number(part, token)?),
                None => (1, parse_number(token, token)?),
            };
            if part == 0 || amount == 0 {
                return Err(PartitionParseError::NonPositivePart {
                    token: token.to_owned(),
                });
            }
            let part_limit = limit.map_or(MAX_PARSED_VALUE, |limit| limit.min(MAX_PARSED_VALUE));
            if part > part_limit {
                return Err(PartitionParseError::PartAboveLimit {
                    part,
                    limit: part_limit,
                });
            }
            if amount > MAX_PARSED_VALUE {
                return Err(PartitionParseError::AmountAboveLimit {
                    amount,
                    limit: MAX_PARSED_VALUE,
                });
            }
            partition.add_parts(part, amount);
        }

        Ok(partition)
    }
}

fn parse_number(text: &str, token: &str) -> Result<usize, PartitionParseError> {
    text.parse::<usize>()
        .map_err(|_| PartitionParseError::InvalidToken {
            token: token.to_owned(),
        })
}

/// Returns true iff the parts of `items` can be grouped into the parts of `bins` such that
/// the parts assigned to each bin sum to at most its size.
///
/// The test is exact. The largest item is placed first: if a bin of exactly its size exists
/// it goes there, otherwise every distinct larger bin size is tried in turn.
pub fn bin_pack(items: &Partition, bins: &Partition) -> bool {
    if items.is_empty() {
        return true;
    }
    if items.size() > bins.size() || items.max() > bins.max() {
        return false;
    }

    let largest = items.max();
    let mut remaining_items = items.clone();
    remaining_items.remove(largest);

    if bins.contains(largest) {
        let mut remaining_bins = bins.clone();
        remaining_bins.remove(largest);
        return bin_pack(&remaining_items, &remaining_bins);
    }

    bins.iter_counts()
        .map(|(bin, _)| bin)
        .filter(|&bin| bin > largest)
        .any(|bin| {
            let mut remaining_bins = bins.clone();
            remaining_bins.remove(bin);
            remaining_bins.add(bin - largest);
            bin_pack(&remaining_items, &remaining_bins)
        })
}

/// Like [`bin_pack`], but also returns how the items are packed.
///
/// The result holds one partition per part of `bins`, in decreasing order of those parts;
/// the partition at index `i` holds the items packed into the `i`th largest bin.
pub fn bin_pack_and_how(items: &Partition, bins: &Partition) -> Option<Vec<Partition>> {
    if items.size() > bins.size() {
        return None;
    }

    let capacities: Vec<usize> = bins.iter_parts().collect();
    let mut spare = capacities.clone();
    let mut packing = vec![Partition::new(); capacities.len()];
    let items: Vec<usize> = items.iter_parts().collect();

    if pack_items(&items, &mut spare, &mut packing) {
        Some(packing)
    } else {
        None
    }
}

fn pack_items(items: &[usize], spare: &mut [usize], packing: &mut [Partition]) -> bool {
    let Some((&item, rest)) = items.split_first() else {
        return true;
    };

    if item == 1 {
        // Only unit items remain, any bin with room will do.
        return match spare.iter().position(|&room| room >= 1) {
            Some(bin) => place(item, bin, rest, spare, packing),
            None => false,
        };
    }

    if let Some(bin) = spare.iter().position(|&room| room == item) {
        return place(item, bin, rest, spare, packing);
    }

    let mut tried_rooms: Vec<usize> = Vec::new();
    for bin in 0..spare.len() {
        let room = spare[bin];
        if room <= item || tried_rooms.contains(&room) {
            continue;
        }
        tried_rooms.push(room);
        if place(item, bin, rest, spare, packing) {
            return true;
        }
    }
    false
}

fn place(
    item: usize,
    bin: usize,
    rest: &[usize],
    spare: &mut [usize],
    packing: &mut [Partition],
) -> bool {
    spare[bin] -= item;
    packing[bin].add(item);
    if pack_items(rest, spare, packing) {
        return true;
    }
    packing[bin].remove(item);
    spare[bin] += item;
    false
}

/// Returns every partition of `n` whose parts are at most `max_part`, largest part first.
///
/// For `n = 4` and `max_part >= 4` this yields `(4)`, `(3 1)`, `(2 2)`, `(2 1 1)` and
/// `(1 1 1 1)`.
pub fn partitions_of(n: usize, max_part: usize) -> Vec<Partition> {
    let mut result = Vec::new();
    let mut current = Partition::new();
    enumerate_partitions(n, max_part.min(n), &mut current, &mut result);
    result
}

fn enumerate_partitions(
    remaining: usize,
    max_part: usize,
    current: &mut Partition,
    result: &mut Vec<Partition>,
) {
    if remaining == 0 {
        result.push(current.clone());
        return;
    }
    for part in (1..=max_part.min(remaining)).rev() {
        current.add(part);
        enumerate_partitions(remaining - part, part, current, result);
        current.remove(part);
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (index, part) in self.iter_parts().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

struct Brief<'a>(&'a Partition);

impl Display for Brief<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "None");
        }
        for (index, (part, count)) in self.0.iter_counts().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            if count == 1 {
                write!(f, "{part}")?;
            } else {
                write!(f, "{count}x{part}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Partition {
    type Err = PartitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Partition::parse_with_limit(s, None)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionParseError {
    #[error("'{token}' is not a partition part")]
    InvalidToken { token: String },
    #[error("partition parts must be positive, got '{token}'")]
    NonPositivePart { token: String },
    #[error("part {part} exceeds the limit of {limit}")]
    PartAboveLimit { part: usize, limit: usize },
    #[error("amount {amount} exceeds the limit of {limit}")]
    AmountAboveLimit { amount: usize, limit: usize },
}
