use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

/// A set of times, stored as a sorted list without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimeGroup {
    times: Vec<usize>,
}

impl TimeGroup {
    pub fn new(times: impl IntoIterator<Item = usize>) -> TimeGroup {
        let mut times: Vec<usize> = times.into_iter().collect();
        times.sort_unstable();
        times.dedup();
        TimeGroup { times }
    }

    /// The group containing every time of a cycle of `time_count` times.
    pub fn full(time_count: usize) -> TimeGroup {
        TimeGroup {
            times: (0..time_count).collect(),
        }
    }

    pub fn singleton(time: usize) -> TimeGroup {
        TimeGroup { times: vec![time] }
    }

    pub fn empty() -> TimeGroup {
        TimeGroup::default()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn contains(&self, time: usize) -> bool {
        self.times.binary_search(&time).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.times.iter().copied()
    }

    pub fn is_subset(&self, other: &TimeGroup) -> bool {
        self.len() <= other.len() && self.iter().all(|time| other.contains(time))
    }

    pub fn is_disjoint(&self, other: &TimeGroup) -> bool {
        self.iter().all(|time| !other.contains(time))
    }

    pub fn intersection(&self, other: &TimeGroup) -> TimeGroup {
        TimeGroup {
            times: self.iter().filter(|&time| other.contains(time)).collect(),
        }
    }

    pub fn union(&self, other: &TimeGroup) -> TimeGroup {
        TimeGroup::new(self.iter().chain(other.iter()))
    }
}

impl Display for TimeGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.times.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_sorts_and_removes_duplicates() {
        let group = TimeGroup::new([4, 1, 4, 2]);

        assert_eq!(group.iter().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(group.to_string(), "{1, 2, 4}");
    }

    #[test]
    fn set_relations() {
        let full = TimeGroup::full(5);
        let low = TimeGroup::new([0, 1]);
        let high = TimeGroup::new([3, 4]);

        assert!(low.is_subset(&full));
        assert!(!full.is_subset(&low));
        assert!(low.is_disjoint(&high));
        assert!(low.intersection(&high).is_empty());
        assert_eq!(low.union(&high).len(), 4);
        assert_eq!(full.intersection(&low), low);
    }
}
