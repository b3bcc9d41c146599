/// The weight of a constraint or the priority of a job.
///
/// Hard and soft weights are combined into a single value, hard weights dominating.
pub type Cost = i64;

/// Combines a hard and a soft weight into one [`Cost`], the hard part occupying the high bits.
pub const fn combined_cost(hard: i64, soft: i64) -> Cost {
    (hard << 32) + soft
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_weight_dominates_soft_weight() {
        assert!(combined_cost(1, 0) > combined_cost(0, 1_000_000));
        assert_eq!(combined_cost(0, 5), 5);
        assert_eq!(combined_cost(2, 3), (2 << 32) + 3);
    }
}
