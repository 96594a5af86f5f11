use serde::{Deserialize, Serialize};

/// Advisory view of cinemas not owned by any rival studio. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependentCinemas {
    pub count: u64,
    pub declared_total: u64,
    pub owned_total: u64,
    /// Rival ownership exceeds the declared total; `count` was clamped to 0.
    pub over_allocated: bool,
}

/// Operands come straight from edit buffers; anything that does not parse counts as 0.
pub fn recompute_independent<'a>(
    total: &str,
    owned: impl IntoIterator<Item = &'a str>,
) -> IndependentCinemas {
    let declared_total = lenient_count(total);
    let owned_total = owned
        .into_iter()
        .map(lenient_count)
        .fold(0u64, |acc, count| acc.saturating_add(count));

    IndependentCinemas {
        count: declared_total.saturating_sub(owned_total),
        declared_total,
        owned_total,
        over_allocated: owned_total > declared_total,
    }
}

pub fn lenient_count(input: &str) -> u64 {
    input.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_and_flags_over_allocation() {
        let view = recompute_independent("10", ["5", "5", "5", "0", "0", "0"]);
        assert_eq!(view.count, 0);
        assert!(view.over_allocated);

        let view = recompute_independent("10", ["1", "1", "2", "0", "0", "0"]);
        assert_eq!(view.count, 6);
        assert!(!view.over_allocated);
    }

    #[test]
    fn non_numeric_operands_count_as_zero() {
        let view = recompute_independent("abc", ["3"]);
        assert_eq!(view.declared_total, 0);
        assert_eq!(view.count, 0);
        assert!(view.over_allocated);

        let view = recompute_independent("12", ["x", "", "-4"]);
        assert_eq!(view.count, 12);
    }
}
