//! Offset probing between two candidate neighbors.

/// Horizontal offsets tried, in order, before a pair is given up.
pub const PROBE_OFFSETS: [i64; 5] = [0, 1, -1, 2, -2];

/// State of the offset probe for one fragment pair.
///
/// Transitions follow [`PROBE_OFFSETS`]:
/// `Matching -> Probing(1) -> Probing(-1) -> Probing(2) -> Probing(-2) -> Exhausted`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProbeState {
    /// Comparing at offset 0.
    #[default]
    Matching,
    /// Retrying at a non-zero offset.
    Probing(i64),
    /// Every offset failed.
    Exhausted,
}

impl ProbeState {
    /// Offset to compare at, or `None` once exhausted.
    pub fn offset(self) -> Option<i64> {
        match self {
            ProbeState::Matching => Some(0),
            ProbeState::Probing(offset) => Some(offset),
            ProbeState::Exhausted => None,
        }
    }

    /// State to move to after a failed comparison.
    pub fn next(self) -> Self {
        match self {
            ProbeState::Matching => ProbeState::Probing(1),
            ProbeState::Probing(1) => ProbeState::Probing(-1),
            ProbeState::Probing(-1) => ProbeState::Probing(2),
            ProbeState::Probing(2) => ProbeState::Probing(-2),
            ProbeState::Probing(_) | ProbeState::Exhausted => ProbeState::Exhausted,
        }
    }
}

/// Result of probing one pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProbeOutcome {
    /// The pair matched at `offset` with `score`.
    Matched { offset: i64, score: f64 },
    /// No offset brought the score under the tolerance.
    Exhausted,
    /// The fragments cannot be compared at all (e.g. different widths).
    Incomparable,
}

#[cfg(test)]
mod tests {
    use super::{ProbeState, PROBE_OFFSETS};

    #[test]
    fn walks_the_fixed_offset_sequence() {
        let mut state = ProbeState::Matching;
        let mut seen = Vec::new();
        while let Some(offset) = state.offset() {
            seen.push(offset);
            state = state.next();
        }
        assert_eq!(seen, PROBE_OFFSETS);
        assert_eq!(state, ProbeState::Exhausted);
        assert_eq!(state.next(), ProbeState::Exhausted);
    }
}
