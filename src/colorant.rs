//! Colorant indices, and the sort/dedupe pass (C1) that normalizes a raw
//! list of input colorants into device order.

/// A physical ink channel (Cyan, Black, a spot color), or one of three
/// sentinels. Orderings throughout this crate treat
/// `ALL < NONE < UNKNOWN < 0 <= real colorants`, matching the source's
/// `COLORANTINDEX_ALL`/`COLORANTINDEX_NONE`/`COLORANTINDEX_UNKNOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorantIndex {
    /// The special `/All` separation.
    All,
    /// Absent/placeholder colorant.
    None,
    /// Negative end-of-list sentinel.
    Unknown,
    /// A real colorant index in the raster style.
    Real(u32),
    /// A pseudo-colorant: a placeholder naming the source separation
    /// of a pre-separated object during recombine (§3), replaced by a
    /// real colorant before it ever reaches `sort_colorants`.
    Pseudo(i32),
}

impl ColorantIndex {
    fn rank(self) -> i64 {
        match self {
            ColorantIndex::All => -3,
            ColorantIndex::None => -2,
            ColorantIndex::Unknown => -1,
            ColorantIndex::Real(i) => i as i64,
            ColorantIndex::Pseudo(i) => i64::MIN + i as i64,
        }
    }
}

/// Policy for resolving duplicate colorant names within a single
/// `DeviceN` color space. Adobe's RIPs pick the last duplicate; some
/// jobs require the first to render correctly, hence this is a knob
/// rather than a fixed choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    First,
    Last,
}

/// Result of `sort_colorants`: the deduplicated, ascending colorant
/// list, plus a `permutation` the same length as the original input,
/// indexed by *sorted* position. `permutation[pos]` is the original
/// input index that landed at sorted position `pos`, or `-1` once that
/// slot has been dropped (a `/None` or a shadowed duplicate); walking
/// `permutation` in order and keeping only the non-negative entries
/// reproduces `output`. `simple` records whether the mapping was the
/// identity, which enables the fast path in `Dcilut`.
#[derive(Debug, Clone)]
pub struct SortedColorants {
    pub output: Vec<ColorantIndex>,
    pub permutation: Vec<i32>,
    pub simple: bool,
}

/// Normalize, sort, and deduplicate a list of input colorant indices.
///
/// The source uses a bubble sort here because real jobs have at most a
/// handful of channels; any stable sort produces the same result, so
/// this uses the standard library's (which is already stable).
pub fn sort_colorants(input: &[ColorantIndex], dup_policy: DuplicatePolicy) -> SortedColorants {
    assert!(!input.is_empty(), "zero length colorant array");

    let n = input.len();

    // `sorted` and `permutation` both parallel the *sorted* position,
    // length n: permutation[pos] names the original input index that
    // landed at sorted position `pos`, or -1 once that slot is dropped.
    let mut sorted_positions: Vec<usize> = (0..n).collect();
    sorted_positions.sort_by_key(|&i| input[i].rank());
    let sorted: Vec<ColorantIndex> = sorted_positions.iter().map(|&i| input[i]).collect();
    let mut permutation: Vec<i32> = sorted_positions.iter().map(|&i| i as i32).collect();

    // Drop /None entries at the front, unless every entry is /None.
    let any_non_none = sorted.iter().any(|&c| c != ColorantIndex::None);
    let mut start = 0;
    if any_non_none {
        while start < n && sorted[start] == ColorantIndex::None {
            permutation[start] = -1;
            start += 1;
        }
    }

    // Dedupe consecutive equal indices from `start` onward, keeping
    // either the first or the last occurrence per `dup_policy`.
    let mut i = start;
    while i < n {
        let mut j = i + 1;
        while j < n && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > 1 {
            let keep = match dup_policy {
                DuplicatePolicy::First => i,
                DuplicatePolicy::Last => j - 1,
            };
            for k in i..j {
                if k != keep {
                    permutation[k] = -1;
                }
            }
        }
        i = j;
    }

    // Compact: walk sorted positions in order, keeping the ones whose
    // mapping survived.
    let output: Vec<ColorantIndex> = permutation
        .iter()
        .enumerate()
        .filter(|&(_, &orig)| orig >= 0)
        .map(|(pos, _)| sorted[pos])
        .collect();

    let simple =
        output.len() == input.len() && output.iter().zip(input.iter()).all(|(a, b)| a == b);

    SortedColorants {
        output,
        permutation,
        simple,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascending_no_duplicates() {
        let input = [
            ColorantIndex::Real(3),
            ColorantIndex::Real(1),
            ColorantIndex::Real(2),
        ];
        let sorted = sort_colorants(&input, DuplicatePolicy::Last);
        assert_eq!(
            sorted.output,
            vec![
                ColorantIndex::Real(1),
                ColorantIndex::Real(2),
                ColorantIndex::Real(3),
            ]
        );
        let mut seen = std::collections::HashSet::new();
        for w in sorted.output.windows(2) {
            assert!(w[0] < w[1]);
        }
        for c in &sorted.output {
            assert!(seen.insert(*c), "duplicate in sorted output");
        }
    }

    #[test]
    fn idempotent_modulo_permutation() {
        let input = [ColorantIndex::Real(0), ColorantIndex::Real(1)];
        let sorted = sort_colorants(&input, DuplicatePolicy::First);
        assert_eq!(sorted.permutation, vec![0, 1]);
        assert!(sorted.simple);
    }

    #[test]
    fn none_dropped_when_other_colorants_present() {
        let input = [ColorantIndex::None, ColorantIndex::Real(2)];
        let sorted = sort_colorants(&input, DuplicatePolicy::Last);
        assert_eq!(sorted.output, vec![ColorantIndex::Real(2)]);
    }

    #[test]
    fn single_none_kept_when_nothing_else() {
        let input = [ColorantIndex::None];
        let sorted = sort_colorants(&input, DuplicatePolicy::Last);
        assert_eq!(sorted.output, vec![ColorantIndex::None]);
    }

    #[test]
    fn all_sorts_before_everything() {
        let input = [ColorantIndex::Real(0), ColorantIndex::All];
        let sorted = sort_colorants(&input, DuplicatePolicy::Last);
        assert_eq!(sorted.output[0], ColorantIndex::All);
    }

    #[test]
    fn duplicate_policy_first_keeps_first() {
        let input = [
            ColorantIndex::Real(5),
            ColorantIndex::Real(5),
            ColorantIndex::Real(7),
        ];
        let sorted = sort_colorants(&input, DuplicatePolicy::First);
        assert_eq!(sorted.output, vec![ColorantIndex::Real(5), ColorantIndex::Real(7)]);
        assert_eq!(sorted.permutation[1], -1);
    }

    #[test]
    fn duplicate_policy_last_keeps_last() {
        let input = [
            ColorantIndex::Real(5),
            ColorantIndex::Real(5),
            ColorantIndex::Real(7),
        ];
        let sorted = sort_colorants(&input, DuplicatePolicy::Last);
        assert_eq!(sorted.permutation[0], -1);
    }
}
