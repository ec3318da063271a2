//! Record-level verbs used by the matching stages: joins, id lookups,
//! conditional selection and per-key scoring summaries.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Every `(left, right)` pair. Neither input is modified.
pub fn cross_join<L: Clone, R: Clone>(left: &[L], right: &[R]) -> Vec<(L, R)> {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| (l.clone(), r.clone())))
        .collect()
}

/// Unique ids (in first-seen order) of the rows where `present` holds.
pub fn find_ids<T, K, I, P>(rows: &[T], id: I, present: P) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: Fn(&T) -> K,
    P: Fn(&T) -> bool,
{
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| present(row))
        .map(id)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// For each position, the value of the first branch whose condition is true,
/// otherwise `default`. The output has the length of the shortest condition.
pub fn case_when<T: Clone>(branches: &[(&[bool], T)], default: T) -> Vec<T> {
    let len = branches.iter().map(|(cond, _)| cond.len()).min().unwrap_or(0);
    (0..len)
        .map(|i| {
            branches
                .iter()
                .find(|(cond, _)| cond[i])
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| default.clone())
        })
        .collect()
}

/// A candidate match between a person key and a record, with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub key: String,
    pub points: i64,
    /// Highest `points` among candidates sharing `key`
    pub max_points: Option<i64>,
    /// Number of candidates sharing both `key` and `points`
    pub count_of_points: Option<usize>,
}

impl MatchCandidate {
    pub fn new(key: impl Into<String>, points: i64) -> Self {
        Self {
            key: key.into(),
            points,
            max_points: None,
            count_of_points: None,
        }
    }
}

/// Fill `max_points` and `count_of_points` on every candidate in place.
pub fn append_max_and_count(candidates: &mut [MatchCandidate]) {
    let mut max_by_key: HashMap<String, i64> = HashMap::new();
    let mut count_by_pair: HashMap<(String, i64), usize> = HashMap::new();
    for c in candidates.iter() {
        max_by_key
            .entry(c.key.clone())
            .and_modify(|m| *m = (*m).max(c.points))
            .or_insert(c.points);
        *count_by_pair.entry((c.key.clone(), c.points)).or_insert(0) += 1;
    }
    for c in candidates.iter_mut() {
        c.max_points = max_by_key.get(&c.key).copied();
        c.count_of_points = count_by_pair.get(&(c.key.clone(), c.points)).copied();
    }
}

/// Like [`append_max_and_count`], but leaves `candidates` untouched and returns a new vector.
pub fn with_max_and_count(candidates: &[MatchCandidate]) -> Vec<MatchCandidate> {
    let mut out = candidates.to_vec();
    append_max_and_count(&mut out);
    out
}
