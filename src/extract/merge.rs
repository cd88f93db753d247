// src/extract/merge.rs
// Collapse duplicate rows from one scrape into one observation per canonical name.

use std::collections::HashMap;

use crate::core::sanitize::split_qualifier;
use crate::model::StudentObservation;

/// Keep the higher state; ties keep the first seen.
fn absorb(into: &mut StudentObservation, other: StudentObservation) {
    if other.state > into.state {
        into.state = other.state;
        into.board_time = other.board_time;
    }
    if other.observed_at > into.observed_at {
        into.observed_at = other.observed_at;
    }
}

/// 1. Exact duplicates merge, CHECKED_OUT > CHECKED_IN > UNKNOWN.
/// 2. An unqualified name (`김도현`) folds into its only qualified variant
///    (`김도현(침산초)`). With two or more variants it stays on its own.
///
/// Output keeps first-appearance order.
pub fn merge_observations(obs: Vec<StudentObservation>) -> Vec<StudentObservation> {
    let mut out: Vec<StudentObservation> = Vec::with_capacity(obs.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for o in obs {
        match by_name.get(&o.name) {
            Some(&i) => absorb(&mut out[i], o),
            None => {
                by_name.insert(o.name.clone(), out.len());
                out.push(o);
            }
        }
    }

    // base → indices of qualified variants
    let mut qualified: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, o) in out.iter().enumerate() {
        if let (base, Some(_)) = split_qualifier(&o.name) {
            qualified.entry(base.to_string()).or_default().push(i);
        }
    }

    let mut folded = vec![false; out.len()];
    for i in 0..out.len() {
        let (base, qual) = split_qualifier(&out[i].name);
        if qual.is_some() {
            continue;
        }
        let Some(&[target]) = qualified.get(base).map(Vec::as_slice) else {
            continue;
        };
        let plain = out[i].clone();
        absorb(&mut out[target], plain);
        folded[i] = true;
    }

    // Move each survivor to the earliest slot any of its rows had.
    let mut first_seen: Vec<usize> = (0..out.len()).collect();
    for (i, o) in out.iter().enumerate() {
        if folded[i] {
            let base = split_qualifier(&o.name).0;
            if let Some(&[target]) = qualified.get(base).map(Vec::as_slice) {
                first_seen[target] = first_seen[target].min(i);
            }
        }
    }

    let mut keyed: Vec<(usize, StudentObservation)> = out
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !folded[*i])
        .map(|(i, o)| (first_seen[i], o))
        .collect();
    keyed.sort_by_key(|(k, _)| *k);
    keyed.into_iter().map(|(_, o)| o).collect()
}
