//! Resolution of repeated gene-set names.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{DedupPolicy, GeneSet};
use crate::error::{DuplicateName, GmtError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub sets: Vec<GeneSet>,
    /// Every name seen more than once, in order of first appearance.
    pub duplicates: Vec<DuplicateName>,
}

/// Counts occurrences per name over the full input.
pub fn find_duplicates(sets: &[GeneSet]) -> Vec<DuplicateName> {
    let mut order = Vec::new();
    let mut counts = HashMap::<&str, usize>::new();
    for set in sets {
        let count = counts.entry(set.name.as_str()).or_insert(0);
        if *count == 0 {
            order.push(set.name.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|name| {
            let occurrences = counts[name];
            (occurrences > 1).then(|| DuplicateName {
                name: name.to_string(),
                occurrences,
            })
        })
        .collect()
}

/// Applies `policy` to the raw parsed gene sets.
///
/// Survivors stay at the position of their name's first appearance.
pub fn resolve(raw: Vec<GeneSet>, policy: DedupPolicy) -> Result<Resolved, GmtError> {
    let duplicates = find_duplicates(&raw);
    if duplicates.is_empty() {
        return Ok(Resolved {
            sets: raw,
            duplicates,
        });
    }

    let sets = match policy {
        DedupPolicy::Error => return Err(GmtError::DuplicateNames(duplicates)),
        DedupPolicy::None => raw,
        DedupPolicy::First => collapse(raw, false),
        DedupPolicy::Last => collapse(raw, true),
    };

    if matches!(policy, DedupPolicy::First | DedupPolicy::Last) {
        for duplicate in &duplicates {
            warn!(
                name = %duplicate.name,
                discarded = duplicate.occurrences - 1,
                keep = %policy,
                "duplicated gene set name; discarded {} occurrence(s)",
                duplicate.occurrences - 1
            );
        }
    }

    Ok(Resolved { sets, duplicates })
}

fn collapse(raw: Vec<GeneSet>, keep_last: bool) -> Vec<GeneSet> {
    let mut index = HashMap::<String, usize>::with_capacity(raw.len());
    let mut kept: Vec<GeneSet> = Vec::with_capacity(raw.len());
    for set in raw {
        match index.get(&set.name) {
            Some(&slot) if keep_last => kept[slot] = set,
            Some(_) => {}
            None => {
                index.insert(set.name.clone(), kept.len());
                kept.push(set);
            }
        }
    }
    kept
}
