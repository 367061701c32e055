//! Top-N cleanest restaurant selection.
//!
//! Selection runs in three passes over the full record table:
//!
//! 1. **Filter**: keep `A`/`B` graded records whose cuisine matches exactly.
//! 2. **Deduplicate**: keep one record per restaurant, the one with the
//!    most recent grade date. A missing grade date ranks older than any
//!    present date. On equal grade dates the record that appears first in
//!    the input wins.
//! 3. **Rank**: stable sort ascending by score (missing scores last) and
//!    take the first `n`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use resto_map_inspection_models::InspectionRecord;

/// Number of restaurants returned when no explicit limit is given.
pub const DEFAULT_TOP_N: usize = 10;

/// Returns the `n` cleanest currently-graded restaurants for `cuisine`.
///
/// The result never contains two records for the same restaurant and is
/// sorted ascending by score. Fewer than `n` records are returned when
/// fewer qualify; an unknown cuisine yields an empty result.
#[must_use]
pub fn select_top_n<'a>(
    records: &'a [InspectionRecord],
    cuisine: &str,
    n: usize,
) -> Vec<&'a InspectionRecord> {
    if n == 0 {
        return Vec::new();
    }

    // restaurant id -> (input position, record)
    let mut latest: BTreeMap<&str, (usize, &InspectionRecord)> = BTreeMap::new();

    for (position, record) in records.iter().enumerate() {
        if !record.has_eligible_grade() || record.cuisine != cuisine {
            continue;
        }

        latest
            .entry(record.restaurant_id.as_str())
            .and_modify(|current| {
                // Option ordering puts None below every Some
                if record.grade_date > current.1.grade_date {
                    *current = (position, record);
                }
            })
            .or_insert((position, record));
    }

    let mut candidates: Vec<(usize, &InspectionRecord)> = latest.into_values().collect();
    candidates.sort_by_key(|(position, _)| *position);
    candidates.sort_by(|(_, a), (_, b)| compare_scores(a.score, b.score));

    candidates
        .into_iter()
        .take(n)
        .map(|(_, record)| record)
        .collect()
}

/// Ascending score order with missing scores after every present score.
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
