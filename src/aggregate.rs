// 📊 Discipline Aggregation
// Drops incomplete registrants, counts the rest per main discipline
//
// The pipeline has no failure modes: any input, including an empty one,
// produces a (possibly empty) list of buckets.

use crate::registrant::{Registrant, ABSENT_MARKER};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// BUCKET
// ============================================================================

/// One (discipline, count) result. `disciplina` is None for registrants
/// with no main discipline; those form their own bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub disciplina: Option<String>,
    #[serde(rename = "usersTotal")]
    pub users_total: usize,
}

impl AggregateBucket {
    /// Display label; the absent discipline shows as ABSENT_MARKER
    pub fn label(&self) -> &str {
        self.disciplina.as_deref().unwrap_or(ABSENT_MARKER)
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// A registrant is complete when partido, provincia, name, lastname and
/// email are all present. The discipline is not required.
pub fn is_complete(registrant: &Registrant) -> bool {
    registrant.partido.is_some()
        && registrant.provincia.is_some()
        && registrant.name.is_some()
        && registrant.lastname.is_some()
        && registrant.email.is_some()
}

/// Keeps complete registrants in their original order.
pub fn filter_complete<'a, I>(registrants: I) -> Vec<&'a Registrant>
where
    I: IntoIterator<Item = &'a Registrant>,
{
    registrants.into_iter().filter(|r| is_complete(r)).collect()
}

// ============================================================================
// GROUP / SORT
// ============================================================================

/// One bucket per distinct discipline, in first-seen order.
pub fn group_counts<'a, I>(registrants: I) -> Vec<AggregateBucket>
where
    I: IntoIterator<Item = &'a Registrant>,
{
    let mut index: HashMap<Option<&'a str>, usize> = HashMap::new();
    let mut buckets: Vec<AggregateBucket> = Vec::new();

    for registrant in registrants {
        let key = registrant.disciplina_principal.as_deref();

        if let Some(&i) = index.get(&key) {
            buckets[i].users_total += 1;
        } else {
            index.insert(key, buckets.len());
            buckets.push(AggregateBucket {
                disciplina: key.map(str::to_string),
                users_total: 1,
            });
        }
    }

    buckets
}

/// Descending by count. `sort_by` is stable, so equal counts keep
/// first-seen order.
pub fn sort_buckets(buckets: &mut [AggregateBucket]) {
    buckets.sort_by(|a, b| b.users_total.cmp(&a.users_total));
}

/// filter → group → sort
pub fn aggregate(registrants: &[Registrant]) -> Vec<AggregateBucket> {
    let complete = filter_complete(registrants);
    let mut buckets = group_counts(complete.iter().copied());
    sort_buckets(&mut buckets);

    debug!(
        registrants = registrants.len(),
        complete = complete.len(),
        buckets = buckets.len(),
        "registrants aggregated"
    );
    buckets
}

// ============================================================================
// SUMMARY
// ============================================================================

/// What happened to a dataset on its way to the chart.
/// The sentinel counters are diagnostic; aggregation never reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_rows: usize,
    pub complete_rows: usize,
    pub excluded_rows: usize,
    pub invalid_dates: usize,
    pub invalid_idnumbers: usize,
    pub buckets: Vec<AggregateBucket>,
}

impl PipelineSummary {
    pub fn summary(&self) -> String {
        format!(
            "Rows: {}, Complete: {}, Excluded: {}, Disciplines: {}",
            self.total_rows,
            self.complete_rows,
            self.excluded_rows,
            self.buckets.len()
        )
    }

    pub fn max_users_total(&self) -> usize {
        self.buckets.iter().map(|b| b.users_total).max().unwrap_or(0)
    }

    /// Looks a bucket up by its display label.
    pub fn bucket(&self, label: &str) -> Option<&AggregateBucket> {
        self.buckets.iter().find(|b| b.label() == label)
    }
}

pub fn summarize(registrants: &[Registrant]) -> PipelineSummary {
    let buckets = aggregate(registrants);
    let complete_rows: usize = buckets.iter().map(|b| b.users_total).sum();

    PipelineSummary {
        total_rows: registrants.len(),
        complete_rows,
        excluded_rows: registrants.len() - complete_rows,
        invalid_dates: registrants
            .iter()
            .filter(|r| !r.has_valid_last_access())
            .count(),
        invalid_idnumbers: registrants
            .iter()
            .filter(|r| !r.has_valid_idnumber())
            .count(),
        buckets,
    }
}
