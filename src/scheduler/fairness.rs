use super::snapshot::RosterSnapshot;
use super::FairnessStrategy;
use crate::model::{Member, MemberId, Region};
use chrono::NaiveDate;
use serde::Serialize;

/// Crédit de récence d'un membre jamais assigné.
pub const NEVER_ASSIGNED_DAYS: i64 = 999;

/// Historique agrégé d'un membre dans sa région.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub count: u32,
    pub last_end: Option<NaiveDate>,
}

impl HistoryStats {
    pub fn new(count: u32, last_end: Option<NaiveDate>) -> Self {
        Self { count, last_end }
    }

    /// Ajoute `times` astreintes se terminant au plus tard le `end`.
    pub fn record(&mut self, end: NaiveDate, times: u32) {
        self.count += times;
        self.last_end = Some(self.last_end.map_or(end, |prev| prev.max(end)));
    }

    pub fn days_since_last(&self, on: NaiveDate) -> i64 {
        self.last_end
            .map_or(NEVER_ASSIGNED_DAYS, |end| (on - end).num_days())
    }
}

/// Plus grand = plus légitime pour la prochaine astreinte.
pub fn score(strategy: FairnessStrategy, stats: &HistoryStats, on: NaiveDate) -> i64 {
    let count = i64::from(stats.count);
    match strategy {
        FairnessStrategy::LoadBalancing => -count,
        FairnessStrategy::RecencyWeighted => 2 * stats.days_since_last(on) + 3 * (10 - count),
    }
}

/// Choisit parmi `candidates` (triés par id croissant) le meilleur score.
///
/// Sans curseur, l'égalité revient au plus petit id. Avec curseur, on tourne
/// parmi les ex aequo et le curseur avance à chaque sélection.
pub fn select<'a, F>(
    strategy: FairnessStrategy,
    candidates: &[&'a Member],
    stats_of: F,
    on: NaiveDate,
    rotation: Option<&mut usize>,
) -> Option<&'a Member>
where
    F: Fn(MemberId) -> HistoryStats,
{
    let scored: Vec<(i64, &'a Member)> = candidates
        .iter()
        .map(|m| (score(strategy, &stats_of(m.id), on), *m))
        .collect();
    let best = scored.iter().map(|(s, _)| *s).max()?;
    let mut tied: Vec<&'a Member> = scored
        .into_iter()
        .filter(|(s, _)| *s == best)
        .map(|(_, m)| m)
        .collect();
    tied.sort_by_key(|m| m.id);

    match rotation {
        Some(cursor) => {
            let chosen = tied[*cursor % tied.len()];
            *cursor += 1;
            Some(chosen)
        }
        None => tied.first().copied(),
    }
}

/// Ligne du rapport d'équité.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FairnessEntry {
    pub member_id: MemberId,
    pub name: String,
    pub region: Region,
    pub count: u32,
    pub last_end: Option<NaiveDate>,
}

/// Compteurs par membre, région par région, du moins au plus sollicité.
pub fn fairness_report(snapshot: &RosterSnapshot) -> Vec<FairnessEntry> {
    let mut out: Vec<FairnessEntry> = snapshot
        .members()
        .iter()
        .map(|m| {
            let stats = snapshot.history_of(m.id);
            FairnessEntry {
                member_id: m.id,
                name: m.name.clone(),
                region: m.region,
                count: stats.count,
                last_end: stats.last_end,
            }
        })
        .collect();
    out.sort_by_key(|e| (e.region, e.count, e.member_id));
    out
}
