use super::availability::Calendar;
use super::fairness::{self, HistoryStats};
use super::snapshot::RosterSnapshot;
use super::{conflicts, FairnessStrategy, Plan, PlanMode, PlannedAssignment, RotaError, SkippedDay};
use crate::model::{DateRange, Member, MemberId, Region};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

/// État mutable d'un appel : compteurs courants et curseurs round-robin par région.
#[derive(Debug, Clone)]
pub(super) struct PlanContext {
    stats: HashMap<MemberId, HistoryStats>,
    cursors: [usize; 2],
}

impl PlanContext {
    fn new(snapshot: &RosterSnapshot) -> Self {
        Self {
            stats: snapshot.history().clone(),
            cursors: [0; 2],
        }
    }

    fn stats(&self, id: MemberId) -> HistoryStats {
        self.stats.get(&id).copied().unwrap_or_default()
    }

    fn record(&mut self, id: MemberId, end: NaiveDate, times: u32) {
        self.stats.entry(id).or_default().record(end, times);
    }
}

pub(super) fn plan_assignments(
    period: DateRange,
    snapshot: &RosterSnapshot,
    strategy: FairnessStrategy,
) -> Result<Plan, RotaError> {
    let weekdays = period.weekdays();
    if weekdays.is_empty() {
        return Err(RotaError::NoWeekdays(period));
    }

    let mut ctx = PlanContext::new(snapshot);

    if let Some(plan) = plan_full_period(period, &weekdays, snapshot, strategy, &mut ctx) {
        return Ok(plan);
    }

    let plan = plan_day_by_day(period, &weekdays, snapshot, strategy, &mut ctx);
    if plan.assignments.is_empty() {
        let conflicts = conflicts::blocking_periods(snapshot, period);
        warn!(%period, blocking = conflicts.len(), "no day of the period could be assigned");
        return Err(RotaError::NoCandidate { period, conflicts });
    }
    Ok(plan)
}

fn candidates<'a, P>(snapshot: &'a RosterSnapshot, region: Region, free: P) -> Vec<&'a Member>
where
    P: Fn(&Calendar<'a>) -> bool,
{
    snapshot
        .members_in(region)
        .filter(|m| {
            let calendar = snapshot.calendar(*m);
            calendar.is_eligible() && free(&calendar)
        })
        .collect()
}

fn plan_full_period(
    period: DateRange,
    weekdays: &[NaiveDate],
    snapshot: &RosterSnapshot,
    strategy: FairnessStrategy,
    ctx: &mut PlanContext,
) -> Option<Plan> {
    let us = candidates(snapshot, Region::Us, |c| c.is_available_on_all(weekdays));
    let uk = candidates(snapshot, Region::Uk, |c| c.is_available_on_all(weekdays));

    let first = weekdays[0];
    let us_pick = fairness::select(strategy, &us, |id| ctx.stats(id), first, None)?;
    let uk_pick = fairness::select(strategy, &uk, |id| ctx.stats(id), first, None)?;

    let days = u32::try_from(weekdays.len()).unwrap_or(u32::MAX);
    let last = weekdays[weekdays.len() - 1];
    ctx.record(us_pick.id, last, days);
    ctx.record(uk_pick.id, last, days);

    debug!(%period, us = %us_pick.id, uk = %uk_pick.id, days, "full period covered by one pair");

    Some(Plan {
        period,
        mode: PlanMode::FullPeriod,
        assignments: weekdays
            .iter()
            .map(|day| PlannedAssignment {
                day: *day,
                us_member: us_pick.id,
                uk_member: uk_pick.id,
            })
            .collect(),
        skipped_days: Vec::new(),
    })
}

// les jours sont traités dans l'ordre : le choix du jour N dépend des compteurs du jour N-1
fn plan_day_by_day(
    period: DateRange,
    weekdays: &[NaiveDate],
    snapshot: &RosterSnapshot,
    strategy: FairnessStrategy,
    ctx: &mut PlanContext,
) -> Plan {
    let mut assignments = Vec::new();
    let mut skipped_days = Vec::new();

    for day in weekdays.iter().copied() {
        let us = candidates(snapshot, Region::Us, |c| c.is_available(day));
        let uk = candidates(snapshot, Region::Uk, |c| c.is_available(day));

        let missing: Vec<Region> = [(Region::Us, &us), (Region::Uk, &uk)]
            .into_iter()
            .filter(|(_, pool)| pool.is_empty())
            .map(|(region, _)| region)
            .collect();
        if !missing.is_empty() {
            let skipped = SkippedDay::new(day, missing);
            warn!(%day, reason = %skipped.reason, "day skipped");
            skipped_days.push(skipped);
            continue;
        }

        let (Some(us_pick), Some(uk_pick)) = (
            pick_rotating(strategy, &us, Region::Us, day, ctx),
            pick_rotating(strategy, &uk, Region::Uk, day, ctx),
        ) else {
            continue;
        };
        ctx.record(us_pick, day, 1);
        ctx.record(uk_pick, day, 1);
        debug!(%day, us = %us_pick, uk = %uk_pick, "day assigned");
        assignments.push(PlannedAssignment {
            day,
            us_member: us_pick,
            uk_member: uk_pick,
        });
    }

    Plan {
        period,
        mode: PlanMode::DayByDay,
        assignments,
        skipped_days,
    }
}

fn pick_rotating(
    strategy: FairnessStrategy,
    pool: &[&Member],
    region: Region,
    day: NaiveDate,
    ctx: &mut PlanContext,
) -> Option<MemberId> {
    let stats = &ctx.stats;
    let cursor = &mut ctx.cursors[region.index()];
    fairness::select(
        strategy,
        pool,
        |id| stats.get(&id).copied().unwrap_or_default(),
        day,
        Some(cursor),
    )
    .map(|m| m.id)
}
