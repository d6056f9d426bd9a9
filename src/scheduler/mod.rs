mod availability;
mod conflicts;
mod coverage;
mod fairness;
mod planner;
mod snapshot;
mod types;
mod week_finder;

pub use availability::{is_available, is_available_for_range, Calendar};
pub use coverage::{resolve_day, resolve_region, DayCoverage};
pub use fairness::{fairness_report, score, select, FairnessEntry, HistoryStats, NEVER_ASSIGNED_DAYS};
pub use snapshot::RosterSnapshot;
pub use types::{
    AutoAssignReport, AutoAssignRequest, BlockingPeriod, ConflictQuery, ConflictReport,
    ConflictSource, ConflictingMember, FairnessStrategy, Plan, PlanMode, PlannedAssignment,
    RotaError, SkippedDay,
};
pub use week_finder::{available_members, check_horizon, DEFAULT_HORIZON_WEEKS, MAX_HORIZON_WEEKS};

use crate::config::RotaConfig;
use crate::dates;
use crate::model::{Assignment, AssignmentId, DateRange, NewAssignment};
use crate::storage::RecordStore;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Planificateur pur : aucune écriture.
pub fn plan_assignments(
    period: DateRange,
    snapshot: &RosterSnapshot,
    strategy: FairnessStrategy,
) -> Result<Plan, RotaError> {
    planner::plan_assignments(period, snapshot, strategy)
}

pub fn check_conflicts(
    query: &ConflictQuery,
    snapshot: &RosterSnapshot,
) -> Result<ConflictReport, RotaError> {
    conflicts::check_conflicts(query, snapshot)
}

pub fn find_next_available_week(
    today: NaiveDate,
    max_weeks: u32,
    snapshot: &RosterSnapshot,
) -> Result<DateRange, RotaError> {
    week_finder::find_next_available_week(today, max_weeks, snapshot)
}

/// Rota : planificateur branché sur un store
#[derive(Debug, Default)]
pub struct Rota<S: RecordStore> {
    store: S,
    config: RotaConfig,
}

impl<S: RecordStore> Rota<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RotaConfig::default())
    }

    pub fn with_config(store: S, config: RotaConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
    pub fn into_store(self) -> S {
        self.store
    }
    pub fn config(&self) -> &RotaConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Result<RosterSnapshot, RotaError> {
        Ok(RosterSnapshot::load(&self.store)?
            .honor_legacy(self.config.honor_legacy_unavailability))
    }

    /// Aperçu du plan pour une période, sans rien persister.
    pub fn plan_period(
        &self,
        period: DateRange,
        strategy: FairnessStrategy,
    ) -> Result<Plan, RotaError> {
        let snapshot = self.snapshot()?;
        planner::plan_assignments(period, &snapshot, strategy)
    }

    /// Planifie puis crée chaque astreinte. Les créations déjà acquittées restent
    /// en place si une suivante échoue.
    pub fn assign_period(
        &mut self,
        period: DateRange,
        strategy: FairnessStrategy,
    ) -> Result<AutoAssignReport, RotaError> {
        let plan = self.plan_period(period, strategy)?;

        let mut created = Vec::with_capacity(plan.assignments.len());
        for planned in &plan.assignments {
            let assignment = self
                .store
                .create_assignment(planned.to_new_assignment(plan.mode))?;
            created.push(assignment);
        }

        info!(
            %period,
            %strategy,
            created = created.len(),
            skipped = plan.skipped_days.len(),
            "period assigned"
        );

        Ok(AutoAssignReport {
            period,
            mode: plan.mode,
            strategy,
            assignments: created,
            skipped_days: plan.skipped_days,
        })
    }

    /// Période et stratégie retenues pour une demande : période explicite (les
    /// deux bornes) ou prochaine semaine exploitable.
    pub fn resolve_request(
        &self,
        request: &AutoAssignRequest,
    ) -> Result<(DateRange, FairnessStrategy), RotaError> {
        match (request.start, request.end) {
            (Some(start), Some(end)) => {
                let period = dates::checked_range(start, end)?;
                Ok((period, request.strategy.unwrap_or(self.config.period_strategy)))
            }
            (None, None) => {
                let weeks = request.horizon_weeks.unwrap_or(self.config.horizon_weeks);
                let week = self.find_next_available_week(request.today, weeks)?;
                Ok((week, request.strategy.unwrap_or(self.config.next_week_strategy)))
            }
            _ => Err(RotaError::IncompletePeriod),
        }
    }

    pub fn auto_assign(&mut self, request: AutoAssignRequest) -> Result<AutoAssignReport, RotaError> {
        let (period, strategy) = self.resolve_request(&request)?;
        self.assign_period(period, strategy)
    }

    pub fn find_next_available_week(
        &self,
        today: NaiveDate,
        max_weeks: u32,
    ) -> Result<DateRange, RotaError> {
        let snapshot = self.snapshot()?;
        week_finder::find_next_available_week(today, max_weeks, &snapshot)
    }

    pub fn check_conflicts(&self, query: &ConflictQuery) -> Result<ConflictReport, RotaError> {
        let snapshot = self.snapshot()?;
        conflicts::check_conflicts(query, &snapshot)
    }

    /// Astreintes existantes dont un membre est en congé, avec le détail.
    pub fn scan_conflicts(&self) -> Result<Vec<(Assignment, ConflictReport)>, RotaError> {
        let snapshot = self.snapshot()?;
        let mut out = Vec::new();
        for assignment in self.store.list_assignments()? {
            let report = conflicts::check_conflicts(&ConflictQuery::from(&assignment), &snapshot)?;
            if report.has_conflict {
                out.push((assignment, report));
            }
        }
        Ok(out)
    }

    /// Création manuelle, refusée en cas de conflit sauf si `force`.
    pub fn create_assignment(
        &mut self,
        draft: NewAssignment,
        force: bool,
    ) -> Result<Assignment, RotaError> {
        if draft.us_member.is_none() && draft.uk_member.is_none() {
            return Err(RotaError::EmptyAssignment);
        }
        let snapshot = self.snapshot()?;
        // membres inconnus et mauvaise région remontent du contrôle des conflits
        let report = conflicts::check_conflicts(&ConflictQuery::from(&draft), &snapshot)?;
        if report.has_conflict {
            if !force {
                return Err(RotaError::Conflicting(report));
            }
            debug!(period = %draft.period, "conflicts overridden");
        }

        Ok(self.store.create_assignment(draft)?)
    }

    pub fn delete_assignment(&mut self, id: AssignmentId) -> Result<(), RotaError> {
        Ok(self.store.delete_assignment(id)?)
    }

    /// Astreintes en cours ou à venir, triées par date de début.
    pub fn upcoming(&self, today: NaiveDate) -> Result<Vec<Assignment>, RotaError> {
        let mut out: Vec<Assignment> = self
            .store
            .list_assignments()?
            .into_iter()
            .filter(|a| a.period.end >= today)
            .collect();
        out.sort_by_key(|a| (a.period.start, a.id));
        Ok(out)
    }

    /// Astreintes retenues pour `date` (la plus spécifique par région).
    pub fn coverage_on(&self, date: NaiveDate) -> Result<(Option<Assignment>, Option<Assignment>), RotaError> {
        let assignments = self.store.list_assignments()?;
        let day = resolve_day(&assignments, date);
        Ok((day.us.cloned(), day.uk.cloned()))
    }

    pub fn fairness_report(&self) -> Result<Vec<FairnessEntry>, RotaError> {
        Ok(fairness::fairness_report(&self.snapshot()?))
    }
}
