use crate::model::{
    Assignment, DateRange, HolidayId, Member, MemberId, NewAssignment, Region,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stratégie d'équité, choisie selon l'intention de l'appelant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FairnessStrategy {
    /// Le moins sollicité d'abord.
    #[default]
    LoadBalancing,
    /// `2 × jours depuis la dernière astreinte + 3 × (10 − nombre d'astreintes)`.
    RecencyWeighted,
}

impl fmt::Display for FairnessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FairnessStrategy::LoadBalancing => "load-balancing",
            FairnessStrategy::RecencyWeighted => "recency-weighted",
        })
    }
}

impl FromStr for FairnessStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load-balancing" | "load" | "count" => Ok(FairnessStrategy::LoadBalancing),
            "recency-weighted" | "recency" => Ok(FairnessStrategy::RecencyWeighted),
            other => Err(format!(
                "unknown strategy `{other}` (expected load-balancing or recency-weighted)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanMode {
    /// Un même binôme couvre chaque jour ouvré.
    FullPeriod,
    /// Repli jour par jour.
    DayByDay,
}

/// Astreinte d'une journée décidée par le planificateur, pas encore persistée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedAssignment {
    pub day: NaiveDate,
    pub us_member: MemberId,
    pub uk_member: MemberId,
}

impl PlannedAssignment {
    pub fn to_new_assignment(&self, mode: PlanMode) -> NewAssignment {
        let notes = match mode {
            PlanMode::FullPeriod => "auto-assigned",
            PlanMode::DayByDay => "auto-assigned (day by day)",
        };
        NewAssignment::auto(DateRange::single(self.day), self.us_member, self.uk_member)
            .with_notes(notes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub missing: Vec<Region>,
    pub reason: String,
}

impl SkippedDay {
    pub fn new(date: NaiveDate, missing: Vec<Region>) -> Self {
        let reason = missing
            .iter()
            .map(|region| format!("No {} members available", region.label()))
            .collect::<Vec<_>>()
            .join(", ");
        Self { date, missing, reason }
    }
}

/// Résultat pur du planificateur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub period: DateRange,
    pub mode: PlanMode,
    pub assignments: Vec<PlannedAssignment>,
    pub skipped_days: Vec<SkippedDay>,
}

/// Résultat d'une auto-assignation persistée.
#[derive(Debug, Clone, Serialize)]
pub struct AutoAssignReport {
    pub period: DateRange,
    pub mode: PlanMode,
    pub strategy: FairnessStrategy,
    pub assignments: Vec<Assignment>,
    pub skipped_days: Vec<SkippedDay>,
}

impl AutoAssignReport {
    pub fn is_partial(&self) -> bool {
        !self.skipped_days.is_empty()
    }
}

/// Demande d'auto-assignation : période explicite, ou semaine trouvée par le Week-Finder.
#[derive(Debug, Clone, Copy)]
pub struct AutoAssignRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub today: NaiveDate,
    pub strategy: Option<FairnessStrategy>,
    pub horizon_weeks: Option<u32>,
}

impl AutoAssignRequest {
    pub fn next_week(today: NaiveDate) -> Self {
        Self {
            start: None,
            end: None,
            today,
            strategy: None,
            horizon_weeks: None,
        }
    }

    pub fn period(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::next_week(today)
        }
    }

    pub fn with_strategy(mut self, strategy: FairnessStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// Origine d'une indisponibilité.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "id")]
pub enum ConflictSource {
    /// Champ historique `unavailable` du membre.
    Legacy,
    Holiday(HolidayId),
}

/// Membre en conflit. `member.unavailable` porte les dates qui bloquent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictingMember {
    pub member: Member,
    pub region: Region,
    pub source: ConflictSource,
    pub period: DateRange,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicting_members: Vec<ConflictingMember>,
}

impl ConflictReport {
    pub fn new(conflicting_members: Vec<ConflictingMember>) -> Self {
        Self {
            has_conflict: !conflicting_members.is_empty(),
            conflicting_members,
        }
    }
}

/// Astreinte proposée ou existante à vérifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictQuery {
    pub period: DateRange,
    pub us_member: Option<MemberId>,
    pub uk_member: Option<MemberId>,
}

impl ConflictQuery {
    pub fn members(&self) -> impl Iterator<Item = (Region, MemberId)> + '_ {
        [(Region::Us, self.us_member), (Region::Uk, self.uk_member)]
            .into_iter()
            .filter_map(|(region, id)| id.map(|id| (region, id)))
    }
}

impl From<&Assignment> for ConflictQuery {
    fn from(a: &Assignment) -> Self {
        Self {
            period: a.period,
            us_member: a.us_member,
            uk_member: a.uk_member,
        }
    }
}

impl From<&NewAssignment> for ConflictQuery {
    fn from(a: &NewAssignment) -> Self {
        Self {
            period: a.period,
            us_member: a.us_member,
            uk_member: a.uk_member,
        }
    }
}

/// Congé (ou indisponibilité historique) qui bloque une période.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingPeriod {
    pub member_id: MemberId,
    pub member_name: String,
    pub region: Region,
    pub source: ConflictSource,
    pub period: DateRange,
    pub description: Option<String>,
}

impl fmt::Display for BlockingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) on holiday {}",
            self.member_name,
            self.region.label(),
            self.period
        )?;
        if let Some(desc) = &self.description {
            write!(f, ": {desc}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RotaError {
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("start and end dates must be given together")]
    IncompletePeriod,
    #[error("period {0} contains no weekday")]
    NoWeekdays(DateRange),
    #[error("unknown member: {0}")]
    UnknownMember(MemberId),
    #[error("member {member} cannot fill the {region} slot")]
    RegionMismatch { member: MemberId, region: Region },
    #[error("assignment needs at least one member")]
    EmptyAssignment,
    #[error("no assignment possible for {period}: {} blocking holiday(s)", .conflicts.len())]
    NoCandidate {
        period: DateRange,
        conflicts: Vec<BlockingPeriod>,
    },
    #[error("assignment conflicts with the holidays of {} member(s)", .0.conflicting_members.len())]
    Conflicting(ConflictReport),
    #[error("no workable week within {weeks} week(s) from {from}: check availability or assign manually")]
    HorizonExhausted { from: NaiveDate, weeks: u32 },
    #[error("horizon of {weeks} week(s) out of range: expected 1 to {max}")]
    InvalidHorizon { weeks: u32, max: u32 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RotaError {
    /// Erreur de saisie, à corriger par l'appelant.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RotaError::InvalidDate(_)
                | RotaError::InvalidRange { .. }
                | RotaError::IncompletePeriod
                | RotaError::NoWeekdays(_)
                | RotaError::UnknownMember(_)
                | RotaError::RegionMismatch { .. }
                | RotaError::EmptyAssignment
                | RotaError::InvalidHorizon { .. }
        )
    }
}
