use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dates;

/// Identifiants numériques forts, attribués par le store (auto-incrément).
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifiant fort pour Member
    MemberId
);
record_id!(
    /// Identifiant fort pour Holiday
    HolidayId
);
record_id!(
    /// Identifiant fort pour Assignment
    AssignmentId
);
record_id!(HistoryId);

/// Région de support. Deux pools totalement indépendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Uk,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Us, Region::Uk];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Uk => "uk",
        }
    }

    /// Libellé utilisé dans les messages ("US", "UK").
    pub fn label(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Uk => "UK",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Region::Us => 0,
            Region::Uk => 1,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "uk" => Ok(Region::Uk),
            other => Err(format!("unknown region `{other}` (expected us or uk)")),
        }
    }
}

/// Intervalle de dates calendaires, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("end date must not be before start date".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Nombre de jours calendaires couverts.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// Jours ouvrés (lundi → vendredi) de l'intervalle, dans l'ordre.
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        self.days().filter(|day| dates::is_weekday(*day)).collect()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

fn default_true() -> bool {
    true
}

/// Membre de l'équipe support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub region: Region,
    #[serde(default = "default_true")]
    pub available: bool,
    /// Ancienne indisponibilité unique, antérieure aux `Holiday`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<DateRange>,
}

/// Données d'un membre avant insertion (l'id est attribué par le store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub region: Region,
    pub available: bool,
    pub unavailable: Option<DateRange>,
}

impl NewMember {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E, region: Region) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            region,
            available: true,
            unavailable: None,
        }
    }
}

/// Congé d'un membre (bornes incluses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: HolidayId,
    pub member_id: MemberId,
    #[serde(flatten)]
    pub period: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Astreinte support : un membre US et/ou un membre UK sur une période.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    #[serde(flatten)]
    pub period: DateRange,
    #[serde(default)]
    pub us_member: Option<MemberId>,
    #[serde(default)]
    pub uk_member: Option<MemberId>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub manual: bool,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn member_for(&self, region: Region) -> Option<MemberId> {
        match region {
            Region::Us => self.us_member,
            Region::Uk => self.uk_member,
        }
    }

    /// Couples (région, membre) non vides, US d'abord.
    pub fn members(&self) -> impl Iterator<Item = (Region, MemberId)> + '_ {
        Region::ALL
            .into_iter()
            .filter_map(|region| self.member_for(region).map(|id| (region, id)))
    }

    pub(crate) fn clear_member(&mut self, id: MemberId) {
        if self.us_member == Some(id) {
            self.us_member = None;
        }
        if self.uk_member == Some(id) {
            self.uk_member = None;
        }
    }
}

/// Demande de création d'astreinte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub period: DateRange,
    pub us_member: Option<MemberId>,
    pub uk_member: Option<MemberId>,
    pub notes: String,
    pub manual: bool,
}

impl NewAssignment {
    pub fn manual(period: DateRange, us_member: Option<MemberId>, uk_member: Option<MemberId>) -> Self {
        Self {
            period,
            us_member,
            uk_member,
            notes: String::new(),
            manual: true,
        }
    }

    pub fn auto(period: DateRange, us_member: MemberId, uk_member: MemberId) -> Self {
        Self {
            period,
            us_member: Some(us_member),
            uk_member: Some(uk_member),
            notes: String::new(),
            manual: false,
        }
    }

    pub fn with_notes<N: Into<String>>(mut self, notes: N) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn member_for(&self, region: Region) -> Option<MemberId> {
        match region {
            Region::Us => self.us_member,
            Region::Uk => self.uk_member,
        }
    }
}

/// Historique dénormalisé : une ligne par (astreinte, membre, région).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentHistory {
    pub id: HistoryId,
    pub assignment_id: AssignmentId,
    pub member_id: MemberId,
    pub region: Region,
    /// Fin de l'astreinte parente (sert au calcul de récence).
    pub period_end: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Ensemble des enregistrements persistés
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotaData {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub history: Vec<AssignmentHistory>,
    #[serde(default)]
    pub next_id: u64,
}

impl RotaData {
    pub fn find_member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
    pub fn find_member_by_email<'a>(&'a self, email: &str) -> Option<&'a Member> {
        self.members
            .iter()
            .find(|m| m.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Vérifie les bornes des intervalles et les clés étrangères.
    pub fn validate(&self) -> Result<(), String> {
        let ranges = self
            .members
            .iter()
            .filter_map(|m| m.unavailable)
            .chain(self.holidays.iter().map(|h| h.period))
            .chain(self.assignments.iter().map(|a| a.period));
        for range in ranges {
            if range.end < range.start {
                return Err(format!("invalid range {} > {}", range.start, range.end));
            }
        }
        for holiday in &self.holidays {
            if self.find_member(holiday.member_id).is_none() {
                return Err(format!(
                    "holiday {} references unknown member {}",
                    holiday.id, holiday.member_id
                ));
            }
        }
        for assignment in &self.assignments {
            for (region, id) in assignment.members() {
                match self.find_member(id) {
                    Some(m) if m.region == region => {}
                    Some(_) => {
                        return Err(format!(
                            "assignment {} puts member {id} in the {region} slot of another region",
                            assignment.id
                        ))
                    }
                    None => {
                        return Err(format!(
                            "assignment {} references unknown member {id}",
                            assignment.id
                        ))
                    }
                }
            }
        }
        for row in &self.history {
            if !self.assignments.iter().any(|a| a.id == row.assignment_id) {
                return Err(format!(
                    "history row {} references unknown assignment {}",
                    row.id, row.assignment_id
                ));
            }
        }
        Ok(())
    }
}
