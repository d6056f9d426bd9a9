use crate::model::{DateRange, Holiday, Member};
use chrono::NaiveDate;

/// Calendrier d'un membre : ses congés, et éventuellement l'ancien champ `unavailable`.
#[derive(Debug, Clone, Copy)]
pub struct Calendar<'a> {
    member: &'a Member,
    holidays: &'a [Holiday],
    honor_legacy: bool,
}

impl<'a> Calendar<'a> {
    pub fn new(member: &'a Member, holidays: &'a [Holiday]) -> Self {
        Self {
            member,
            holidays,
            honor_legacy: true,
        }
    }

    pub fn honor_legacy(mut self, honor: bool) -> Self {
        self.honor_legacy = honor;
        self
    }

    /// Le membre peut-il être proposé ? (drapeau `available`)
    pub fn is_eligible(&self) -> bool {
        self.member.available
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        if self.holidays.iter().any(|h| h.period.contains(date)) {
            return false;
        }
        !self.legacy_range().is_some_and(|range| range.contains(date))
    }

    /// Disponible chaque jour calendaire de l'intervalle, pas seulement aux bornes.
    pub fn is_available_for_range(&self, range: DateRange) -> bool {
        range.days().all(|day| self.is_available(day))
    }

    pub fn is_available_on_all(&self, days: &[NaiveDate]) -> bool {
        days.iter().all(|day| self.is_available(*day))
    }

    /// Filtre lâche : aucun congé ne touche l'intervalle.
    pub fn is_free_during(&self, range: DateRange) -> bool {
        if self.holidays.iter().any(|h| h.period.overlaps(&range)) {
            return false;
        }
        !self.legacy_range().is_some_and(|legacy| legacy.overlaps(&range))
    }

    pub fn legacy_range(&self) -> Option<DateRange> {
        if self.honor_legacy {
            self.member.unavailable
        } else {
            None
        }
    }

    pub fn holidays(&self) -> &'a [Holiday] {
        self.holidays
    }
}

pub fn is_available(member: &Member, holidays: &[Holiday], date: NaiveDate) -> bool {
    Calendar::new(member, holidays).is_available(date)
}

pub fn is_available_for_range(member: &Member, holidays: &[Holiday], range: DateRange) -> bool {
    Calendar::new(member, holidays).is_available_for_range(range)
}
