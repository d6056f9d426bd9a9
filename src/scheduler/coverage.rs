use crate::model::{Assignment, Region};
use chrono::NaiveDate;
use std::cmp::Reverse;

/// Qui est d'astreinte un jour donné, région par région.
#[derive(Debug, Clone, Copy)]
pub struct DayCoverage<'a> {
    pub date: NaiveDate,
    pub us: Option<&'a Assignment>,
    pub uk: Option<&'a Assignment>,
}

impl<'a> DayCoverage<'a> {
    pub fn for_region(&self, region: Region) -> Option<&'a Assignment> {
        match region {
            Region::Us => self.us,
            Region::Uk => self.uk,
        }
    }
}

/// Les astreintes peuvent se chevaucher : la plus spécifique gagne
/// (période la plus courte, puis la plus récente).
pub fn resolve_day(assignments: &[Assignment], date: NaiveDate) -> DayCoverage<'_> {
    DayCoverage {
        date,
        us: resolve_region(assignments, date, Region::Us),
        uk: resolve_region(assignments, date, Region::Uk),
    }
}

pub fn resolve_region(
    assignments: &[Assignment],
    date: NaiveDate,
    region: Region,
) -> Option<&Assignment> {
    assignments
        .iter()
        .filter(|a| a.period.contains(date) && a.member_for(region).is_some())
        .min_by_key(|a| (a.period.len_days(), Reverse(a.created_at), Reverse(a.id)))
}
