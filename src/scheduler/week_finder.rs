use super::snapshot::RosterSnapshot;
use super::RotaError;
use crate::dates;
use crate::model::{DateRange, Member, Region};
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

pub const DEFAULT_HORIZON_WEEKS: u32 = 8;
/// Dix ans de semaines.
pub const MAX_HORIZON_WEEKS: u32 = 520;

/// Horizon accepté : entre 1 et `MAX_HORIZON_WEEKS` semaines.
pub fn check_horizon(weeks: u32) -> Result<u32, RotaError> {
    if weeks == 0 || weeks > MAX_HORIZON_WEEKS {
        return Err(RotaError::InvalidHorizon {
            weeks,
            max: MAX_HORIZON_WEEKS,
        });
    }
    Ok(weeks)
}

/// Membres éligibles de la région sans aucun congé dans l'intervalle.
pub fn available_members(snapshot: &RosterSnapshot, region: Region, range: DateRange) -> Vec<&Member> {
    snapshot
        .members_in(region)
        .filter(|m| {
            let calendar = snapshot.calendar(*m);
            calendar.is_eligible() && calendar.is_free_during(range)
        })
        .collect()
}

/// Première semaine lundi → dimanche, à partir du lundi courant ou suivant,
/// où chaque région a au moins un membre libre.
pub(super) fn find_next_available_week(
    today: NaiveDate,
    max_weeks: u32,
    snapshot: &RosterSnapshot,
) -> Result<DateRange, RotaError> {
    let max_weeks = check_horizon(max_weeks)?;
    let first_monday = dates::next_monday(today);

    for offset in 0..max_weeks {
        // fin du calendrier : on s'arrête comme si l'horizon était épuisé
        let Some(week) = first_monday
            .and_then(|monday| monday.checked_add_signed(Duration::weeks(i64::from(offset))))
            .and_then(dates::week_starting)
        else {
            break;
        };
        let workable = Region::ALL
            .into_iter()
            .all(|region| !available_members(snapshot, region, week).is_empty());
        if workable {
            debug!(%week, offset, "workable week found");
            return Ok(week);
        }
    }

    warn!(%today, max_weeks, "no workable week within horizon");
    Err(RotaError::HorizonExhausted {
        from: today,
        weeks: max_weeks,
    })
}
