use super::snapshot::RosterSnapshot;
use super::{BlockingPeriod, ConflictQuery, ConflictReport, ConflictSource, ConflictingMember, RotaError};
use crate::model::DateRange;

pub(super) fn check_conflicts(
    query: &ConflictQuery,
    snapshot: &RosterSnapshot,
) -> Result<ConflictReport, RotaError> {
    let mut out = Vec::new();

    for (region, id) in query.members() {
        let member = snapshot.member(id).ok_or(RotaError::UnknownMember(id))?;
        if member.region != region {
            return Err(RotaError::RegionMismatch { member: id, region });
        }
        let calendar = snapshot.calendar(member);

        // l'ancien champ et la table des congés peuvent signaler le même membre
        if let Some(legacy) = calendar.legacy_range() {
            if legacy.overlaps(&query.period) {
                out.push(ConflictingMember {
                    member: member.clone(),
                    region,
                    source: ConflictSource::Legacy,
                    period: legacy,
                    description: None,
                });
            }
        }

        if let Some(holiday) = calendar
            .holidays()
            .iter()
            .find(|h| h.period.overlaps(&query.period))
        {
            let mut stamped = member.clone();
            stamped.unavailable = Some(holiday.period);
            out.push(ConflictingMember {
                member: stamped,
                region,
                source: ConflictSource::Holiday(holiday.id),
                period: holiday.period,
                description: holiday.description.clone(),
            });
        }
    }

    Ok(ConflictReport::new(out))
}

/// Tous les congés, de tous les membres, qui touchent la période.
pub(super) fn blocking_periods(snapshot: &RosterSnapshot, period: DateRange) -> Vec<BlockingPeriod> {
    let mut out = Vec::new();

    for member in snapshot.members() {
        let calendar = snapshot.calendar(member);
        let block = |source, range: DateRange, description: Option<String>| BlockingPeriod {
            member_id: member.id,
            member_name: member.name.clone(),
            region: member.region,
            source,
            period: range,
            description,
        };

        if let Some(legacy) = calendar.legacy_range().filter(|r| r.overlaps(&period)) {
            out.push(block(ConflictSource::Legacy, legacy, None));
        }
        for holiday in calendar.holidays().iter().filter(|h| h.period.overlaps(&period)) {
            out.push(block(
                ConflictSource::Holiday(holiday.id),
                holiday.period,
                holiday.description.clone(),
            ));
        }
    }

    out
}
