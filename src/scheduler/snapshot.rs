use super::availability::Calendar;
use super::fairness::HistoryStats;
use crate::model::{AssignmentHistory, Holiday, Member, MemberId, Region};
use crate::storage::RecordStore;
use std::collections::HashMap;

/// Photo des entrées du planificateur, lue en une fois avant toute décision.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    members: Vec<Member>,
    holidays: HashMap<MemberId, Vec<Holiday>>,
    history: HashMap<MemberId, HistoryStats>,
    honor_legacy: bool,
}

impl RosterSnapshot {
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> anyhow::Result<Self> {
        let mut members = Vec::new();
        for region in Region::ALL {
            members.extend(store.list_members_by_region(region)?);
        }

        let mut holidays = HashMap::with_capacity(members.len());
        let mut history = HashMap::with_capacity(members.len());
        for member in &members {
            holidays.insert(member.id, store.list_holidays_by_member(member.id)?);
            let rows = store.list_history_by_member(member.id)?;
            history.insert(member.id, aggregate(member, &rows));
        }

        Ok(Self::assemble(members, holidays, history))
    }

    /// Construit une photo sans store (historique déjà agrégé).
    pub fn from_parts(
        members: Vec<Member>,
        holidays: Vec<Holiday>,
        history: HashMap<MemberId, HistoryStats>,
    ) -> Self {
        let mut by_member: HashMap<MemberId, Vec<Holiday>> = HashMap::new();
        for holiday in holidays {
            by_member.entry(holiday.member_id).or_default().push(holiday);
        }
        Self::assemble(members, by_member, history)
    }

    fn assemble(
        mut members: Vec<Member>,
        holidays: HashMap<MemberId, Vec<Holiday>>,
        history: HashMap<MemberId, HistoryStats>,
    ) -> Self {
        members.sort_by_key(|m| m.id);
        Self {
            members,
            holidays,
            history,
            honor_legacy: true,
        }
    }

    pub fn honor_legacy(mut self, honor: bool) -> Self {
        self.honor_legacy = honor;
        self
    }

    pub fn honors_legacy(&self) -> bool {
        self.honor_legacy
    }

    /// Membres triés par id croissant.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn members_in(&self, region: Region) -> impl Iterator<Item = &Member> + '_ {
        self.members.iter().filter(move |m| m.region == region)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn holidays_of(&self, id: MemberId) -> &[Holiday] {
        self.holidays.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn history_of(&self, id: MemberId) -> HistoryStats {
        self.history.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn history(&self) -> &HashMap<MemberId, HistoryStats> {
        &self.history
    }

    pub fn calendar<'a>(&'a self, member: &'a Member) -> Calendar<'a> {
        Calendar::new(member, self.holidays_of(member.id)).honor_legacy(self.honor_legacy)
    }
}

/// Seules les lignes de la région du membre comptent.
fn aggregate(member: &Member, rows: &[AssignmentHistory]) -> HistoryStats {
    rows.iter()
        .filter(|row| row.region == member.region)
        .fold(HistoryStats::default(), |mut acc, row| {
            acc.record(row.period_end, 1);
            acc
        })
}
