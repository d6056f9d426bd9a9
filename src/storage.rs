use crate::model::{
    Assignment, AssignmentHistory, AssignmentId, DateRange, HistoryId, Holiday, HolidayId,
    Member, MemberId, NewAssignment, NewMember, Region, RotaData,
};
use anyhow::{bail, Context};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Opérations enregistrement par enregistrement consommées par le planificateur.
pub trait RecordStore {
    fn list_members(&self) -> anyhow::Result<Vec<Member>>;
    fn list_members_by_region(&self, region: Region) -> anyhow::Result<Vec<Member>>;
    fn get_member(&self, id: MemberId) -> anyhow::Result<Option<Member>>;
    fn create_member(&mut self, member: NewMember) -> anyhow::Result<Member>;
    fn update_member(&mut self, member: Member) -> anyhow::Result<()>;
    /// Supprime aussi les congés et l'historique du membre, ainsi que les
    /// astreintes où il était seul.
    fn delete_member(&mut self, id: MemberId) -> anyhow::Result<()>;

    fn list_holidays_by_member(&self, id: MemberId) -> anyhow::Result<Vec<Holiday>>;
    fn create_holiday(
        &mut self,
        member_id: MemberId,
        period: DateRange,
        description: Option<String>,
    ) -> anyhow::Result<Holiday>;
    fn delete_holiday(&mut self, id: HolidayId) -> anyhow::Result<()>;

    fn list_history(&self) -> anyhow::Result<Vec<AssignmentHistory>>;
    fn list_history_by_member(&self, id: MemberId) -> anyhow::Result<Vec<AssignmentHistory>>;

    fn list_assignments(&self) -> anyhow::Result<Vec<Assignment>>;
    /// Crée l'astreinte et une ligne d'historique par membre renseigné.
    fn create_assignment(&mut self, assignment: NewAssignment) -> anyhow::Result<Assignment>;
    /// Supprime l'astreinte et son historique.
    fn delete_assignment(&mut self, id: AssignmentId) -> anyhow::Result<()>;
}

/// Store en mémoire au-dessus de `RotaData`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: RotaData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: RotaData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &RotaData {
        &self.data
    }

    pub fn into_data(self) -> RotaData {
        self.data
    }

    fn allocate_id(&mut self) -> u64 {
        self.data.next_id += 1;
        self.data.next_id
    }
}

impl RecordStore for MemoryStore {
    fn list_members(&self) -> anyhow::Result<Vec<Member>> {
        Ok(self.data.members.clone())
    }

    fn list_members_by_region(&self, region: Region) -> anyhow::Result<Vec<Member>> {
        Ok(self
            .data
            .members
            .iter()
            .filter(|m| m.region == region)
            .cloned()
            .collect())
    }

    fn get_member(&self, id: MemberId) -> anyhow::Result<Option<Member>> {
        Ok(self.data.find_member(id).cloned())
    }

    fn create_member(&mut self, member: NewMember) -> anyhow::Result<Member> {
        if member.name.trim().is_empty() || member.email.trim().is_empty() {
            bail!("member name and email cannot be empty");
        }
        if self.data.find_member_by_email(&member.email).is_some() {
            bail!("a member with email {} already exists", member.email);
        }
        let created = Member {
            id: MemberId::new(self.allocate_id()),
            name: member.name,
            email: member.email,
            region: member.region,
            available: member.available,
            unavailable: member.unavailable,
        };
        self.data.members.push(created.clone());
        Ok(created)
    }

    fn update_member(&mut self, member: Member) -> anyhow::Result<()> {
        if member.name.trim().is_empty() || member.email.trim().is_empty() {
            bail!("member name and email cannot be empty");
        }
        if let Some(other) = self.data.find_member_by_email(&member.email) {
            if other.id != member.id {
                bail!("a member with email {} already exists", member.email);
            }
        }
        let assigned_in = self.data.assignments.iter().find_map(|a| {
            a.members()
                .find(|(region, id)| *id == member.id && *region != member.region)
                .map(|(region, _)| region)
        });
        if let Some(region) = assigned_in {
            bail!("member {} has assignments in region {region}, cannot move it", member.id);
        }
        let slot = self
            .data
            .members
            .iter_mut()
            .find(|m| m.id == member.id)
            .with_context(|| format!("unknown member {}", member.id))?;
        *slot = member;
        Ok(())
    }

    fn delete_member(&mut self, id: MemberId) -> anyhow::Result<()> {
        let before = self.data.members.len();
        self.data.members.retain(|m| m.id != id);
        if self.data.members.len() == before {
            bail!("unknown member {id}");
        }
        self.data.holidays.retain(|h| h.member_id != id);
        self.data.history.retain(|row| row.member_id != id);
        for assignment in &mut self.data.assignments {
            assignment.clear_member(id);
        }

        // une astreinte sans aucun membre n'a plus lieu d'être
        let orphaned: Vec<AssignmentId> = self
            .data
            .assignments
            .iter()
            .filter(|a| a.us_member.is_none() && a.uk_member.is_none())
            .map(|a| a.id)
            .collect();
        self.data.assignments.retain(|a| !orphaned.contains(&a.id));
        self.data.history.retain(|row| !orphaned.contains(&row.assignment_id));
        Ok(())
    }

    fn list_holidays_by_member(&self, id: MemberId) -> anyhow::Result<Vec<Holiday>> {
        Ok(self
            .data
            .holidays
            .iter()
            .filter(|h| h.member_id == id)
            .cloned()
            .collect())
    }

    fn create_holiday(
        &mut self,
        member_id: MemberId,
        period: DateRange,
        description: Option<String>,
    ) -> anyhow::Result<Holiday> {
        if self.data.find_member(member_id).is_none() {
            bail!("unknown member {member_id}");
        }
        let holiday = Holiday {
            id: HolidayId::new(self.allocate_id()),
            member_id,
            period,
            description: description.filter(|d| !d.trim().is_empty()),
        };
        self.data.holidays.push(holiday.clone());
        Ok(holiday)
    }

    fn delete_holiday(&mut self, id: HolidayId) -> anyhow::Result<()> {
        let before = self.data.holidays.len();
        self.data.holidays.retain(|h| h.id != id);
        if self.data.holidays.len() == before {
            bail!("unknown holiday {id}");
        }
        Ok(())
    }

    fn list_history(&self) -> anyhow::Result<Vec<AssignmentHistory>> {
        Ok(self.data.history.clone())
    }

    fn list_history_by_member(&self, id: MemberId) -> anyhow::Result<Vec<AssignmentHistory>> {
        Ok(self
            .data
            .history
            .iter()
            .filter(|row| row.member_id == id)
            .cloned()
            .collect())
    }

    fn list_assignments(&self) -> anyhow::Result<Vec<Assignment>> {
        Ok(self.data.assignments.clone())
    }

    fn create_assignment(&mut self, assignment: NewAssignment) -> anyhow::Result<Assignment> {
        if assignment.us_member.is_none() && assignment.uk_member.is_none() {
            bail!("assignment needs at least one member");
        }
        for region in Region::ALL {
            let Some(id) = assignment.member_for(region) else {
                continue;
            };
            let member = self
                .data
                .find_member(id)
                .with_context(|| format!("unknown member {id}"))?;
            if member.region != region {
                bail!("member {id} cannot fill the {region} slot");
            }
        }

        let now = Utc::now();
        let created = Assignment {
            id: AssignmentId::new(self.allocate_id()),
            period: assignment.period,
            us_member: assignment.us_member,
            uk_member: assignment.uk_member,
            notes: assignment.notes,
            manual: assignment.manual,
            created_at: now,
        };
        let rows: Vec<(Region, MemberId)> = created.members().collect();
        for (region, member_id) in rows {
            let row = AssignmentHistory {
                id: HistoryId::new(self.allocate_id()),
                assignment_id: created.id,
                member_id,
                region,
                period_end: created.period.end,
                created_at: now,
            };
            self.data.history.push(row);
        }
        self.data.assignments.push(created.clone());
        Ok(created)
    }

    fn delete_assignment(&mut self, id: AssignmentId) -> anyhow::Result<()> {
        let before = self.data.assignments.len();
        self.data.assignments.retain(|a| a.id != id);
        if self.data.assignments.len() == before {
            bail!("unknown assignment {id}");
        }
        self.data.history.retain(|row| row.assignment_id != id);
        Ok(())
    }
}

pub trait Storage {
    /// Charge l'ensemble des enregistrements depuis un support.
    fn load(&self) -> anyhow::Result<RotaData>;
    /// Sauvegarde de manière atomique.
    fn save(&self, data: &RotaData) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Charge le fichier s'il existe, sinon un jeu de données vide.
    pub fn load_or_default(&self) -> anyhow::Result<RotaData> {
        if self.exists() {
            self.load()
        } else {
            Ok(RotaData::default())
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<RotaData> {
        let raw = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let data: RotaData = serde_json::from_slice(&raw).with_context(|| "parsing rota data")?;
        data.validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("validating {}", self.path.display()))?;
        Ok(data)
    }

    fn save(&self, data: &RotaData) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
