use crate::dates;
use crate::model::{DateRange, MemberId, NewMember, Region, RotaData};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de membres depuis CSV: header `name,email,region[,available][,unavailable]`
pub fn import_members_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NewMember>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let email = rec.get(1).context("missing email")?.trim();
        let region = rec.get(2).context("missing region")?.trim();
        if name.is_empty() || email.is_empty() {
            bail!("invalid member row (empty)");
        }
        let region: Region = region
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid region for {email}"))?;
        let mut member = NewMember::new(name, email, region);
        if let Some(flag) = rec.get(3) {
            let flag = flag.trim();
            if !flag.is_empty() {
                member.available = parse_bool(flag)
                    .with_context(|| format!("invalid available value for {email}"))?;
            }
        }
        if let Some(range) = rec.get(4) {
            let range = range.trim();
            if !range.is_empty() {
                member.unavailable = Some(
                    parse_range(range)
                        .with_context(|| format!("invalid unavailable value for {email}"))?,
                );
            }
        }
        out.push(member);
    }
    Ok(out)
}

/// Ligne de congé importée, rattachée au membre par email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayImport {
    pub email: String,
    pub period: DateRange,
    pub description: Option<String>,
}

/// Import de congés: header `email,start,end[,description]` (YYYY-MM-DD)
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<HolidayImport>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let email = rec.get(0).context("missing email")?.trim();
        let start = rec.get(1).context("missing start")?;
        let end = rec.get(2).context("missing end")?;
        if email.is_empty() {
            bail!("invalid holiday row (empty email)");
        }
        let period = dates::parse_period(start, end)
            .with_context(|| format!("invalid holiday dates for {email}"))?;
        let description = rec
            .get(3)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        out.push(HolidayImport {
            email: email.to_string(),
            period,
            description,
        });
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// `start/end`, `start..end` ou une date seule.
pub fn parse_range(raw: &str) -> anyhow::Result<DateRange> {
    let range = match raw.split_once('/').or_else(|| raw.split_once("..")) {
        Some((start, end)) => dates::parse_period(start, end)?,
        None => DateRange::single(dates::parse_date(raw)?),
    };
    Ok(range)
}

/// Export JSON de toutes les données (jolie mise en forme)
pub fn export_data_json<P: AsRef<Path>>(path: P, data: &RotaData) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(data)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des astreintes: header `id,start,end,us,uk,manual,notes`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, data: &RotaData) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "start", "end", "us", "uk", "manual", "notes"])?;

    let email_of = |id: Option<MemberId>| {
        id.and_then(|id| data.find_member(id))
            .map(|m| m.email.as_str())
            .unwrap_or("")
    };

    let mut assignments: Vec<_> = data.assignments.iter().collect();
    assignments.sort_by_key(|a| (a.period.start, a.id));
    let mut id_buf = itoa::Buffer::new();
    for a in assignments {
        let start = a.period.start.to_string();
        let end = a.period.end.to_string();
        w.write_record([
            id_buf.format(a.id.get()),
            start.as_str(),
            end.as_str(),
            email_of(a.us_member),
            email_of(a.uk_member),
            if a.manual { "manual" } else { "auto" },
            a.notes.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
