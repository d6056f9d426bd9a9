#![forbid(unsafe_code)]
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use support_rota::{
    dates, io,
    model::{AssignmentId, HolidayId, Member, MemberId, NewAssignment, NewMember, Region},
    scheduler::{AutoAssignRequest, ConflictQuery, ConflictSource, FairnessStrategy, RotaError},
    storage::{JsonStorage, MemoryStore, RecordStore, Storage},
    Rota, RotaConfig,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des astreintes support US/UK
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des données
    #[arg(long, global = true, default_value = "rota.json")]
    data: String,

    /// Fichier JSON de configuration (optionnel)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un membre
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// us | uk
        #[arg(long)]
        region: Region,
    },

    /// Importer des membres depuis un CSV
    ImportMembers {
        #[arg(long)]
        csv: String,
    },

    /// Marquer un membre disponible ou non pour les assignations
    SetAvailability {
        #[arg(long)]
        email: String,
        #[arg(long, action = clap::ArgAction::Set)]
        available: bool,
    },

    /// Supprimer un membre (et ses congés)
    RemoveMember {
        #[arg(long)]
        email: String,
    },

    /// Déclarer un congé
    AddHoliday {
        #[arg(long)]
        email: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        end: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Importer des congés depuis un CSV
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Supprimer un congé
    RemoveHoliday {
        #[arg(long)]
        id: u64,
    },

    /// Créer une astreinte manuelle
    Assign {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// email du membre US
        #[arg(long)]
        us: Option<String>,
        /// email du membre UK
        #[arg(long)]
        uk: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
        /// Ignorer les conflits de congés
        #[arg(long)]
        force: bool,
    },

    /// Assignation automatique (période donnée ou prochaine semaine exploitable)
    AutoAssign {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// load-balancing | recency-weighted
        #[arg(long)]
        strategy: Option<FairnessStrategy>,
        /// Date de référence (défaut : aujourd'hui, UTC)
        #[arg(long)]
        today: Option<String>,
        #[arg(long)]
        weeks: Option<u32>,
        /// Afficher le plan sans l'enregistrer
        #[arg(long)]
        dry_run: bool,
    },

    /// Trouver la prochaine semaine où chaque région a un membre libre
    FindWeek {
        #[arg(long)]
        today: Option<String>,
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// Supprimer une astreinte (et son historique)
    Unassign {
        #[arg(long)]
        id: u64,
    },

    /// Vérifier les conflits congés / astreintes
    Check {
        /// Une seule astreinte
        #[arg(long)]
        id: Option<u64>,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Qui est d'astreinte à une date
    Coverage {
        #[arg(long)]
        date: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        /// Seulement les astreintes en cours ou à venir
        #[arg(long)]
        upcoming: bool,
        /// Date de référence pour --upcoming (défaut : aujourd'hui, UTC)
        #[arg(long)]
        today: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Compteurs d'astreintes par membre
    Fairness,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = RotaConfig::load_or_default(cli.config.as_deref())?;
    let storage = JsonStorage::open(&cli.data)?;
    let store = MemoryStore::from_data(storage.load_or_default()?);
    let mut rota = Rota::with_config(store, config);

    let code = run(cli.cmd, &mut rota, &storage)?;
    std::process::exit(code);
}

fn run(cmd: Commands, rota: &mut Rota<MemoryStore>, storage: &JsonStorage) -> Result<i32> {
    let code = match cmd {
        Commands::AddMember { name, email, region } => {
            let member = rota
                .store_mut()
                .create_member(NewMember::new(name, email, region))?;
            storage.save(rota.store().data())?;
            println!("Member {} added ({})", member.id, member.region);
            0
        }
        Commands::ImportMembers { csv } => {
            let members = io::import_members_csv(csv)?;
            let count = members.len();
            for member in members {
                rota.store_mut().create_member(member)?;
            }
            storage.save(rota.store().data())?;
            println!("{count} member(s) imported");
            0
        }
        Commands::SetAvailability { email, available } => {
            let mut member = member_by_email(rota, &email)?;
            member.available = available;
            rota.store_mut().update_member(member)?;
            storage.save(rota.store().data())?;
            0
        }
        Commands::RemoveMember { email } => {
            let member = member_by_email(rota, &email)?;
            rota.store_mut().delete_member(member.id)?;
            storage.save(rota.store().data())?;
            0
        }
        Commands::AddHoliday {
            email,
            start,
            end,
            description,
        } => {
            let member = member_by_email(rota, &email)?;
            let period = dates::parse_period(&start, &end)?;
            let holiday = rota
                .store_mut()
                .create_holiday(member.id, period, description)?;
            storage.save(rota.store().data())?;
            println!("Holiday {} added for {} ({})", holiday.id, member.name, period);
            0
        }
        Commands::ImportHolidays { csv } => {
            let rows = io::import_holidays_csv(csv)?;
            let count = rows.len();
            for row in rows {
                let member = member_by_email(rota, &row.email)?;
                rota.store_mut()
                    .create_holiday(member.id, row.period, row.description)?;
            }
            storage.save(rota.store().data())?;
            println!("{count} holiday(s) imported");
            0
        }
        Commands::RemoveHoliday { id } => {
            rota.store_mut().delete_holiday(HolidayId::new(id))?;
            storage.save(rota.store().data())?;
            0
        }
        Commands::Assign {
            start,
            end,
            us,
            uk,
            notes,
            force,
        } => {
            let period = dates::parse_period(&start, &end)?;
            let us = us.map(|email| member_by_email(rota, &email).map(|m| m.id)).transpose()?;
            let uk = uk.map(|email| member_by_email(rota, &email).map(|m| m.id)).transpose()?;
            let draft = NewAssignment::manual(period, us, uk).with_notes(notes);
            match rota.create_assignment(draft, force) {
                Ok(assignment) => {
                    storage.save(rota.store().data())?;
                    println!("Assignment {} created ({})", assignment.id, assignment.period);
                    0
                }
                Err(RotaError::Conflicting(report)) => {
                    eprintln!("Assignment blocked by holidays (use --force to override):");
                    for c in &report.conflicting_members {
                        eprintln!("  {} ({}) unavailable {}", c.member.name, c.region.label(), c.period);
                    }
                    1
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::AutoAssign {
            start,
            end,
            strategy,
            today,
            weeks,
            dry_run,
        } => {
            let today = today_or(today.as_deref())?;
            let start = start.as_deref().map(dates::parse_date).transpose()?;
            let end = end.as_deref().map(dates::parse_date).transpose()?;
            let request = AutoAssignRequest {
                start,
                end,
                today,
                strategy,
                horizon_weeks: weeks,
            };

            if dry_run {
                let (period, strategy) = rota.resolve_request(&request)?;
                let plan = rota.plan_period(period, strategy)?;
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(if plan.skipped_days.is_empty() { 0 } else { 2 });
            }

            match rota.auto_assign(request) {
                Ok(report) => {
                    storage.save(rota.store().data())?;
                    println!(
                        "{} assignment(s) created for {} ({:?}, {})",
                        report.assignments.len(),
                        report.period,
                        report.mode,
                        report.strategy
                    );
                    for skipped in &report.skipped_days {
                        eprintln!("Skipped {}: {}", skipped.date, skipped.reason);
                    }
                    // Code 2 = WARNING/INCOMPLETE
                    if report.is_partial() {
                        2
                    } else {
                        0
                    }
                }
                Err(RotaError::NoCandidate { period, conflicts }) => {
                    eprintln!("No assignment possible for {period}");
                    for c in &conflicts {
                        eprintln!("  {c}");
                    }
                    1
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::FindWeek { today, weeks } => {
            let today = today_or(today.as_deref())?;
            let weeks = weeks.unwrap_or(rota.config().horizon_weeks);
            let week = rota.find_next_available_week(today, weeks)?;
            println!("{} {}", week.start, week.end);
            0
        }
        Commands::Unassign { id } => {
            rota.delete_assignment(AssignmentId::new(id))?;
            storage.save(rota.store().data())?;
            0
        }
        Commands::Check { id, report } => {
            let conflicts = match id {
                Some(id) => {
                    let id = AssignmentId::new(id);
                    let assignment = rota
                        .store()
                        .list_assignments()?
                        .into_iter()
                        .find(|a| a.id == id)
                        .ok_or_else(|| anyhow!("unknown assignment: {id}"))?;
                    let found = rota.check_conflicts(&ConflictQuery::from(&assignment))?;
                    if found.has_conflict {
                        vec![(assignment, found)]
                    } else {
                        Vec::new()
                    }
                }
                None => rota.scan_conflicts()?,
            };
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflicting assignment(s)", conflicts.len());
                for (assignment, found) in &conflicts {
                    for c in &found.conflicting_members {
                        eprintln!(
                            "  assignment {} ({}): {} on holiday {}",
                            assignment.id, assignment.period, c.member.name, c.period
                        );
                    }
                }
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["assignment_id", "member_id", "region", "source", "start", "end"])?;
                    for (assignment, found) in &conflicts {
                        for c in &found.conflicting_members {
                            w.write_record([
                                assignment.id.to_string(),
                                c.member.id.to_string(),
                                c.region.to_string(),
                                match c.source {
                                    ConflictSource::Legacy => "legacy".to_string(),
                                    ConflictSource::Holiday(id) => format!("holiday:{id}"),
                                },
                                c.period.start.to_string(),
                                c.period.end.to_string(),
                            ])?;
                        }
                    }
                    w.flush()?;
                }
                2
            }
        }
        Commands::Coverage { date } => {
            let date = today_or(date.as_deref())?;
            let (us, uk) = rota.coverage_on(date)?;
            for (region, assignment) in [(Region::Us, us), (Region::Uk, uk)] {
                let name = assignment
                    .and_then(|a| a.member_for(region))
                    .map(|id| name_of(rota, id))
                    .unwrap_or_else(|| "-".to_string());
                println!("{} {} | {}", date, region.label(), name);
            }
            0
        }
        Commands::List {
            upcoming,
            today,
            out_json,
            out_csv,
        } => {
            if let Some(path) = out_json {
                io::export_data_json(path, rota.store().data())?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, rota.store().data())?;
            }
            let mut assignments = if upcoming {
                rota.upcoming(today_or(today.as_deref())?)?
            } else {
                rota.store().list_assignments()?
            };
            assignments.sort_by_key(|a| (a.period.start, a.id));
            // impression compacte
            for a in &assignments {
                let us = a.us_member.map(|id| name_of(rota, id)).unwrap_or_else(|| "-".into());
                let uk = a.uk_member.map(|id| name_of(rota, id)).unwrap_or_else(|| "-".into());
                println!(
                    "{} | {} → {} | US {} | UK {}{}",
                    a.id,
                    a.period.start,
                    a.period.end,
                    us,
                    uk,
                    if a.manual { " | manual" } else { "" }
                );
            }
            0
        }
        Commands::Fairness => {
            for entry in rota.fairness_report()? {
                let last = entry
                    .last_end
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "never".into());
                println!(
                    "{} | {} | {} | last {}",
                    entry.region.label(),
                    entry.name,
                    entry.count,
                    last
                );
            }
            0
        }
    };
    Ok(code)
}

fn today_or(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(dates::parse_date(raw)?),
        None => Ok(Utc::now().date_naive()),
    }
}

fn member_by_email(rota: &Rota<MemoryStore>, email: &str) -> Result<Member> {
    rota.store()
        .data()
        .find_member_by_email(email)
        .cloned()
        .ok_or_else(|| anyhow!("unknown member: {email}"))
}

fn name_of(rota: &Rota<MemoryStore>, id: MemberId) -> String {
    rota.store()
        .data()
        .find_member(id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| id.to_string())
}
