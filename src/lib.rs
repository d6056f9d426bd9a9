#![forbid(unsafe_code)]
//! Support rota — planification des astreintes support US/UK (sans BD).
//!
//! - Stockage fichier (JSON), import/export CSV.
//! - Congés par membre, disponibilité jour par jour.
//! - Équité : équilibrage de charge ou pondération par récence.
//! - Plan période complète, repli jour par jour, jours non couverts expliqués.
//! - Dates calendaires uniquement (`YYYY-MM-DD`), aucune heure ni fuseau.

pub mod config;
pub mod dates;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use config::RotaConfig;
pub use model::{
    Assignment, AssignmentHistory, AssignmentId, DateRange, Holiday, HolidayId, Member, MemberId,
    NewAssignment, NewMember, Region, RotaData,
};
pub use scheduler::{
    AutoAssignReport, AutoAssignRequest, ConflictQuery, ConflictReport, FairnessStrategy, Plan,
    PlanMode, Rota, RosterSnapshot, RotaError, SkippedDay,
};
pub use storage::{JsonStorage, MemoryStore, RecordStore, Storage};
