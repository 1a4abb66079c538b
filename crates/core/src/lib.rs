//! Pure domain logic for the CargoScreen compliance screening service.
//!
//! This crate has no database or HTTP dependencies. It provides:
//!
//! - The word/phrase matcher and its match-type vocabulary (`word_match`).
//! - The morphology support gate and its lexicon-backed implementation
//!   (`morphology`).
//! - FEACN prefix-rule matching and tariff-code format checks (`feacn`).
//! - The classification decision table (`check_status`).
//! - Register payload resolution, the spreadsheet/archive reader seams,
//!   and header-to-field column mapping (`register_import`).
//! - The in-process import job registry with progress tracking and
//!   cooperative cancellation (`import_job`).

pub mod check_status;
pub mod error;
pub mod feacn;
pub mod import_job;
pub mod morphology;
pub mod pagination;
pub mod register_import;
pub mod types;
pub mod word_match;
