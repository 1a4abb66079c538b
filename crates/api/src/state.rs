use std::sync::Arc;

use cargoscreen_core::import_job::ImportJobRegistry;
use cargoscreen_core::morphology::MorphologyGate;
use cargoscreen_core::register_import::{ArchiveReader, ColumnMapping, SheetReader};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cargoscreen_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of running import jobs, keyed by handle.
    pub registry: Arc<ImportJobRegistry>,
    /// Morphology dictionary used by the matcher and the vocabulary
    /// validation gate.
    pub morphology: Arc<dyn MorphologyGate>,
    /// Header-to-field column mapping, loaded once at startup.
    pub columns: Arc<ColumnMapping>,
    /// Spreadsheet reader seam.
    pub sheet_reader: Arc<dyn SheetReader>,
    /// Archive reader seam.
    pub archive_reader: Arc<dyn ArchiveReader>,
}
