//! Register import and validation jobs.
//!
//! [`start_register_import`] resolves an uploaded payload, creates the
//! register and its parcels, and spawns the validation loop as one
//! independent Tokio task. [`start_register_validation`] spawns the
//! same loop over an existing register. Both return an opaque handle
//! for progress polling and cancellation via the shared
//! [`ImportJobRegistry`].

use cargoscreen_core::error::CoreError;
use cargoscreen_core::import_job::ImportHandle;
use cargoscreen_core::register_import::{resolve_payload, ColumnMapping, MappedRow, SheetData};
use cargoscreen_core::types::DbId;
use serde::Serialize;

use cargoscreen_db::models::parcel::{CreateParcel, ParcelVariant};
use cargoscreen_db::models::register::{CreateRegister, DocumentType};
use cargoscreen_db::repositories::{ParcelRepo, RegisterRepo};

use crate::engine::classify::{classify_and_persist, ClassificationContext};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Result of starting an import or validation job.
#[derive(Debug, Serialize)]
pub struct StartedImport {
    pub handle: ImportHandle,
    pub register_id: DbId,
    pub parcel_count: usize,
}

/// Resolve an uploaded register payload, bulk-insert its parcels, and
/// spawn the validation job. Payload errors are reported synchronously;
/// nothing is persisted in that case.
pub async fn start_register_import(
    state: &AppState,
    document_type: DocumentType,
    filename: &str,
    bytes: &[u8],
) -> AppResult<StartedImport> {
    let sheet = resolve_payload(
        bytes,
        filename,
        state.sheet_reader.as_ref(),
        state.archive_reader.as_ref(),
    )?;

    let register = RegisterRepo::create(
        &state.pool,
        &CreateRegister {
            file_name: filename.to_string(),
            document_type,
        },
    )
    .await?;

    let parcels = build_parcels(&state.columns, register.id, document_type, &sheet);
    let parcel_ids = ParcelRepo::bulk_insert(&state.pool, &parcels).await?;
    RegisterRepo::set_parcel_count(&state.pool, register.id, parcel_ids.len() as i32).await?;

    tracing::info!(
        register_id = register.id,
        file_name = filename,
        parcel_count = parcel_ids.len(),
        "Register imported, starting validation"
    );

    Ok(spawn_validation(state, register.id, parcel_ids))
}

/// Spawn a re-validation job over an already imported register.
pub async fn start_register_validation(
    state: &AppState,
    register_id: DbId,
) -> AppResult<StartedImport> {
    let register = RegisterRepo::find_by_id(&state.pool, register_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Register",
            id: register_id,
        }))?;

    let parcel_ids = ParcelRepo::ids_by_register(&state.pool, register.id).await?;

    tracing::info!(
        register_id = register.id,
        parcel_count = parcel_ids.len(),
        "Starting register re-validation"
    );

    Ok(spawn_validation(state, register.id, parcel_ids))
}

/// Map spreadsheet rows onto parcel create DTOs.
fn build_parcels(
    columns: &ColumnMapping,
    register_id: DbId,
    document_type: DocumentType,
    sheet: &SheetData,
) -> Vec<CreateParcel> {
    sheet
        .rows
        .iter()
        .map(|cells| {
            let row = MappedRow::from_cells(columns, &sheet.headers, cells);
            let variant = match document_type {
                DocumentType::Wbr => ParcelVariant::Wbr {
                    order_number: row.order_number,
                },
                DocumentType::Ozon => ParcelVariant::Ozon {
                    posting_number: row.posting_number,
                },
            };
            CreateParcel {
                register_id,
                tariff_code: row.tariff_code.unwrap_or_default(),
                product_name: row.product_name,
                description: row.description,
                country_code: row.country_code,
                quantity: row.quantity,
                weight_kg: row.weight_kg,
                variant,
            }
        })
        .collect()
}

/// Register a job for the given parcels and spawn its validation loop.
fn spawn_validation(state: &AppState, register_id: DbId, parcel_ids: Vec<DbId>) -> StartedImport {
    let handle = state.registry.register(parcel_ids.len());
    let parcel_count = parcel_ids.len();

    let state = state.clone();
    tokio::spawn(async move {
        run_validation(state, handle, parcel_ids).await;
    });

    StartedImport {
        handle,
        register_id,
        parcel_count,
    }
}

/// The validation loop: classify each parcel in turn, checking the
/// cancellation token at every parcel boundary.
///
/// A single parcel failure keeps that parcel in its prior status and
/// moves on; `import_error_threshold` consecutive failures fail the
/// whole job. Already-written classifications are never rolled back.
async fn run_validation(state: AppState, handle: ImportHandle, parcel_ids: Vec<DbId>) {
    let Some(cancel) = state.registry.cancellation_token(handle) else {
        return;
    };

    let ctx = match ClassificationContext::load(&state.pool).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load classification context");
            state
                .registry
                .fail(handle, format!("Failed to load classification rules: {e}"));
            return;
        }
    };

    let threshold = state.config.import_error_threshold.max(1);
    let mut consecutive_failures: u32 = 0;

    for parcel_id in parcel_ids {
        if cancel.is_cancelled() {
            state.registry.mark_cancelled(handle);
            tracing::info!(%handle, "Validation job cancelled");
            return;
        }

        match classify_and_persist(&state.pool, &ctx, state.morphology.as_ref(), parcel_id).await
        {
            Ok(()) => consecutive_failures = 0,
            Err(e) => {
                tracing::warn!(
                    parcel_id,
                    error = %e,
                    "Parcel classification failed; parcel keeps its prior status"
                );
                consecutive_failures += 1;
                if consecutive_failures >= threshold {
                    state.registry.fail(
                        handle,
                        format!("{consecutive_failures} consecutive classification failures, last: {e}"),
                    );
                    return;
                }
            }
        }

        state.registry.record_processed(handle);
    }

    state.registry.finish(handle);
    tracing::info!(%handle, "Validation job finished");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cargoscreen_core::register_import::ColumnMapping;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> SheetData {
        SheetData {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_build_parcels_maps_fields_and_wbr_variant() {
        let columns = ColumnMapping::default_mapping();
        let sheet = sheet(
            &["ТН ВЭД", "Наименование", "Номер заказа"],
            &[&["8517120000", "Телефон", "WBR-42"]],
        );

        let parcels = build_parcels(&columns, 1, DocumentType::Wbr, &sheet);
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].tariff_code, "8517120000");
        assert_eq!(parcels[0].product_name.as_deref(), Some("Телефон"));
        assert_eq!(
            parcels[0].variant,
            ParcelVariant::Wbr {
                order_number: Some("WBR-42".to_string())
            }
        );
    }

    #[test]
    fn test_build_parcels_ozon_variant_ignores_order_number() {
        let columns = ColumnMapping::default_mapping();
        let sheet = sheet(
            &["ТН ВЭД", "Номер заказа", "Номер отправления"],
            &[&["8517120000", "WBR-42", "OZON-7"]],
        );

        let parcels = build_parcels(&columns, 1, DocumentType::Ozon, &sheet);
        assert_eq!(
            parcels[0].variant,
            ParcelVariant::Ozon {
                posting_number: Some("OZON-7".to_string())
            }
        );
    }

    #[test]
    fn test_build_parcels_missing_code_defaults_empty() {
        let columns = ColumnMapping::default_mapping();
        let sheet = sheet(&["Наименование"], &[&["Телефон"]]);

        let parcels = build_parcels(&columns, 1, DocumentType::Wbr, &sheet);
        assert_eq!(parcels[0].tariff_code, "");
    }
}
