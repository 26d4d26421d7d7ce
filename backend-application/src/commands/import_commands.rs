use chrono::NaiveDate;
use tracing::{info, warn};

use backend_domain::{
    discover_new_members, normalize, ImportOutcome, ImportStatus, NormalizeOutcome, SheetFormat,
};

use crate::commands::{roster_commands, sync_commands};
use crate::{AppError, AppState};

#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub bytes: Vec<u8>,
    pub date: NaiveDate,
    pub tag: String,
    pub tag_filter: Option<String>,
    /// Declared file name or extension; sniffed from the bytes when absent.
    pub format: Option<String>,
    pub add_new_members: bool,
}

/// Decodes, normalizes and stores one uploaded sheet under `(date, tag)`.
/// Empty or filtered-out uploads leave the store untouched.
pub async fn import_sheet(
    state: &AppState,
    request: ImportRequest,
) -> Result<ImportOutcome, AppError> {
    let tag = request.tag.trim().to_string();
    if tag.is_empty() {
        return Err(AppError::BadRequest("tag is required".to_string()));
    }
    let format = SheetFormat::resolve(request.format.as_deref(), &request.bytes);
    if format == SheetFormat::Unknown {
        return Err(AppError::BadRequest("uploaded file is empty".to_string()));
    }
    let table = state
        .sheet_decoder
        .decode(&request.bytes, format)
        .map_err(|err| {
            state.metrics.record_import_error();
            AppError::BadRequest(format!("cannot read spreadsheet: {:#}", err))
        })?;

    let batch = match normalize(&table, request.tag_filter.as_deref()) {
        NormalizeOutcome::Normalized(batch) => batch,
        NormalizeOutcome::NoData { columns, warnings } => {
            warn!("upload for {} {} has no usable rows; columns: {:?}", request.date, tag, columns);
            state.metrics.record_empty_import();
            let mut outcome = ImportOutcome::empty(ImportStatus::NoData, request.date, &tag);
            outcome.source_columns = columns;
            outcome.warnings = warnings;
            return Ok(outcome);
        }
        NormalizeOutcome::NoMatchingData { columns, filter } => {
            warn!("no rows in upload match tag filter '{}'", filter);
            state.metrics.record_empty_import();
            let mut outcome = ImportOutcome::empty(ImportStatus::NoMatchingData, request.date, &tag);
            outcome.source_columns = columns;
            outcome.warnings = vec![format!("no rows match tag filter '{}'", filter)];
            return Ok(outcome);
        }
    };
    for warning in &batch.warnings {
        warn!("import {} {}: {}", request.date, tag, warning);
    }

    let new_members = discover_new_members(&state.roster.read().await, &batch.records);
    let record_count = batch.records.len();
    let replaced_existing = state
        .daily_repo
        .upsert(request.date, &tag, batch.records)
        .await
        .map_err(|err| {
            state.metrics.record_import_error();
            AppError::Internal(err)
        })?;
    state.metrics.record_import(record_count);
    info!(
        "imported {} records for {} under tag {} (replaced: {})",
        record_count, request.date, tag, replaced_existing
    );

    let members_added = if request.add_new_members && !new_members.is_empty() {
        roster_commands::add_discovered_members(state, &new_members).await?
    } else {
        0
    };
    if members_added == 0 {
        sync_commands::auto_sync(state).await;
    }

    Ok(ImportOutcome {
        status: ImportStatus::Imported,
        date: request.date,
        tag,
        record_count,
        dropped_rows: batch.dropped_rows,
        replaced_existing,
        warnings: batch.warnings,
        source_columns: batch.source_columns,
        new_member_ids: new_members.into_iter().map(|m| m.member_id).collect(),
        members_added,
    })
}
