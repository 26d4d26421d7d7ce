use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;

use backend_application::commands::import_commands::{self, ImportRequest};
use backend_application::AppState;
use backend_domain::{parse_date, today, ImportOutcome, ImportQuery};

use crate::error::HttpError;

/// Raw spreadsheet body; `date` defaults to today, `format` falls back to
/// the request content type and then to sniffing.
pub async fn import_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<ImportOutcome>, HttpError> {
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(value) => parse_date(value).map_err(|_| {
            HttpError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", value))
        })?,
        None => today(),
    };
    let format = query.format.or_else(|| format_from_content_type(&headers));
    let outcome = import_commands::import_sheet(
        &state,
        ImportRequest {
            bytes: body.to_vec(),
            date,
            tag: query.tag,
            tag_filter: query.tag_filter,
            format,
            add_new_members: query.add_new_members,
        },
    )
    .await?;
    Ok(Json(outcome))
}

fn format_from_content_type(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let format = match content_type.split(';').next()?.trim() {
        "text/csv" => "csv",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.oasis.opendocument.spreadsheet" => "ods",
        _ => return None,
    };
    Some(format.to_string())
}
