//! Admin report handler.

use crate::api::flash::{take_flash, with_set_cookie};
use crate::api::models::reports::ReportPage;
use crate::db::models::services::ServiceDBResponse;
use crate::errors::Result;
use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};

/// `GET /report` - aggregate counts per status, revenue figures, and the full
/// service listing. Admin only.
pub async fn report(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let mut conn = state.conn().await?;
    let summary = ServiceDBResponse::report_summary(&mut conn).await?;
    let services = ServiceDBResponse::report_rows(&mut conn).await?;

    let (flash, clear) = take_flash(&headers);
    let response = Json(ReportPage {
        summary,
        services,
        flash,
    })
    .into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}
