//! Service listing, creation, status transitions and deletion handlers.

use crate::api::flash::{redirect_with_flash, take_flash, with_set_cookie};
use crate::api::models::services::{ServiceForm, ServiceListQuery, ServicesPage};
use crate::api::models::users::CurrentUser;
use crate::db::errors::DbError;
use crate::db::handlers::repository::Repository;
use crate::db::handlers::services::ServiceFilter;
use crate::db::models::cars::CarDBResponse;
use crate::db::models::services::{ServiceCreateDBRequest, ServiceDBResponse, ServiceStatus};
use crate::errors::Result;
use crate::types::ServiceId;
use crate::validation::validate_cost;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    Form,
};
use tracing::info;

/// `GET /services` - filtered listing. Non-admin sessions never see
/// cancelled services.
pub async fn list_services(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ServiceListQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let search = query.search.unwrap_or_default();
    let status_filter = query.status_filter.unwrap_or_default();

    let filter = ServiceFilter {
        search: (!search.is_empty()).then(|| search.clone()),
        status: status_filter.parse::<ServiceStatus>().ok(),
        customer_name: query.customer_filter.clone().filter(|name| !name.is_empty()),
        exclude_cancelled: !user.is_admin(),
    };

    let mut conn = state.conn().await?;
    let services = ServiceDBResponse::list_filtered(&mut conn, &filter).await?;
    let cars = CarDBResponse::list_for_picker(&mut conn).await?;

    let (flash, clear) = take_flash(&headers);
    let response = Json(ServicesPage {
        services,
        cars,
        statuses: ServicesPage::status_options(),
        search,
        status_filter,
        flash,
    })
    .into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}

/// `POST /services`
pub async fn create_service(
    State(state): State<AppState>,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let service_type = form.service_type.trim().to_string();
    let car_id = form.car_id.trim().parse::<i64>().ok();

    if service_type.is_empty() || form.cost.trim().is_empty() || car_id.is_none() {
        return Ok(redirect_with_flash(
            "/services",
            "Please fill in all required fields.",
        ));
    }
    if !validate_cost(&form.cost) {
        return Ok(redirect_with_flash(
            "/services",
            "Please enter a valid cost (must be greater than 0).",
        ));
    }
    // Just validated as a positive float
    let cost: f64 = form.cost.trim().parse().unwrap_or_default();

    let status = if form.status.trim().is_empty() {
        ServiceStatus::Pending
    } else {
        match form.status.trim().parse::<ServiceStatus>() {
            Ok(status) => status,
            Err(_) => {
                return Ok(redirect_with_flash("/services", "Please select a valid status."));
            }
        }
    };

    let description = {
        let trimmed = form.description.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    let mut conn = state.conn().await?;
    let request = ServiceCreateDBRequest {
        service_type,
        cost,
        status,
        car_id: car_id.unwrap_or_default(),
        description,
    };
    match ServiceDBResponse::create(&mut conn, &request).await {
        Ok(service) => {
            info!(service_id = service.id, status = %service.status, "Service created");
            Ok(redirect_with_flash("/services", "Service added successfully!"))
        }
        Err(DbError::ForeignKeyViolation { .. }) => {
            Ok(redirect_with_flash("/services", "Error: Invalid car selection."))
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /start_service/{id}` - Pending -> In Progress.
pub async fn start_service(
    State(state): State<AppState>,
    Path(service_id): Path<ServiceId>,
) -> Result<Response> {
    let mut conn = state.conn().await?;
    match ServiceDBResponse::start(&mut conn, service_id).await {
        Ok(service) => {
            info!(service_id, "Service started");
            Ok(redirect_with_flash(
                "/services",
                &format!("Service '{}' started successfully!", service.service_type),
            ))
        }
        Err(DbError::NotFound) => Ok(redirect_with_flash("/services", "Service not found.")),
        Err(DbError::ProtectedEntity { reason, .. }) => {
            Ok(redirect_with_flash("/services", &reason))
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /end_service/{id}` - Pending or In Progress -> Completed.
pub async fn end_service(
    State(state): State<AppState>,
    Path(service_id): Path<ServiceId>,
) -> Result<Response> {
    let mut conn = state.conn().await?;
    match ServiceDBResponse::finish(&mut conn, service_id).await {
        Ok(service) => {
            info!(service_id, "Service completed");
            Ok(redirect_with_flash(
                "/services",
                &format!("Service '{}' completed successfully!", service.service_type),
            ))
        }
        Err(DbError::NotFound) => Ok(redirect_with_flash("/services", "Service not found.")),
        Err(DbError::ProtectedEntity { reason, .. }) => {
            Ok(redirect_with_flash("/services", &reason))
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /delete_service/{id}` - admin only, unconditional.
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<ServiceId>,
) -> Result<Response> {
    let mut conn = state.conn().await?;

    let Some(service) = ServiceDBResponse::get_by_id(&mut conn, service_id).await? else {
        return Ok(redirect_with_flash("/services", "Service not found."));
    };

    ServiceDBResponse::delete(&mut conn, service_id).await?;
    info!(service_id, "Service deleted");
    Ok(redirect_with_flash(
        "/services",
        &format!(
            "Service '{}' has been deleted successfully.",
            service.service_type
        ),
    ))
}
