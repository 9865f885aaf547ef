//! Car listing, creation and deletion handlers.

use crate::api::flash::{redirect_with_flash, take_flash, with_set_cookie};
use crate::api::models::cars::{CarForm, CarsPage};
use crate::db::errors::DbError;
use crate::db::handlers::repository::Repository;
use crate::db::models::cars::{CarCreateDBRequest, CarDBResponse};
use crate::db::models::customers::CustomerDBResponse;
use crate::types::CarId;
use crate::validation::validate_year;
use crate::errors::Result;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    Form,
};
use tracing::info;

/// `GET /cars`
pub async fn list_cars(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let mut conn = state.conn().await?;
    let cars = CarDBResponse::list_with_owners(&mut conn).await?;
    let customers = CustomerDBResponse::list_names(&mut conn).await?;

    let (flash, clear) = take_flash(&headers);
    let response = Json(CarsPage {
        cars,
        customers,
        flash,
    })
    .into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}

/// `POST /cars`
pub async fn create_car(
    State(state): State<AppState>,
    Form(form): Form<CarForm>,
) -> Result<Response> {
    let name = form.name.trim().to_string();
    let model = form.model.trim().to_string();
    let engine_type = form.engine_type.trim().to_string();
    let customer_id = form.customer_id.trim().parse::<i64>().ok();

    if name.is_empty() || model.is_empty() || engine_type.is_empty() || customer_id.is_none() {
        return Ok(redirect_with_flash("/cars", "Please fill in all required fields."));
    }
    if !validate_year(&form.year) {
        return Ok(redirect_with_flash("/cars", "Please enter a valid year."));
    }
    // Just validated as an in-range integer
    let year: i32 = form.year.trim().parse().unwrap_or_default();

    let license_plate = {
        let trimmed = form.license_plate.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };
    let vin = {
        let trimmed = form.vin.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    let mut conn = state.conn().await?;
    let request = CarCreateDBRequest {
        name,
        model,
        year,
        engine_type,
        customer_id: customer_id.unwrap_or_default(),
        license_plate,
        vin,
    };
    match CarDBResponse::create(&mut conn, &request).await {
        Ok(car) => {
            info!(car_id = car.id, "Car created");
            Ok(redirect_with_flash("/cars", "Car added successfully!"))
        }
        Err(
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::CheckViolation { .. },
        ) => Ok(redirect_with_flash("/cars", "Error: This car may already exist.")),
        Err(err) => Err(err.into()),
    }
}

/// `POST /delete_car/{id}` - admin only, blocked while service records exist.
pub async fn delete_car(
    State(state): State<AppState>,
    Path(car_id): Path<CarId>,
) -> Result<Response> {
    let mut conn = state.conn().await?;

    let Some(car) = CarDBResponse::get_by_id(&mut conn, car_id).await? else {
        return Ok(redirect_with_flash("/cars", "Car not found."));
    };

    match CarDBResponse::delete(&mut conn, car_id).await {
        Ok(()) => {
            info!(car_id, "Car deleted");
            Ok(redirect_with_flash(
                "/cars",
                &format!("Car '{} {}' has been deleted successfully.", car.name, car.model),
            ))
        }
        Err(DbError::ProtectedEntity { reason, .. }) => Ok(redirect_with_flash(
            "/cars",
            &format!("Cannot delete car '{} {}' - {reason}.", car.name, car.model),
        )),
        Err(err) => Err(err.into()),
    }
}
