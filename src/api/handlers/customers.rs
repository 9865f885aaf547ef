//! Customer listing, creation and deletion handlers.

use crate::api::flash::{redirect_with_flash, take_flash, with_set_cookie};
use crate::api::models::customers::{CustomerForm, CustomersPage};
use crate::db::errors::DbError;
use crate::db::handlers::repository::Repository;
use crate::db::models::customers::{CustomerCreateDBRequest, CustomerDBResponse};
use crate::errors::{Error, Result};
use crate::types::CustomerId;
use crate::validation::{validate_email, validate_phone};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    Form,
};
use tracing::info;

fn normalize(field: String) -> Option<String> {
    let trimmed = field.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// `GET /customers`
pub async fn list_customers(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let mut conn = state.conn().await?;
    let customers = CustomerDBResponse::list(&mut conn, &()).await?;

    let (flash, clear) = take_flash(&headers);
    let response = Json(CustomersPage { customers, flash }).into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}

/// `POST /customers`
pub async fn create_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let name = form.name.trim().to_string();
    let phone = form.phone.trim().to_string();
    let email = normalize(form.email);
    let address = normalize(form.address);

    if name.is_empty() {
        return Ok(redirect_with_flash("/customers", "Customer name is required."));
    }
    if phone.is_empty() {
        return Ok(redirect_with_flash("/customers", "Phone number is required."));
    }
    if !validate_phone(&phone) {
        return Ok(redirect_with_flash(
            "/customers",
            "Please enter a valid phone number.",
        ));
    }
    if let Some(email) = &email {
        if !validate_email(email) {
            return Ok(redirect_with_flash(
                "/customers",
                "Please enter a valid email address.",
            ));
        }
    }

    let mut conn = state.conn().await?;
    let request = CustomerCreateDBRequest {
        name,
        phone,
        email,
        address,
    };
    match CustomerDBResponse::create(&mut conn, &request).await {
        Ok(customer) => {
            info!(customer_id = customer.id, "Customer created");
            Ok(redirect_with_flash("/customers", "Customer added successfully!"))
        }
        Err(err @ DbError::UniqueViolation { .. }) => Ok(redirect_with_flash(
            "/customers",
            &Error::from(err).user_message(),
        )),
        Err(err) => Err(err.into()),
    }
}

/// `POST /delete_customer/{id}` - admin only, blocked while cars exist.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Response> {
    let mut conn = state.conn().await?;

    let Some(customer) = CustomerDBResponse::get_by_id(&mut conn, customer_id).await? else {
        return Ok(redirect_with_flash("/customers", "Customer not found."));
    };

    match CustomerDBResponse::delete(&mut conn, customer_id).await {
        Ok(()) => {
            info!(customer_id, "Customer deleted");
            Ok(redirect_with_flash(
                "/customers",
                &format!("Customer '{}' has been deleted successfully.", customer.name),
            ))
        }
        Err(DbError::ProtectedEntity { reason, .. }) => Ok(redirect_with_flash(
            "/customers",
            &format!("Cannot delete customer '{}' - {reason}.", customer.name),
        )),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{
        create_test_app, decode_flash_cookie, login_as, provision_user, seed_admin_session,
    };
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_customers_require_login(pool: SqlitePool) {
        let server = create_test_app(pool).await;
        let response = server.get("/customers").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_create_and_list_customer(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;

        let response = server
            .post("/customers")
            .form(&[
                ("name", "Jane Doe"),
                ("phone", "555-010-1234"),
                ("email", "jane@example.com"),
                ("address", ""),
            ])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/customers");
        assert_eq!(
            decode_flash_cookie(&response).as_deref(),
            Some("Customer added successfully!")
        );

        let page = server.get("/customers").await;
        page.assert_status_ok();
        let body: Value = page.json();
        assert_eq!(body["customers"].as_array().unwrap().len(), 1);
        assert_eq!(body["customers"][0]["name"], "Jane Doe");
        // Blank address was normalized away
        assert!(body["customers"][0]["address"].is_null());
    }

    #[sqlx::test]
    async fn test_session_survives_pending_flash(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;

        // The POST leaves a flash cookie in the jar alongside the session
        // cookie; the next request must stay authenticated and consume it
        server
            .post("/customers")
            .form(&[("name", "Jane Doe"), ("phone", "555-010-1234")])
            .await;

        let page = server.get("/customers").await;
        page.assert_status_ok();
        let body: Value = page.json();
        assert_eq!(body["flash"], "Customer added successfully!");

        // Flash was one-shot; the session still holds
        let again = server.get("/customers").await;
        again.assert_status_ok();
        let body: Value = again.json();
        assert!(body["flash"].is_null());
    }

    #[sqlx::test]
    async fn test_create_rejects_bad_input(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;

        for (form, expected) in [
            (
                vec![("name", ""), ("phone", "555-010-1234")],
                "Customer name is required.",
            ),
            (vec![("name", "Jane"), ("phone", "")], "Phone number is required."),
            (
                vec![("name", "Jane"), ("phone", "123")],
                "Please enter a valid phone number.",
            ),
            (
                vec![
                    ("name", "Jane"),
                    ("phone", "555-010-1234"),
                    ("email", "not-an-email"),
                ],
                "Please enter a valid email address.",
            ),
        ] {
            let response = server.post("/customers").form(&form).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(decode_flash_cookie(&response).as_deref(), Some(expected));
        }

        let page = server.get("/customers").await;
        let body: Value = page.json();
        assert!(body["customers"].as_array().unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_duplicate_phone_flash(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;
        let form = [("name", "Jane Doe"), ("phone", "555-010-1234")];

        server.post("/customers").form(&form).await;
        let response = server.post("/customers").form(&form).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            decode_flash_cookie(&response).as_deref(),
            Some("A customer with this phone number already exists.")
        );
    }

    #[sqlx::test]
    async fn test_delete_requires_admin(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        provision_user(&pool, "mechanic", "mech-pass", Role::User).await;
        login_as(&server, "mechanic", "mech-pass").await;

        let response = server.post("/delete_customer/1").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/dashboard");
    }

    #[sqlx::test]
    async fn test_delete_blocked_by_cars(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;

        server
            .post("/customers")
            .form(&[("name", "Jane Doe"), ("phone", "555-010-1234")])
            .await;
        server
            .post("/cars")
            .form(&[
                ("name", "Volvo"),
                ("model", "V60"),
                ("year", "2020"),
                ("engine_type", "Diesel"),
                ("customer_id", "1"),
            ])
            .await;

        let response = server.post("/delete_customer/1").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            decode_flash_cookie(&response).as_deref(),
            Some("Cannot delete customer 'Jane Doe' - they have 1 car(s) registered.")
        );
    }

    #[sqlx::test]
    async fn test_delete_success_and_not_found(pool: SqlitePool) {
        let server = seed_admin_session(&pool).await;

        server
            .post("/customers")
            .form(&[("name", "Jane Doe"), ("phone", "555-010-1234")])
            .await;

        let response = server.post("/delete_customer/1").await;
        assert_eq!(
            decode_flash_cookie(&response).as_deref(),
            Some("Customer 'Jane Doe' has been deleted successfully.")
        );

        let missing = server.post("/delete_customer/1").await;
        assert_eq!(
            decode_flash_cookie(&missing).as_deref(),
            Some("Customer not found.")
        );
    }
}
