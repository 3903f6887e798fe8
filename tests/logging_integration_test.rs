use axum::response::IntoResponse;
use bus_tracking_api::error::AppError;
use tracing_test::traced_test;

// Clients get a `{message}` body; anything operational goes to the log.

#[traced_test]
#[test]
fn validation_errors_are_logged_as_warnings() {
    let response =
        AppError::Validation("latitude and longitude (numbers) required".to_string())
            .into_response();

    assert_eq!(response.status(), 400);
    assert!(logs_contain("Validation error"));
    assert!(logs_contain("latitude and longitude"));
}

#[traced_test]
#[test]
fn conflict_errors_are_logged_as_warnings() {
    let response = AppError::Conflict("bus_id already exists".to_string()).into_response();

    assert_eq!(response.status(), 409);
    assert!(logs_contain("Conflict"));
}

#[traced_test]
#[test]
fn database_errors_are_logged_but_not_echoed() {
    let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();

    // the client sees a 500; the sqlx detail only appears in the log
    assert_eq!(response.status(), 500);
    assert!(logs_contain("Database error"));
}

#[traced_test]
#[test]
fn auth_failures_map_to_401_and_403() {
    let unauthorized =
        AppError::Unauthorized("Not authorized. Missing token.".to_string()).into_response();
    let forbidden = AppError::Forbidden("Role not permitted".to_string()).into_response();

    assert_eq!(unauthorized.status(), 401);
    assert_eq!(forbidden.status(), 403);
}
