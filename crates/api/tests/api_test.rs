//! Router tests driving the HTTP API through `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rentdesk_api::{AppState, DatabaseBackend, MemoryBackend, create_router};
use rentdesk_core::settings::CatalogSettings;
use rentdesk_core::user::{NewUser, User};
use rentdesk_db::{Migrator, RentalRepository, connect_with};
use rentdesk_shared::{JwtConfig, JwtService, Role};
use rstest::rstest;
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    admin: String,
    employee: String,
}

fn jwt_service() -> JwtService {
    JwtService::new(&JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expiry_secs: 900,
    })
}

const PASSWORD: &str = "desk-password";

fn token_for(jwt: &JwtService, user: &User) -> String {
    jwt.generate_access_token(user.id.into_inner(), &user.name, user.role)
        .unwrap()
}

fn test_app() -> TestApp {
    let jwt = jwt_service();
    let backend = MemoryBackend::new(CatalogSettings::default());
    let admin = backend
        .engine()
        .create_user(NewUser::new("Omar", "omar", PASSWORD, Role::Admin))
        .unwrap();
    let employee = backend
        .engine()
        .create_user(NewUser::new("Sara", "sara", PASSWORD, Role::Employee))
        .unwrap();
    TestApp {
        admin: token_for(&jwt, &admin),
        employee: token_for(&jwt, &employee),
        router: create_router(AppState::new(backend, jwt)),
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn as_employee(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.employee), body).await
    }

    async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.admin), body).await
    }

    async fn create_item(&self, name: &str, rate: &str) -> String {
        let (status, item) = self
            .as_employee(
                Method::POST,
                "/api/v1/items",
                Some(json!({ "name": name, "daily_rate": rate })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        item["id"].as_str().unwrap().to_string()
    }

    async fn create_party(&self, name: &str) -> String {
        let (status, party) = self
            .as_employee(Method::POST, "/api/v1/parties", Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        party["id"].as_str().unwrap().to_string()
    }
}

fn booking_body(party_id: &str, item_ids: &[&str], start: &str, end: &str) -> Value {
    json!({
        "party_id": party_id,
        "item_ids": item_ids,
        "start_date": start,
        "end_date": end,
    })
}

// ============================================================================
// Plumbing
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
}

#[rstest]
#[case(None)]
#[case(Some("not-a-token"))]
#[tokio::test]
async fn test_protected_routes_need_a_valid_token(#[case] token: Option<&str>) {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api/v1/items", token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_for_unknown_account_is_refused() {
    let app = test_app();
    let stranger = jwt_service()
        .generate_access_token(Uuid::new_v4(), "Ghost", Role::Admin)
        .unwrap();
    let (status, body) = app
        .send(Method::GET, "/api/v1/items", Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

// ============================================================================
// Sign-in and accounts
// ============================================================================

#[tokio::test]
async fn test_login_issues_a_working_token() {
    let app = test_app();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": " Sara ", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_eq!(body["user"]["username"], "sara");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["access_token"].as_str().unwrap();
    let (status, me) = app
        .send(Method::GET, "/api/v1/auth/me", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Sara");
    assert_eq!(me["role"], "employee");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "sara", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let app = test_app();
    let lina = json!({ "name": "Lina", "username": "lina", "password": PASSWORD });

    let (status, _) = app.as_employee(Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .as_employee(Method::POST, "/api/v1/users", Some(lina.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .as_admin(Method::POST, "/api/v1/users", Some(lina.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "employee");
    let uri = format!("/api/v1/users/{}", created["id"].as_str().unwrap());

    let (status, body) = app.as_admin(Method::POST, "/api/v1/users", Some(lina)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "USERNAME_TAKEN");

    let (_, listed) = app.as_admin(Method::GET, "/api/v1/users", None).await;
    assert_eq!(listed["meta"]["total"], 3);
    assert_eq!(listed["data"][0]["username"], "lina");

    let (status, updated) = app
        .as_admin(Method::PATCH, &uri, Some(json!({ "phone": "0500000000" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "0500000000");

    let (status, disabled) = app
        .as_admin(
            Method::PUT,
            &format!("{uri}/status"),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disabled["active"], false);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "lina", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "ACCOUNT_DISABLED");

    let (status, _) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = app.as_admin(Method::GET, "/api/v1/users", None).await;
    assert_eq!(listed["meta"]["total"], 2);
    let (_, everyone) = app
        .as_admin(Method::GET, "/api/v1/users?include_deleted=true", None)
        .await;
    assert_eq!(everyone["meta"]["total"], 3);
}

#[tokio::test]
async fn test_disabled_account_loses_access() {
    let app = test_app();
    let (_, me) = app.as_employee(Method::GET, "/api/v1/auth/me", None).await;
    let sara = me["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/users/{sara}/status"),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.as_employee(Method::GET, "/api/v1/items", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "ACCOUNT_DISABLED");
}

#[tokio::test]
async fn test_last_admin_cannot_remove_themselves() {
    let app = test_app();
    let (_, me) = app.as_admin(Method::GET, "/api/v1/auth/me", None).await;
    let uri = format!("/api/v1/users/{}", me["id"].as_str().unwrap());

    let (status, body) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LAST_ADMIN");

    let (status, body) = app
        .as_admin(Method::PATCH, &uri, Some(json!({ "role": "employee" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LAST_ADMIN");
}

// ============================================================================
// Booking lifecycle
// ============================================================================

#[tokio::test]
async fn test_booking_payment_return_flow() {
    let app = test_app();
    let e1 = app.create_item("E1", "300").await;
    let c1 = app.create_party("C1").await;

    let (status, booking) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(&c1, &[&e1], "2024-01-01", "2024-01-03")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "active");
    assert_eq!(booking["total_amount"], "600");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (_, item) = app
        .as_employee(Method::GET, &format!("/api/v1/items/{e1}"), None)
        .await;
    assert_eq!(item["status"], "rented");

    let (status, entry) = app
        .as_employee(
            Method::POST,
            &format!("/api/v1/parties/{c1}/payments"),
            Some(json!({ "amount": "600", "method": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["kind"], "payment");

    let (status, returned) = app
        .as_employee(
            Method::POST,
            &format!("/api/v1/bookings/{booking_id}/return"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "completed");

    let (_, ledger) = app
        .as_employee(Method::GET, &format!("/api/v1/ledger/parties/{c1}"), None)
        .await;
    assert_eq!(ledger["balance"], "0");
    assert_eq!(ledger["entries"].as_array().unwrap().len(), 2);

    let (_, report) = app
        .as_employee(Method::GET, "/api/v1/ledger/reconciliation", None)
        .await;
    assert_eq!(report["mismatches"], json!([]));
}

#[tokio::test]
async fn test_hold_creates_pending_booking() {
    let app = test_app();
    let e1 = app.create_item("E1", "300").await;
    let c1 = app.create_party("C1").await;

    let (status, booking) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings?hold=true",
            Some(booking_body(&c1, &[&e1], "2024-01-01", "2024-01-03")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "pending");

    let (_, item) = app
        .as_employee(Method::GET, &format!("/api/v1/items/{e1}"), None)
        .await;
    assert_eq!(item["status"], "available");

    let (_, listed) = app
        .as_employee(Method::GET, "/api/v1/bookings?status=pending", None)
        .await;
    assert_eq!(listed["meta"]["total"], 1);

    let (status, revenue) = app
        .as_employee(Method::GET, "/api/v1/bookings/revenue", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revenue["revenue"], "0");
    assert_eq!(revenue["pending_bookings"], 1);
    assert_eq!(revenue["pending_value"], "600");

    let booking_id = booking["id"].as_str().unwrap();
    app.as_employee(
        Method::POST,
        &format!("/api/v1/bookings/{booking_id}/activate"),
        None,
    )
    .await;
    let (_, revenue) = app
        .as_employee(Method::GET, "/api/v1/bookings/revenue", None)
        .await;
    assert_eq!(revenue["invoiced_bookings"], 1);
    assert_eq!(revenue["revenue"], "600");
    assert_eq!(revenue["pending_bookings"], 0);
}

#[tokio::test]
async fn test_rule_violations_map_to_codes() {
    let app = test_app();
    let e1 = app.create_item("E1", "300").await;
    let c1 = app.create_party("C1").await;
    let c2 = app.create_party("C2").await;

    let (status, body) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(&c1, &[], "2024-01-01", "2024-01-03")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EMPTY_SELECTION");

    app.as_employee(
        Method::POST,
        "/api/v1/bookings",
        Some(booking_body(&c1, &[&e1], "2024-01-01", "2024-01-03")),
    )
    .await;
    let (status, body) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(&c2, &[&e1], "2024-01-01", "2024-01-03")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ITEM_UNAVAILABLE");

    let (_, booking) = app
        .as_employee(Method::GET, &format!("/api/v1/bookings?party_id={c1}"), None)
        .await;
    let booking_id = booking["data"][0]["id"].as_str().unwrap().to_string();
    let (status, body) = app
        .as_employee(
            Method::POST,
            &format!("/api/v1/parties/{c2}/refunds"),
            Some(json!({ "amount": "100", "booking_id": booking_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "REFUND_PARTY_MISMATCH");

    let (status, body) = app
        .as_employee(
            Method::POST,
            "/api/v1/items",
            Some(json!({ "name": "E2", "daily_rate": "1000000000000001" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "AMOUNT_TOO_LARGE");

    let missing = Uuid::new_v4();
    let (status, body) = app
        .as_employee(Method::GET, &format!("/api/v1/bookings/{missing}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "BOOKING_NOT_FOUND");
}

// ============================================================================
// Admin guard
// ============================================================================

#[tokio::test]
async fn test_delete_booking_requires_admin() {
    let app = test_app();
    let e1 = app.create_item("E1", "300").await;
    let c1 = app.create_party("C1").await;
    let (_, booking) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(&c1, &[&e1], "2024-01-01", "2024-01-03")),
        )
        .await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let (status, body) = app.as_employee(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, party) = app
        .as_employee(Method::GET, &format!("/api/v1/parties/{c1}"), None)
        .await;
    assert_eq!(party["balance"], "0");
    let (_, item) = app
        .as_employee(Method::GET, &format!("/api/v1/items/{e1}"), None)
        .await;
    assert_eq!(item["status"], "available");
}

#[tokio::test]
async fn test_presets_are_admin_only() {
    let app = test_app();

    let (status, _) = app
        .as_employee(Method::POST, "/api/v1/settings/preset/cars", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, settings) = app
        .as_admin(Method::POST, "/api/v1/settings/preset/cars", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["app_name"], "Car Rental");

    let (_, current) = app.as_employee(Method::GET, "/api/v1/settings", None).await;
    assert_eq!(current["app_name"], "Car Rental");

    let (status, body) = app
        .as_admin(Method::POST, "/api/v1/settings/preset/boats", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "UNKNOWN_PRESET");
}

// ============================================================================
// Database backend
// ============================================================================

#[tokio::test]
async fn test_database_backend_serves_the_same_routes() {
    let db = connect_with("sqlite::memory:", 1, 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let jwt = jwt_service();
    let repo = RentalRepository::new(db);
    let admin = repo
        .create_user(NewUser::new("Omar", "omar", PASSWORD, Role::Admin))
        .await
        .unwrap();
    let token = token_for(&jwt, &admin);
    let backend = DatabaseBackend::new(repo, CatalogSettings::default());
    let app = TestApp {
        router: create_router(AppState::new(backend, jwt)),
        admin: token.clone(),
        employee: token,
    };

    let (_, health) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(health["backend"], "database");

    let e1 = app.create_item("E1", "300").await;
    let c1 = app.create_party("C1").await;
    let (status, booking) = app
        .as_employee(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(&c1, &[&e1], "2024-01-01", "2024-01-03")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "active");

    let (_, report) = app
        .as_employee(Method::GET, "/api/v1/ledger/reconciliation", None)
        .await;
    assert_eq!(report["mismatches"], json!([]));
    assert_eq!(report["checked"], 1);

    let (_, revenue) = app
        .as_employee(Method::GET, "/api/v1/bookings/revenue", None)
        .await;
    assert_eq!(revenue["revenue"], "600");

    let (status, login) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "omar", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "admin");
}
