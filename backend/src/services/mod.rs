//! # HTTP Services
//!
//! Every API endpoint lives under `/api`, one sub-module per resource. Each
//! sub-module exposes `configure_routes()` returning its Actix `Scope`, and
//! [`configure`] mounts them all on an application.
//!
//! Handlers run their database work through `web::block` (or, for imports,
//! `tokio::task::spawn_blocking`) and return `Result<HttpResponse, ApiError>`;
//! the error renders itself through `ResponseError`.

pub mod activities;
pub mod areas;
pub mod barangays;
pub mod customers;
pub mod export;
pub mod import;
pub mod interruptions;
pub mod notices;
pub mod personnel;

use crate::error::ApiError;
use actix_web::web;

/// Upper bound on JSON request bodies; import documents can be large.
const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Registers every resource scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(interruptions::configure_routes())
        .service(notices::configure_routes())
        .service(customers::configure_routes())
        .service(activities::configure_routes())
        .service(personnel::configure_routes())
        .service(areas::configure_routes())
        .service(barangays::configure_routes())
        .service(import::configure_routes())
        .service(export::configure_routes());
}

/// JSON extractor settings: 10 MB bodies, and malformed payloads answered
/// with the same error body as every other validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

/// Rejects a required text field that is empty after trimming.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!(
            "field '{}' must not be blank",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeletePolicy;
    use crate::db::testing::temp_database;
    use crate::state::AppState;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn state(policy: DeletePolicy) -> (tempfile::TempDir, AppState) {
        let (dir, db) = temp_database();
        let state = AppState {
            db,
            delete_policy: policy,
            retry_backoff: Duration::ZERO,
        };
        (dir, state)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(json_config())
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn create_then_fetch_an_interruption() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/interruptions")
            .set_json(json!({"date": "2024-01-01", "area": "Zone A", "start_time": "08:00:00"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/api/interruptions/{}", id))
            .to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["area"], "Zone A");
        assert_eq!(fetched["start_time"], "08:00:00");

        let req = test::TestRequest::get()
            .uri("/api/interruptions/by-area/zone%20a")
            .to_request();
        let by_area: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(by_area.len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/interruptions/by-date/2024-01-02")
            .to_request();
        let by_date: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(by_date.is_empty());
    }

    #[actix_web::test]
    async fn unknown_id_is_a_json_404() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/notices/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "not_found");
        assert_eq!(body["entity"], "notice");
        assert_eq!(body["id"], 99);
    }

    #[actix_web::test]
    async fn blank_and_malformed_payloads_are_400() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/interruptions")
            .set_json(json!({"date": "2024-01-01", "area": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/interruptions")
            .set_json(json!({"date": "not a date", "area": "Zone A"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "validation");

        let req = test::TestRequest::get()
            .uri("/api/interruptions/by-date/yesterday")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn child_of_missing_parent_is_a_conflict() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/customers")
            .set_json(json!({"notice_id": 12, "name": "Juan Dela Cruz"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn delete_follows_the_configured_policy() {
        let document = json!([{
            "date": "2024-01-01",
            "area": "Zone A",
            "notices": [{"area": "Zone A", "customers": ["Juan Dela Cruz"]}]
        }]);

        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/import")
            .set_json(&document)
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::delete()
            .uri("/api/interruptions/1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "interruption 1 has dependents");

        let req = test::TestRequest::get().uri("/api/interruptions/1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let cascading = AppState {
            delete_policy: DeletePolicy::Cascade,
            ..state.clone()
        };
        let app = app!(cascading);
        let req = test::TestRequest::delete()
            .uri("/api/interruptions/1")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NO_CONTENT
        );

        let req = test::TestRequest::get().uri("/api/customers").to_request();
        let customers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(customers.is_empty());
    }

    #[actix_web::test]
    async fn import_reports_and_full_data_round_trips() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);
        let document = json!({"interruptions": [
            {
                "date": "2024-01-01",
                "area": "Zone A",
                "notices": [{
                    "area": "Zone A",
                    "customers": ["Juan Dela Cruz"],
                    "personnel": [{"name": "Maria Santos", "position": "Area Engineer"}]
                }]
            },
            {"date": "someday", "area": "Zone B"}
        ]});

        let req = test::TestRequest::post()
            .uri("/api/import")
            .set_json(&document)
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["entries"], 2);
        assert_eq!(report["counts"]["interruptions"]["created"], 1);
        assert_eq!(report["counts"]["interruptions"]["failed"], 1);
        assert_eq!(report["counts"]["personnel"]["created"], 1);
        assert_eq!(report["failures"][0]["index"], 1);
        assert_eq!(report["failures"][0]["kind"], "validation");

        let req = test::TestRequest::get().uri("/api/full-data").to_request();
        let exported: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(exported[0]["notices"][0]["affected_customers"][0], "Juan Dela Cruz");

        let req = test::TestRequest::post()
            .uri("/api/import")
            .set_json(&exported)
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["counts"]["interruptions"]["unchanged"], 1);
        assert_eq!(report["counts"]["customers"]["unchanged"], 1);
        assert_eq!(report["counts"]["customers"]["created"], 0);
        assert!(report["failures"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn interruption_level_rows_are_listed_by_owner() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);
        let document = json!([{
            "date": "2024-03-05",
            "area": "Batangas",
            "affected_customers": ["Acme Rice Mill"],
            "affected_areas": [{"name": "Lipa City", "barangays": ["Sabang"]}],
            "notices": [{"area": "Lipa City", "customers": ["Juan Dela Cruz"]}]
        }]);
        let req = test::TestRequest::post()
            .uri("/api/import")
            .set_json(&document)
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["counts"]["areas"]["created"], 1);
        assert_eq!(report["counts"]["barangays"]["created"], 1);

        let req = test::TestRequest::get()
            .uri("/api/customers?interruption_id=1")
            .to_request();
        let direct: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0]["name"], "Acme Rice Mill");
        assert_eq!(direct[0]["notice_id"], Value::Null);

        let req = test::TestRequest::get()
            .uri("/api/areas?interruption_id=1")
            .to_request();
        let areas: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let area_id = areas[0]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/api/barangays?area_id={}", area_id))
            .to_request();
        let barangays: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(barangays[0]["name"], "Sabang");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/areas/{}", area_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/customers")
            .set_json(json!({"notice_id": 1, "interruption_id": 1, "name": "Both Owners"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn scalar_document_is_rejected() {
        let (_dir, state) = state(DeletePolicy::Reject);
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/import")
            .set_json(json!(42))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
