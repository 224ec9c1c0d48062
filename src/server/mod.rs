//! HTTP trigger surface (Axum router).
//!
//! - `routes.rs`: handlers for the cron sweep, manual sends, history and
//!   template seeding
//! - `middleware.rs`: API key checks
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::resend::EmailSender;
use crate::service::ReminderService;
use crate::store::Store;

pub mod errors;
pub mod middleware;
pub mod routes;

/// Keys guarding the cron and admin endpoints. `None` locks the endpoint.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub cron: Option<String>,
    pub admin: Option<String>,
}

pub struct AppState<S, E> {
    pub service: Arc<ReminderService<S, E>>,
    pub keys: Arc<ApiKeys>,
}

impl<S, E> Clone for AppState<S, E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            keys: Arc::clone(&self.keys),
        }
    }
}

/// Build the full HTTP router.
pub fn build_app<S, E>(service: Arc<ReminderService<S, E>>, keys: ApiKeys) -> Router
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    let state = AppState {
        service,
        keys: Arc::new(keys),
    };

    Router::new()
        .route("/health", get(routes::health))
        .route("/cron/process-reminders", post(routes::process_reminders::<S, E>))
        .route("/invoices/:invoice_id/send-reminder", post(routes::send_reminder::<S, E>))
        .route("/invoices/:invoice_id/history", get(routes::history::<S, E>))
        .route("/admin/seed-templates", post(routes::seed_templates::<S, E>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use super::*;
    use crate::model::{Client, Invoice};
    use crate::resend::{EmailOptions, ResendError, SendEmailResponse};
    use crate::service::SenderSettings;
    use crate::store::{ClientStore, InvoiceStore, MemoryStore};

    struct AcceptAll;

    impl EmailSender for AcceptAll {
        async fn send_email(&self, _email: &EmailOptions) -> Result<SendEmailResponse, ResendError> {
            Ok(SendEmailResponse { id: "em_test".into() })
        }
    }

    fn app() -> (Router, Arc<ReminderService<MemoryStore, AcceptAll>>) {
        let service = Arc::new(ReminderService::new(
            MemoryStore::new(),
            AcceptAll,
            SenderSettings {
                from: "invoices@studio.test".into(),
                reply_to: None,
            },
        ));
        let keys = ApiKeys {
            cron: Some("cron-key".into()),
            admin: Some("admin-key".into()),
        };
        (build_app(Arc::clone(&service), keys), service)
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(k) = key {
            builder = builder.header("x-api-key", k);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cron_rejects_bad_key_before_processing() {
        let (app, _) = app();
        let resp = app
            .clone()
            .oneshot(post("/cron/process-reminders?userId=u1", Some("wrong")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .oneshot(post("/cron/process-reminders?userId=u1", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cron_requires_user_id() {
        let (app, _) = app();
        let resp = app
            .oneshot(post("/cron/process-reminders", Some("cron-key")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], "User ID is required");
    }

    #[tokio::test]
    async fn cron_returns_counts() {
        let (app, _) = app();
        let resp = app
            .oneshot(post("/cron/process-reminders?userId=u1", Some("cron-key")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["processed"], 0);
        assert_eq!(json["sent"], 0);
        assert_eq!(json["errors"], 0);
    }

    #[tokio::test]
    async fn seed_requires_admin_key() {
        let (app, _) = app();
        let resp = app
            .clone()
            .oneshot(post("/admin/seed-templates", Some("cron-key")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .oneshot(post("/admin/seed-templates", Some("admin-key")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["count"], 24);
    }

    #[tokio::test]
    async fn send_reminder_validates_body() {
        let (app, _) = app();
        let resp = app
            .clone()
            .oneshot(post_json("/invoices/inv-1/send-reminder", serde_json::json!({"userId": "u1"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(post_json(
                "/invoices/inv-1/send-reminder",
                serde_json::json!({"userId": "u1", "level": "urgent"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "invalid_level");
    }

    #[tokio::test]
    async fn send_reminder_maps_not_found_and_ownership() {
        let (app, service) = app();
        let client = Client::new("u1", "Ada", "ada@example.com");
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let invoice = Invoice::new("u1", &client.id, "INV-1", 10.0, due, due);
        service.store().put_client(client).await.unwrap();
        service.store().put_invoice(invoice.clone()).await.unwrap();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/invoices/missing/send-reminder",
                serde_json::json!({"userId": "u1", "level": "gentle"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .clone()
            .oneshot(post_json(
                &format!("/invoices/{}/send-reminder", invoice.id),
                serde_json::json!({"userId": "someone-else", "level": "gentle"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // No templates seeded yet.
        let resp = app
            .oneshot(post_json(
                &format!("/invoices/{}/send-reminder", invoice.id),
                serde_json::json!({"userId": "u1", "level": "gentle"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn send_reminder_rejects_template_for_another_level() {
        let (app, service) = app();
        service.seed_templates().await.unwrap();
        let client = Client::new("u1", "Ada", "ada@example.com");
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let invoice = Invoice::new("u1", &client.id, "INV-1", 10.0, due, due);
        service.store().put_client(client).await.unwrap();
        service.store().put_invoice(invoice.clone()).await.unwrap();
        let final_template = service
            .templates("u1", Some(crate::model::ReminderLevel::Final), None)
            .await
            .unwrap()
            .remove(0);

        let resp = app
            .oneshot(post_json(
                &format!("/invoices/{}/send-reminder", invoice.id),
                serde_json::json!({"userId": "u1", "level": "gentle", "templateId": final_template.id}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "invalid_input");
    }
}
