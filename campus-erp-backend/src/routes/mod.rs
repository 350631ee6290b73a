pub mod admissions;
pub mod analytics;
pub mod attendance;
pub mod exams;
pub mod fees;
pub mod health;
pub mod hostel;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::Router;
    use campus_erp_ledger::InMemoryStore;
    use http::header::CONTENT_TYPE;
    use http::{Method, Request, StatusCode};
    use http_body_util::BodyExt as _;
    use serde_json::Value;
    use tower::ServiceExt as _;

    use crate::{fixtures, router, AppState};

    pub fn app() -> (InMemoryStore, Router) {
        let store = InMemoryStore::new(fixtures::demo());
        (store.clone(), router(AppState::new(store)))
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
