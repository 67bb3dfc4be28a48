use axum::Router;

use crate::state::SharedState;

pub mod control;
pub mod docs;
pub mod health;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(websocket::router())
        .merge(control::router())
        .merge(docs::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn app() -> Router<()> {
        router(AppState::new(AppConfig::default()))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post_json(uri: &str, value: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn healthcheck_reports_connected_displays() {
        let request = Request::get("/healthcheck").body(Body::empty()).expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok", "displays": 0 }));
    }

    #[tokio::test]
    async fn modules_lists_configured_library() {
        let request = Request::get("/modules").body(Body::empty()).expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([{ "name": "slideshow-flickr" }, { "name": "slither" }])
        );
    }

    #[tokio::test]
    async fn play_without_displays_forwards_to_nobody() {
        let response = app()
            .oneshot(post_json("/play", json!({ "module": "slither", "deadline": 1_000 })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "module": "slither", "deadline": 1_000, "clients": [] })
        );
    }

    #[tokio::test]
    async fn play_rejects_bad_requests() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json("/play", json!({ "module": "unknown" })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(post_json("/play", json!({ "module": "" })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json(
                "/clients/00000000-0000-0000-0000-000000000000/play",
                json!({ "module": "slither" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn geometry_replacement_validates_outline() {
        let request = Request::put("/geometry")
            .header("content-type", "application/json")
            .body(Body::from(json!([{ "x": 0.0, "y": 0.0 }]).to_string()))
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn openapi_document_lists_control_routes() {
        let request = Request::get("/api-doc/openapi.json").body(Body::empty()).expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let document = json_body(response).await;
        assert!(document["paths"]["/clients/{id}/play"].is_object());
        assert!(document["paths"]["/ws"].is_object());
    }
}
