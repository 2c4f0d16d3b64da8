pub mod auth;
pub mod portfolio;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::session::require_session;
use crate::state::AppState;

/// Build the full router. `/add_coin` and `/dashboard` require a session.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/add_coin", post(portfolio::add_coin))
        .route("/dashboard", get(portfolio::dashboard))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(auth::home))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Router over an in-memory store whose price provider is unreachable.
    async fn test_router() -> Router {
        let app = coinfolio::AsyncCoinfolio::builder()
            .in_memory()
            .price_api_base("http://127.0.0.1:9/api/v3")
            .timeout(Duration::from_secs(2))
            .build()
            .await
            .unwrap();
        router(Arc::new(AppState {
            app,
            sessions: SessionStore::default(),
        }))
    }

    fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(resp: &Response) -> &str {
        resp.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    /// Sign up and log in, returning the `name=value` cookie pair.
    async fn login_as(app: &Router, username: &str) -> String {
        let body = format!("username={username}&password=pw");
        let resp = app.clone().oneshot(form("/signup", &body, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.clone().oneshot(form("/login", &body, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn signup_twice_conflicts() {
        let app = test_router().await;
        let body = "username=alice&password=pw";

        let resp = app.clone().oneshot(form("/signup", body, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = json_body(resp).await;
        assert_eq!(json["data"]["username"], "alice");
        assert!(json["data"].get("password").is_none());

        let resp = app.clone().oneshot(form("/signup", body, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(resp).await["error"], "Username already exists!");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_rejected() {
        let app = test_router().await;
        app.clone()
            .oneshot(form("/signup", "username=alice&password=pw", None))
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(form("/login", "username=alice&password=nope", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn protected_routes_redirect_without_session() {
        let app = test_router().await;

        let resp = app.clone().oneshot(get_req("/dashboard", None)).await.unwrap();
        assert!(resp.status().is_redirection());
        assert_eq!(location(&resp), "/login");

        let resp = app
            .clone()
            .oneshot(form("/add_coin", "coin=btc&amount=1&buy_price=1", None))
            .await
            .unwrap();
        assert!(resp.status().is_redirection());

        let resp = app
            .clone()
            .oneshot(get_req("/dashboard", Some("coinfolio_session=forged")))
            .await
            .unwrap();
        assert_eq!(location(&resp), "/login");
    }

    #[tokio::test]
    async fn home_redirects_by_session() {
        let app = test_router().await;

        let resp = app.clone().oneshot(get_req("/", None)).await.unwrap();
        assert_eq!(location(&resp), "/login");

        let cookie = login_as(&app, "alice").await;
        let resp = app.clone().oneshot(get_req("/", Some(&cookie))).await.unwrap();
        assert_eq!(location(&resp), "/dashboard");
    }

    #[tokio::test]
    async fn add_coin_then_dashboard_with_provider_down() {
        let app = test_router().await;
        let cookie = login_as(&app, "alice").await;

        let resp = app
            .clone()
            .oneshot(form(
                "/add_coin",
                "coin=BTC&amount=2&buy_price=100",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(json_body(resp).await["data"]["coin"], "BTC");

        let resp = app
            .clone()
            .oneshot(get_req("/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["username"], "alice");
        assert_eq!(json["portfolio"][0]["value"], 0.0);
        assert_eq!(json["total_value"], 0.0);
        assert_eq!(json["total_profit_loss"], -200.0);
        assert_eq!(json["chart_labels"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn add_coin_rejects_blank_coin() {
        let app = test_router().await;
        let cookie = login_as(&app, "alice").await;

        let resp = app
            .clone()
            .oneshot(form("/add_coin", "coin=+&amount=1&buy_price=1", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = test_router().await;
        let cookie = login_as(&app, "alice").await;

        let resp = app.clone().oneshot(get_req("/logout", Some(&cookie))).await.unwrap();
        assert_eq!(location(&resp), "/login");
        let cleared = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));

        let resp = app
            .clone()
            .oneshot(get_req("/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&resp), "/login");
    }
}
