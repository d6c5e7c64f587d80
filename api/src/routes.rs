use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::map_page))
        .route("/map", get(handlers::map_page))
        .route("/map/bookmarks", post(handlers::add_bookmark))
        .route("/map/bookmarks/clear", post(handlers::clear_bookmarks))
        .route("/map/geolocation", post(handlers::post_geolocation))
        .route("/population", get(handlers::population_page))
        .route("/stocks", get(handlers::stocks_page))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chrono::NaiveDate;
    use shared::{Config, PriceHistoryProvider, StockBar, StockError, StockSeries};
    use tower::ServiceExt;

    struct FakeProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PriceHistoryProvider for FakeProvider {
        async fn history(&self, ticker: &str, _period: &str) -> Result<StockSeries, StockError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StockError::Provider(format!("No data found for {}", ticker)));
            }
            Ok(StockSeries::from_vec(vec![StockBar {
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                open: 200.0,
                high: 205.5,
                low: 198.25,
                close: 204.0,
                volume: 1_234_567,
            }]))
        }
    }

    fn test_state(fail: bool, csv_path: &str) -> (AppState, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let config = Config {
            population_csv_path: csv_path.to_string(),
            ..Config::default()
        };
        (AppState::with_provider(config, provider.clone()), provider)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie issued")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state(false, "missing.csv");
        let response = router(state).oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_add_then_render_bookmark() {
        let (state, _) = test_state(false, "missing.csv");
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(form_post(
                "/map/bookmarks",
                "name=City+Hall&lat=37.5665&lon=126.9780",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = session_cookie(&response);

        let response = app.oneshot(get("/map", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("City Hall"));
        assert!(html.contains(r#"icon: "user", prefix: "fa", markerColor: "red""#));
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_cookieless_visits_do_not_grow_sessions() {
        let (state, _) = test_state(false, "missing.csv");
        let app = router(state.clone());

        for _ in 0..50 {
            let response = app.clone().oneshot(get("/map", None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().contains_key(header::SET_COOKIE));
        }
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_bookmark_is_rejected_inline() {
        let (state, _) = test_state(false, "missing.csv");
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(form_post("/map/bookmarks", "name=Nowhere&lat=95&lon=10", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let cookie = session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains("latitude 95 is outside -90..90"));

        let response = app
            .oneshot(form_post("/map/bookmarks", "name=&lat=abc&lon=10", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_clear_bookmarks() {
        let (state, _) = test_state(false, "missing.csv");
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(form_post("/map/bookmarks", "name=A&lat=1&lon=2", None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);
        app.clone()
            .oneshot(form_post("/map/bookmarks", "name=B&lat=3&lon=4", Some(&cookie)))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(form_post("/map/bookmarks/clear", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app.oneshot(get("/map", Some(&cookie))).await.unwrap();
        let html = body_text(response).await;
        assert!(!html.contains("<h2>Bookmarks</h2>"));
    }

    #[tokio::test]
    async fn test_geolocation_message_applied_on_next_render() {
        let (state, _) = test_state(false, "missing.csv");
        let app = router(state);

        let response = app.clone().oneshot(get("/map", None)).await.unwrap();
        let cookie = session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains("requestLocation();"));

        let request = Request::builder()
            .method("POST")
            .uri("/map/geolocation")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"error": "User denied Geolocation"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/map", Some(&cookie))).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Could not get your location: User denied Geolocation"));
    }

    #[tokio::test]
    async fn test_stocks_page_renders_chart_and_caches() {
        let (state, provider) = test_state(false, "missing.csv");
        let app = router(state);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(get("/stocks?company=Tesla", None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let html = body_text(response).await;
            assert!(html.contains("Tesla (TSLA)"));
            assert!(html.contains("Plotly.newPlot"));
            assert!(html.contains("1,234,567"));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stocks_page_warns_when_provider_fails() {
        let (state, _) = test_state(true, "missing.csv");
        let response = router(state)
            .oneshot(get("/stocks?company=Apple", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Could not load price data for the selected company"));
        assert!(html.contains(r#"<div class="alert warning">Failed to fetch stock data for"#));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn test_population_page() {
        let path = std::env::temp_dir().join(format!("population-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "행정구역,2025년04월_남_20세,2025년04월_여_20세\n서울특별시,\"10,234\",\"9,876\"\n부산광역시,\"5,000\",\"4,000\"\n",
        )
        .unwrap();
        let (state, _) = test_state(false, path.to_str().unwrap());
        let app = router(state);

        let response = app
            .clone()
            .oneshot(get("/population?region=%EB%B6%80%EC%82%B0%EA%B4%91%EC%97%AD%EC%8B%9C", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Population Pyramid for 부산광역시"));
        assert!(html.contains(r#""x":[-5000]"#));

        let response = app
            .oneshot(get("/population?region=Atlantis", None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Population Pyramid for 서울특별시"));
        assert!(html.contains("Unknown region"));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_population_page_reports_missing_file() {
        let (state, _) = test_state(false, "/definitely/not/here.csv");
        let response = router(state)
            .oneshot(get("/population", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Could not load population data"));
    }
}
