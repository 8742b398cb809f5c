//! HTTP API routes
//!
//! Defines all REST API endpoints for the development backend.

use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::geo::proxy::ProxyAddressResponse;
use crate::geo::ReverseGeocoder;
use crate::recommend::{Recommendation, RecommendationRequest, Restaurant};
use crate::server::state::AppState;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Query parameters forwarded to the KMA forecast service
const WEATHER_PARAMS: [&str; 7] = [
    "pageNo",
    "numOfRows",
    "dataType",
    "base_date",
    "base_time",
    "nx",
    "ny",
];

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Result<Router> {
    let cors = cors_layer(&state.config.server.allowed_origins)?;

    Ok(Router::new()
        .route("/", get(root_handler))
        .route("/api/recommend-food", post(recommend_handler))
        .route("/api/reverse-geocode", get(reverse_geocode_handler))
        .route("/api/weather", get(weather_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| Error::Config(format!("Invalid allowed origin {}: {}", o, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Error::Transport(_) | Error::Http(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE")
            }
            Error::UpstreamDataMissing(_) | Error::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            Error::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError::new(status, code, err.to_string())
    }
}

/// Liveness message
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// GET /
async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("mood-menu backend v{} is running", env!("CARGO_PKG_VERSION")),
    })
}

/// Dishes the stub backend rotates through
fn menu() -> Vec<Recommendation> {
    let restaurant = |name: &str, address: &str| Restaurant {
        name: name.to_string(),
        address: address.to_string(),
    };
    vec![
        Recommendation {
            food_name: "Pajeon and makgeolli".to_string(),
            reason: "A crisp scallion pancake with rice wine is the classic answer to grey skies."
                .to_string(),
            average_price: 18000.0,
            calories: 700.0,
            restaurants: vec![
                restaurant("Jeon Alley", "Jongno-gu, Seoul"),
                restaurant("Rainy Day Pub", "Mapo-gu, Seoul"),
                restaurant("Grandma's Jeon", "Jung-gu, Seoul"),
            ],
        },
        Recommendation {
            food_name: "Kimchi jjigae".to_string(),
            reason: "A hot, spicy stew warms you up and lifts a low mood.".to_string(),
            average_price: 9000.0,
            calories: 450.0,
            restaurants: vec![
                restaurant("Stew House", "Jung-gu, Seoul"),
                restaurant("Kimchi Corner", "Seodaemun-gu, Seoul"),
                restaurant("Old Pot", "Yongsan-gu, Seoul"),
            ],
        },
        Recommendation {
            food_name: "Naengmyeon".to_string(),
            reason: "Cold buckwheat noodles are refreshing when it is warm out.".to_string(),
            average_price: 12000.0,
            calories: 550.0,
            restaurants: vec![
                restaurant("Pyongyang Noodles", "Jung-gu, Seoul"),
                restaurant("Icy Bowl", "Gangnam-gu, Seoul"),
                restaurant("Noodle Street", "Jongno-gu, Seoul"),
            ],
        },
        Recommendation {
            food_name: "Bibimbap".to_string(),
            reason: "A balanced bowl that suits almost any weather and mood.".to_string(),
            average_price: 10000.0,
            calories: 600.0,
            restaurants: vec![
                restaurant("Stone Bowl", "Jongno-gu, Seoul"),
                restaurant("Jeonju Table", "Mapo-gu, Seoul"),
                restaurant("Green Rice", "Seocho-gu, Seoul"),
            ],
        },
    ]
}

/// Pick a dish from the prompt bytes so a re-roll (new nonce) can land elsewhere
fn canned_recommendation(prompt: &str) -> Recommendation {
    let mut dishes = menu();
    let index = prompt.bytes().map(usize::from).sum::<usize>() % dishes.len();
    dishes.swap_remove(index)
}

/// POST /api/recommend-food
async fn recommend_handler(
    Json(req): Json<RecommendationRequest>,
) -> std::result::Result<Json<Recommendation>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "EMPTY_PROMPT",
            "prompt must not be empty",
        ));
    }

    info!(prompt = %req.prompt, "recommendation requested");
    Ok(Json(canned_recommendation(&req.prompt)))
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/reverse-geocode?lat=..&lon=..
async fn reverse_geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> std::result::Result<Json<ProxyAddressResponse>, ApiError> {
    let coord = GeoCoordinate::checked(query.lat, query.lon)?;

    let address = state.geocoder.reverse_geocode(coord).await.map_err(|e| {
        warn!(error = %e, %coord, "reverse geocoding failed");
        ApiError::from(e)
    })?;

    Ok(Json(match address {
        Some(address) => ProxyAddressResponse {
            address: Some(address),
            error: None,
        },
        None => ProxyAddressResponse {
            address: None,
            error: Some("address not found".to_string()),
        },
    }))
}

/// GET /api/weather?base_date=..&base_time=..&nx=..&ny=..
///
/// Forwards the forecast query to KMA with the server's key.
async fn weather_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let key = state.kma_key().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "CONFIG_ERROR",
            "weather proxy has no KMA key configured",
        )
    })?;

    let mut query: Vec<(&str, &str)> = WEATHER_PARAMS
        .iter()
        .filter_map(|name| params.get(*name).map(|v| (*name, v.as_str())))
        .collect();
    query.push(("serviceKey", key));

    let response = state
        .client
        .get(&state.config.endpoints.weather)
        .query(&query)
        .send()
        .await
        .map_err(|e| ApiError::from(Error::Transport(format!("KMA request failed: {}", e))))?;

    if !response.status().is_success() {
        return Err(ApiError::from(Error::Transport(format!(
            "KMA returned status: {}",
            response.status()
        ))));
    }

    let body = response.json().await.map_err(|e| {
        ApiError::from(Error::UpstreamDataMissing(format!(
            "Failed to parse KMA response: {}",
            e
        )))
    })?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()).unwrap())
    }

    fn create_test_router() -> Router {
        create_router(create_test_state()).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn recommend_request(prompt: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/recommend-food")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&RecommendationRequest {
                    prompt: prompt.to_string(),
                })
                .unwrap(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let response = create_test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let root: RootResponse = body_json(response).await;
        assert!(root.message.contains("running"));
    }

    #[tokio::test]
    async fn test_recommend_endpoint() {
        let response = create_test_router()
            .oneshot(recommend_request("It is raining and I feel tired"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response).await;
        let rec = crate::recommend::client::parse_recommendation(body).unwrap();
        assert!(!rec.food_name.is_empty());
        assert_eq!(rec.restaurants.len(), 3);
    }

    #[tokio::test]
    async fn test_recommend_rejects_empty_prompt() {
        let response = create_test_router()
            .oneshot(recommend_request("   "))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "EMPTY_PROMPT");
    }

    #[tokio::test]
    async fn test_reverse_geocode_validates_coordinates() {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/reverse-geocode?lat=123&lon=127")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_weather_without_key() {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/weather?base_date=20240115&base_time=0800&nx=60&ny=127")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut config = Config::default();
        config.server.allowed_origins = vec!["bad\norigin".to_string()];
        let state = Arc::new(AppState::new(config).unwrap());
        assert!(create_router(state).is_err());
    }

    #[test]
    fn test_canned_recommendation_is_deterministic() {
        let a = canned_recommendation("same prompt");
        let b = canned_recommendation("same prompt");
        assert_eq!(a, b);
        assert!(menu().contains(&a));
    }
}
