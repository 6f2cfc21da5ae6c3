/**
 * API REST FOOTCARE - Serveur HTTP du kernel
 *
 * RÔLE :
 * Expose le simulateur de signes vitaux et le store des mesures aux clients
 * (app mobile, dashboard web, scripts de démo).
 *
 * FONCTIONNEMENT :
 * - Routes : /health, /system/health, /api/health-metric-simulate/{next,push}, /api/health-metrics
 * - L'identité arrive déjà résolue dans le header `x-user-id` (posé par la
 *   couche session en amont) ; le kernel ne la vérifie pas
 * - Erreurs de persistance -> 500 + `{message}`, journalisées
 */

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::health::{HealthTracker, KernelHealth};
use crate::models::{HealthMetricRecord, NewHealthMetric, PushOutcome, VitalsSample};
use crate::ports::StoreError;
use crate::simulator::step::ANOMALIES_MAX;
use crate::simulator::{PersistenceError, VitalsSimulator};

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<VitalsSimulator>,
    pub health_tracker: HealthTracker,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/api/health-metric-simulate/next", get(simulate_next))
        .route("/api/health-metric-simulate/push", axum::routing::post(simulate_push))
        .route("/api/health-metrics", get(get_latest_metrics).post(create_metrics))
        .with_state(app_state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing x-user-id header")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to simulate health metrics".to_string(),
            ),
            ApiError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to access health metrics".to_string(),
            ),
        };
        if code.is_server_error() {
            tracing::error!(error = %self, "[http] request failed");
        }
        (code, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health_tracker.get_health(app.simulator.store().as_ref()))
}

// GET /api/health-metric-simulate/next (sans persistance)
async fn simulate_next(State(app): State<AppState>) -> Json<VitalsSample> {
    Json(app.simulator.peek())
}

// POST /api/health-metric-simulate/push (persiste si un utilisateur est connu)
async fn simulate_push(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PushOutcome>, ApiError> {
    let user = user_id(&headers);
    match app.simulator.push_sample(user.as_deref()).await {
        Ok(outcome) => {
            if outcome.is_saved() {
                app.health_tracker.record_persisted();
            }
            Ok(Json(outcome))
        }
        Err(e) => {
            app.health_tracker.record_failure();
            Err(e.into())
        }
    }
}

// GET /api/health-metrics (dernière mesure de l'utilisateur)
async fn get_latest_metrics(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<HealthMetricRecord>>, ApiError> {
    let user = user_id(&headers).ok_or(ApiError::Unauthorized)?;
    let latest = app.simulator.store().latest_health_metrics(&user).await?;
    Ok(Json(latest))
}

/// Saisie manuelle d'une mesure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricInput {
    pub heart_rate: i32,
    pub foot_pressure: f64,
    #[serde(default)]
    pub bluetooth_connected: bool,
    #[serde(default)]
    pub battery_level: u8,
    #[serde(default)]
    pub anomalies_detected: u8,
}

impl MetricInput {
    fn into_metric(self, user_id: String) -> Result<NewHealthMetric, ApiError> {
        if self.heart_rate <= 0 {
            return Err(ApiError::BadRequest("heartRate must be positive".into()));
        }
        if !self.foot_pressure.is_finite() || self.foot_pressure < 0.0 {
            return Err(ApiError::BadRequest("footPressure must be a non-negative number".into()));
        }
        if self.battery_level > 100 {
            return Err(ApiError::BadRequest("batteryLevel must be within 0..=100".into()));
        }
        if self.anomalies_detected > ANOMALIES_MAX as u8 {
            return Err(ApiError::BadRequest("anomaliesDetected must be within 0..=10".into()));
        }
        Ok(NewHealthMetric {
            user_id,
            heart_rate: self.heart_rate,
            foot_pressure: self.foot_pressure,
            bluetooth_connected: self.bluetooth_connected,
            battery_level: self.battery_level,
            anomalies_detected: self.anomalies_detected,
        })
    }
}

// POST /api/health-metrics
async fn create_metrics(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<MetricInput>,
) -> Result<Json<HealthMetricRecord>, ApiError> {
    let user = user_id(&headers).ok_or(ApiError::Unauthorized)?;
    let metric = input.into_metric(user)?;
    let record = app.simulator.store().create_health_metrics(metric).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewHealthMetric;
    use crate::ports::{MemoryStore, MetricsStore, StoreInfo};
    use crate::simulator::RngSource;
    use async_trait::async_trait;

    struct DownStore;

    #[async_trait]
    impl MetricsStore for DownStore {
        async fn create_health_metrics(
            &self,
            _metric: NewHealthMetric,
        ) -> Result<HealthMetricRecord, StoreError> {
            Err(StoreError::Unavailable("database offline".into()))
        }

        async fn latest_health_metrics(
            &self,
            _user_id: &str,
        ) -> Result<Option<HealthMetricRecord>, StoreError> {
            Err(StoreError::Unavailable("database offline".into()))
        }

        fn info(&self) -> StoreInfo {
            StoreInfo { kind: "down".into(), location: None, records: 0 }
        }
    }

    fn app_with(store: Arc<dyn MetricsStore>) -> AppState {
        let simulator = VitalsSimulator::new(
            store,
            Arc::new(crate::simulator::SystemClock),
            Box::new(RngSource::seeded(1)),
        );
        AppState {
            simulator: Arc::new(simulator),
            health_tracker: HealthTracker::new(),
        }
    }

    fn headers_for(user: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, user.parse().unwrap());
        headers
    }

    #[test]
    fn test_user_header_parsing() {
        assert_eq!(user_id(&headers_for(" user_123 ")), Some("user_123".to_string()));
        assert_eq!(user_id(&headers_for("   ")), None);
        assert_eq!(user_id(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_push_then_fetch_latest() {
        let app = app_with(Arc::new(MemoryStore::new()));

        let Json(outcome) = simulate_push(State(app.clone()), headers_for("user_123")).await.unwrap();
        let PushOutcome::Saved(saved) = outcome else { panic!("expected saved outcome") };

        let Json(latest) = get_latest_metrics(State(app.clone()), headers_for("user_123")).await.unwrap();
        assert_eq!(latest, Some(saved));

        let Json(health) = get_system_health(State(app)).await;
        assert_eq!(health.samples_persisted, 1);
        assert_eq!(health.store.records, 1);
    }

    #[tokio::test]
    async fn test_anonymous_push_is_not_saved() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let Json(outcome) = simulate_push(State(app.clone()), HeaderMap::new()).await.unwrap();
        assert!(!outcome.is_saved());
        assert_eq!(app.simulator.store().info().records, 0);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_500() {
        let app = app_with(Arc::new(DownStore));
        let err = simulate_push(State(app.clone()), headers_for("user_123")).await.unwrap_err();
        assert!(matches!(err, ApiError::Persistence(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let Json(health) = get_system_health(State(app)).await;
        assert_eq!(health.persistence_failures, 1);
    }

    #[tokio::test]
    async fn test_latest_requires_user() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let err = get_latest_metrics(State(app), HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_manual_entry_is_validated() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let input = MetricInput {
            heart_rate: 80,
            foot_pressure: 84.2,
            bluetooth_connected: true,
            battery_level: 150,
            anomalies_detected: 0,
        };
        let err = create_metrics(State(app.clone()), headers_for("user_123"), Json(input))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let input: MetricInput = serde_json::from_value(serde_json::json!({
            "heartRate": 80,
            "footPressure": 84.2
        }))
        .unwrap();
        let Json(record) = create_metrics(State(app), headers_for("user_123"), Json(input))
            .await
            .unwrap();
        assert_eq!(record.user_id, "user_123");
        assert_eq!(record.battery_level, 0);
    }

    #[tokio::test]
    async fn test_manual_entry_rejects_anomaly_overflow() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let entry = |anomalies: u8| MetricInput {
            heart_rate: 80,
            foot_pressure: 84.2,
            bluetooth_connected: true,
            battery_level: 50,
            anomalies_detected: anomalies,
        };

        let err = create_metrics(State(app.clone()), headers_for("user_123"), Json(entry(11)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(app.simulator.store().info().records, 0);

        let Json(record) = create_metrics(State(app), headers_for("user_123"), Json(entry(10)))
            .await
            .unwrap();
        assert_eq!(record.anomalies_detected, 10);
    }
}
