// HTTP request handlers
use crate::application::error::ServiceError;
use crate::application::observation_service::BulkEdit;
use crate::domain::scan;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct FountainQuery {
    pub fountain_id: Option<String>,
}

impl FountainQuery {
    /// Unparseable ids select the default fountain
    fn fountain_id(&self) -> Option<i64> {
        self.fountain_id.as_deref().and_then(|id| id.trim().parse().ok())
    }
}

#[derive(Deserialize)]
pub struct NewFountain {
    pub name: Option<String>,
    pub target: Option<f64>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub delete_password: Option<String>,
}

#[derive(Deserialize)]
pub struct NewObservation {
    pub fountain_id: Option<i64>,
    pub value: Option<f64>,
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub text: String,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Projection dashboard for one fountain
pub async fn get_dashboard(
    Query(query): Query<FountainQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_service.get_dashboard(query.fountain_id()).await {
        Ok(dashboard) => respond(StatusCode::OK, &dashboard, &headers).await,
        Err(e) => e.into_response(),
    }
}

pub async fn list_fountains(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.fountain_service.list_fountains().await {
        Ok(fountains) => respond(StatusCode::OK, &fountains, &headers).await,
        Err(e) => e.into_response(),
    }
}

pub async fn create_fountain(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewFountain>,
) -> Response {
    match state
        .fountain_service
        .create_fountain(body.name.as_deref(), body.target)
        .await
    {
        Ok(fountain) => respond(StatusCode::CREATED, &fountain, &headers).await,
        Err(e) => e.into_response(),
    }
}

pub async fn delete_fountain(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteRequest>,
) -> Response {
    match state
        .fountain_service
        .delete_fountain(id, body.delete_password.as_deref())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_observations(
    Query(query): Query<FountainQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.observation_service.list(query.fountain_id()).await {
        Ok(page) => respond(StatusCode::OK, &page, &headers).await,
        Err(e) => e.into_response(),
    }
}

pub async fn record_observation(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewObservation>,
) -> Response {
    match state
        .observation_service
        .record(body.fountain_id, body.value)
        .await
    {
        Ok(record) => respond(StatusCode::CREATED, &record, &headers).await,
        Err(e) => e.into_response(),
    }
}

pub async fn bulk_edit_observations(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(edit): Json<BulkEdit>,
) -> Response {
    match state.observation_service.bulk_edit(edit).await {
        Ok(outcome) => respond(StatusCode::OK, &outcome, &headers).await,
        Err(e) => e.into_response(),
    }
}

/// Interprets text recognized from a photographed counter display
pub async fn interpret_scan(headers: HeaderMap, Json(body): Json<ScanRequest>) -> Response {
    match scan::interpret(&body.text) {
        Some(reading) => respond(StatusCode::OK, &reading, &headers).await,
        None => {
            tracing::debug!(text = %body.text, "no reading recognized");
            ServiceError::Invalid("Could not read a value from the display.".to_string())
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::fountain_service::FountainService;
    use crate::application::observation_service::ObservationService;
    use crate::infrastructure::memory_repository::MemoryRepository;
    use serde_json::{json, Value};

    fn state() -> Arc<AppState> {
        let repository = Arc::new(MemoryRepository::new());
        Arc::new(AppState {
            dashboard_service: DashboardService::new(repository.clone(), 30000.0),
            fountain_service: FountainService::new(repository.clone(), "fountain".to_string()),
            observation_service: ObservationService::new(repository, "fountain".to_string()),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query(id: &str) -> Query<FountainQuery> {
        Query(FountainQuery {
            fountain_id: Some(id.to_string()),
        })
    }

    async fn create(state: &Arc<AppState>, name: &str, target: f64) -> i64 {
        let response = create_fountain(
            HeaderMap::new(),
            State(state.clone()),
            Json(NewFountain {
                name: Some(name.to_string()),
                target: Some(target),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_dashboard_flow() {
        let state = state();
        let id = create(&state, "Lobby", 30000.0).await;

        for value in [1000.0, 2000.0] {
            let response = record_observation(
                HeaderMap::new(),
                State(state.clone()),
                Json(NewObservation {
                    fountain_id: Some(id),
                    value: Some(value),
                }),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = get_dashboard(query(&id.to_string()), HeaderMap::new(), State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let dashboard = body_json(response).await;
        assert_eq!(dashboard["selected"]["name"], "Lobby");
        assert_eq!(dashboard["target"], 30000.0);
        assert_eq!(dashboard["chart"]["points"].as_array().unwrap().len(), 2);
        assert!(dashboard["projection"]["status"].is_string());
    }

    #[tokio::test]
    async fn test_dashboard_ignores_bad_fountain_id() {
        let state = state();
        create(&state, "Lobby", 30000.0).await;

        let response = get_dashboard(query("abc"), HeaderMap::new(), State(state)).await;
        let dashboard = body_json(response).await;
        assert_eq!(dashboard["selected"]["name"], "Lobby");
        assert_eq!(dashboard["projection"]["status"], "no_regression");
    }

    #[tokio::test]
    async fn test_create_fountain_duplicate() {
        let state = state();
        create(&state, "Lobby", 30000.0).await;

        let response = create_fountain(
            HeaderMap::new(),
            State(state),
            Json(NewFountain {
                name: Some("Lobby".to_string()),
                target: Some(1.0),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Fountain name already exists." })
        );
    }

    #[tokio::test]
    async fn test_delete_fountain_password() {
        let state = state();
        let id = create(&state, "Lobby", 30000.0).await;

        let denied = delete_fountain(
            Path(id),
            State(state.clone()),
            Json(DeleteRequest {
                delete_password: Some("wrong".to_string()),
            }),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let deleted = delete_fountain(
            Path(id),
            State(state.clone()),
            Json(DeleteRequest {
                delete_password: Some("fountain".to_string()),
            }),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let listed = list_fountains(HeaderMap::new(), State(state)).await;
        assert_eq!(body_json(listed).await, json!([]));
    }

    #[tokio::test]
    async fn test_record_invalid_value() {
        let state = state();
        let id = create(&state, "Lobby", 30000.0).await;

        let response = record_observation(
            HeaderMap::new(),
            State(state),
            Json(NewObservation {
                fountain_id: Some(id),
                value: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bulk_edit_denied() {
        let state = state();
        let id = create(&state, "Lobby", 30000.0).await;
        let record = state
            .observation_service
            .record(Some(id), Some(10.0))
            .await
            .unwrap();

        let edit: BulkEdit = serde_json::from_value(json!({
            "fountain_id": id,
            "rows": [{ "id": record.id, "delete": true }]
        }))
        .unwrap();
        let response = bulk_edit_observations(HeaderMap::new(), State(state.clone()), Json(edit)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let page = list_observations(query(&id.to_string()), HeaderMap::new(), State(state)).await;
        assert_eq!(body_json(page).await["observations"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_interpret_scan() {
        let response = interpret_scan(
            HeaderMap::new(),
            Json(ScanRequest {
                text: "0 2 4 5 1 0".to_string(),
            }),
        )
        .await;
        assert_eq!(
            body_json(response).await,
            json!({ "digits": "24510", "value": 24510.0, "warning": null })
        );

        let unreadable = interpret_scan(
            HeaderMap::new(),
            Json(ScanRequest {
                text: "--".to_string(),
            }),
        )
        .await;
        assert_eq!(unreadable.status(), StatusCode::BAD_REQUEST);
    }
}
