//! HTTP handlers for the listings API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

use super::query::cheapest;
use super::store::{StoreError, Table};
use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Store failures surfaced to HTTP clients
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Empty(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("{}", self.0);
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The cheapest listings in the scraped CSV, cheapest first
pub async fn cheapest_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let table = Table::load(&state.config.csv_path).await?;
    if table.rows.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let rows = cheapest(&table, state.config.limit)?;
    debug!("Serving {} of {} listings", rows.len(), table.rows.len());
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn state_for(path: &Path) -> State<AppState> {
        State(AppState {
            config: Arc::new(ApiConfig {
                csv_path: path.to_path_buf(),
                ..ApiConfig::default()
            }),
        })
    }

    async fn call(path: &Path) -> (StatusCode, Value) {
        let response = cheapest_listings(state_for(path)).await.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let (status, body) = call(&tmp.path().join("booking_listings.csv")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn empty_file_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(&path, "").unwrap();

        let (status, body) = call(&path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("is empty"));
    }

    #[tokio::test]
    async fn header_only_is_empty_array() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(&path, "Title,Address,Cost (AUD)\n").unwrap();

        let (status, body) = call(&path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unreadable_file_is_500() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(&path, "Title,Address\nA,B\n").unwrap();

        let (status, body) = call(&path).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Failed to read or process CSV file"));
    }

    #[tokio::test]
    async fn serves_cheapest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(
            &path,
            "Title,Address,Headline Room Type,Cost (AUD),Review Score,# of Reviews\n\
             Pricey,A,Room,100,8.0,10\n\
             Odd,B,Room,bad,N/A,N/A\n\
             Cheap,C,Room,50,9.1,3\n",
        )
        .unwrap();

        let (status, body) = call(&path).await;
        assert_eq!(status, StatusCode::OK);
        let costs: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["Cost (AUD)"].clone())
            .collect();
        assert_eq!(
            costs,
            vec![
                Value::String("50".into()),
                Value::String("100".into()),
                Value::Null
            ]
        );
    }

    #[tokio::test]
    async fn short_row_is_served_with_nulls() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(
            &path,
            "Title,Address,Headline Room Type,Cost (AUD),Review Score,# of Reviews\n\
             A,B,R,100\n\
             C,D,R,90,8.1,12\n",
        )
        .unwrap();

        let (status, body) = call(&path).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows[0]["Title"], Value::String("C".into()));
        assert_eq!(rows[1]["Cost (AUD)"], Value::String("100".into()));
        assert_eq!(rows[1]["Review Score"], Value::Null);
        assert_eq!(rows[1]["# of Reviews"], Value::Null);
    }

    #[tokio::test]
    async fn bom_only_file_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("booking_listings.csv");
        std::fs::write(&path, "\u{feff}").unwrap();

        let (status, _) = call(&path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
