//! Electrician routes: list, search, create and delete.
//!
//! `create` and `remove` sit behind [`AuthMiddleware`](crate::auth::AuthMiddleware)
//! and receive the caller's identity as an explicit `Extension<AuthUser>`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::store::{DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_RADIUS_METERS};
use crate::database::{Electrician, NewElectrician, Proximity, SearchQuery};
use crate::error::AppError;
use crate::server::AppState;

/// Query string accepted by `GET /search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub text: Option<String>,
    pub hint: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

impl SearchParams {
    pub fn into_query(self) -> SearchQuery {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        // Only a positive longitude turns on the proximity filter.
        let near = match self.lon {
            Some(longitude) if longitude > 0.0 => Some(Proximity {
                longitude,
                latitude: self.lat.unwrap_or(0.0),
                max_distance_meters: DEFAULT_SEARCH_RADIUS_METERS,
            }),
            _ => None,
        };

        // `limit=0` means no limit at all.
        let limit = match self.limit {
            None => Some(DEFAULT_SEARCH_LIMIT),
            Some(0) => None,
            Some(limit) => Some(limit),
        };

        SearchQuery {
            skip: self.skip.unwrap_or(0),
            limit,
            text: non_empty(self.text),
            name_prefix: non_empty(self.hint),
            near,
        }
    }
}

/// `GET /`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Electrician>>, AppError> {
    let electricians = state.store.list().await?;
    Ok(Json(electricians))
}

/// `GET /search?skip&limit&text&hint&lon&lat`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Electrician>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = params.into_query();
    tracing::debug!("Searching electricians: {:?}", query);

    let electricians = state.store.search(&query).await?;
    Ok(Json(electricians))
}

/// `POST /`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewElectrician>, JsonRejection>,
) -> Result<(StatusCode, Json<Electrician>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected create body: {}", e.body_text());
        AppError::BadRequest("Incorrect body".to_string())
    })?;

    let electrician = payload
        .into_electrician(Uuid::new_v4())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.store.insert(&electrician).await?;
    tracing::info!("Electrician {} created by {}", electrician.id, user.id);

    Ok((StatusCode::CREATED, Json(electrician)))
}

/// `DELETE /{id}`
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("Electrician {} deleted by {}", id, user.id);

    Ok(Json(json!({ "message": "electrician_deleted" })))
}
