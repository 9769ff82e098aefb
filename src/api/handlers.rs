use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{
    AddRecommendationRequest, AddedRecommendation, ApiResponse, RemovedRecommendation,
    UserRecommendations,
};

use super::AppState;

/// Health check endpoint, reports whether the backend answers
pub async fn health_check(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Value>)> {
    state.store.backend().ping().await?;
    Ok((StatusCode::OK, Json(json!({ "status": "healthy" }))))
}

/// Append a category to a user's list
pub async fn add_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AddRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AddedRecommendation>>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    tracing::debug!(
        request_id = %request_id,
        user_id = %request.user_id,
        category = %request.category,
        "Adding recommendation"
    );

    let recommendations = state.store.add(&request.user_id, &request.category).await?;

    Ok(Json(ApiResponse::success(
        "Recommendation added successfully",
        AddedRecommendation {
            user_id: request.user_id,
            category: request.category,
            recommendations,
        },
    )))
}

/// Fetch one user's list; unknown users get an empty list
pub async fn get_recommendations(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ApiResponse<UserRecommendations>>> {
    let Path(user_id) = path.map_err(invalid_path)?;

    let (message, recommendations) = match state.store.find(&user_id).await? {
        Some(recommendations) => ("Recommendations retrieved successfully", recommendations),
        None => ("No recommendations found for this user", Vec::new()),
    };

    Ok(Json(ApiResponse::success(
        message,
        UserRecommendations {
            user_id,
            recommendations,
        },
    )))
}

/// Fetch every user's list
pub async fn get_all_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ApiResponse<Vec<UserRecommendations>>>> {
    let all = state.store.get_all().await?;

    tracing::info!(request_id = %request_id, users = all.len(), "Listed all recommendations");

    let message = if all.is_empty() {
        "No recommendations found for any user"
    } else {
        "All recommendations retrieved successfully"
    };

    Ok(Json(ApiResponse::success(message, all)))
}

/// Remove one occurrence of a category from a user's list
pub async fn remove_recommendation(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> AppResult<Json<ApiResponse<RemovedRecommendation>>> {
    let Path((user_id, category)) = path.map_err(invalid_path)?;
    let recommendations = state.store.remove(&user_id, &category).await?;

    Ok(Json(ApiResponse::success(
        "Recommendation removed successfully",
        RemovedRecommendation {
            user_id,
            removed_category: category,
            recommendations,
        },
    )))
}

fn invalid_path(rejection: PathRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}
