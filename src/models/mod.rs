use serde::{Deserialize, Serialize};

/// Ordered categories stored for one user; duplicates are allowed
pub type RecommendationList = Vec<String>;

/// One user's stored categories, as listed by the get-all endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecommendations {
    pub user_id: String,
    pub recommendations: RecommendationList,
}

/// Body of `POST /add_recommendation/`
#[derive(Debug, Clone, Deserialize)]
pub struct AddRecommendationRequest {
    pub user_id: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct AddedRecommendation {
    pub user_id: String,
    pub category: String,
    pub recommendations: RecommendationList,
}

#[derive(Debug, Serialize)]
pub struct RemovedRecommendation {
    pub user_id: String,
    pub removed_category: String,
    pub recommendations: RecommendationList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Envelope wrapped around every successful response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data,
        }
    }
}

/// Envelope returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }
}
