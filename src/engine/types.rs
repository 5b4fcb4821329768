use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeOut {
    pub content: String,
    pub model_id: String,
    pub api_version: String,
    /// Set when the requested format was rejected and the default was used instead.
    pub fell_back: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub status: String,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Pending,
    Succeeded,
    Failed,
}

impl OperationStatus {
    pub fn state(&self) -> PollState {
        match self.status.to_ascii_lowercase().as_str() {
            "succeeded" => PollState::Succeeded,
            "failed" | "canceled" => PollState::Failed,
            _ => PollState::Pending,
        }
    }
}
