use serde::{Deserialize, Serialize};

/// One movie suggested by the AI recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiRecommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub reason: String,
}
