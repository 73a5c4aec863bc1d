/// Gemini recommendation provider
///
/// Asks the model for five movies as structured JSON
/// (`{"recommendations": [{title, year, reason}]}`) and parses the first
/// candidate's text.
use crate::{
    error::{AppError, AppResult},
    models::AiRecommendation,
    services::providers::Recommender,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

pub const RECOMMENDATION_FAILURE: &str =
    "Failed to get recommendations from AI. Please try again.";

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationEnvelope {
    #[serde(default)]
    recommendations: Option<Vec<AiRecommendation>>,
}

/// Builds the instruction sent to the model
///
/// With liked titles the model is asked to connect its picks to the user's
/// taste as well as to the request.
pub fn build_prompt(prompt: &str, liked_titles: &[String]) -> String {
    if liked_titles.is_empty() {
        format!(
            "Based on the following request, recommend 5 movies. For each movie, provide the title, \
             the year of release, and a short reason for the recommendation. Request: \"{}\"",
            prompt
        )
    } else {
        format!(
            "I am a movie fan who likes the following movies: {}. Please act as an expert movie \
             recommender. Based on my tastes and my specific request, recommend 5 other movies I \
             might enjoy. My request is: \"{}\". For each movie, provide the title, the year of \
             release, and a short reason for the recommendation that connects to my taste or request.",
            liked_titles.join(", "),
            prompt
        )
    }
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "The title of the movie." },
                        "year": { "type": "INTEGER", "description": "The year the movie was released." },
                        "reason": { "type": "STRING", "description": "A short reason why this movie is recommended." }
                    }
                }
            }
        }
    })
}

/// Extracts recommendations from a `generateContent` response body
fn parse_recommendations(body: &str) -> AppResult<Vec<AiRecommendation>> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .ok_or_else(|| AppError::ExternalApi("Gemini returned no candidates".to_string()))?;

    let envelope: RecommendationEnvelope = serde_json::from_str(text.trim())?;
    Ok(envelope.recommendations.unwrap_or_default())
}

impl GeminiClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    async fn generate(&self, prompt: &str, liked_titles: &[String]) -> AppResult<Vec<AiRecommendation>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(prompt, liked_titles) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        let response = self
            .http_client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let text = response.text().await?;
        parse_recommendations(&text)
    }
}

#[async_trait::async_trait]
impl Recommender for GeminiClient {
    async fn recommend(
        &self,
        prompt: &str,
        liked_titles: Vec<String>,
    ) -> AppResult<Vec<AiRecommendation>> {
        match self.generate(prompt, &liked_titles).await {
            Ok(recommendations) => {
                tracing::info!(
                    model = %self.model,
                    personalised = !liked_titles.is_empty(),
                    results = recommendations.len(),
                    "AI recommendations received"
                );
                Ok(recommendations)
            }
            Err(e) => {
                tracing::error!(error = %e, model = %self.model, "Error getting AI recommendations");
                Err(AppError::Recommendation(RECOMMENDATION_FAILURE.to_string()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
