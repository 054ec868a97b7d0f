//! Survey analysis: a local statistical summary, optionally enriched by the
//! Gemini API. The API is best effort only; any failure lands on the local
//! fallback and never surfaces as an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Feedback text used whenever AI analysis is unavailable.
pub const FALLBACK_FEEDBACK: &str = "Unable to generate AI feedback at this time.";

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnalysis {
    pub average_score: f64,
    pub feedback: String,
    pub recommendations: Vec<String>,
}

/// Plain average of the survey scores. Empty input averages to 0.
pub fn local_average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn fallback_analysis(scores: &[f64]) -> SurveyAnalysis {
    SurveyAnalysis {
        average_score: local_average(scores),
        feedback: FALLBACK_FEEDBACK.to_string(),
        recommendations: Vec::new(),
    }
}

/// Analyze survey scores. With an API key, asks Gemini for qualitative
/// feedback; without one, or on any API failure, returns the local fallback.
pub async fn analyze_survey(scores: &[f64], api_key: Option<&str>) -> SurveyAnalysis {
    let Some(key) = api_key else {
        return fallback_analysis(scores);
    };
    match request_analysis(scores, key).await {
        Ok(analysis) => analysis,
        Err(e) => {
            crate::buffered_eprintln!("Survey analysis request failed: {:#}", e);
            fallback_analysis(scores)
        }
    }
}

fn build_prompt(scores: &[f64]) -> String {
    format!(
        "You are analyzing end-of-course student feedback survey scores for a \
         university course. The scores are: {:?}. Respond with ONLY a JSON \
         object, no markdown fences, with keys: \"averageScore\" (number), \
         \"feedback\" (a 2-3 sentence summary of how the course was received), \
         \"recommendations\" (array of 2-4 short, concrete suggestions for the \
         instructor).",
        scores
    )
}

async fn request_analysis(scores: &[f64], api_key: &str) -> Result<SurveyAnalysis> {
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "contents": [{
            "parts": [{ "text": build_prompt(scores) }]
        }]
    });

    let response = client
        .post(format!("{}?key={}", GEMINI_URL, api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("Failed to reach the Gemini API")?;

    if !response.status().is_success() {
        anyhow::bail!("Gemini API returned status {}", response.status());
    }

    let payload: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse Gemini response JSON")?;

    let text = payload
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .context("Gemini response had no candidate text")?;

    parse_analysis_text(text, scores)
}

/// Parse the model's JSON reply. Models sometimes wrap JSON in code fences
/// despite instructions, so those are stripped first. The average is always
/// recomputed locally rather than trusted from the model.
fn parse_analysis_text(text: &str, scores: &[f64]) -> Result<SurveyAnalysis> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let mut analysis: SurveyAnalysis =
        serde_json::from_str(trimmed).context("Gemini reply was not the expected JSON shape")?;
    analysis.average_score = local_average(scores);
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_average() {
        assert_eq!(local_average(&[4.0, 5.0, 3.0]), 4.0);
    }

    #[test]
    fn test_local_average_empty_is_zero() {
        assert_eq!(local_average(&[]), 0.0);
    }

    #[tokio::test]
    async fn test_no_key_means_fallback() {
        let analysis = analyze_survey(&[4.0, 2.0], None).await;
        assert_eq!(analysis.average_score, 3.0);
        assert_eq!(analysis.feedback, FALLBACK_FEEDBACK);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_parse_analysis_text_plain_json() {
        let text = r#"{"averageScore": 99.0, "feedback": "Well received.", "recommendations": ["More examples"]}"#;
        let analysis = parse_analysis_text(text, &[4.0, 4.0]).unwrap();
        // Model-reported average is ignored in favor of the local one.
        assert_eq!(analysis.average_score, 4.0);
        assert_eq!(analysis.feedback, "Well received.");
        assert_eq!(analysis.recommendations, vec!["More examples".to_string()]);
    }

    #[test]
    fn test_parse_analysis_text_strips_code_fences() {
        let text = "```json\n{\"averageScore\": 1.0, \"feedback\": \"ok\", \"recommendations\": []}\n```";
        let analysis = parse_analysis_text(text, &[2.0]).unwrap();
        assert_eq!(analysis.feedback, "ok");
    }

    #[test]
    fn test_parse_analysis_text_rejects_garbage() {
        assert!(parse_analysis_text("not json at all", &[1.0]).is_err());
    }
}
