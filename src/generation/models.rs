use super::error::TransportError;
use crate::constants::MIN_COUNT;
use crate::constraint::{max_for, GenerationMode};
use crate::errors::AppError;
use crate::panel::{PanelSnapshot, TuningValues};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    count: u32,
    mode: GenerationMode,
    use_enhanced: bool,
    tuning: Option<TuningValues>,
}

impl GenerationRequest {
    /// Builds a request from the form values and a panel snapshot.
    ///
    /// Tuning values travel only when enhanced mode is on.
    pub fn new(count: u32, mode: GenerationMode, snapshot: &PanelSnapshot) -> Result<Self, AppError> {
        let tuning = snapshot.use_enhanced.then(|| snapshot.tuning.clone());
        Self::validated(count, mode, snapshot.use_enhanced, tuning)
    }

    /// A plain request with enhanced mode off.
    pub fn basic(count: u32, mode: GenerationMode) -> Result<Self, AppError> {
        Self::validated(count, mode, false, None)
    }

    fn validated(
        count: u32,
        mode: GenerationMode,
        use_enhanced: bool,
        tuning: Option<TuningValues>,
    ) -> Result<Self, AppError> {
        let max = max_for(mode);
        if !(MIN_COUNT..=max).contains(&count) {
            return Err(AppError::InvalidInput(format!(
                "Count must be between {} and {} for {} mode",
                MIN_COUNT, max, mode
            )));
        }
        if use_enhanced != tuning.is_some() {
            return Err(AppError::InvalidInput(
                "Tuning values must accompany enhanced mode".to_string(),
            ));
        }
        Ok(Self {
            count,
            mode,
            use_enhanced,
            tuning,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn use_enhanced(&self) -> bool {
        self.use_enhanced
    }

    pub fn tuning(&self) -> Option<&TuningValues> {
        self.tuning.as_ref()
    }

    /// Query fields in wire order: count, mode, use_enhanced, then one per dial.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("count", self.count.to_string()),
            ("mode", self.mode.as_str().to_string()),
            ("use_enhanced", self.use_enhanced.to_string()),
        ];
        if let Some(tuning) = &self.tuning {
            pairs.extend(tuning.iter().map(|(name, value)| (name.as_str(), value.to_string())));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationMetadata {
    pub count: Option<u32>,
    pub mode: Option<GenerationMode>,
    pub timestamp: Option<String>,
}

impl GenerationMetadata {
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success {
        text: String,
        metadata: Option<GenerationMetadata>,
    },
    Failure {
        message: String,
        detail: Option<String>,
        fallback_available: bool,
    },
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    text: Option<String>,
    error: Option<String>,
    message: Option<String>,
    fallback_available: Option<bool>,
    metadata: Option<GenerationMetadata>,
}

impl GenerationResult {
    pub fn success(text: impl Into<String>) -> Self {
        GenerationResult::Success {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn failure(message: impl Into<String>, fallback_available: bool) -> Self {
        GenerationResult::Failure {
            message: message.into(),
            detail: None,
            fallback_available,
        }
    }

    /// Interprets a response body. A non-blank `error` wins over `text`; a body with neither is malformed.
    pub fn from_json(body: serde_json::Value) -> Result<Self, TransportError> {
        let raw: RawResponse = serde_json::from_value(body)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        if let Some(error) = raw.error.filter(|e| !e.trim().is_empty()) {
            return Ok(GenerationResult::Failure {
                message: error,
                detail: raw.message.filter(|m| !m.trim().is_empty()),
                fallback_available: raw.fallback_available.unwrap_or(false),
            });
        }
        match raw.text {
            Some(text) => Ok(GenerationResult::Success {
                text,
                metadata: raw.metadata,
            }),
            None => Err(TransportError::Malformed(
                "response carries neither text nor error".to_string(),
            )),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    /// Text shown to the user for a failure; `None` for success.
    pub fn status_text(&self) -> Option<String> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Failure {
                message,
                detail: Some(detail),
                ..
            } => Some(format!("{}: {}", message, detail)),
            GenerationResult::Failure { message, .. } => Some(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::DialName;
    use serde_json::json;

    fn snapshot(use_enhanced: bool) -> PanelSnapshot {
        PanelSnapshot {
            use_enhanced,
            tuning: DialName::ALL
                .into_iter()
                .map(|name| (name, name.default_value()))
                .collect(),
        }
    }

    #[test]
    fn enhanced_request_carries_every_dial() {
        let request = GenerationRequest::new(3, GenerationMode::Sentence, &snapshot(true)).unwrap();
        let pairs = request.query_pairs();
        assert_eq!(pairs[0], ("count", "3".to_string()));
        assert_eq!(pairs[1], ("mode", "sentence".to_string()));
        assert_eq!(pairs[2], ("use_enhanced", "true".to_string()));
        for name in DialName::ALL {
            assert!(pairs.iter().any(|(key, _)| *key == name.as_str()), "missing {}", name);
        }
    }

    #[test]
    fn plain_request_omits_tuning() {
        let request = GenerationRequest::new(2, GenerationMode::Word, &snapshot(false)).unwrap();
        assert!(request.tuning().is_none());
        let keys: Vec<&str> = request.query_pairs().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["count", "mode", "use_enhanced"]);
    }

    #[test]
    fn count_above_mode_max_is_rejected() {
        let err = GenerationRequest::basic(6, GenerationMode::Paragraph).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(GenerationRequest::basic(0, GenerationMode::Word).is_err());
        assert!(GenerationRequest::basic(50, GenerationMode::Word).is_ok());
    }

    #[test]
    fn parses_success() {
        let result = GenerationResult::from_json(json!({ "text": "Hello\n\nWorld" })).unwrap();
        assert_eq!(result, GenerationResult::success("Hello\n\nWorld"));
        assert!(result.status_text().is_none());
    }

    #[test]
    fn parses_failure_with_and_without_fallback() {
        let with = GenerationResult::from_json(json!({ "error": "rate limited", "fallback_available": true })).unwrap();
        assert_eq!(with, GenerationResult::failure("rate limited", true));

        let without = GenerationResult::from_json(json!({ "error": "Invalid mode" })).unwrap();
        assert_eq!(without, GenerationResult::failure("Invalid mode", false));
    }

    #[test]
    fn error_field_wins_over_text() {
        let result = GenerationResult::from_json(json!({ "text": "ignored", "error": "boom" })).unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn blank_error_does_not_hide_text() {
        let result = GenerationResult::from_json(json!({ "error": "", "text": "Butter" })).unwrap();
        assert_eq!(result, GenerationResult::success("Butter"));

        let result = GenerationResult::from_json(json!({ "error": "  ", "text": "Flow" })).unwrap();
        assert!(result.is_success());
    }

    #[test]
    fn detail_message_is_appended_to_status() {
        let result = GenerationResult::from_json(json!({
            "error": "Invalid count parameter",
            "message": "Count must be between 1 and 10"
        }))
        .unwrap();
        assert_eq!(
            result.status_text().as_deref(),
            Some("Invalid count parameter: Count must be between 1 and 10")
        );
    }

    #[test]
    fn metadata_timestamp_is_parsed() {
        let result = GenerationResult::from_json(json!({
            "text": "Butter.",
            "metadata": { "count": 1, "mode": "sentence", "timestamp": "2024-05-01T12:30:00.250000Z" }
        }))
        .unwrap();
        let GenerationResult::Success { metadata: Some(metadata), .. } = result else {
            panic!("expected success with metadata");
        };
        assert_eq!(metadata.mode, Some(GenerationMode::Sentence));
        let at = metadata.generated_at().unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-01 12:30:00");
        assert_eq!(at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn body_without_text_or_error_is_malformed() {
        assert!(matches!(
            GenerationResult::from_json(json!({ "status": "ok" })),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(
            GenerationResult::from_json(json!("just a string")),
            Err(TransportError::Malformed(_))
        ));
    }
}
