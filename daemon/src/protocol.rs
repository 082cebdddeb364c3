use serde::{Deserialize, Serialize};
use typeahead_core::Snapshot;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddCharacterRequest {
    #[serde(default)]
    pub character: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub suggestion: String,
}

/// JSON fallback for `/transcribe-audio` when no multipart form is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    /// Base64-encoded audio bytes.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub current_text: String,
    pub suggestions: Vec<String>,
    pub is_word_complete: bool,
}

impl From<Snapshot> for TextResponse {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            current_text: snapshot.current_text,
            suggestions: snapshot.suggestions,
            is_word_complete: snapshot.is_word_complete,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptResponse {
    pub success: bool,
    #[serde(flatten)]
    pub text: TextResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTextResponse {
    pub current_text: String,
    pub is_word_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub transcription: String,
    pub current_text: String,
    pub suggestions: Vec<String>,
    /// Present only when the placeholder text stood in for a real transcription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_response_is_flat_camel_case() {
        let response = AcceptResponse {
            success: true,
            text: TextResponse {
                current_text: "hi there".to_string(),
                suggestions: vec!["friend".to_string()],
                is_word_complete: true,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": true,
                "currentText": "hi there",
                "suggestions": ["friend"],
                "isWordComplete": true
            })
        );
    }

    #[test]
    fn note_is_omitted_for_real_transcriptions() {
        let response = TranscriptionResponse {
            transcription: "hello".to_string(),
            current_text: "hello".to_string(),
            suggestions: Vec::new(),
            note: None,
        };
        let raw = serde_json::to_string(&response).unwrap();
        assert!(!raw.contains("note"));
    }

    #[test]
    fn parses_audio_payload() {
        let payload: AudioPayload =
            serde_json::from_str(r#"{"audio":"AAEC","mimeType":"audio/webm"}"#).unwrap();
        assert_eq!(payload.audio.as_deref(), Some("AAEC"));
        assert_eq!(payload.mime_type.as_deref(), Some("audio/webm"));
    }
}
