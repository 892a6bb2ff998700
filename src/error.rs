use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {:#}", 0)]
    Ai(#[from] AiError),

    #[error("Serialization error: {:#}", 0)]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {:#}", 0)]
    IO(#[from] std::io::Error),
}

// Errors from the remote generation collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("OpenAI API error: {:#}", 0)]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Session not initialized")]
    SessionNotInitialized,

    #[error("No message found")]
    NoMessageFound,

    #[error("Malformed structured response: {:#}", 0)]
    MalformedResponse(String),

    #[error("No image returned")]
    NoImageReturned,
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> AiError {
        AiError::MalformedResponse(err.to_string())
    }
}

pub const QUOTA_MESSAGE: &str = "Your API key has exceeded its current quota. This usually means \
     too many requests in a short time. Wait a moment and retry, or check \
     your billing and usage limits.";

pub const INVALID_KEY_MESSAGE: &str =
    "The configured API key is not valid. Check the key in the settings file \
     or re-enter it from the settings menu.";

/// Maps raw backend error text to something a player can act on. Known
/// substrings win; failing that, a JSON error envelope embedded anywhere in
/// the text is mined for its nested message; failing that, the input passes
/// through verbatim. Never panics on malformed input.
pub fn classify_error(message: &str) -> String {
    if message.contains("RESOURCE_EXHAUSTED") || message.contains("quota") {
        return QUOTA_MESSAGE.to_string();
    }
    if message.contains("API key not valid") || message.contains("Incorrect API key") {
        return INVALID_KEY_MESSAGE.to_string();
    }

    if let Some(nested) = embedded_error_message(message) {
        return format!("The AI service reported an error: {nested}");
    }

    message.to_string()
}

/// Extracts `error.message` from the first JSON object embedded in `text`,
/// if there is one. A parse failure is expected for many error shapes and
/// simply yields `None`.
fn embedded_error_message(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_keyword_wins_regardless_of_surrounding_text() {
        let classified = classify_error("got 429: RESOURCE_EXHAUSTED while calling model");
        assert_eq!(classified, QUOTA_MESSAGE);
    }

    #[test]
    fn invalid_key_keyword_maps_to_fixed_message() {
        assert_eq!(classify_error("API key not valid. etc"), INVALID_KEY_MESSAGE);
    }

    #[test]
    fn embedded_json_envelope_is_mined() {
        let classified = classify_error(r#"{"error":{"message":"boom"}}"#);
        assert!(classified.contains("boom"));
    }

    #[test]
    fn json_envelope_with_prefix_text_is_found() {
        let classified =
            classify_error(r#"status 500: {"error":{"message":"server melted","code":500}}"#);
        assert!(classified.contains("server melted"));
    }

    #[test]
    fn unknown_text_passes_through_verbatim() {
        assert_eq!(classify_error("connection reset"), "connection reset");
    }

    #[test]
    fn malformed_json_falls_through_verbatim() {
        assert_eq!(classify_error("{not json"), "{not json");
    }
}
