//! Wire types for the server's REST API
//!
//! Request and response bodies for the generate and chat endpoints.
//! Optional request fields are omitted from the serialized body; response
//! fields the server only sends on the final fragment are optional.

use serde::{Deserialize, Serialize};

use crate::types::message::{Message, Role};

/// Sampling options accepted by the generate and chat endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
}

/// Request body for the `/api/generate` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Target model name
    pub model: String,
    /// Prompt text
    pub prompt: String,
    /// Whether the server should stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Opaque context from a previous response, for continuation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SamplingOptions>,
}

impl GenerateRequest {
    /// Build a plain prompt request with no options set
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: None,
            context: None,
            options: None,
        }
    }
}

/// A message as sent on the wire, without client-side metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Request body for the `/api/chat` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Target model name
    pub model: String,
    /// Conversation so far, oldest first
    pub messages: Vec<WireMessage>,
    /// Whether the server should stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SamplingOptions>,
}

impl ChatRequest {
    /// Build a chat request from an ordered message sequence
    pub fn new<'a>(
        model: impl Into<String>,
        messages: impl IntoIterator<Item = &'a Message>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: messages.into_iter().map(WireMessage::from).collect(),
            stream: None,
            options: None,
        }
    }
}

/// One response record from the generate or chat endpoint.
///
/// When streaming, the server sends a sequence of these; only the final one
/// (`done: true`) carries the context and timing diagnostics. The generate
/// endpoint puts the text in `response`; the chat endpoint nests it inside
/// `message.content`. Use [`text`](Self::text) to read either.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Model that produced this fragment
    #[serde(default)]
    pub model: String,
    /// Text fragment (generate endpoint)
    #[serde(default)]
    pub response: String,
    /// Text fragment (chat endpoint)
    #[serde(default)]
    pub message: Option<WireMessage>,
    /// True on the final fragment of a stream
    #[serde(default)]
    pub done: bool,
    /// Opaque context for continuing the conversation
    #[serde(default)]
    pub context: Option<Vec<i64>>,
    /// Wall time for the whole request, nanoseconds
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Model load time, nanoseconds
    #[serde(default)]
    pub load_duration: Option<u64>,
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Prompt evaluation time, nanoseconds
    #[serde(default)]
    pub prompt_eval_duration: Option<u64>,
    /// Tokens generated
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Generation time, nanoseconds
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

impl GenerateResponse {
    /// The text of this fragment, wherever the endpoint put it
    pub fn text(&self) -> &str {
        if !self.response.is_empty() {
            &self.response
        } else if let Some(msg) = &self.message {
            &msg.content
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_omits_unset_fields() {
        let req = GenerateRequest::new("llama3.2", "hi");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"model":"llama3.2","prompt":"hi"}"#);
    }

    #[test]
    fn test_generate_request_serializes_options() {
        let mut req = GenerateRequest::new("llama3.2", "hi");
        req.stream = Some(false);
        req.options = Some(SamplingOptions {
            temperature: Some(0.7),
            ..Default::default()
        });
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""stream":false"#));
        assert!(json.contains(r#""temperature":0.7"#));
        assert!(!json.contains("top_k"));
    }

    #[test]
    fn test_chat_request_from_messages() {
        let messages = vec![
            Message::new(Role::System, "be brief"),
            Message::new(Role::User, "hi"),
        ];
        let req = ChatRequest::new("llama3.2", &messages);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""role":"system""#));
        assert!(json.contains(r#""content":"hi""#));
        // client-side timestamps never reach the wire
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_response_text_from_generate_shape() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"model":"llama3.2","response":"hello","done":true}"#).unwrap();
        assert_eq!(resp.text(), "hello");
        assert!(resp.done);
    }

    #[test]
    fn test_response_text_from_chat_shape() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"hel"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "hel");
        assert!(!resp.done);
    }

    #[test]
    fn test_final_fragment_carries_diagnostics() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"model":"m","response":"","done":true,"context":[1,2,3],
                "total_duration":5000000,"eval_count":42}"#,
        )
        .unwrap();
        assert_eq!(resp.context.as_deref(), Some(&[1, 2, 3][..]));
        assert_eq!(resp.eval_count, Some(42));
    }
}
