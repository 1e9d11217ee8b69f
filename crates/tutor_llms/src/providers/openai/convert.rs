//! Conversion between unified types and OpenAI types

use super::types::{OpenAIErrorBody, OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::error::{Error, Result};
use crate::types::{GenerateRequest, GenerateResponse, Message, Role, Usage};

/// Convert unified request to OpenAI request
pub fn to_openai_request(req: &GenerateRequest) -> OpenAIRequest {
    OpenAIRequest {
        model: req.model.clone(),
        messages: req.messages.iter().map(to_openai_message).collect(),
        temperature: req.temperature,
        stream: false,
    }
}

fn to_openai_message(msg: &Message) -> OpenAIMessage {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    OpenAIMessage {
        role: role.to_string(),
        content: msg.content.clone(),
    }
}

/// Convert OpenAI response to unified response
pub fn from_openai_response(resp: OpenAIResponse) -> Result<GenerateResponse> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::invalid_response("No choices in OpenAI response"))?;

    let text = choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::invalid_response("No content in OpenAI response"))?;

    let usage = resp.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(GenerateResponse {
        text,
        usage,
        finish_reason: choice.finish_reason,
        model: resp.model,
    })
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<OpenAIErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty error body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_openai_request_maps_roles() {
        let req = GenerateRequest::new(
            "gpt-4",
            vec![Message::system("persona"), Message::user("template")],
        )
        .temperature(0.0);

        let openai = to_openai_request(&req);
        assert_eq!(openai.model, "gpt-4");
        assert_eq!(openai.messages[0].role, "system");
        assert_eq!(openai.messages[1].role, "user");
        assert_eq!(openai.temperature, Some(0.0));

        let json = serde_json::to_value(&openai).unwrap();
        assert_eq!(json["stream"], false);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_from_openai_response() {
        let resp: OpenAIResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "model": "gpt-4-0613",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "What does 1/0 evaluate to?"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 200, "completion_tokens": 9, "total_tokens": 209}
            }"#,
        )
        .unwrap();

        let unified = from_openai_response(resp).unwrap();
        assert_eq!(unified.text, "What does 1/0 evaluate to?");
        assert_eq!(unified.finish_reason.as_deref(), Some("stop"));
        assert_eq!(unified.usage.unwrap().total_tokens, 209);
        assert_eq!(unified.model.as_deref(), Some("gpt-4-0613"));
    }

    #[test]
    fn test_from_openai_response_rejects_empty() {
        let no_choices: OpenAIResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            from_openai_response(no_choices),
            Err(Error::InvalidResponse(_))
        ));

        let blank: OpenAIResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "  "}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert!(from_openai_response(blank).is_err());
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
        assert_eq!(error_message(""), "empty error body");
    }
}
