use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;

use crate::config::Resolved;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub path: String,
    pub reason: String,
}

/// Minimal OpenAI-compatible chat completions client.
pub struct ChatClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(cfg: &Resolved) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sortpath/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    /// Send `prompt` as the system message and return the first choice.
    pub fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "system", "content": prompt }],
        });
        log::debug!("POST {} (model {})", url, self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .with_context(|| format!("failed to reach {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            bail!("API error ({}): {}", status.as_u16(), text.trim());
        }

        let parsed: ChatResponse = resp.json().context("malformed completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("no response from model"))
    }

    pub fn recommend(&self, prompt: &str) -> Result<Recommendation> {
        let reply = self.complete(prompt)?;
        parse_recommendation(&reply)
    }
}

fn tag(name: &str) -> Option<&'static Regex> {
    static PATH: OnceLock<Option<Regex>> = OnceLock::new();
    static REASON: OnceLock<Option<Regex>> = OnceLock::new();
    let cell = match name {
        "path" => &PATH,
        _ => &REASON,
    };
    cell.get_or_init(|| Regex::new(&format!(r"(?s)<{0}>(.*?)</{0}>", name)).ok())
        .as_ref()
}

fn extract(reply: &str, name: &str) -> Option<String> {
    tag(name)?
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Pull `<path>` and `<reason>` out of the model's reply. A missing reason
/// is tolerated; a missing or empty path is not.
pub fn parse_recommendation(reply: &str) -> Result<Recommendation> {
    let path = extract(reply, "path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("model reply contained no <path>: {}", reply.trim()))?;
    Ok(Recommendation {
        path,
        reason: extract(reply, "reason").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::path::PathBuf;

    fn resolved(base: String) -> Resolved {
        Resolved {
            api_key: "sk-test".into(),
            api_base: base,
            model: "gpt-test".into(),
            tree_path: PathBuf::from("."),
            log_level: "info".into(),
        }
    }

    #[test]
    fn parses_tags_with_surrounding_text() {
        let reply = "Sure!\n<recommendation>\n  <path>/03_PHOTOS/2025/Berlin_Trip</path>\n  <reason>Photos by\nyear.</reason>\n</recommendation>";
        let r = parse_recommendation(reply).unwrap();
        assert_eq!(r.path, "/03_PHOTOS/2025/Berlin_Trip");
        assert_eq!(r.reason, "Photos by\nyear.");
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(parse_recommendation("<reason>no idea</reason>").is_err());
        assert!(parse_recommendation("<path>  </path>").is_err());
        assert_eq!(
            parse_recommendation("<path>/x</path>").unwrap().reason,
            ""
        );
    }

    #[test]
    fn posts_system_prompt_with_bearer_auth() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "model": "gpt-test",
                    "messages": [{ "role": "system", "content": "PROMPT" }]
                }));
            then.status(200).json_body(json!({
                "choices": [{ "message": {
                    "role": "assistant",
                    "content": "<recommendation><path>/05_CODE/Templates</path><reason>Reusable code.</reason></recommendation>"
                }}]
            }));
        });

        let client = ChatClient::new(&resolved(server.url("/v1/"))).unwrap();
        let rec = client.recommend("PROMPT").unwrap();

        m.assert();
        assert_eq!(rec.path, "/05_CODE/Templates");
        assert_eq!(rec.reason, "Reusable code.");
    }

    #[test]
    fn non_success_status_carries_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).body("invalid api key");
        });

        let client = ChatClient::new(&resolved(server.base_url())).unwrap();
        let err = client.complete("p").unwrap_err().to_string();
        assert!(err.contains("401"));
        assert!(err.contains("invalid api key"));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        });

        let client = ChatClient::new(&resolved(server.base_url())).unwrap();
        let err = client.complete("p").unwrap_err().to_string();
        assert_eq!(err, "no response from model");
    }
}
