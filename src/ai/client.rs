//! # Generative Language API 클라이언트
//!
//! [`GeminiClient`]는 Google Generative Language API의
//! `models/{model}:generateContent` 엔드포인트를 호출하는 얇은 HTTP
//! 클라이언트입니다. 스트리밍·멀티턴·함수호출은 쓰지 않습니다 —
//! 이 시스템의 AI 경로는 "프롬프트 하나 → 텍스트 하나"면 충분합니다.
//!
//! ## 설정
//!
//! | 항목 | 출처 | 기본값 |
//! |------|------|--------|
//! | API 키 | `GEMINI_API_KEY` 환경 변수 | 없음 (필수) |
//! | 모델 | `GEMINI_MODEL` 환경 변수 | `gemma-3-27b-it` |
//!
//! 키가 없으면 클라이언트 생성이 실패하고, 서버는 AI 기능이 꺼진 채로
//! 기동합니다 — 로컬 필터링은 그대로 동작합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generative Language API 베이스 URL.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 기본 모델.
const DEFAULT_MODEL: &str = "gemma-3-27b-it";

/// API 키 환경 변수 이름.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 모델 재지정 환경 변수 이름.
const MODEL_ENV: &str = "GEMINI_MODEL";

/// AI 호출 실패 분류.
///
/// 이 오류는 사용자에게 5xx로 번지지 않습니다 — 오케스트레이터가
/// 채팅 오류 말풍선으로 바꿔 보여줍니다.
#[derive(Debug, Error)]
pub enum AiError {
    /// `GEMINI_API_KEY` 환경 변수가 설정되지 않음.
    #[error("GEMINI_API_KEY 환경 변수가 설정되지 않았습니다")]
    MissingApiKey,

    /// 전송 계층 실패 (DNS, TLS, 타임아웃 등).
    #[error("API 요청 실패: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx가 아닌 응답 (할당량 초과 429 포함).
    #[error("API 응답 오류 (HTTP {status}): {body}")]
    Status {
        /// HTTP 상태 코드.
        status: reqwest::StatusCode,
        /// 응답 본문 앞부분 (진단용).
        body: String,
    },

    /// 응답에 후보 텍스트가 없음.
    #[error("AI 응답에 본문이 없습니다")]
    EmptyResponse,
}

// ─── 와이어 타입 ─────────────────────────────────────────────────
// generateContent 요청/응답 중 실제로 쓰는 필드만 모델링한다.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// generateContent 엔드포인트 클라이언트.
///
/// `reqwest::Client`는 내부 커넥션 풀을 공유하므로 애플리케이션 전체에
/// 한 인스턴스를 `Arc`로 돌려 씁니다.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// 환경 변수에서 설정을 읽어 클라이언트를 만듭니다.
    ///
    /// # 오류
    ///
    /// `GEMINI_API_KEY`가 없으면 [`AiError::MissingApiKey`].
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| AiError::MissingApiKey)?;
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// 키와 모델을 직접 지정해 클라이언트를 만듭니다 (테스트용 포함).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// 사용 중인 모델명.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// 프롬프트 하나를 보내고 생성된 텍스트를 돌려받습니다.
    ///
    /// 후보가 여러 part로 쪼개져 오면 이어 붙입니다. 재시도는 하지
    /// 않습니다 — 실패는 오케스트레이터가 채팅 오류 메시지로 처리하고,
    /// 사용자가 다시 보내면 그게 곧 재시도입니다.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            // 진단용으로 본문 앞부분만 보존 (한글 경계 안전하게 문자 단위)
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(300)
                .collect();
            tracing::warn!(status = %status, "Generative Language API 오류 응답");
            return Err(AiError::Status { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{"text": "첫 부분, "}, {"text": "둘째 부분"}] }
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "첫 부분, 둘째 부분");
    }

    #[test]
    fn response_without_candidates_deserializes_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn request_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "질문" }],
            }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"질문"}]}]}"#);
    }
}
