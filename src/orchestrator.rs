//! # 오케스트레이터 — 메시지 한 건의 처리 흐름
//!
//! [`Orchestrator`]는 채팅 메시지 하나를 받아 응답 메시지 목록과 지도
//! 하이라이트 대상을 만들어 내는 **조정자**입니다. 분류/평가 코어는
//! 순수 계산이고, 네트워크(AI 호출)는 이 계층에서만 일어납니다.
//!
//! ## 처리 흐름
//!
//! ```text
//! 사용자 메시지
//!   ├── 1. NFC 정규화 (macOS 입력기의 자소 분리 대응)
//!   ├── 2. 분류 (ActionClassifier)
//!   │
//!   ├── Filter(rule) ──→ 로컬 평가 (즉시, 네트워크 없음)
//!   │     evaluate → describe_outcome → [필터 메시지] + 하이라이트 ID
//!   │
//!   ├── Danger ──→ AI 위험 분석
//!   │     CSV 컨텍스트 + danger_prompt → generate
//!   │     → [IDS] 파싱 → [분석 메시지, 표시 안내] + 하이라이트 ID
//!   │
//!   └── None ──→ 일반 AI 대화
//!         시설물 관련? grounded_prompt : casual_prompt → [답변 메시지]
//! ```
//!
//! ## 실패 처리
//!
//! AI 호출 실패(키 미설정 포함)는 예외로 번지지 않고 오류 말풍선이
//! 됩니다 — 로컬 필터 경로는 AI 없이도 항상 동작합니다.

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::ai::{prompt, GeminiClient};
use crate::core::Dataset;
use crate::nlu::{describe_outcome, evaluate, ActionClassifier, FilterRule, MapAction};

/// AI 호출 실패 시 사용자에게 보여줄 문구.
const AI_FAILURE_TEXT: &str = "오류가 발생했습니다. 할당량(Quota)이나 네트워크를 확인하세요.";

/// API 키 미설정으로 AI 경로가 꺼져 있을 때의 문구.
const AI_DISABLED_TEXT: &str =
    "AI 기능이 비활성화되어 있습니다. GEMINI_API_KEY 환경 변수를 설정한 뒤 다시 시작하세요.";

/// 채팅 메시지 한 건.
///
/// role은 문자 그대로의 발신자가 아니라 **의미상의 출처**이며,
/// 프런트엔드가 말풍선 스타일을 고르는 기준입니다.
pub struct ChatMessage {
    /// 의미상의 출처.
    pub role: MessageRole,
    /// 표시용 본문 (여러 줄 가능 — 목록은 줄바꿈으로 구분).
    pub content: String,
}

/// 메시지의 의미상 출처.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    /// 사용자 입력.
    User,
    /// 로컬 필터 결과 (즉시 응답).
    Filter,
    /// AI 위험 분석 결과.
    Analysis,
    /// 일반 AI 답변.
    Assistant,
    /// 오류 안내.
    Error,
}

/// 메시지 한 건 처리의 전체 산출물.
///
/// `highlight_ids`는 채팅과 지도를 잇는 고리입니다 — 웹 계층이 이
/// 목록을 SSE 이벤트로 방송하면 지도 글루가 해당 마커를 강조합니다.
pub struct ChatOutcome {
    /// 화면에 순서대로 붙일 응답 메시지들.
    pub messages: Vec<ChatMessage>,
    /// 지도에 강조 표시할 맨홀 ID (없으면 빈 벡터).
    pub highlight_ids: Vec<String>,
    /// 강조의 근거가 된 조건 문구 (지도 배너용).
    pub condition: Option<String>,
}

impl ChatOutcome {
    fn single(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role,
                content: content.into(),
            }],
            highlight_ids: Vec::new(),
            condition: None,
        }
    }
}

/// 메시지 처리 조정자.
///
/// 상태가 없어 `&self`로 동시 호출이 가능합니다 — 웹 계층은 `Arc`로
/// 감싸 공유합니다.
pub struct Orchestrator {
    /// 읽기 전용 데이터셋.
    dataset: Arc<Dataset>,
    /// 지도 액션 분류기 (정규식은 생성 시 1회 컴파일).
    classifier: ActionClassifier,
    /// 외부 생성형 AI 클라이언트. 키 미설정이면 `None` — 로컬 필터만 동작.
    ai: Option<Arc<GeminiClient>>,
}

impl Orchestrator {
    /// 오케스트레이터를 만듭니다.
    pub fn new(dataset: Arc<Dataset>, ai: Option<Arc<GeminiClient>>) -> Self {
        Self {
            dataset,
            classifier: ActionClassifier::new(),
            ai,
        }
    }

    /// AI 경로 사용 가능 여부 (`/status` 표시용).
    pub fn ai_ready(&self) -> bool {
        self.ai.is_some()
    }

    /// 메시지 한 건을 처리합니다.
    ///
    /// 전제: `user_text`는 트리밍된 비어 있지 않은 입력 (웹 핸들러가
    /// 빈 입력을 걸러줌).
    pub async fn process_message(&self, user_text: &str) -> ChatOutcome {
        // 한글 키워드 매칭 전에 NFC로 통일 — NFD로 들어온 "지도에"도 잡힌다
        let text: String = user_text.nfc().collect();

        match self.classifier.classify(&text) {
            Some(MapAction::Filter(rule)) => self.handle_filter(&rule),
            Some(MapAction::Danger) => self.handle_danger(&text).await,
            None => self.handle_free_chat(&text).await,
        }
    }

    /// 로컬 필터 경로 — 평가기 호출 후 결과 메시지 구성. 네트워크 없음.
    fn handle_filter(&self, rule: &FilterRule) -> ChatOutcome {
        let outcome = evaluate(rule, &self.dataset);
        tracing::info!(
            condition = %rule.condition_label(),
            matched = outcome.len(),
            "로컬 필터 평가 완료"
        );

        let content = describe_outcome(rule, &outcome);
        ChatOutcome {
            messages: vec![ChatMessage {
                role: MessageRole::Filter,
                content,
            }],
            condition: (!outcome.is_empty()).then(|| rule.condition_label().to_string()),
            highlight_ids: outcome.ids,
        }
    }

    /// 위험 분석 경로 — AI가 스스로 기준을 세워 맨홀을 선별한다.
    async fn handle_danger(&self, user_text: &str) -> ChatOutcome {
        let Some(ai) = &self.ai else {
            return ChatOutcome::single(MessageRole::Error, AI_DISABLED_TEXT);
        };

        let prompt = prompt::danger_prompt(&self.dataset.to_csv(), user_text);
        let response = match ai.generate(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "위험 분석 AI 호출 실패");
                return ChatOutcome::single(MessageRole::Error, AI_FAILURE_TEXT);
            }
        };

        let (ids, explanation) = prompt::extract_ids(&response);
        tracing::info!(selected = ids.len(), "AI 위험 분석 완료");

        let mut messages = vec![ChatMessage {
            role: MessageRole::Analysis,
            content: explanation,
        }];
        if !ids.is_empty() {
            messages.push(ChatMessage {
                role: MessageRole::Filter,
                content: format!("지도에 {}개 맨홀을 표시했습니다.", ids.len()),
            });
        }

        ChatOutcome {
            messages,
            condition: (!ids.is_empty()).then(|| "AI 분석".to_string()),
            highlight_ids: ids,
        }
    }

    /// 일반 대화 경로 — 시설물 질문이면 CSV 근거, 아니면 일상 대화.
    async fn handle_free_chat(&self, user_text: &str) -> ChatOutcome {
        let Some(ai) = &self.ai else {
            return ChatOutcome::single(MessageRole::Error, AI_DISABLED_TEXT);
        };

        let prompt = if prompt::is_infra_related(user_text) {
            prompt::grounded_prompt(&self.dataset.to_csv(), user_text)
        } else {
            prompt::casual_prompt(user_text)
        };

        match ai.generate(&prompt).await {
            Ok(answer) => ChatOutcome::single(MessageRole::Assistant, answer),
            Err(e) => {
                tracing::error!(error = %e, "일반 대화 AI 호출 실패");
                ChatOutcome::single(MessageRole::Error, AI_FAILURE_TEXT)
            }
        }
    }
}
