//! # 프롬프트 구성과 응답 파싱
//!
//! 생성형 AI 경로에 쓰이는 세 가지 프롬프트와, AI 응답에서 맨홀 ID
//! 목록을 꺼내는 파서를 모아 둔 모듈입니다.
//!
//! | 프롬프트 | 언제 | 근거 데이터 |
//! |----------|------|------------|
//! | [`danger_prompt`] | Danger 액션 — AI가 직접 위험 맨홀을 선별 | CSV 전체 |
//! | [`grounded_prompt`] | 일반 질문 중 시설물 관련 | CSV 전체 |
//! | [`casual_prompt`] | 일반 질문 중 시설물 무관 | 없음 |
//!
//! ## `[IDS]` 계약
//!
//! 위험 분석 프롬프트는 AI에게 선별한 맨홀 ID를
//! `[IDS]MH-1-01-01,MH-1-02-05[/IDS]` 형태의 태그로 응답 첫 줄에
//! 넣으라고 지시합니다. [`extract_ids`]가 그 태그를 파싱해 (ID 목록,
//! 태그를 제거한 설명 텍스트)로 분리합니다. 해당 맨홀이 없으면 빈 태그
//! `[IDS][/IDS]`가 오고, 파서는 빈 목록을 돌려줍니다.

use regex::Regex;
use std::sync::OnceLock;

/// 시설물 관련 질문 판별 키워드 — 하나라도 있으면 CSV 근거 프롬프트 사용.
const INFRA_KEYWORDS: &[&str] = &[
    "맨홀", "역", "호선", "좌표", "위도", "경도", "침수", "수선", "민원", "위험", "데이터",
    "목록", "어디", "가장", "제일", "상태", "분석", "점검", "관리", "지역",
];

/// `[IDS]...[/IDS]` 태그 정규식 (한 번 컴파일해 재사용).
fn ids_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[IDS\](.*?)\[/IDS\]").unwrap())
}

/// 질문이 시설물 데이터와 관련 있는지 — 관련 없으면 일상 대화 프롬프트.
pub fn is_infra_related(message: &str) -> bool {
    INFRA_KEYWORDS.iter().any(|kw| message.contains(kw))
}

/// 위험 분석 프롬프트 — AI가 스스로 기준을 세워 맨홀을 선별한다.
///
/// 응답 형식을 `[IDS]` 태그로 강제해, 설명 텍스트와 지도 하이라이트
/// 대상을 한 번의 호출로 함께 받습니다.
pub fn danger_prompt(csv_context: &str, user_message: &str) -> String {
    format!(
        "\
당신은 대구교통공사(DTRO)의 맨홀 관리 시스템 전문 AI 어시스턴트입니다.
아래 CSV 데이터를 분석하여 사용자의 요청에 응답하세요.

<Instruction>
1. 사용자의 요청을 분석하여 해당하는 맨홀들을 선별하세요.
2. 침수빈도, 수선횟수, 민원횟수 등을 종합적으로 고려하여 스스로 판단 기준을 세우세요.
3. 반드시 아래 형식으로 응답하세요:
   - 첫 줄에 [IDS] 태그 안에 선별한 맨홀 ID를 쉼표로 나열: [IDS]MH-1-01-01,MH-1-02-05[/IDS]
   - 그 아래에 분석 근거와 설명을 작성하세요.
4. 선별 기준과 이유를 구체적으로 설명해주세요.
5. 해당하는 맨홀이 없으면 [IDS][/IDS] (빈 태그)로 응답하세요.
</Instruction>

<Data>
{csv_context}
</Data>

요청: {user_message}"
    )
}

/// 데이터 근거 질의응답 프롬프트 — CSV에 있는 내용만으로 답하게 한다.
pub fn grounded_prompt(csv_context: &str, question: &str) -> String {
    format!(
        "\
당신은 대구교통공사(DTRO)의 맨홀 관리 시스템 전문 AI 어시스턴트입니다.
아래 제공된 CSV 데이터를 분석하여 사용자의 질문에 답변하세요.

<Instruction>
1. 제공된 [Data]에 있는 내용에 기반해서만 답변하세요. 정보가 없으면 솔직하게 모른다고 답하세요.
2. 특정 맨홀의 정보를 나열할 때는 가독성이 좋게 해주세요.
3. 침수 빈도나 민원 횟수가 높은 위험 시설물에 대해서는 주의를 당부하는 멘트를 추가하세요.
</Instruction>

<Data>
{csv_context}
</Data>

Question: {question}"
    )
}

/// 시설물과 무관한 일상 대화 프롬프트.
pub fn casual_prompt(question: &str) -> String {
    format!(
        "너는 '대구교통공사 맨홀관리 시스템'의 AI야. 시설물 관리와 관련 없는 \
일상적인 대화나 질문에는 친절하게 대답해줘. 질문: {question}"
    )
}

/// AI 응답에서 `[IDS]` 태그를 파싱합니다.
///
/// 반환값: (맨홀 ID 목록, 태그를 제거하고 트리밍한 설명 텍스트).
/// 태그가 없거나 비어 있으면 ID 목록은 빈 벡터입니다 — 오류가 아니라
/// "선별 대상 없음"입니다.
pub fn extract_ids(response: &str) -> (Vec<String>, String) {
    let ids = ids_tag_re()
        .captures(response)
        .map(|cap| {
            cap[1]
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let explanation = ids_tag_re().replace(response, "").trim().to_string();
    (ids, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infra_keywords_gate_grounded_prompt() {
        assert!(is_infra_related("침수가 가장 잦은 곳이 어디야?"));
        assert!(is_infra_related("2호선 상태 알려줘"));
        assert!(!is_infra_related("오늘 점심 뭐 먹을까"));
    }

    #[test]
    fn extract_ids_splits_and_trims() {
        let response = "[IDS]MH-1-01-01, MH-1-02-05 ,MH-2-01-01[/IDS]\n침수 빈도 기준으로 선별했습니다.";
        let (ids, explanation) = extract_ids(response);
        assert_eq!(ids, ["MH-1-01-01", "MH-1-02-05", "MH-2-01-01"]);
        assert_eq!(explanation, "침수 빈도 기준으로 선별했습니다.");
    }

    #[test]
    fn empty_tag_yields_no_ids() {
        let (ids, explanation) = extract_ids("[IDS][/IDS]\n조건에 해당하는 맨홀이 없습니다.");
        assert!(ids.is_empty());
        assert_eq!(explanation, "조건에 해당하는 맨홀이 없습니다.");
    }

    #[test]
    fn missing_tag_keeps_full_text() {
        let (ids, explanation) = extract_ids("태그 없이 답변만 온 경우입니다.");
        assert!(ids.is_empty());
        assert_eq!(explanation, "태그 없이 답변만 온 경우입니다.");
    }

    #[test]
    fn prompts_embed_context_and_question() {
        let csv = "호선,ID\n1호선,MH-1-01-01\n";
        let danger = danger_prompt(csv, "위험한 맨홀 보여줘");
        assert!(danger.contains(csv));
        assert!(danger.contains("[IDS]"));
        assert!(danger.ends_with("요청: 위험한 맨홀 보여줘"));

        let grounded = grounded_prompt(csv, "민원 많은 역은?");
        assert!(grounded.contains(csv));
        assert!(grounded.ends_with("Question: 민원 많은 역은?"));

        let casual = casual_prompt("안녕!");
        assert!(casual.ends_with("질문: 안녕!"));
    }
}
