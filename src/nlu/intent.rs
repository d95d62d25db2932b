//! # 지도 액션 분류기 (Intent Classifier)
//!
//! [`ActionClassifier`]는 채팅 메시지에서 **지도 필터링 의도**를
//! 추출합니다. 키워드 + 정규식 기반의 결정적 분류기로, 우선순위가
//! 높은 분기부터 차례로 시도하고 첫 매치에서 끝납니다:
//!
//! | 우선순위 | 분기 | 예시 | 산출 |
//! |---------|------|------|------|
//! | 0 | 액션 게이트 | "표시/보여/찾아/..." 미포함 | `None` (일반 대화) |
//! | 1 | 숫자 조건 | "수선이 2회 이상인 맨홀 표시" | [`FilterRule::Numeric`] |
//! | 2 | 위험 분석 | "위험한 맨홀 보여줘" | [`MapAction::Danger`] |
//! | 3 | 호선 | "1호선 맨홀 표시해줘" | [`FilterRule::Line`] |
//! | 4 | 역 | "반월당역 맨홀 보여줘" | [`FilterRule::Station`] |
//!
//! `None`은 오류가 아니라 "지도 요청이 아님"이며, 호출자는 일반 AI
//! 대화로 위임해야 합니다. `Danger`는 로컬 평가기가 아닌 외부 생성형
//! AI가 판단하는 경로입니다.
//!
//! ## 알려진 휴리스틱 한계 (의도적으로 유지)
//!
//! - 필드 키워드가 둘 이상이면 선언 순서(수선 → 침수 → 민원)의 첫
//!   키워드가 이긴다. 의미상 더 적합한 키워드가 뒤에 있어도 마찬가지 —
//!   제품 결정 없이 바꾸지 않는다.
//! - 임계값은 메시지 **어디든** 처음 나오는 숫자 런이다. "1호선 수선
//!   맨홀 표시"는 Numeric(수선, 1)으로 분류된다.

use regex::Regex;

use crate::core::CounterKind;

/// 액션 게이트 키워드 — 하나라도 포함돼야 지도 요청으로 판단.
const ACTION_KEYWORDS: &[&str] = &["표시", "보여", "찾아", "하이라이트", "마크", "지도에"];

/// 필드 키워드 → 카운터 필드. **선언 순서가 곧 우선순위**다.
const FIELD_KEYWORDS: &[(&str, CounterKind)] = &[
    ("수선", CounterKind::Repair),
    ("침수", CounterKind::Flood),
    ("민원", CounterKind::Complaint),
];

/// 복합 판단 키워드 — AI 분석(위험도 선별)이 필요한 요청.
const DANGER_KEYWORDS: &[&str] = &["주의", "위험", "관리", "점검", "우선", "심각", "긴급", "취약"];

/// 비교 연산자 — 파싱 시점에 확정되는 닫힌 집합.
///
/// 클로저 대신 enum으로 고정해 두면 평가기와 테스트에서 값 비교가
/// 가능하고, 처리 누락이 컴파일 타임에 드러납니다.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    /// 이상 (기본값).
    Gte,
    /// 초과.
    Gt,
    /// 이하.
    Lte,
    /// 미만.
    Lt,
}

impl Comparator {
    /// `value`가 `threshold`에 대해 이 비교를 만족하는가.
    pub fn holds(self, value: u32, threshold: u32) -> bool {
        match self {
            Comparator::Gte => value >= threshold,
            Comparator::Gt => value > threshold,
            Comparator::Lte => value <= threshold,
            Comparator::Lt => value < threshold,
        }
    }

    /// 조건문 라벨 ("수선 2회 이상"의 마지막 토큰).
    pub fn label(self) -> &'static str {
        match self {
            Comparator::Gte => "이상",
            Comparator::Gt => "초과",
            Comparator::Lte => "이하",
            Comparator::Lt => "미만",
        }
    }
}

/// 로컬 평가기가 처리하는 세 가지 필터 규칙.
///
/// [`MapAction`]에서 한 단계 내려 분리해 둔 이유: 평가기
/// ([`super::filter::evaluate`])가 이 타입에 대해 **전함수**가 되어
/// "Danger가 평가기로 흘러드는" 경우가 타입 수준에서 차단됩니다.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterRule {
    /// 카운터 필드 숫자 조건 (예: 수선 2회 이상).
    Numeric {
        /// 비교 대상 카운터 필드.
        field: CounterKind,
        /// 메시지의 첫 숫자 런을 파싱한 임계값.
        threshold: u32,
        /// 파싱 시점에 확정된 비교 연산자.
        compare: Comparator,
        /// 사람이 읽는 조건문 (예: "수선 2회 이상").
        label: String,
    },
    /// 호선명 부분 문자열 매칭 (예: "2호선").
    Line {
        /// `lineTitle`에 대해 검사할 부분 문자열.
        keyword: String,
    },
    /// 역명 부분 문자열 매칭 (예: "반월당역").
    Station {
        /// `stationName`에 대해 검사할 부분 문자열.
        keyword: String,
    },
}

impl FilterRule {
    /// 결과 메시지에 들어가는 조건 표현 — Numeric은 label, 나머지는 keyword.
    pub fn condition_label(&self) -> &str {
        match self {
            FilterRule::Numeric { label, .. } => label,
            FilterRule::Line { keyword } | FilterRule::Station { keyword } => keyword,
        }
    }
}

/// 분류된 지도 액션.
#[derive(Clone, Debug, PartialEq)]
pub enum MapAction {
    /// 로컬 필터링으로 즉시 처리 가능한 요청.
    Filter(FilterRule),
    /// 외부 생성형 AI에 위임하는 위험도 분석 요청.
    Danger,
}

/// 키워드 + 정규식 기반 지도 액션 분류기.
///
/// 정규식은 생성 시 한 번 컴파일해 재사용합니다. 상태가 없으므로
/// `&self`로 얼마든지 동시 호출해도 됩니다.
pub struct ActionClassifier {
    /// 첫 숫자 런 추출용.
    digits_re: Regex,
    /// "N호선" 패턴.
    line_re: Regex,
    /// "...역" 패턴 (한글 음절 + 역).
    station_re: Regex,
    /// 비교 연산자 패턴 — **배열 순서가 곧 검사 순서**다.
    comparator_res: [(Regex, Comparator); 4],
}

impl ActionClassifier {
    /// 정규식을 컴파일한 분류기를 만듭니다.
    pub fn new() -> Self {
        Self {
            digits_re: Regex::new(r"\d+").unwrap(),
            line_re: Regex::new(r"(\d+)호선").unwrap(),
            station_re: Regex::new(r"([가-힣]+역)").unwrap(),
            comparator_res: [
                (Regex::new("이상").unwrap(), Comparator::Gte),
                (Regex::new("초과").unwrap(), Comparator::Gt),
                (Regex::new("이하").unwrap(), Comparator::Lte),
                (Regex::new("미만").unwrap(), Comparator::Lt),
            ],
        }
    }

    /// 메시지를 분류합니다.
    ///
    /// 전제: `message`는 트리밍된 비어 있지 않은 사용자 입력
    /// (NFC 정규화는 호출자 — [`crate::orchestrator`] — 책임).
    ///
    /// ## 분기 순서
    ///
    /// 1. 액션 키워드가 하나도 없으면 즉시 `None`.
    /// 2. 숫자 조건: 필드 키워드가 있고 메시지에 숫자 런이 있으면
    ///    `Numeric`. 숫자가 없으면 그 필드 후보만 건너뛰고 다음
    ///    후보/분기로 진행한다 (파싱 실패가 아님).
    /// 3. 위험 키워드 → `Danger`.
    /// 4. "N호선" → `Line`.
    /// 5. "...역" → `Station`.
    /// 6. 전부 불발 → `None`.
    pub fn classify(&self, message: &str) -> Option<MapAction> {
        // 0. 게이트: 지도 액션 요청인지부터 확인
        if !ACTION_KEYWORDS.iter().any(|kw| message.contains(kw)) {
            return None;
        }

        // 1. 숫자 조건 필터 (예: "수선이 2회 이상", "민원 3회 초과")
        for &(keyword, field) in FIELD_KEYWORDS {
            if !message.contains(keyword) {
                continue;
            }
            // 숫자 런이 없으면 이 필드 후보는 성립하지 않음
            let Some(num) = self.digits_re.find(message) else {
                continue;
            };
            let Ok(threshold) = num.as_str().parse::<u32>() else {
                continue;
            };

            // 비교 연산자: 선언 순서대로 첫 매치, 기본값은 이상(≥)
            let compare = self
                .comparator_res
                .iter()
                .find(|(re, _)| re.is_match(message))
                .map(|&(_, cmp)| cmp)
                .unwrap_or(Comparator::Gte);

            // 라벨의 필드 토큰은 매칭된 키워드와 철자가 같다 (CounterKind::label)
            return Some(MapAction::Filter(FilterRule::Numeric {
                field,
                threshold,
                compare,
                label: format!("{} {}회 {}", field.label(), threshold, compare.label()),
            }));
        }

        // 2. AI 분석 필터 (예: "주의를 기울여야 할 맨홀 표시해줘")
        if DANGER_KEYWORDS.iter().any(|kw| message.contains(kw)) {
            return Some(MapAction::Danger);
        }

        // 3. 호선 필터 (예: "1호선 맨홀 표시해줘")
        if let Some(cap) = self.line_re.captures(message) {
            return Some(MapAction::Filter(FilterRule::Line {
                keyword: format!("{}호선", &cap[1]),
            }));
        }

        // 4. 역 필터 (예: "반월당역 맨홀 보여줘")
        if let Some(cap) = self.station_re.captures(message) {
            return Some(MapAction::Filter(FilterRule::Station {
                keyword: cap[1].to_string(),
            }));
        }

        None
    }
}

impl Default for ActionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(msg: &str) -> Option<MapAction> {
        ActionClassifier::new().classify(msg)
    }

    // ─── 게이트 ────────────────────────────────────────────────

    #[test]
    fn no_action_keyword_means_no_action() {
        assert_eq!(classify("오늘 날씨 어때?"), None);
        // 위험 키워드가 있어도 액션 키워드가 없으면 일반 대화
        assert_eq!(classify("위험한 맨홀 좀 봐줘"), None);
    }

    #[test]
    fn action_keyword_alone_still_yields_none() {
        // 게이트는 통과하지만 2~5 분기가 전부 불발 → None (오류 아님)
        assert_eq!(classify("지도에 표시해줘"), None);
    }

    // ─── 숫자 조건 ─────────────────────────────────────────────

    #[test]
    fn numeric_repair_threshold() {
        let action = classify("수선이 2회 이상인 맨홀 지도에 표시해줘").unwrap();
        assert_eq!(
            action,
            MapAction::Filter(FilterRule::Numeric {
                field: CounterKind::Repair,
                threshold: 2,
                compare: Comparator::Gte,
                label: "수선 2회 이상".into(),
            })
        );
    }

    #[test]
    fn comparator_defaults_to_gte() {
        let Some(MapAction::Filter(FilterRule::Numeric { compare, label, .. })) =
            classify("민원 3회 맨홀 보여줘")
        else {
            panic!("숫자 필터여야 함");
        };
        assert_eq!(compare, Comparator::Gte);
        assert_eq!(label, "민원 3회 이상");
    }

    #[test]
    fn comparator_order_gte_wins_over_gt() {
        // "이상"과 "초과"가 함께 있으면 검사 순서상 앞선 "이상"이 이긴다
        let Some(MapAction::Filter(FilterRule::Numeric { compare, .. })) =
            classify("수선 2회 이상 초과 맨홀 표시")
        else {
            panic!("숫자 필터여야 함");
        };
        assert_eq!(compare, Comparator::Gte);
    }

    #[test]
    fn each_comparator_pattern_resolves() {
        for (word, expected) in [
            ("이상", Comparator::Gte),
            ("초과", Comparator::Gt),
            ("이하", Comparator::Lte),
            ("미만", Comparator::Lt),
        ] {
            let msg = format!("침수 2회 {word} 맨홀 표시해줘");
            let Some(MapAction::Filter(FilterRule::Numeric { field, compare, .. })) =
                classify(&msg)
            else {
                panic!("숫자 필터여야 함: {msg}");
            };
            assert_eq!(field, CounterKind::Flood);
            assert_eq!(compare, expected);
        }
    }

    #[test]
    fn field_keyword_order_is_declaration_order() {
        // "수선"과 "민원"이 함께 있으면 선언 순서상 앞선 "수선"이 이긴다
        let Some(MapAction::Filter(FilterRule::Numeric { field, .. })) =
            classify("민원 말고 수선 2회 이상 맨홀 표시")
        else {
            panic!("숫자 필터여야 함");
        };
        assert_eq!(field, CounterKind::Repair);
    }

    #[test]
    fn numeric_without_digits_falls_through() {
        // "수선"은 있지만 숫자가 없음 → 숫자 분기 불발, 역 분기로 진행
        assert_eq!(
            classify("반월당역 수선 맨홀 보여줘"),
            Some(MapAction::Filter(FilterRule::Station {
                keyword: "반월당역".into()
            }))
        );
    }

    #[test]
    fn numeric_picks_first_digit_run_anywhere() {
        // 알려진 한계: 호선 숫자가 임계값으로 잡힌다 (의도적으로 유지)
        let Some(MapAction::Filter(FilterRule::Numeric { field, threshold, .. })) =
            classify("1호선 수선 맨홀 표시해줘")
        else {
            panic!("숫자 필터여야 함");
        };
        assert_eq!(field, CounterKind::Repair);
        assert_eq!(threshold, 1);
    }

    // ─── 위험 / 호선 / 역 ──────────────────────────────────────

    #[test]
    fn danger_keywords_delegate_to_ai() {
        assert_eq!(classify("위험한 맨홀 보여줘"), Some(MapAction::Danger));
        assert_eq!(
            classify("점검이 시급한 맨홀 지도에 표시해줘"),
            Some(MapAction::Danger)
        );
    }

    #[test]
    fn numeric_outranks_danger() {
        // 위험 키워드가 있어도 필드 키워드 + 숫자가 있으면 숫자 분기가 먼저
        let action = classify("긴급! 침수 2회 이상 맨홀 표시").unwrap();
        assert!(matches!(
            action,
            MapAction::Filter(FilterRule::Numeric {
                field: CounterKind::Flood,
                ..
            })
        ));
    }

    #[test]
    fn line_filter_captures_digits_and_suffix() {
        assert_eq!(
            classify("2호선 맨홀 보여줘"),
            Some(MapAction::Filter(FilterRule::Line {
                keyword: "2호선".into()
            }))
        );
    }

    #[test]
    fn station_filter_captures_hangul_run() {
        assert_eq!(
            classify("반월당역 맨홀 찾아줘"),
            Some(MapAction::Filter(FilterRule::Station {
                keyword: "반월당역".into()
            }))
        );
    }

    #[test]
    fn condition_label_matches_variant() {
        let rule = FilterRule::Numeric {
            field: CounterKind::Repair,
            threshold: 2,
            compare: Comparator::Gte,
            label: "수선 2회 이상".into(),
        };
        assert_eq!(rule.condition_label(), "수선 2회 이상");
        assert_eq!(
            FilterRule::Line { keyword: "2호선".into() }.condition_label(),
            "2호선"
        );
    }
}
