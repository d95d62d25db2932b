//! # 필터 평가기 + 결과 메시지 포매터
//!
//! [`evaluate`]는 분류기가 만든 [`FilterRule`]을 데이터셋에 적용해
//! 일치하는 맨홀의 ID/이름 목록을 만듭니다. [`describe_outcome`]은 그
//! 결과를 채팅에 띄울 한 덩어리의 텍스트로 포장합니다.
//!
//! ## 평가 규칙
//!
//! ```text
//! 호선 → 역 → 맨홀 깊이 우선 순회 (데이터셋 순서 유지)
//!   ├── Line 규칙:    lineTitle에 keyword 미포함 → 호선 서브트리 전체 스킵
//!   ├── Station 규칙: stationName에 keyword 미포함 → 역 서브트리 스킵
//!   └── Numeric 규칙: 가지치기 없음 — 모든 맨홀을 검사
//!         match = compare(counter(field), threshold)   // 누락 카운터는 0
//! ```
//!
//! 가지치기를 통과해 도달한 맨홀은 Line/Station 규칙에서는 무조건
//! 일치입니다. 출력은 순회 순서 그대로의 병렬 시퀀스(ids, names)이며,
//! 순회가 각 맨홀을 정확히 한 번 방문하므로 중복이 없습니다.
//! **일치 0건은 유효한 상태**입니다 — 호출자는 "조건에 맞는 맨홀 없음"
//! 메시지를 띄우면 되고, 오류가 아닙니다.

use crate::core::Dataset;

use super::intent::FilterRule;

/// 결과 목록에서 이름을 최대 몇 개까지 펼쳐 보여줄지.
const MAX_LISTED_NAMES: usize = 10;

/// 평가 결과 — 순회 순서가 유지되는 병렬 ID/이름 시퀀스.
///
/// `ids`는 지도 하이라이트 호출로, `names`는 채팅 목록으로 흘러갑니다.
/// 두 시퀀스는 항상 같은 길이입니다.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOutcome {
    /// 일치한 맨홀 ID (데이터셋 순회 순서).
    pub ids: Vec<String>,
    /// 일치한 맨홀 이름 (ids와 같은 순서).
    pub names: Vec<String>,
}

impl FilterOutcome {
    /// 일치 건수.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 일치 0건인가.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// 필터 규칙을 데이터셋에 적용합니다.
///
/// 순수 함수 — 같은 (규칙, 데이터셋)이면 항상 같은 순서의 같은 결과를
/// 돌려줍니다. `Danger` 액션은 타입상 이 함수에 들어올 수 없습니다
/// ([`FilterRule`]이 평가 가능한 세 종류만 담는 이유).
pub fn evaluate(rule: &FilterRule, dataset: &Dataset) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for line in &dataset.lines {
        // 호선 가지치기: Line 규칙이면 호선명 불일치 시 서브트리 스킵
        if let FilterRule::Line { keyword } = rule {
            if !line.line_title.contains(keyword.as_str()) {
                continue;
            }
        }

        for st in &line.stations {
            // 역 가지치기: Station 규칙이면 역명 불일치 시 서브트리 스킵
            if let FilterRule::Station { keyword } = rule {
                if !st.station_name.contains(keyword.as_str()) {
                    continue;
                }
            }

            for mh in &st.manholes {
                let matched = match rule {
                    FilterRule::Numeric {
                        field,
                        threshold,
                        compare,
                        ..
                    } => compare.holds(mh.counter(*field), *threshold),
                    // 가지치기를 통과해 도달했다면 무조건 일치
                    FilterRule::Line { .. } | FilterRule::Station { .. } => true,
                };

                if matched {
                    outcome.ids.push(mh.id.clone());
                    outcome.names.push(mh.name.clone());
                }
            }
        }
    }

    outcome
}

/// 평가 결과를 채팅 메시지 본문으로 포장합니다.
///
/// - 0건: 조건을 되풀이해 주는 고정 "없음" 문구.
/// - 1건 이상: 조건 + 건수 헤더, 이어서 처음 10개 이름 목록.
///   10개를 넘으면 `...외 N개` 표시를 덧붙인다.
///
/// ```text
/// 수선 2회 이상인 맨홀 3개를 지도에 표시했습니다.
/// - 반월당역 2번 맨홀
/// - 반월당역 3번 맨홀
/// - 범어역 1번 맨홀
/// ```
pub fn describe_outcome(rule: &FilterRule, outcome: &FilterOutcome) -> String {
    if outcome.is_empty() {
        return format!(
            "조건에 맞는 맨홀이 없습니다. (조건: {})",
            rule.condition_label()
        );
    }

    // Numeric 조건문에는 조사가 붙고("...이상인 맨홀"),
    // 호선/역 키워드는 그대로 이어 쓴다("2호선 맨홀").
    let header = match rule {
        FilterRule::Numeric { label, .. } => {
            format!("{}인 맨홀 {}개를 지도에 표시했습니다.", label, outcome.len())
        }
        FilterRule::Line { keyword } | FilterRule::Station { keyword } => {
            format!("{} 맨홀 {}개를 지도에 표시했습니다.", keyword, outcome.len())
        }
    };

    let mut text = header;
    for name in outcome.names.iter().take(MAX_LISTED_NAMES) {
        text.push_str("\n- ");
        text.push_str(name);
    }
    if outcome.len() > MAX_LISTED_NAMES {
        text.push_str(&format!("\n...외 {}개", outcome.len() - MAX_LISTED_NAMES));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::tests::sample_dataset;
    use crate::core::manhole::CounterKind;
    use crate::core::{Dataset, Line, Manhole, Station};
    use crate::nlu::intent::Comparator;

    fn numeric_rule(threshold: u32, compare: Comparator) -> FilterRule {
        FilterRule::Numeric {
            field: CounterKind::Repair,
            threshold,
            compare,
            label: format!("수선 {}회 {}", threshold, compare.label()),
        }
    }

    #[test]
    fn numeric_gte_coerces_missing_to_zero() {
        // sample_dataset의 repair_cnt 분포: 0, 2, 3, 누락, 1
        let ds = sample_dataset();
        let outcome = evaluate(&numeric_rule(2, Comparator::Gte), &ds);
        // 2와 3만 일치 — 누락(→0)과 0, 1은 제외
        assert_eq!(outcome.ids, ["MH-1-01-02", "MH-1-01-03"]);
        assert_eq!(outcome.names, ["반월당역 2번 맨홀", "반월당역 3번 맨홀"]);
    }

    #[test]
    fn numeric_lt_includes_missing_as_zero() {
        let ds = sample_dataset();
        let outcome = evaluate(&numeric_rule(1, Comparator::Lt), &ds);
        // repair < 1 → repair 0인 MH-1-01-01과 누락(→0)인 MH-1-02-01
        assert_eq!(outcome.ids, ["MH-1-01-01", "MH-1-02-01"]);
    }

    #[test]
    fn line_rule_prunes_other_lines_and_keeps_order() {
        let ds = sample_dataset();
        let outcome = evaluate(&FilterRule::Line { keyword: "1호선".into() }, &ds);
        assert_eq!(
            outcome.ids,
            ["MH-1-01-01", "MH-1-01-02", "MH-1-01-03", "MH-1-02-01"]
        );
    }

    #[test]
    fn station_rule_selects_single_station() {
        let ds = sample_dataset();
        let outcome = evaluate(&FilterRule::Station { keyword: "중앙로역".into() }, &ds);
        assert_eq!(outcome.ids, ["MH-1-02-01"]);
        assert_eq!(outcome.names, ["중앙로역 1번 맨홀"]);
    }

    #[test]
    fn evaluate_is_order_stable_and_idempotent() {
        let ds = sample_dataset();
        let rule = FilterRule::Line { keyword: "1호선".into() };
        let first = evaluate(&rule, &ds);
        let second = evaluate(&rule, &ds);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_matches_is_valid_empty_outcome() {
        let ds = sample_dataset();
        let outcome = evaluate(&FilterRule::Line { keyword: "3호선".into() }, &ds);
        assert!(outcome.is_empty());
        assert!(outcome.names.is_empty());
    }

    // ─── describe_outcome ──────────────────────────────────────

    #[test]
    fn numeric_header_text() {
        let ds = sample_dataset();
        let rule = numeric_rule(2, Comparator::Gte);
        let outcome = evaluate(&rule, &ds);
        let text = describe_outcome(&rule, &outcome);
        assert!(
            text.starts_with("수선 2회 이상인 맨홀 2개를 지도에 표시했습니다."),
            "text: {text}"
        );
        assert!(text.contains("- 반월당역 2번 맨홀"));
    }

    #[test]
    fn keyword_header_text() {
        let ds = sample_dataset();
        let rule = FilterRule::Station { keyword: "범어역".into() };
        let outcome = evaluate(&rule, &ds);
        let text = describe_outcome(&rule, &outcome);
        assert!(text.starts_with("범어역 맨홀 1개를 지도에 표시했습니다."));
    }

    #[test]
    fn no_match_text_embeds_condition() {
        let rule = FilterRule::Line { keyword: "2호선".into() };
        let text = describe_outcome(&rule, &FilterOutcome::default());
        assert_eq!(text, "조건에 맞는 맨홀이 없습니다. (조건: 2호선)");
    }

    #[test]
    fn listing_caps_at_ten_with_overflow_marker() {
        // 맨홀 12기짜리 단일 역 데이터셋
        let manholes: Vec<Manhole> = (1..=12)
            .map(|i| Manhole {
                id: format!("MH-9-01-{i:02}"),
                name: format!("시청역 {i}번 맨홀"),
                lat: 35.87,
                lng: 128.60,
                flood_freq: None,
                repair_cnt: None,
                complaint_cnt: None,
            })
            .collect();
        let ds = Dataset {
            lines: vec![Line {
                line_id: "line-9".into(),
                line_title: "9호선".into(),
                stations: vec![Station {
                    station_id: "st-901".into(),
                    station_name: "시청역".into(),
                    manholes,
                }],
            }],
        };

        let rule = FilterRule::Line { keyword: "9호선".into() };
        let outcome = evaluate(&rule, &ds);
        assert_eq!(outcome.len(), 12);

        let text = describe_outcome(&rule, &outcome);
        let listed = text.lines().filter(|l| l.starts_with("- ")).count();
        assert_eq!(listed, 10);
        assert!(text.ends_with("...외 2개"), "text: {text}");
    }
}
