//! # Core — 도메인 기본 타입
//!
//! 시설물 도메인의 기본 타입을 모아 둔 모듈입니다:
//!
//! - [`Manhole`] — 최말단 시설물 엔티티 (좌표 + 이력 카운터)
//! - [`CounterKind`] — 숫자 필터가 참조하는 카운터 필드의 닫힌 집합
//! - [`Line`] / [`Station`] / [`Dataset`] — 호선 → 역 → 맨홀 3단 계층
//!
//! 데이터셋은 외부 수집 단계가 만든 JSON을 로드한 뒤 읽기 전용으로만
//! 사용합니다. 분류/평가 코어는 `(메시지, 데이터셋) → 액션`,
//! `(액션, 데이터셋) → 결과`의 순수 함수이며 이 모듈의 타입을 변경하지
//! 않습니다.

/// 맨홀 엔티티와 카운터 접근자.
pub mod manhole;

/// 호선/역/데이터셋 계층과 정규 순회.
pub mod dataset;

// 편의 re-export — `crate::core::Dataset` 형태로 바로 사용.
pub use dataset::{Dataset, Line, Station};
pub use manhole::{CounterKind, Manhole};
