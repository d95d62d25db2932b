//! # NLU — 자연어 지도 명령 처리
//!
//! 한국어 채팅 메시지를 지도 필터링 액션으로 바꾸는 파이프라인입니다.
//! 전부 결정적 순수 계산이라 네트워크도, 잠금도, 중단점도 없습니다 —
//! 호출 스레드에서 동기로 돌려도 블로킹 걱정이 없습니다.
//!
//! ```text
//! 사용자 메시지 (NFC 정규화 후)
//!   ├── intent::classify() ──→ MapAction | None
//!   │       Numeric / Line / Station → FilterRule
//!   │       Danger                   → 외부 AI 위임
//!   │       None                     → 일반 AI 대화 위임
//!   └── filter::evaluate(rule) ──→ { ids, names }
//!           └── filter::describe_outcome() → 채팅 메시지 본문
//! ```
//!
//! | 모듈 | 역할 |
//! |------|------|
//! | [`intent`] | 키워드/정규식 기반 액션 분류기 |
//! | [`filter`] | 계층 순회 필터 평가기 + 결과 포매터 |

/// 지도 액션 분류기.
pub mod intent;

/// 필터 평가기와 결과 메시지 포매터.
pub mod filter;

pub use filter::{describe_outcome, evaluate, FilterOutcome};
pub use intent::{ActionClassifier, Comparator, FilterRule, MapAction};
