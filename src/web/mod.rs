//! # Web — axum 라우터와 화면 계층
//!
//! **Axum + HTMX + Maud + SSE**로 구성된 웹 계층입니다.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Browser (HTMX + SSE + 지도 SDK 글루)                 │
//! ├──────────────────────────────────────────────────────┤
//! │ Axum Router (이 모듈)                                │
//! │  ├── GET  /              → 대시보드 페이지           │
//! │  ├── GET  /status        → JSON: AI 가용성·규모      │
//! │  ├── GET  /events        → SSE (지도 하이라이트)     │
//! │  ├── POST /chat          → HTMX 프래그먼트           │
//! │  ├── GET  /menu/{target} → HTMX 프래그먼트 (모달)    │
//! │  ├── GET  /api/manholes      → JSON 데이터셋         │
//! │  ├── GET  /api/manholes/{id} → JSON 맨홀 상세        │
//! │  └── GET  /api/weather       → JSON 날씨 오버레이    │
//! ├──────────────────────────────────────────────────────┤
//! │ 정적 파일 (tower_http::ServeDir → /assets/)          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! | 모듈 | 역할 |
//! |------|------|
//! | [`state`] | 공유 상태 (`AppState`) |
//! | [`events`] | SSE 하이라이트 이벤트 타입 |
//! | [`handlers`] | 라우트별 핸들러 |
//! | [`templates`] | Maud 페이지/프래그먼트 |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use state::AppState;

/// 전체 라우터를 조립합니다.
///
/// `/api/*`는 사내 다른 도구에서도 긁어갈 수 있게 CORS를 열어 둡니다.
/// 상태는 axum `State` 추출기로 모든 핸들러에 공유됩니다.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/manholes", get(handlers::dataset_json))
        .route("/manholes/{id}", get(handlers::manhole_json))
        .route("/weather", get(handlers::weather_json))
        .layer(CorsLayer::permissive());

    Router::new()
        // ── 페이지 ────────────────────────────────────────
        .route("/", get(handlers::index))
        // ── JSON / SSE ───────────────────────────────────
        .route("/status", get(handlers::status))
        .route("/events", get(handlers::sse_events))
        // ── HTMX 프래그먼트 ──────────────────────────────
        .route("/chat", post(handlers::chat))
        .route("/menu/{target}", get(handlers::menu_modal))
        // ── 데이터 API ───────────────────────────────────
        .nest("/api", api)
        // ── 정적 파일 ────────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .with_state(state)
}
