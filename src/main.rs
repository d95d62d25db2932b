//! # 대구교통공사 맨홀 관리 시스템 — 서버 진입점
//!
//! 지하철 맨홀 시설물 운영 콘솔의 백엔드입니다. 기동 순서:
//!
//! ```text
//! main()
//!   ├── tracing/logging 설정 (RUST_LOG, 기본 info)
//!   ├── 데이터셋 로드 (data/manholes.json — 실패 시 빈 데이터셋으로 기동)
//!   ├── Generative Language API 클라이언트 생성 (GEMINI_API_KEY —
//!   │     미설정이면 AI 경로만 꺼진 채 기동)
//!   ├── 지도 하이라이트 broadcast 채널 생성
//!   ├── AppState + Router 조립
//!   └── 0.0.0.0:3000 에서 serve
//! ```
//!
//! ## 실행 예시
//!
//! ```bash
//! # 기본 로그 레벨(info)로 실행
//! GEMINI_API_KEY=... cargo run
//!
//! # 상세 로그
//! RUST_LOG=debug GEMINI_API_KEY=... cargo run
//!
//! # http://localhost:3000 에서 접속
//! ```
//!
//! AI 키 없이도 서버는 뜹니다 — 로컬 필터링("수선 2회 이상 맨홀
//! 표시해줘")은 그대로 동작하고, AI 위임 경로만 오류 말풍선이 됩니다.

/// `core` — 호선/역/맨홀 도메인 타입.
mod core;

/// `nlu` — 지도 액션 분류기와 필터 평가기.
mod nlu;

/// `ai` — 외부 생성형 AI 협력자 (클라이언트 + 프롬프트).
mod ai;

/// `orchestrator` — 메시지 한 건의 처리 흐름.
mod orchestrator;

/// `weather` — 날씨 오버레이 데이터 가공.
mod weather;

/// `metrics` — 시스템/프로세스 지표.
mod metrics;

/// `persistence` — 데이터 파일 읽기 경계.
mod persistence;

/// `web` — axum 라우터, 핸들러, 템플릿, SSE.
mod web;

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use crate::ai::GeminiClient;
use crate::core::Dataset;
use crate::orchestrator::Orchestrator;
use crate::web::events::HighlightEvent;
use crate::web::state::AppState;

/// 서버 바인드 주소.
const BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG 환경 변수로 레벨 제어, 기본 info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("맨홀 관리 시스템 — starting...");

    // 데이터셋 로드 — 실패해도 빈 데이터셋으로 기동한다 (페이지·API는
    // 살아 있고, 트리에 안내 문구가 뜬다)
    let dataset = match persistence::load_dataset() {
        Ok(ds) => Arc::new(ds),
        Err(e) => {
            tracing::warn!(error = %e, "데이터셋 로드 실패, 빈 데이터셋으로 기동");
            Arc::new(Dataset::default())
        }
    };

    // AI 클라이언트 — 키 미설정이면 AI 경로만 비활성
    let ai = match GeminiClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "Generative Language API 클라이언트 준비");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI 비활성 — 로컬 필터링만 동작");
            None
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(dataset.clone(), ai));

    // 지도 하이라이트 SSE 방송 채널. 용량 64 — 느린 구독자의 밀린
    // 이벤트는 버려진다.
    let (events_tx, _) = broadcast::channel::<HighlightEvent>(64);

    let state = AppState {
        dataset,
        orchestrator,
        events_tx: Arc::new(events_tx),
        weather: Arc::new(RwLock::new(None)),
    };

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    tracing::info!("Server running at http://localhost:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
