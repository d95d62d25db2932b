//! # 웹 애플리케이션 상태
//!
//! 모든 axum 핸들러가 공유하는 상태입니다. 데이터셋은 기동 시 로드된
//! 뒤 읽기 전용이라 `Arc`만으로 충분하고, 잠금이 필요한 것은 지연
//! 로드되는 날씨 캐시뿐입니다.
//!
//! ```text
//! AppState
//!  ├── dataset      Arc<Dataset>                 (읽기 전용)
//!  ├── orchestrator Arc<Orchestrator>            (무상태, &self 동시 호출)
//!  ├── events_tx    Arc<broadcast::Sender<...>>  (지도 하이라이트 방송)
//!  └── weather      Arc<RwLock<Option<...>>>     (첫 요청 시 로드 후 캐시)
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::core::Dataset;
use crate::orchestrator::Orchestrator;
use crate::weather::WeatherTable;
use crate::web::events::HighlightEvent;

/// axum 핸들러 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 호선/역/맨홀 데이터셋 (읽기 전용).
    pub dataset: Arc<Dataset>,
    /// 메시지 처리 조정자.
    pub orchestrator: Arc<Orchestrator>,
    /// 지도 하이라이트 이벤트 broadcast 채널.
    pub events_tx: Arc<broadcast::Sender<HighlightEvent>>,
    /// 날씨 관측 테이블 캐시 — 첫 `/api/weather` 요청 때 채워진다.
    pub weather: Arc<RwLock<Option<WeatherTable>>>,
}
