//! # HTTP 핸들러
//!
//! 이 모듈의 공개 함수 하나하나가 [`super::create_router()`]의 라우트
//! 하나에 대응합니다. 채팅과 모달은 **HTMX 프래그먼트** 패턴 — 전체
//! 페이지가 아니라 HTML 조각을 돌려주고 HTMX가 DOM에 주입합니다.
//!
//! | 핸들러 | 메서드 | 반환 | 용도 |
//! |--------|--------|------|------|
//! | `index` | GET | 전체 HTML | 대시보드 페이지 |
//! | `chat` | POST | HTMX 프래그먼트 | 채팅 말풍선 + 메트릭 줄 |
//! | `sse_events` | GET | SSE 스트림 | 지도 하이라이트 방송 |
//! | `menu_modal` | GET | HTMX 프래그먼트 | 상단 메뉴 모달 내용 |
//! | `status` | GET | JSON | AI 가용성 + 데이터셋 규모 |
//! | `dataset_json` | GET | JSON | 지도 글루용 전체 데이터셋 |
//! | `weather_json` | GET | JSON | 날씨 오버레이 행 목록 |
//!
//! 채팅 처리 중 AI가 실패해도 HTTP는 200입니다 — 실패는 오류
//! 말풍선으로 렌더링되고, 5xx는 이 계층에서 나가지 않습니다.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::Html;
use axum::Json;
use futures_util::stream::StreamExt;
use maud::html;
use tokio_stream::wrappers::BroadcastStream;

use super::state::AppState;
use super::templates;
use crate::core::Dataset;
use crate::orchestrator::MessageRole;
use crate::persistence;
use crate::weather::{self, WeatherOverlay};
use crate::web::events::HighlightEvent;

/// `/status` 응답.
#[derive(serde::Serialize)]
pub struct StatusResponse {
    /// 생성형 AI 경로 사용 가능 여부 (API 키 설정 여부).
    pub ai_ready: bool,
    /// 호선 수.
    pub lines: usize,
    /// 역 수.
    pub stations: usize,
    /// 맨홀 수.
    pub manholes: usize,
    /// 데이터 기준 시각 (데이터셋 파일 수정 시각, 없으면 null).
    pub data_as_of: Option<String>,
    /// 프로세스 RSS (MB).
    pub memory_used_mb: f64,
}

/// 채팅 폼 데이터 (`message` 필드).
#[derive(serde::Deserialize)]
pub struct ChatForm {
    /// 사용자 입력 원문.
    pub message: String,
}

/// `/api/manholes/{id}` 응답 — 소속 정보를 붙인 맨홀 상세.
#[derive(serde::Serialize)]
pub struct ManholeDetail {
    /// 소속 호선명.
    pub line_title: String,
    /// 소속 역명.
    pub station_name: String,
    /// 맨홀 본체.
    pub manhole: crate::core::Manhole,
}

/// Maud Markup → axum Html 변환.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

/// GET `/` — 대시보드 전체 페이지.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    markup_to_html(templates::full_page(&state.dataset))
}

/// GET `/status` — AI 가용성과 데이터셋 규모.
///
/// 페이지의 상태 표시줄이 10초 주기로 폴링합니다.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let metrics = crate::metrics::collect_metrics();
    Json(StatusResponse {
        ai_ready: state.orchestrator.ai_ready(),
        lines: state.dataset.line_count(),
        stations: state.dataset.station_count(),
        manholes: state.dataset.manhole_count(),
        data_as_of: persistence::dataset_modified()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        memory_used_mb: metrics.memory_used_mb,
    })
}

/// GET `/events` — 지도 하이라이트 SSE 스트림.
///
/// broadcast 채널을 구독해 각 [`HighlightEvent`]를 JSON으로 직렬화해
/// 흘려보냅니다. 프록시의 유휴 연결 종료를 피하려고 15초 간격
/// keep-alive를 보냅니다. 느린 구독자가 놓친 이벤트는 조용히
/// 버려집니다 (filter_map → None).
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None, // 밀린 이벤트는 버림
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// POST `/chat` — 메시지 처리 후 말풍선 프래그먼트 반환.
///
/// ```text
/// 1. message 트리밍 (빈 입력 → 빈 프래그먼트)
/// 2. orchestrator.process_message() → 응답 메시지 + 하이라이트 ID
/// 3. 하이라이트가 있으면 SSE 채널로 방송 → 지도 글루가 강조
/// 4. 사용자 말풍선 + 응답 말풍선들 + 메트릭 한 줄 렌더링
/// ```
pub async fn chat(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<ChatForm>,
) -> Html<String> {
    let user_text = form.message.trim().to_string();
    if user_text.is_empty() {
        return markup_to_html(html! {});
    }

    let t0 = Instant::now();
    let outcome = state.orchestrator.process_message(&user_text).await;
    let elapsed_ms = t0.elapsed().as_millis() as u64;

    // 지도 하이라이트 방송 — 구독자(지도 탭)가 없어도 실패 아님
    if !outcome.highlight_ids.is_empty() {
        let event = HighlightEvent {
            count: outcome.highlight_ids.len(),
            condition: outcome.condition.clone().unwrap_or_default(),
            ids: outcome.highlight_ids.clone(),
        };
        tracing::debug!(count = event.count, condition = %event.condition, "하이라이트 이벤트 방송");
        let _ = state.events_tx.send(event);
    }

    let metrics_line = crate::metrics::collect_metrics().summary_line(elapsed_ms);

    markup_to_html(html! {
        // 사용자 말풍선 (오른쪽 정렬)
        div class="message user-message" {
            div class="message-role" { (MessageRole::User.label()) }
            div class="message-content" { (user_text) }
        }
        // 응답 말풍선들 — 본문은 줄 단위로 렌더링 (필터 결과 목록 대응)
        @for msg in &outcome.messages {
            div class=(format!("message system-message {}", msg.role.css_class())) {
                div class="message-role" { (msg.role.label()) }
                div class="message-content" {
                    @for (i, line) in msg.content.lines().enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
        }
        // 메트릭 한 줄
        div class="message system-message metrics" {
            div class="message-content metrics-line" { (metrics_line) }
        }
    })
}

/// GET `/menu/{target}` — 상단 메뉴 모달 내용.
///
/// `device-reg`와 `realtime-monitor`는 데이터셋 기반 테이블을, 그 외
/// 메뉴는 기본 안내 문구를 돌려줍니다.
pub async fn menu_modal(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Html<String> {
    let markup = match target.as_str() {
        "device-reg" => templates::equipment_table(&state.dataset),
        "realtime-monitor" => templates::monitor_table(&state.dataset),
        "inspection-plan" => templates::generic_modal("점검 일정", &target),
        "manual" => templates::generic_modal("시설 매뉴얼", &target),
        other => templates::generic_modal(other, other),
    };
    markup_to_html(markup)
}

/// GET `/api/manholes` — 지도 글루용 전체 데이터셋.
pub async fn dataset_json(State(state): State<AppState>) -> Json<Dataset> {
    Json((*state.dataset).clone())
}

/// GET `/api/manholes/{id}` — 맨홀 한 기의 상세 (오버레이 상세보기용).
///
/// 모르는 ID는 404 — 지도 글루가 안내 문구로 처리합니다.
pub async fn manhole_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ManholeDetail>, axum::http::StatusCode> {
    match state.dataset.find_manhole(&id) {
        Some((line, st, mh)) => Ok(Json(ManholeDetail {
            line_title: line.line_title.clone(),
            station_name: st.station_name.clone(),
            manhole: mh.clone(),
        })),
        None => Err(axum::http::StatusCode::NOT_FOUND),
    }
}

/// GET `/api/weather` — 날씨 오버레이 행 목록.
///
/// 첫 요청에서 `data/weather_data.json`을 로드해 캐시합니다. 날씨는
/// 부가 기능이라 로드 실패는 경고 로그 + 빈 목록으로 누그러뜨립니다
/// (지도는 오버레이 없이 그대로 동작).
pub async fn weather_json(State(state): State<AppState>) -> Json<Vec<WeatherOverlay>> {
    // 캐시 히트
    if let Some(table) = state.weather.read().as_ref() {
        return Json(weather::build_overlays(table));
    }

    // 캐시 미스 — 파일 로드 후 채움
    match persistence::load_weather() {
        Ok(table) => {
            let overlays = weather::build_overlays(&table);
            *state.weather.write() = Some(table);
            Json(overlays)
        }
        Err(e) => {
            tracing::warn!(error = %e, "날씨 데이터 로드 실패, 빈 오버레이 반환");
            Json(Vec::new())
        }
    }
}

// ─── MessageRole의 HTML 확장 ─────────────────────────────────────

impl MessageRole {
    /// 말풍선 스타일 클래스.
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Filter => "filter",
            MessageRole::Analysis => "analysis",
            MessageRole::Assistant => "assistant",
            MessageRole::Error => "error",
        }
    }

    /// 말풍선 상단에 붙는 출처 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "사용자",
            MessageRole::Filter => "지도 필터",
            MessageRole::Analysis => "AI 분석",
            MessageRole::Assistant => "AI",
            MessageRole::Error => "오류",
        }
    }
}
