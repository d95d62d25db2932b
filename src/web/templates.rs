//! # Maud 템플릿 — 서버 렌더링 대시보드
//!
//! 대시보드 화면 전체와 HTMX 프래그먼트를 컴파일 타임 maud 템플릿으로
//! 렌더링합니다. SPA 대신 **하이퍼미디어 구동** 패턴입니다:
//!
//! - 서버는 HTML(페이지/프래그먼트)을 돌려주고
//! - HTMX가 채팅/모달 프래그먼트를 DOM에 주입하며
//! - 지도 SDK 글루(/assets/map.js)만 클라이언트 JavaScript로 남습니다
//!
//! ## 레이아웃
//!
//! ```text
//! ┌──────────────── nav-bar ─────────────────────────────┐
//! │ DTRO 맨홀 관리 │ 장비 등록 │ 실시간 모니터링 │ ... │ ● │
//! ├───────────────┬──────────────────────────────────────┤
//! │ 시설물 트리    │                                      │
//! │  1호선 (4)    │            지도 (#map)               │
//! │   반월당역(3) │   □ 교통정보 □ 날씨 □ 로드뷰         │
//! │ ──────────── │                                      │
//! │ AI 채팅       │                                      │
//! │  [입력][전송] │                                      │
//! └───────────────┴──────────────────────────────────────┘
//! ```
//!
//! | 함수 | 종류 | 내용 |
//! |------|------|------|
//! | [`full_page`] | 페이지 | 트리 + 지도 + 채팅 전체 레이아웃 |
//! | [`equipment_table`] | 프래그먼트 | 장비 등록 목록 (모달) |
//! | [`monitor_table`] | 프래그먼트 | 종합 이력 상위 10기 (모달) |
//! | [`generic_modal`] | 프래그먼트 | 그 외 메뉴의 기본 안내 |

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::core::{CounterKind, Dataset};

/// 상단 메뉴 (표시명, 모달 target). target은 `/menu/{target}` 경로가 된다.
const MENU_ITEMS: &[(&str, &str)] = &[
    ("장비 등록", "device-reg"),
    ("실시간 모니터링", "realtime-monitor"),
    ("점검 일정", "inspection-plan"),
    ("시설 매뉴얼", "manual"),
];

/// 장비 등록 목록에 펼쳐 보여줄 최대 행 수.
const EQUIPMENT_ROWS: usize = 20;

/// 실시간 모니터링 순위 행 수.
const MONITOR_ROWS: usize = 10;

/// 대시보드 전체 페이지.
///
/// 사이드바 트리는 서버에서 `<details>` 그룹으로 렌더링합니다 —
/// 접기/펼치기에 JavaScript가 필요 없습니다. 맨홀 항목 클릭과 지도
/// 연동만 `/assets/map.js`의 글루가 담당합니다.
pub fn full_page(dataset: &Dataset) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ko" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "대구교통공사 맨홀 관리 시스템" }
                link rel="stylesheet" href="/assets/style.css";
                script src="/assets/htmx.min.js" {}
            }
            body {
                div class="app-shell" {
                    // 상단 네비게이션
                    nav class="nav-bar" {
                        a href="/" class="nav-brand" {
                            span class="nav-brand-icon" { "DTRO" }
                            span class="nav-brand-text" { "맨홀 관리 시스템" }
                        }
                        div class="nav-links" {
                            @for (name, target) in MENU_ITEMS {
                                a href="#" class="nav-link spa-link"
                                    hx-get=(format!("/menu/{}", target))
                                    hx-target="#modal-body" {
                                    (name)
                                }
                            }
                        }
                        div class="nav-status" id="nav-status" {
                            span class="nav-status-dot" id="status-dot" {}
                            span id="status-text" { "연결 확인 중..." }
                        }
                    }

                    div class="app-container" {
                        // 사이드바: 시설물 트리 + AI 채팅
                        aside class="sidebar" id="sidebar" {
                            div class="tree-container" id="tree-container" {
                                (tree(dataset))
                            }
                            div class="chat-panel" id="ai-chat-container" {
                                div id="chat-messages" class="chat-messages" {
                                    div class="message system-message welcome" {
                                        div class="message-content" {
                                            div class="welcome-title" { "맨홀 관리 AI 어시스턴트" }
                                            p {
                                                "자연어로 시설물을 조회하세요. 예: "
                                                em { "\"수선이 2회 이상인 맨홀 지도에 표시해줘\"" }
                                            }
                                        }
                                    }
                                }
                                form class="chat-form" id="chat-form"
                                    hx-post="/chat"
                                    hx-target="#chat-messages"
                                    hx-swap="beforeend" {
                                    input type="text" name="message" id="chat-input"
                                        placeholder="메시지를 입력하세요..." autocomplete="off";
                                    button type="submit" id="send-btn" { "전송" }
                                }
                            }
                        }

                        // 본문: 지도 + 오버레이 컨트롤
                        main class="main-content" id="main-content" {
                            div class="map-controls" {
                                label { input type="checkbox" id="traffic-checkbox"; " 교통정보" }
                                label { input type="checkbox" id="weather-checkbox"; " 날씨" }
                                label { input type="checkbox" id="roadview-checkbox"; " 로드뷰" }
                            }
                            div id="map" class="map-container" {}
                            div id="roadview" class="roadview-container" style="display:none" {}
                        }
                    }

                    // 메뉴 모달 (HTMX가 #modal-body를 채운다)
                    div id="spa-modal-overlay" class="modal-overlay" style="display:none" {
                        div class="modal-window" {
                            div class="modal-header" {
                                span id="modal-title" {}
                                button id="modal-close-btn" class="modal-close" { "×" }
                            }
                            div id="modal-body" class="modal-body" {}
                        }
                    }
                }

                // 지도 SDK 글루 (마커 생성·하이라이트·날씨 오버레이)
                script src="/assets/map.js" {}
                (inline_script())
            }
        }
    }
}

/// 사이드바 시설물 트리 — 호선 → 역 → 맨홀, 건수 포함.
fn tree(dataset: &Dataset) -> Markup {
    html! {
        @for line in &dataset.lines {
            @let line_total: usize = line.stations.iter().map(|st| st.manholes.len()).sum();
            details class="tree-group line-group" id=(format!("tree-{}", line.line_id)) {
                summary class="tree-group-header line-header" {
                    span class="line-title" { (line.line_title) }
                    span class="tree-count" { "(" (line_total) ")" }
                }
                @for st in &line.stations {
                    details class="tree-group station-group" id=(format!("tree-{}", st.station_id)) {
                        summary class="tree-group-header station-header" {
                            span { (st.station_name) }
                            span class="tree-count" { "(" (st.manholes.len()) ")" }
                        }
                        @for mh in &st.manholes {
                            div class="manhole-item"
                                id=(format!("manhole-item-{}", mh.id))
                                data-id=(mh.id) {
                                "[" (mh.id) "] " (mh.name)
                            }
                        }
                    }
                }
            }
        }
        @if dataset.lines.is_empty() {
            p class="tree-empty" { "데이터셋이 비어 있습니다. data/manholes.json을 확인하세요." }
        }
    }
}

/// 장비 등록 모달 — 시설물 목록 테이블.
pub fn equipment_table(dataset: &Dataset) -> Markup {
    let total = dataset.manhole_count();
    html! {
        div class="table-summary" {
            span { "총 " strong { (total) } "건의 데이터가 조회되었습니다." }
        }
        table class="data-table" {
            thead {
                tr {
                    th { "ID" }
                    th { "시설물명" }
                    th { "소속" }
                    th { "위치(위도, 경도)" }
                    th { "침수" }
                    th { "수선" }
                    th { "민원" }
                }
            }
            tbody {
                @for (line, st, mh) in dataset.iter_manholes().take(EQUIPMENT_ROWS) {
                    tr {
                        td { (mh.id) }
                        td { (mh.name) }
                        td { (line.line_title) " / " (st.station_name) }
                        td { (format!("{:.4}, {:.4}", mh.lat, mh.lng)) }
                        td { (mh.counter(CounterKind::Flood)) }
                        td { (mh.counter(CounterKind::Repair)) }
                        td { (mh.counter(CounterKind::Complaint)) }
                    }
                }
            }
        }
        @if total > EQUIPMENT_ROWS {
            p class="table-note" { "...외 " (total - EQUIPMENT_ROWS) "건 (전체는 /api/manholes 참조)" }
        }
    }
}

/// 실시간 모니터링 모달 — 침수+수선+민원 종합 상위 시설물.
///
/// 동점은 데이터셋 순회 순서가 앞선 쪽이 위다 (stable sort).
pub fn monitor_table(dataset: &Dataset) -> Markup {
    let mut ranked: Vec<_> = dataset.iter_manholes().collect();
    ranked.sort_by_key(|(_, _, mh)| std::cmp::Reverse(mh.risk_score()));
    ranked.truncate(MONITOR_ROWS);

    html! {
        div class="table-summary" {
            span { "침수·수선·민원 이력을 합산한 상위 " (MONITOR_ROWS) "기입니다." }
        }
        table class="data-table" {
            thead {
                tr {
                    th { "순위" }
                    th { "ID" }
                    th { "시설물명" }
                    th { "역" }
                    th { "침수" }
                    th { "수선" }
                    th { "민원" }
                    th { "종합" }
                }
            }
            tbody {
                @for (rank, (_, st, mh)) in ranked.iter().enumerate() {
                    tr {
                        td { (rank + 1) }
                        td { (mh.id) }
                        td { (mh.name) }
                        td { (st.station_name) }
                        td { (mh.counter(CounterKind::Flood)) }
                        td { (mh.counter(CounterKind::Repair)) }
                        td { (mh.counter(CounterKind::Complaint)) }
                        td { strong { (mh.risk_score()) } }
                    }
                }
            }
        }
    }
}

/// 아직 전용 화면이 없는 메뉴의 기본 안내.
pub fn generic_modal(menu_name: &str, target: &str) -> Markup {
    html! {
        p { strong { "'" (menu_name) "'" } " 메뉴를 선택하셨습니다." }
        p { "현재 페이지를 유지한 상태로 기능이 실행됩니다." }
        p class="modal-hint" { "(Target ID: " (target) ")" }
    }
}

/// 페이지 하단 인라인 스크립트.
///
/// 남겨둔 클라이언트 로직은 세 가지뿐입니다:
/// 1. `/events` SSE 구독 → 지도 글루에 하이라이트 전달
/// 2. 채팅 새 메시지 자동 스크롤
/// 3. 메뉴 모달 열기/닫기
fn inline_script() -> Markup {
    html! {
        script {
            (PreEscaped(r#"
(function () {
  // 1. 지도 하이라이트: 서버가 방송하는 SSE를 글루에 중계
  var events = new EventSource('/events');
  events.onmessage = function (e) {
    var ev = JSON.parse(e.data);
    document.dispatchEvent(new CustomEvent('manholehighlight', { detail: ev }));
    if (window.opsMap && window.opsMap.highlight) {
      window.opsMap.highlight(ev.ids, ev.condition);
    }
  };

  // 2. 채팅 자동 스크롤 + 전송 후 입력창 비우기
  var chat = document.getElementById('chat-messages');
  new MutationObserver(function () {
    chat.scrollTop = chat.scrollHeight;
  }).observe(chat, { childList: true });
  document.body.addEventListener('htmx:afterRequest', function (e) {
    if (e.target && e.target.id === 'chat-form') e.target.reset();
  });

  // 3. 메뉴 모달
  var overlay = document.getElementById('spa-modal-overlay');
  var title = document.getElementById('modal-title');
  document.querySelectorAll('.spa-link').forEach(function (link) {
    link.addEventListener('click', function () {
      title.innerText = link.innerText;
      overlay.style.display = 'flex';
    });
  });
  document.getElementById('modal-close-btn').addEventListener('click', function () {
    overlay.style.display = 'none';
  });
  overlay.addEventListener('click', function (e) {
    if (e.target === overlay) overlay.style.display = 'none';
  });

  // 서버 상태 점검 (10초 주기)
  function poll() {
    fetch('/status').then(function (r) { return r.json(); }).then(function (s) {
      document.getElementById('status-text').innerText =
        s.ai_ready ? 'AI 연결됨 · 맨홀 ' + s.manholes + '기' : 'AI 비활성 · 맨홀 ' + s.manholes + '기';
      document.getElementById('status-dot').className =
        'nav-status-dot ' + (s.ai_ready ? 'ready' : 'degraded');
    }).catch(function () {
      document.getElementById('status-text').innerText = '서버 연결 끊김';
    });
  }
  poll();
  setInterval(poll, 10000);
})();
"#))
        }
    }
}
