//! # 데이터 파일 경계 — 읽기 전용 로드
//!
//! 외부 수집 스크립트가 만들어 두는 두 JSON 파일을 읽어들이는
//! 모듈입니다. 이 서버는 데이터를 **쓰지 않습니다** — 수집과 갱신은
//! 전부 바깥 단계의 몫이고, 여기서는 기동 시(데이터셋) 혹은 요청 시
//! (날씨) 파일을 파싱만 합니다.
//!
//! | 파일 | 내용 | 로드 시점 |
//! |------|------|----------|
//! | `data/manholes.json` | 호선/역/맨홀 계층 | 기동 시 1회 |
//! | `data/weather_data.json` | 역별 KMA 관측값 | 첫 요청 시, 캐시 |
//!
//! 데이터셋 파일이 없거나 깨져 있어도 서버는 기동합니다 — 빈
//! 데이터셋으로 페이지는 뜨고, 호출자가 경고 로그를 남깁니다.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::core::Dataset;
use crate::weather::WeatherTable;

/// 맨홀 데이터셋 파일 경로 (프로젝트 루트 기준).
pub const DATASET_PATH: &str = "data/manholes.json";

/// 날씨 관측 파일 경로.
pub const WEATHER_PATH: &str = "data/weather_data.json";

/// 맨홀 데이터셋을 로드합니다.
///
/// # 오류
///
/// 파일이 없거나, 읽을 수 없거나, JSON이 계층 구조와 맞지 않으면
/// 컨텍스트가 붙은 오류를 돌려줍니다. 빈 데이터셋 폴백은 호출자
/// ([`crate::main`]) 정책입니다.
pub fn load_dataset() -> Result<Dataset> {
    let json = std::fs::read_to_string(Path::new(DATASET_PATH))
        .with_context(|| format!("{DATASET_PATH} 읽기 실패"))?;
    let dataset: Dataset =
        serde_json::from_str(&json).with_context(|| format!("{DATASET_PATH} 파싱 실패"))?;
    tracing::info!(
        lines = dataset.line_count(),
        stations = dataset.station_count(),
        manholes = dataset.manhole_count(),
        "맨홀 데이터셋 로드 완료"
    );
    Ok(dataset)
}

/// 날씨 관측 테이블을 로드합니다.
///
/// 날씨는 부가 기능이므로 실패 처리는 호출자(핸들러)가 경고 로그 +
/// 빈 오버레이로 누그러뜨립니다.
pub fn load_weather() -> Result<WeatherTable> {
    let json = std::fs::read_to_string(Path::new(WEATHER_PATH))
        .with_context(|| format!("{WEATHER_PATH} 읽기 실패"))?;
    let table: WeatherTable =
        serde_json::from_str(&json).with_context(|| format!("{WEATHER_PATH} 파싱 실패"))?;
    tracing::info!(stations = table.len(), "날씨 관측 테이블 로드 완료");
    Ok(table)
}

/// 데이터셋 파일 크기 (메트릭 표시용, 없으면 0).
pub fn dataset_file_size() -> u64 {
    Path::new(DATASET_PATH)
        .metadata()
        .map(|m| m.len())
        .unwrap_or(0)
}

/// 데이터셋 파일 수정 시각 — "데이터 기준 시각" 표시용.
///
/// 수집 스크립트가 파일을 갈아끼운 시점이 곧 데이터 기준 시각입니다.
pub fn dataset_modified() -> Option<DateTime<Local>> {
    let modified = Path::new(DATASET_PATH).metadata().ok()?.modified().ok()?;
    Some(DateTime::from(modified))
}
