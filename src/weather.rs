//! # 날씨 오버레이 데이터
//!
//! 기상청(KMA) 관측 수집 스크립트가 만들어 둔 `data/weather_data.json`을
//! 역별 오버레이 행으로 가공합니다. 지도 위 시각화 자체는 클라이언트
//! 글루의 몫이고, 서버는 **표시에 필요한 값(아이콘·문구·좌표)까지만**
//! 계산해 `/api/weather`로 내려보냅니다.
//!
//! ## 입력 형식
//!
//! 역명을 키로 하는 객체이며, 값 필드는 KMA 원본 코드명을 그대로
//! 따릅니다 (전부 문자열로 들어옴):
//!
//! | 필드 | 의미 |
//! |------|------|
//! | `LAT` / `LON` | 관측 지점 좌표 |
//! | `TA` | 기온 (°C) |
//! | `RN_OX` | 강수 유무 (0/1) |
//! | `RN_60M` | 최근 60분 강수량 (mm) |
//! | `VS` | 시정 (단위: 100m) |
//!
//! ## 아이콘 규칙
//!
//! ```text
//! RN_OX > 0 또는 RN_60M > 0  → ☔️ (강수)
//! 그 외에 VS < 12            → 🌫️ (시정 불량)
//! 나머지                      → ☀️
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 역 하나의 원본 관측값 (KMA 코드명 그대로, 문자열).
///
/// 숫자 해석은 타입 있는 접근자에서만 하고, 파싱 불가 값은 "관측
/// 없음"으로 간주해 보수적인 기본값을 씁니다.
#[derive(Clone, Debug, Deserialize)]
pub struct StationWeather {
    /// 위도.
    #[serde(rename = "LAT")]
    pub lat: String,
    /// 경도.
    #[serde(rename = "LON")]
    pub lon: String,
    /// 기온 (°C).
    #[serde(rename = "TA")]
    pub ta: String,
    /// 강수 유무 (0/1).
    #[serde(rename = "RN_OX", default)]
    pub rn_ox: String,
    /// 최근 60분 강수량 (mm).
    #[serde(rename = "RN_60M", default)]
    pub rn_60m: String,
    /// 시정 (100m 단위).
    #[serde(rename = "VS", default)]
    pub vs: String,
}

/// 역명 → 관측값. BTreeMap이라 응답 순서가 역명 순으로 안정적이다.
pub type WeatherTable = BTreeMap<String, StationWeather>;

impl StationWeather {
    fn parse_f64(raw: &str, default: f64) -> f64 {
        raw.trim().parse().unwrap_or(default)
    }

    /// 기온 (파싱 불가 시 0.0).
    pub fn temperature(&self) -> f64 {
        Self::parse_f64(&self.ta, 0.0)
    }

    /// 최근 60분 강수량 mm (파싱 불가 시 0.0 — 강수 없음으로 간주).
    pub fn rain_mm(&self) -> f64 {
        Self::parse_f64(&self.rn_60m, 0.0)
    }

    /// 강수 중인가.
    pub fn is_raining(&self) -> bool {
        Self::parse_f64(&self.rn_ox, 0.0) > 0.0 || self.rain_mm() > 0.0
    }

    /// 시정 불량인가 (VS < 12, 값이 없으면 양호로 간주).
    pub fn is_foggy(&self) -> bool {
        self.vs.trim().parse::<i64>().map(|v| v < 12).unwrap_or(false)
    }

    /// 오버레이 아이콘.
    pub fn icon(&self) -> &'static str {
        if self.is_raining() {
            "☔️"
        } else if self.is_foggy() {
            "🌫️"
        } else {
            "☀️"
        }
    }

    /// 기온 문구 (예: "23.5°C").
    pub fn temp_text(&self) -> String {
        format!("{:.1}°C", self.temperature())
    }

    /// 강수 문구 (예: "강수: 3mm" / "강수 없음").
    pub fn pcp_text(&self) -> String {
        let mm = self.rain_mm();
        if mm > 0.0 {
            format!("강수: {}mm", mm)
        } else {
            "강수 없음".to_string()
        }
    }
}

/// `/api/weather` 응답 행 — 지도 글루가 그대로 그릴 수 있는 형태.
#[derive(Clone, Debug, Serialize)]
pub struct WeatherOverlay {
    /// 역명.
    pub station: String,
    /// 위도.
    pub lat: f64,
    /// 경도.
    pub lng: f64,
    /// 오버레이 아이콘.
    pub icon: String,
    /// 기온 문구.
    pub temp_text: String,
    /// 강수 문구.
    pub pcp_text: String,
}

/// 관측 테이블을 오버레이 행 목록으로 변환합니다.
///
/// 좌표를 파싱할 수 없는 역은 지도에 놓을 수 없으므로 경고 로그와 함께
/// 건너뜁니다.
pub fn build_overlays(table: &WeatherTable) -> Vec<WeatherOverlay> {
    table
        .iter()
        .filter_map(|(station, w)| {
            let lat: f64 = match w.lat.trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(station = %station, "날씨 관측 지점 좌표 파싱 실패, 건너뜀");
                    return None;
                }
            };
            let lng: f64 = w.lon.trim().parse().ok()?;
            Some(WeatherOverlay {
                station: station.clone(),
                lat,
                lng,
                icon: w.icon().to_string(),
                temp_text: w.temp_text(),
                pcp_text: w.pcp_text(),
            })
        })
        .collect()
}
