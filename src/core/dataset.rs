//! # Dataset — 호선 → 역 → 맨홀 3단 계층
//!
//! [`Dataset`]은 외부 수집 단계가 만들어 둔 `data/manholes.json`을
//! 그대로 담는 읽기 전용 컨테이너입니다. 시스템의 모든 집계는 이
//! 컨테이너의 **정규 순회 순서**(호선 → 역 → 맨홀, 파일에 적힌 순서)를
//! 따릅니다 — 필터 결과의 표시 순서도, AI에 넘기는 CSV 컨텍스트의 행
//! 순서도 전부 여기서 결정됩니다.
//!
//! ## 와이어 포맷
//!
//! ```json
//! {
//!   "lines": [
//!     { "lineId": "line-1", "lineTitle": "1호선",
//!       "stations": [
//!         { "stationId": "st-101", "stationName": "반월당역",
//!           "manholes": [ { "id": "MH-1-01-01", "name": "...", ... } ] }
//!       ] }
//!   ]
//! }
//! ```
//!
//! 필드명은 수집 스크립트 산출물의 camelCase를 그대로 따릅니다
//! (`lineId`, `lineTitle`, `stationId`, `stationName`).
//!
//! ## 불변식
//!
//! - 맨홀 `id`는 데이터셋 전체에서 유일하다.
//! - 계층은 정확히 3단이며 순회는 항상 호선 → 역 → 맨홀 순서다.

use serde::{Deserialize, Serialize};

use super::manhole::{CounterKind, Manhole};

/// 도시철도 호선 — 역들의 묶음.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Line {
    /// 호선 고유 ID (트리 DOM 그룹 키로도 쓰임).
    #[serde(rename = "lineId")]
    pub line_id: String,

    /// 표시용 호선명 (예: "1호선"). 호선 필터는 이 문자열에 대한
    /// 부분 문자열 매칭으로 동작한다.
    #[serde(rename = "lineTitle")]
    pub line_title: String,

    /// 소속 역 목록 (파일 순서 유지).
    pub stations: Vec<Station>,
}

/// 역 — 맨홀들의 묶음.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Station {
    /// 역 고유 ID.
    #[serde(rename = "stationId")]
    pub station_id: String,

    /// 표시용 역명 (예: "반월당역"). 역 필터의 부분 문자열 매칭 대상.
    #[serde(rename = "stationName")]
    pub station_name: String,

    /// 소속 맨홀 목록 (파일 순서 유지).
    pub manholes: Vec<Manhole>,
}

/// 전체 데이터셋 — 로드 이후 읽기 전용.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// 호선 목록 (파일 순서 유지).
    pub lines: Vec<Line>,
}

impl Dataset {
    /// 정규 순회: 호선 → 역 → 맨홀, 데이터셋 순서 그대로.
    ///
    /// 각 맨홀은 정확히 한 번 방문되며, 동일 데이터셋에 대해 순서는
    /// 항상 같습니다. 필터 평가기와 CSV 빌더가 공유하는 유일한
    /// 순회 경로입니다.
    pub fn iter_manholes(&self) -> impl Iterator<Item = (&Line, &Station, &Manhole)> {
        self.lines.iter().flat_map(|line| {
            line.stations.iter().flat_map(move |st| {
                st.manholes.iter().map(move |mh| (line, st, mh))
            })
        })
    }

    /// ID로 맨홀 검색 (선형 탐색 — 수백 기 규모에서 충분).
    pub fn find_manhole(&self, id: &str) -> Option<(&Line, &Station, &Manhole)> {
        self.iter_manholes().find(|(_, _, mh)| mh.id == id)
    }

    /// 호선 수.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 역 수.
    pub fn station_count(&self) -> usize {
        self.lines.iter().map(|l| l.stations.len()).sum()
    }

    /// 맨홀 수.
    pub fn manhole_count(&self) -> usize {
        self.iter_manholes().count()
    }

    /// AI 프롬프트에 붙는 CSV 컨텍스트를 생성합니다.
    ///
    /// 헤더는 고정이고 행 순서는 정규 순회 순서입니다. 카운터는
    /// [`Manhole::counter()`]를 거치므로 누락 필드는 0으로 찍힙니다.
    ///
    /// ```text
    /// 호선,ID,이름,역,위도,경도,침수빈도,수선횟수,민원횟수
    /// 1호선,MH-1-01-01,반월당역 1번 맨홀,반월당역,35.8714,128.6014,2,1,0
    /// ```
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("호선,ID,이름,역,위도,경도,침수빈도,수선횟수,민원횟수\n");
        for (line, st, mh) in self.iter_manholes() {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                line.line_title,
                mh.id,
                mh.name,
                st.station_name,
                mh.lat,
                mh.lng,
                mh.counter(CounterKind::Flood),
                mh.counter(CounterKind::Repair),
                mh.counter(CounterKind::Complaint),
            ));
        }
        csv
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 테스트 공용 데이터셋: 1호선(반월당역 3기, 중앙로역 1기) + 2호선(범어역 1기).
    ///
    /// repair_cnt가 {0, 2, 3, 누락, 1}로 분포해 숫자 필터 경계를
    /// 그대로 검증할 수 있게 구성했다.
    pub(crate) fn sample_dataset() -> Dataset {
        let mh = |id: &str, name: &str, flood, repair, complaint| Manhole {
            id: id.into(),
            name: name.into(),
            lat: 35.8714,
            lng: 128.6014,
            flood_freq: flood,
            repair_cnt: repair,
            complaint_cnt: complaint,
        };

        Dataset {
            lines: vec![
                Line {
                    line_id: "line-1".into(),
                    line_title: "1호선".into(),
                    stations: vec![
                        Station {
                            station_id: "st-101".into(),
                            station_name: "반월당역".into(),
                            manholes: vec![
                                mh("MH-1-01-01", "반월당역 1번 맨홀", Some(1), Some(0), Some(4)),
                                mh("MH-1-01-02", "반월당역 2번 맨홀", Some(3), Some(2), Some(1)),
                                mh("MH-1-01-03", "반월당역 3번 맨홀", None, Some(3), None),
                            ],
                        },
                        Station {
                            station_id: "st-102".into(),
                            station_name: "중앙로역".into(),
                            manholes: vec![mh("MH-1-02-01", "중앙로역 1번 맨홀", Some(0), None, Some(2))],
                        },
                    ],
                },
                Line {
                    line_id: "line-2".into(),
                    line_title: "2호선".into(),
                    stations: vec![Station {
                        station_id: "st-201".into(),
                        station_name: "범어역".into(),
                        manholes: vec![mh("MH-2-01-01", "범어역 1번 맨홀", Some(2), Some(1), Some(0))],
                    }],
                },
            ],
        }
    }

    #[test]
    fn traversal_preserves_dataset_order() {
        let ds = sample_dataset();
        let ids: Vec<&str> = ds.iter_manholes().map(|(_, _, mh)| mh.id.as_str()).collect();
        assert_eq!(
            ids,
            ["MH-1-01-01", "MH-1-01-02", "MH-1-01-03", "MH-1-02-01", "MH-2-01-01"]
        );
    }

    #[test]
    fn counts() {
        let ds = sample_dataset();
        assert_eq!(ds.line_count(), 2);
        assert_eq!(ds.station_count(), 3);
        assert_eq!(ds.manhole_count(), 5);
    }

    #[test]
    fn find_manhole_returns_owning_line_and_station() {
        let ds = sample_dataset();
        let (line, st, mh) = ds.find_manhole("MH-1-02-01").unwrap();
        assert_eq!(line.line_title, "1호선");
        assert_eq!(st.station_name, "중앙로역");
        assert_eq!(mh.name, "중앙로역 1번 맨홀");
        assert!(ds.find_manhole("MH-9-99-99").is_none());
    }

    #[test]
    fn csv_has_fixed_header_and_traversal_order() {
        let ds = sample_dataset();
        let csv = ds.to_csv();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows[0], "호선,ID,이름,역,위도,경도,침수빈도,수선횟수,민원횟수");
        assert_eq!(rows.len(), 1 + 5);
        assert!(rows[1].starts_with("1호선,MH-1-01-01,반월당역 1번 맨홀,반월당역,"));
        assert!(rows[5].starts_with("2호선,MH-2-01-01,"));
    }

    #[test]
    fn csv_renders_missing_counters_as_zero() {
        let ds = sample_dataset();
        let csv = ds.to_csv();
        // MH-1-01-03: flood 누락, repair 3, complaint 누락
        let row = csv.lines().find(|l| l.contains("MH-1-01-03")).unwrap();
        assert!(row.ends_with("0,3,0"), "row: {row}");
    }

    #[test]
    fn camel_case_wire_names_roundtrip() {
        let json = r#"{
            "lines": [{
                "lineId": "line-1", "lineTitle": "1호선",
                "stations": [{
                    "stationId": "st-101", "stationName": "반월당역",
                    "manholes": [{"id":"MH-1-01-01","name":"반월당역 1번 맨홀","lat":35.87,"lng":128.6}]
                }]
            }]
        }"#;
        let ds: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(ds.lines[0].line_title, "1호선");
        assert_eq!(ds.lines[0].stations[0].station_name, "반월당역");
        assert_eq!(ds.manhole_count(), 1);
    }
}
