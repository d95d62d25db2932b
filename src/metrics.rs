//! # 시스템 메트릭
//!
//! 채팅 응답 하단과 `/status` 응답에 붙는 프로세스/시스템 지표를
//! 수집합니다. 운영 콘솔 특성상 "방금 요청이 얼마나 걸렸고 서버가
//! 얼마나 먹고 있나"를 바로 보여주는 용도라, 수집 항목은 의도적으로
//! 가볍게 유지합니다.
//!
//! | 항목 | 출처 |
//! |------|------|
//! | 프로세스 RSS / 시스템 전체 RAM | `sysinfo` |
//! | 활성 코어 수 / 코어 피크 사용률 | `sysinfo` |
//! | 데이터셋 파일 크기 | `std::fs::metadata` |
//!
//! ## System 싱글턴
//!
//! `sysinfo`의 CPU 사용률은 직전 스냅샷과의 델타로 계산되므로,
//! [`System`] 인스턴스 하나를 `OnceLock` + `Mutex`로 프로세스 수명
//! 동안 재사용합니다.

use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::persistence;

/// CPU 델타 계산용 System 싱글턴.
static SYS: OnceLock<Mutex<System>> = OnceLock::new();

/// System 싱글턴을 돌려줍니다 (첫 호출 시 베이스라인 수집).
fn system() -> &'static Mutex<System> {
    SYS.get_or_init(|| {
        let mut s = System::new();
        s.refresh_cpu_usage(); // 이후 델타 계산의 베이스라인
        Mutex::new(s)
    })
}

/// 시스템/프로세스 지표 스냅샷.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessMetrics {
    /// 프로세스 RSS (MB).
    pub memory_used_mb: f64,
    /// 시스템 전체 RAM (MB).
    pub memory_total_mb: f64,
    /// 사용률 1% 초과 코어 수.
    pub cpu_active_cores: usize,
    /// 코어별 사용률 최대값 (%).
    pub cpu_max_core_percent: f32,
    /// 논리 코어 총수.
    pub cpu_total_cores: usize,
    /// `data/manholes.json` 크기 (bytes, 없으면 0).
    pub dataset_file_size_bytes: u64,
}

/// 지표 스냅샷을 수집합니다.
pub fn collect_metrics() -> ProcessMetrics {
    let pid = Pid::from_u32(std::process::id());

    let mut sys = system().lock();
    sys.refresh_memory();
    sys.refresh_cpu_usage();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);

    let memory_used_mb = sys
        .process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);
    let memory_total_mb = sys.total_memory() as f64 / (1024.0 * 1024.0);

    let cpus = sys.cpus();
    let cpu_total_cores = cpus.len();
    let cpu_active_cores = cpus.iter().filter(|c| c.cpu_usage() > 1.0).count();
    let cpu_max_core_percent = cpus.iter().map(|c| c.cpu_usage()).fold(0.0f32, f32::max);
    drop(sys);

    ProcessMetrics {
        memory_used_mb,
        memory_total_mb,
        cpu_active_cores,
        cpu_max_core_percent,
        cpu_total_cores,
        dataset_file_size_bytes: persistence::dataset_file_size(),
    }
}

impl ProcessMetrics {
    /// 채팅 하단에 붙는 한 줄 요약.
    ///
    /// 형식: `142ms | RAM 32.1 MB | CPU 2/8 cores peak 41.0% | 데이터 48.2 KB`
    pub fn summary_line(&self, elapsed_ms: u64) -> String {
        let data_size = if self.dataset_file_size_bytes < 1024 {
            format!("{} B", self.dataset_file_size_bytes)
        } else if self.dataset_file_size_bytes < 1024 * 1024 {
            format!("{:.1} KB", self.dataset_file_size_bytes as f64 / 1024.0)
        } else {
            format!(
                "{:.1} MB",
                self.dataset_file_size_bytes as f64 / (1024.0 * 1024.0)
            )
        };

        format!(
            "{}ms | RAM {:.1} MB | CPU {}/{} cores peak {:.1}% | 데이터 {}",
            elapsed_ms,
            self.memory_used_mb,
            self.cpu_active_cores,
            self.cpu_total_cores,
            self.cpu_max_core_percent,
            data_size,
        )
    }
}
