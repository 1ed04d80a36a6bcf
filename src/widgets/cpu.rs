//! # CPU Widget
//!
//! Overall utilization from `/proc/stat`, with a history graph underneath a
//! short text summary. Clock speed comes from `/proc/cpuinfo` and the
//! temperature from the first thermal zone, when the machine exposes one.
//!
//! ```text
//! ┌──────────────────────┐
//! │Usage: 23.4%          │  ← summary (SUMMARY_ROWS lines)
//! │Cores: 8              │
//! │Model: ...            │
//! │Freq: 2999 MHz        │
//! │Temp: 48.0°C          │
//! │      ****            │  ← filled history graph
//! │*****######***********│
//! └──────────────────────┘
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{Widget, WidgetError, bad_args};
use crate::surface::{Area, Color, FillDirection, GraphOptions, Surface};

pub const KIND: &str = "cpu";
pub const DEFAULT_HISTORY: usize = 20;
const SUMMARY_ROWS: u16 = 5;

const STAT_PATH: &str = "/proc/stat";
const CPUINFO_PATH: &str = "/proc/cpuinfo";
const THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Aggregate jiffy counters from the `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Parse the aggregate `cpu` line. Idle time includes iowait.
pub fn parse_stat(contents: &str) -> Option<CpuTimes> {
    let line = contents.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() < 4 {
        return None;
    }
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes { idle, total: fields.iter().sum() })
}

/// Busy fraction between two samples, in `[0, 1]`.
pub fn utilization(prev: CpuTimes, now: CpuTimes) -> f64 {
    let total = now.total.saturating_sub(prev.total);
    if total == 0 {
        return 0.0;
    }
    let idle = now.idle.saturating_sub(prev.idle);
    (total.saturating_sub(idle) as f64 / total as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Default, PartialEq)]
pub struct CpuInfo {
    pub model: Option<String>,
    pub cores: usize,
    /// Mean current clock across cores.
    pub mhz: Option<f64>,
}

pub fn parse_cpuinfo(contents: &str) -> CpuInfo {
    let mut info = CpuInfo::default();
    let mut clocks = Vec::new();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "processor" => info.cores += 1,
            "model name" if info.model.is_none() => info.model = Some(value.trim().to_string()),
            "cpu MHz" => clocks.extend(value.trim().parse::<f64>().ok()),
            _ => {}
        }
    }
    if !clocks.is_empty() {
        info.mhz = Some(clocks.iter().sum::<f64>() / clocks.len() as f64);
    }
    info
}

/// Degrees Celsius from a sysfs thermal reading in millidegrees.
pub fn parse_temperature(contents: &str) -> Option<f64> {
    contents.trim().parse::<i64>().ok().map(|m| m as f64 / 1000.0)
}

struct History {
    samples: VecDeque<f64>,
    last: Option<CpuTimes>,
}

impl History {
    fn new(len: usize) -> Self {
        Self {
            samples: std::iter::repeat_n(0.0, len).collect(),
            last: None,
        }
    }

    /// Record a new reading and return the latest utilization.
    fn push(&mut self, times: CpuTimes) -> f64 {
        let usage = self.last.map(|prev| utilization(prev, times)).unwrap_or(0.0);
        self.last = Some(times);
        self.samples.pop_front();
        self.samples.push_back(usage);
        usage
    }
}

pub struct CpuWidget {
    history: Mutex<History>,
    graph: GraphOptions,
}

impl CpuWidget {
    pub fn new(history: usize, graph: GraphOptions) -> Self {
        Self {
            history: Mutex::new(History::new(history.max(2))),
            graph,
        }
    }

    /// Filled gradient bands, magenta through purple to blue.
    pub fn default_graph() -> GraphOptions {
        GraphOptions {
            color: vec![
                Color::Rgb(215, 2, 112),
                Color::Rgb(215, 2, 112),
                Color::Rgb(115, 79, 150),
                Color::Rgb(0, 56, 168),
                Color::Rgb(0, 56, 168),
            ],
            fill: true,
            fill_dir: FillDirection::Bottom,
            normalized: false,
            ..Default::default()
        }
    }

    fn sample(&self, times: CpuTimes) -> (f64, Vec<f64>) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let usage = history.push(times);
        (usage, history.samples.iter().copied().collect())
    }
}

/// Args: `[history?, graph_options?]`.
pub fn build(args: &[Value]) -> Result<Arc<dyn Widget>, WidgetError> {
    let history = match args.first() {
        None => DEFAULT_HISTORY,
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| bad_args(KIND, "history length must be a positive integer"))?,
    };
    let graph = match args.get(1) {
        None => CpuWidget::default_graph(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| bad_args(KIND, format!("bad graph options: {e}")))?,
    };
    Ok(Arc::new(CpuWidget::new(history, graph)))
}

#[async_trait]
impl Widget for CpuWidget {
    fn name(&self) -> &str {
        KIND
    }

    async fn draw(&self, surface: &Surface, area: Area, _tick: u64) -> Result<(), WidgetError> {
        let (stat, cpuinfo, thermal) = futures::join!(
            tokio::fs::read_to_string(STAT_PATH),
            tokio::fs::read_to_string(CPUINFO_PATH),
            tokio::fs::read_to_string(THERMAL_PATH),
        );
        let (stat, cpuinfo) = (stat?, cpuinfo?);
        let temperature = thermal.ok().as_deref().and_then(parse_temperature);
        let times = parse_stat(&stat)
            .ok_or_else(|| WidgetError::Source(format!("no aggregate cpu line in {STAT_PATH}")))?;
        let info = parse_cpuinfo(&cpuinfo);
        let (usage, samples) = self.sample(times);

        surface.clear_region(area)?;
        surface.reset()?;
        let freq = info
            .mhz
            .map(|mhz| format!("{mhz:.0} MHz"))
            .unwrap_or_else(|| "n/a".to_string());
        let temp = temperature
            .map(|c| format!("{c:.1}°C"))
            .unwrap_or_else(|| "n/a".to_string());
        let summary = format!(
            "Usage: {:.1}%\nCores: {}\nModel: {}\nFreq: {}\nTemp: {}",
            usage * 100.0,
            info.cores,
            info.model.as_deref().unwrap_or("unknown"),
            freq,
            temp,
        );
        let summary_area = Area {
            height: area.height.min(SUMMARY_ROWS),
            ..area
        };
        surface.write_in(&summary, summary_area)?;

        let graph_area = Area {
            row: area.row.saturating_add(SUMMARY_ROWS),
            height: area.height.saturating_sub(SUMMARY_ROWS),
            ..area
        };
        surface.graph(&samples, graph_area, &self.graph)?;
        surface.reset()?;
        Ok(())
    }
}
