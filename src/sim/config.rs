//! 运行配置
//!
//! `key=value` 文本格式，每行一项；`#` 开头为注释，未知 key 忽略。
//! 数值无法解析时保留原值并给出警告，不会中止运行。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 单次运行的全部可调参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub initial_servers: u32,
    pub simulation_cycles: u64,
    /// 预热队列深度 = initial_servers * 该值
    pub initial_queue_multiplier: u32,
    /// 每个 worker 的缩容阈值（队列深度）
    pub min_queue_per_server: u32,
    /// 每个 worker 的扩容阈值（队列深度）
    pub max_queue_per_server: u32,
    pub scaling_cooldown_cycles: u32,
    pub min_request_time: u32,
    pub max_request_time: u32,
    /// 每次到达尝试成功的概率
    pub arrival_probability: f64,
    /// 每个周期的到达尝试次数
    pub max_new_requests_per_cycle: u32,
    /// 每 N 个周期输出一次状态（0 关闭）
    pub status_print_interval: u64,
    pub log_file: String,
    /// 0 表示使用非确定性种子
    pub seed: u64,
    pub blocked_ranges: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_servers: 10,
            simulation_cycles: 10_000,
            initial_queue_multiplier: 100,
            min_queue_per_server: 50,
            max_queue_per_server: 80,
            scaling_cooldown_cycles: 25,
            min_request_time: 1,
            max_request_time: 30,
            arrival_probability: 0.5,
            max_new_requests_per_cycle: 1,
            status_print_interval: 500,
            log_file: "load_balancer.log".to_string(),
            seed: 0,
            blocked_ranges: Vec::new(),
        }
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, key: &str, val: &str) {
    match val.parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => warn!(key, value = val, "⚠️  配置值无法解析，保留原值"),
    }
}

/// 逗号分隔的区间列表：逐项去空白，丢弃空项
fn split_ranges(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// 从文件读取并覆盖默认值；文件不可读时返回错误，调用方可回退到默认配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::default();
        cfg.apply_str(&text);
        Ok(cfg)
    }

    /// 在现有值之上应用一段配置文本，然后做范围修正
    pub fn apply_str(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            self.apply_kv(key.trim(), val.trim());
        }
        self.normalize();
    }

    fn apply_kv(&mut self, key: &str, val: &str) {
        match key {
            "initial_servers" => set_parsed(&mut self.initial_servers, key, val),
            "simulation_cycles" => set_parsed(&mut self.simulation_cycles, key, val),
            "initial_queue_multiplier" => set_parsed(&mut self.initial_queue_multiplier, key, val),
            "min_queue_per_server" => set_parsed(&mut self.min_queue_per_server, key, val),
            "max_queue_per_server" => set_parsed(&mut self.max_queue_per_server, key, val),
            "scaling_cooldown_cycles" => set_parsed(&mut self.scaling_cooldown_cycles, key, val),
            "min_request_time" => set_parsed(&mut self.min_request_time, key, val),
            "max_request_time" => set_parsed(&mut self.max_request_time, key, val),
            "arrival_probability" => set_parsed(&mut self.arrival_probability, key, val),
            "max_new_requests_per_cycle" => {
                set_parsed(&mut self.max_new_requests_per_cycle, key, val)
            }
            "status_print_interval" => set_parsed(&mut self.status_print_interval, key, val),
            "log_file" => self.log_file = val.to_string(),
            "seed" => set_parsed(&mut self.seed, key, val),
            "blocked_ranges" => self.blocked_ranges = split_ranges(val),
            _ => debug!(key, "忽略未知配置项"),
        }
    }

    /// 修正相互依赖的取值范围
    pub fn normalize(&mut self) {
        self.min_request_time = self.min_request_time.max(1);
        self.max_request_time = self.max_request_time.max(self.min_request_time);
        self.max_queue_per_server = self.max_queue_per_server.max(self.min_queue_per_server);
        self.arrival_probability = if self.arrival_probability.is_nan() {
            0.0
        } else {
            self.arrival_probability.clamp(0.0, 1.0)
        };
    }
}
