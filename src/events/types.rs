//! 事件类型
//!
//! 仿真过程中发出的结构化事件及其日志文本。

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::farm::{JobType, RequestId, WorkerId};
use crate::sim::{Cycle, SimulationStats};

/// 伸缩事件的上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleInfo {
    pub queue: usize,
    /// 触发本次伸缩的阈值（扩容为上限，缩容为下限）
    pub threshold: usize,
    pub workers: usize,
}

/// 周期性状态快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub total_cycles: u64,
    pub queue: usize,
    pub capacity: usize,
    pub workers: usize,
    pub generated: u64,
    pub blocked: u64,
    pub completed: u64,
}

/// 仿真事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    Info { message: String },
    /// 源地址命中黑名单，请求被丢弃
    Blocked { request: RequestId, src: Ipv4Addr, dst: Ipv4Addr },
    /// 请求进入调度队列
    Queued {
        request: RequestId,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        job_type: JobType,
        duration: u32,
    },
    /// 请求被分派给 worker
    Assigned {
        request: RequestId,
        worker: WorkerId,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        duration: u32,
    },
    ScaleUp(ScaleInfo),
    ScaleDown(ScaleInfo),
    Status(StatusInfo),
    Warn { message: String },
    Error { message: String },
    /// 运行结束汇总
    Summary {
        stats: SimulationStats,
        log_file: Option<String>,
    },
}

impl SimEvent {
    pub fn info(message: impl Into<String>) -> Self {
        SimEvent::Info {
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        SimEvent::Warn {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        SimEvent::Error {
            message: message.into(),
        }
    }

    /// 日志行前缀标签
    pub fn tag(&self) -> &'static str {
        match self {
            SimEvent::Info { .. } | SimEvent::Status(_) | SimEvent::Summary { .. } => "INFO",
            SimEvent::Blocked { .. } => "BLOCK",
            SimEvent::Queued { .. } => "QUEUED",
            SimEvent::Assigned { .. } => "ASSIGNED",
            SimEvent::ScaleUp(_) => "SCALE UP",
            SimEvent::ScaleDown(_) => "SCALE DOWN",
            SimEvent::Warn { .. } => "WARN",
            SimEvent::Error { .. } => "ERROR",
        }
    }

    /// 带周期前缀的完整消息（不含标签）
    pub fn render(&self, cycle: Cycle) -> String {
        match self {
            SimEvent::ScaleUp(_) | SimEvent::ScaleDown(_) => format!("Cycle {cycle}: {self}"),
            SimEvent::Status(s) => format!("Cycle {cycle}/{}  |  {self}", s.total_cycles),
            _ => self.to_string(),
        }
    }

    /// 汇总块的逐行内容（标签之后的部分）
    pub fn summary_lines(stats: &SimulationStats, log_file: Option<&str>) -> Vec<String> {
        let mut lines = vec![
            "==== Simulation Summary ====".to_string(),
            format!("Generated requests : {}", stats.generated_requests),
            format!("Accepted requests  : {}", stats.accepted_requests),
            format!("Blocked requests   : {}", stats.blocked_requests),
            format!("Completed requests : {}", stats.completed_requests),
            format!("Peak queue size    : {}", stats.peak_queue_size),
            format!("Final queue size   : {}", stats.final_queue_size),
            format!("Servers added      : {}", stats.added_servers),
            format!("Servers removed    : {}", stats.removed_servers),
            format!("Final server count : {}", stats.final_server_count),
        ];
        if let Some(path) = log_file {
            lines.push(format!("Log file           : {path}"));
        }
        lines
    }
}

fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 { 0 } else { part * 100 / whole }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::Info { message } | SimEvent::Warn { message } | SimEvent::Error { message } => {
                f.write_str(message)
            }
            SimEvent::Blocked { request, src, dst } => {
                write!(f, "Request {request} BLOCKED | src={src} dst={dst}")
            }
            SimEvent::Queued {
                request,
                src,
                dst,
                job_type,
                duration,
            } => write!(
                f,
                "Request {request} | {src} -> {dst} | type={job_type} time={duration}"
            ),
            SimEvent::Assigned {
                request,
                worker,
                src,
                dst,
                duration,
            } => write!(
                f,
                "Request {request} -> server {worker} | {src} -> {dst} | time={duration}"
            ),
            SimEvent::ScaleUp(s) => write!(
                f,
                "queue={} exceeded max threshold={}, added 1 server (now {})",
                s.queue, s.threshold, s.workers
            ),
            SimEvent::ScaleDown(s) => write!(
                f,
                "queue={} below min threshold={}, removed 1 server (now {})",
                s.queue, s.threshold, s.workers
            ),
            SimEvent::Status(s) => write!(
                f,
                "queue {}/{} ({}%)  |  servers={}  |  gen={} blocked={} done={}",
                s.queue,
                s.capacity,
                percent(s.queue, s.capacity),
                s.workers,
                s.generated,
                s.blocked,
                s.completed
            ),
            SimEvent::Summary { stats, log_file } => {
                let lines = Self::summary_lines(stats, log_file.as_deref());
                f.write_str(&lines.join("\n"))
            }
        }
    }
}
