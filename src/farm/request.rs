//! 请求模型
//!
//! 一个合成的工作单元，创建后不可变。

use std::fmt;
use std::net::Ipv4Addr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::id::RequestId;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Processing,
    Streaming,
}

impl JobType {
    /// 单字符缩写（P / S）
    pub fn code(self) -> char {
        match self {
            JobType::Processing => 'P',
            JobType::Streaming => 'S',
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    /// 所需处理周期数（>= 1）
    pub duration: u32,
    pub job_type: JobType,
}

impl Request {
    pub fn new(id: RequestId, src: Ipv4Addr, dst: Ipv4Addr, duration: u32, job_type: JobType) -> Self {
        Self {
            id,
            src,
            dst,
            duration,
            job_type,
        }
    }

    /// 随机生成请求：地址四段各自均匀取 [0,255]，时长均匀取 `[min_time, max_time]`。
    ///
    /// 调用方保证 `1 <= min_time <= max_time`，并负责 id 的递增。
    pub fn random<R: Rng + ?Sized>(id: RequestId, rng: &mut R, min_time: u32, max_time: u32) -> Self {
        let src = random_addr(rng);
        let dst = random_addr(rng);
        let duration = rng.gen_range(min_time..=max_time);
        let job_type = if rng.gen_bool(0.5) {
            JobType::Processing
        } else {
            JobType::Streaming
        };
        Self::new(id, src, dst, duration, job_type)
    }
}

fn random_addr<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    Ipv4Addr::new(
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    )
}
