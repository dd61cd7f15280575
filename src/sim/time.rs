//! 仿真时间类型
//!
//! 以离散周期为单位推进。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 仿真周期（第 0 周期为预热阶段）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Cycle(pub u64);

impl Cycle {
    pub const ZERO: Cycle = Cycle(0);

    pub fn next(self) -> Cycle {
        Cycle(self.0.saturating_add(1))
    }

    /// 是否落在每 `interval` 个周期一次的节拍上（interval 为 0 时永远不落）
    pub fn on_interval(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
