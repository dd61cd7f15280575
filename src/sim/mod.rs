//! 仿真核心模块
//!
//! 此模块包含离散周期仿真的核心组件：仿真时间、配置、统计和驱动。

// 子模块声明
mod config;
mod driver;
mod stats;
mod time;

// 重新导出公共接口
pub use config::{Config, ConfigError};
pub use driver::{LoadBalancer, Phase, WARMUP_ATTEMPT_FACTOR};
pub use stats::SimulationStats;
pub use time::Cycle;
