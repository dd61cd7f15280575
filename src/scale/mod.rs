//! 自动伸缩
//!
//! 按“每个 worker 的队列深度”阈值增减 worker，扩缩共用冷却计时。

mod autoscaler;

pub use autoscaler::{Autoscaler, ScaleDecision, ScalingPolicy};
