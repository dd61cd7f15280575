//! 阈值伸缩控制器
//!
//! 每次调用最多增减一个 worker，且不会缩到 1 个以下。

use tracing::debug;

use crate::events::{EventSink, ScaleInfo, SimEvent};
use crate::farm::WorkerPool;
use crate::sim::{Config, Cycle, SimulationStats};

/// 伸缩阈值与冷却长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingPolicy {
    pub min_queue_per_worker: u32,
    pub max_queue_per_worker: u32,
    pub cooldown_cycles: u32,
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self {
            min_queue_per_worker: 50,
            max_queue_per_worker: 80,
            cooldown_cycles: 25,
        }
    }
}

impl ScalingPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            min_queue_per_worker: cfg.min_queue_per_server,
            max_queue_per_worker: cfg.max_queue_per_server,
            cooldown_cycles: cfg.scaling_cooldown_cycles,
        }
    }

    /// 缩容下限 `min × workers`
    pub fn lower(&self, workers: usize) -> usize {
        (self.min_queue_per_worker as usize).saturating_mul(workers)
    }

    /// 扩容上限 `max × workers`
    pub fn upper(&self, workers: usize) -> usize {
        (self.max_queue_per_worker as usize).saturating_mul(workers)
    }
}

/// 单次评估的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// 冷却中，本周期不评估
    Cooling,
    ScaledUp,
    ScaledDown,
    /// 需要缩容但所有 worker 都在忙
    NoIdleWorker,
    Hold,
}

#[derive(Debug, Clone)]
pub struct Autoscaler {
    policy: ScalingPolicy,
    cooldown: u32,
}

impl Autoscaler {
    pub fn new(policy: ScalingPolicy) -> Self {
        Self { policy, cooldown: 0 }
    }

    pub fn policy(&self) -> &ScalingPolicy {
        &self.policy
    }

    /// 剩余冷却周期数
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// 根据当前队列深度评估一次，必要时调整 worker 池
    #[tracing::instrument(skip(self, pool, stats, sink), fields(cooldown = self.cooldown, workers = pool.len()))]
    pub fn balance(
        &mut self,
        now: Cycle,
        queue_len: usize,
        pool: &mut WorkerPool,
        stats: &mut SimulationStats,
        sink: &mut dyn EventSink,
    ) -> ScaleDecision {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return ScaleDecision::Cooling;
        }

        let workers = pool.len();
        let lower = self.policy.lower(workers);
        let upper = self.policy.upper(workers);

        if queue_len > upper {
            pool.add_worker();
            stats.added_servers += 1;
            self.cooldown = self.policy.cooldown_cycles;
            debug!(queue_len, upper, workers = pool.len(), "📈 扩容");
            sink.emit(
                now,
                &SimEvent::ScaleUp(ScaleInfo {
                    queue: queue_len,
                    threshold: upper,
                    workers: pool.len(),
                }),
            );
            return ScaleDecision::ScaledUp;
        }

        if queue_len < lower && workers > 1 {
            if pool.remove_idle_worker().is_none() {
                debug!(queue_len, lower, "所有 worker 忙碌，跳过缩容");
                return ScaleDecision::NoIdleWorker;
            }
            stats.removed_servers += 1;
            self.cooldown = self.policy.cooldown_cycles;
            debug!(queue_len, lower, workers = pool.len(), "📉 缩容");
            sink.emit(
                now,
                &SimEvent::ScaleDown(ScaleInfo {
                    queue: queue_len,
                    threshold: lower,
                    workers: pool.len(),
                }),
            );
            return ScaleDecision::ScaledDown;
        }

        ScaleDecision::Hold
    }
}
