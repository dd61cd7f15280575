//! 仿真驱动
//!
//! 持有过滤器、队列、worker 池和伸缩控制器，按周期推进仿真。
//! 每个周期依次执行：到达 → 过滤 → 入队 → 分派 → 全体 tick → 伸缩 → 统计。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::config::Config;
use super::stats::SimulationStats;
use super::time::Cycle;
use crate::events::{EventSink, SimEvent, StatusInfo};
use crate::farm::{Request, RequestId, WorkerPool};
use crate::filter::AddressFilter;
use crate::queue::DispatchQueue;
use crate::scale::{Autoscaler, ScaleDecision, ScalingPolicy};

/// 预热阶段最多尝试 `目标深度 × 该值` 次提交
pub const WARMUP_ATTEMPT_FACTOR: u64 = 64;

/// 驱动状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    PoolWarmup,
    QueueWarmup,
    Running,
    Finished,
}

/// 负载均衡仿真驱动。`run` 消耗自身，结束后不可复用。
pub struct LoadBalancer<S: EventSink> {
    cfg: Config,
    filter: AddressFilter,
    pool: WorkerPool,
    queue: DispatchQueue,
    scaler: Autoscaler,
    stats: SimulationStats,
    rng: StdRng,
    sink: S,
    now: Cycle,
    next_request_id: u64,
    phase: Phase,
    log_path: Option<String>,
}

impl<S: EventSink> LoadBalancer<S> {
    pub fn new(mut cfg: Config, filter: AddressFilter, sink: S) -> Self {
        cfg.normalize();
        let rng = if cfg.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(cfg.seed)
        };
        let scaler = Autoscaler::new(ScalingPolicy::from_config(&cfg));
        Self {
            cfg,
            filter,
            pool: WorkerPool::new(),
            queue: DispatchQueue::new(),
            scaler,
            stats: SimulationStats::default(),
            rng,
            sink,
            now: Cycle::ZERO,
            next_request_id: 1,
            phase: Phase::Uninitialized,
            log_path: None,
        }
    }

    /// 按配置中的 `blocked_ranges` 构建过滤器；无效项发出 WARN 后跳过。
    pub fn from_config(cfg: Config, mut sink: S) -> Self {
        let mut filter = AddressFilter::new();
        for spec in &cfg.blocked_ranges {
            if let Err(err) = filter.add_range_spec(spec) {
                warn!(range = %spec, %err, "忽略无效的封禁区间");
                sink.emit(
                    Cycle::ZERO,
                    &SimEvent::warn(format!("Invalid blocked range ignored: {spec} ({err})")),
                );
            }
        }
        Self::new(cfg, filter, sink)
    }

    /// 汇总中报告的日志文件路径
    pub fn with_log_path(mut self, path: impl Into<String>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn now(&self) -> Cycle {
        self.now
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn filter(&self) -> &AddressFilter {
        &self.filter
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    pub fn scaler(&self) -> &Autoscaler {
        &self.scaler
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 当前 worker 数下的队列容量（扩容阈值）
    pub fn capacity(&self) -> usize {
        self.scaler.policy().upper(self.pool.len())
    }

    /// 生成下一个随机请求，id 严格递增
    pub fn generate_request(&mut self) -> Request {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        Request::random(
            id,
            &mut self.rng,
            self.cfg.min_request_time,
            self.cfg.max_request_time,
        )
    }

    /// 准入检查后入队；被封禁的请求直接丢弃。返回是否入队。
    pub fn submit(&mut self, req: Request) -> bool {
        self.stats.generated_requests += 1;
        if self.filter.is_blocked_addr(req.src) {
            self.stats.blocked_requests += 1;
            self.sink.emit(
                self.now,
                &SimEvent::Blocked {
                    request: req.id,
                    src: req.src,
                    dst: req.dst,
                },
            );
            return false;
        }

        self.sink.emit(
            self.now,
            &SimEvent::Queued {
                request: req.id,
                src: req.src,
                dst: req.dst,
                job_type: req.job_type,
                duration: req.duration,
            },
        );
        self.queue.push(req);
        self.stats.accepted_requests += 1;
        true
    }

    /// 创建 `max(1, initial_servers)` 个 worker
    pub fn warm_up_pool(&mut self) {
        self.phase = Phase::PoolWarmup;
        let n = self.cfg.initial_servers.max(1);
        self.cfg.initial_servers = n;
        for _ in 0..n {
            self.pool.add_worker();
        }
        debug!(workers = self.pool.len(), "worker 池预热完成");
    }

    /// 持续生成请求直到队列深度达到 `initial_servers × initial_queue_multiplier`
    pub fn fill_initial_queue(&mut self) {
        self.phase = Phase::QueueWarmup;
        let target = u64::from(self.cfg.initial_servers) * u64::from(self.cfg.initial_queue_multiplier);
        let max_attempts = target.saturating_mul(WARMUP_ATTEMPT_FACTOR);

        let mut attempts = 0u64;
        while (self.queue.len() as u64) < target && attempts < max_attempts {
            let req = self.generate_request();
            self.submit(req);
            attempts += 1;
        }

        if (self.queue.len() as u64) < target {
            warn!(target, depth = self.queue.len(), attempts, "预热未达到目标队列深度");
            self.sink.emit(
                self.now,
                &SimEvent::warn(format!(
                    "Initial queue stopped at {} of {target} requests after {attempts} attempts",
                    self.queue.len()
                )),
            );
        }
        self.stats.peak_queue_size = self.queue.len();
    }

    /// 按到达模型生成本周期的新请求
    pub fn arrivals(&mut self) -> u32 {
        let mut admitted = 0;
        for _ in 0..self.cfg.max_new_requests_per_cycle {
            if self.rng.gen_bool(self.cfg.arrival_probability) {
                let req = self.generate_request();
                if self.submit(req) {
                    admitted += 1;
                }
            }
        }
        admitted
    }

    /// 分派队头请求给空闲 worker，然后推进所有 worker（包括刚分派的）一个周期。
    ///
    /// 返回本周期完成的请求数。
    #[tracing::instrument(skip(self), fields(now = self.now.0, queue = self.queue.len()))]
    pub fn dispatch(&mut self) -> u64 {
        let now = self.now;
        for worker in self.pool.iter_mut() {
            if self.queue.is_empty() {
                break;
            }
            if !worker.is_available() {
                continue;
            }
            let Some(req) = self.queue.pop() else { break };
            let event = SimEvent::Assigned {
                request: req.id,
                worker: worker.id(),
                src: req.src,
                dst: req.dst,
                duration: req.duration,
            };
            match worker.assign(req) {
                Ok(()) => self.sink.emit(now, &event),
                Err(req) => {
                    self.queue.push_front(req);
                    break;
                }
            }
        }

        let done = self.pool.tick_all();
        self.stats.completed_requests += done;
        done
    }

    /// 执行一次伸缩评估
    pub fn balance_load(&mut self) -> ScaleDecision {
        self.scaler.balance(
            self.now,
            self.queue.len(),
            &mut self.pool,
            &mut self.stats,
            &mut self.sink,
        )
    }

    /// 推进一个运行周期
    pub fn step(&mut self) {
        self.phase = Phase::Running;
        self.now = self.now.next();

        self.arrivals();
        self.dispatch();
        self.stats.observe_queue(self.queue.len());
        self.balance_load();

        if self.now.on_interval(self.cfg.status_print_interval) {
            let status = self.status();
            self.sink.emit(self.now, &SimEvent::Status(status));
        }
    }

    fn status(&self) -> StatusInfo {
        StatusInfo {
            total_cycles: self.cfg.simulation_cycles,
            queue: self.queue.len(),
            capacity: self.capacity(),
            workers: self.pool.len(),
            generated: self.stats.generated_requests,
            blocked: self.stats.blocked_requests,
            completed: self.stats.completed_requests,
        }
    }

    fn announce_start(&mut self) {
        let msg = format!(
            "Starting simulation for {} cycles with {} server(s)",
            self.cfg.simulation_cycles,
            self.pool.len()
        );
        self.sink.emit(self.now, &SimEvent::info(msg));

        if !self.filter.is_empty() {
            let msg = format!(
                "Blocked IP ranges ({}): {}",
                self.filter.len(),
                self.filter.labels().join(", ")
            );
            self.sink.emit(self.now, &SimEvent::info(msg));
        }
    }

    fn announce_queue(&mut self) {
        let msg = format!(
            "Initial queue: {} requests | generated={} | blocked={} | accepted={}",
            self.queue.len(),
            self.stats.generated_requests,
            self.stats.blocked_requests,
            self.stats.accepted_requests
        );
        self.sink.emit(self.now, &SimEvent::info(msg));

        let cap = self.capacity();
        let fill = if cap == 0 { 0 } else { self.queue.len() * 100 / cap };
        let policy = *self.scaler.policy();
        let msg = format!(
            "Queue capacity: {cap} ({} per server) | fill={fill}%  [scale-up >{}/srv, scale-down <{}/srv]",
            policy.max_queue_per_worker, policy.max_queue_per_worker, policy.min_queue_per_worker
        );
        self.sink.emit(self.now, &SimEvent::info(msg));
    }

    /// 完整运行：预热 → 逐周期推进 → 汇总。返回最终统计。
    #[tracing::instrument(skip(self), fields(cycles = self.cfg.simulation_cycles, seed = self.cfg.seed))]
    pub fn run(mut self) -> SimulationStats {
        info!("▶️  开始运行仿真");

        self.warm_up_pool();
        self.announce_start();
        self.fill_initial_queue();
        self.announce_queue();

        for _ in 0..self.cfg.simulation_cycles {
            self.step();
        }

        self.finish()
    }

    fn finish(mut self) -> SimulationStats {
        self.phase = Phase::Finished;
        self.stats.final_queue_size = self.queue.len();
        self.stats.final_server_count = self.pool.len();

        let summary = SimEvent::Summary {
            stats: self.stats.clone(),
            log_file: self.log_path.clone(),
        };
        self.sink.emit(self.now, &summary);
        if let Err(err) = self.sink.flush() {
            warn!(%err, "刷新事件日志失败");
        }

        info!(
            completed = self.stats.completed_requests,
            final_workers = self.stats.final_server_count,
            "✅ 仿真完成"
        );
        self.stats
    }
}
