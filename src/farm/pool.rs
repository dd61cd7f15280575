//! worker 池
//!
//! 有序、可伸缩；缩容只移除空闲 worker，且优先移除最新加入的。

use tracing::debug;

use super::id::WorkerId;
use super::worker::Worker;

#[derive(Debug, Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    next_id: u32,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个空闲 worker，编号从 1 开始单调递增
    pub fn add_worker(&mut self) -> WorkerId {
        self.next_id += 1;
        let id = WorkerId(self.next_id);
        self.workers.push(Worker::new(id));
        debug!(worker = %id, size = self.workers.len(), "➕ 新增 worker");
        id
    }

    /// 从尾部向头部查找第一个空闲 worker 并移除；全部忙碌时返回 None。
    pub fn remove_idle_worker(&mut self) -> Option<WorkerId> {
        let idx = self.workers.iter().rposition(Worker::is_available)?;
        let removed = self.workers.remove(idx);
        debug!(worker = %removed.id(), size = self.workers.len(), "➖ 移除空闲 worker");
        Some(removed.id())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn busy_count(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_available()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.workers.iter_mut()
    }

    pub fn get(&self, idx: usize) -> Option<&Worker> {
        self.workers.get(idx)
    }

    /// 推进所有 worker 一个周期，返回本周期完成数
    pub fn tick_all(&mut self) -> u64 {
        self.workers.iter_mut().map(|w| u64::from(w.tick())).sum()
    }
}
