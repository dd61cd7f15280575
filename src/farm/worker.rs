//! 单槽 worker
//!
//! 同一时刻最多持有一个请求，每个周期倒计时一次。

use tracing::trace;

use super::id::WorkerId;
use super::request::Request;

/// 不变式：`busy == current.is_some()`，且 `remaining > 0` 仅在 busy 时成立。
#[derive(Debug, Clone)]
pub struct Worker {
    id: WorkerId,
    remaining: u32,
    current: Option<Request>,
    completed: u64,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            remaining: 0,
            current: None,
            completed: 0,
        }
    }

    /// 空闲时接收请求并返回 `Ok(())`；忙碌时原样退回请求，不产生副作用。
    ///
    /// 时长为 0 的请求按 1 个周期处理。
    pub fn assign(&mut self, req: Request) -> Result<(), Request> {
        if self.current.is_some() {
            return Err(req);
        }
        trace!(worker = %self.id, req = %req.id, duration = req.duration, "worker 接收请求");
        self.remaining = req.duration.max(1);
        self.current = Some(req);
        Ok(())
    }

    /// 推进一个周期；本周期恰好完成时返回 true。
    pub fn tick(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.current = None;
            self.completed += 1;
            trace!(worker = %self.id, completed = self.completed, "worker 完成请求");
            return true;
        }
        false
    }

    pub fn is_available(&self) -> bool {
        self.current.is_none()
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn current(&self) -> Option<&Request> {
        self.current.as_ref()
    }
}
