//! FIFO 调度队列
//!
//! 已准入的请求按到达顺序排队，队头最早。

use std::collections::VecDeque;

use crate::farm::Request;

#[derive(Debug, Default)]
pub struct DispatchQueue {
    q: VecDeque<Request>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, req: Request) {
        self.q.push_back(req);
    }

    /// 退回队头（分派失败时保持原有顺序）
    pub fn push_front(&mut self, req: Request) {
        self.q.push_front(req);
    }

    pub fn pop(&mut self) -> Option<Request> {
        self.q.pop_front()
    }

    pub fn front(&self) -> Option<&Request> {
        self.q.front()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
}
