//! 统计信息
//!
//! 单次运行中单调累积的计数器，运行结束后只读。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub generated_requests: u64,
    pub accepted_requests: u64,
    pub blocked_requests: u64,
    pub completed_requests: u64,
    pub added_servers: u64,
    pub removed_servers: u64,
    pub peak_queue_size: usize,
    pub final_queue_size: usize,
    pub final_server_count: usize,
}

impl SimulationStats {
    pub(crate) fn observe_queue(&mut self, depth: usize) {
        self.peak_queue_size = self.peak_queue_size.max(depth);
    }
}
