//! 请求队列
//!
//! 目前只有严格 FIFO 的调度队列。

mod fifo;

pub use fifo::DispatchQueue;
