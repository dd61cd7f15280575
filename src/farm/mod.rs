//! 服务器集群
//!
//! 请求模型、单槽 worker 以及可伸缩的 worker 池。

mod id;
mod pool;
mod request;
mod worker;

pub use id::{RequestId, WorkerId};
pub use pool::WorkerPool;
pub use request::{JobType, Request};
pub use worker::Worker;
