//! 仿真事件记录
//!
//! 核心逻辑只通过 [`EventSink`] 发出结构化事件，
//! 格式化、着色和落盘由具体的 sink 决定。

mod sink;
mod types;

pub use sink::{EventSink, FanOut, LogFileSink, NullSink, RecordingSink, TracingSink};
pub use types::{ScaleInfo, SimEvent, StatusInfo};
