//! 事件 sink
//!
//! 控制台（tracing）、日志文件、内存记录以及广播组合。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::types::SimEvent;
use crate::sim::Cycle;

/// 事件接收端：核心逻辑只依赖这个接口。
pub trait EventSink {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent);

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        (**self).emit(cycle, event);
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        (**self).emit(cycle, event);
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _cycle: Cycle, _event: &SimEvent) {}
}

/// 把事件保存在内存中（测试和 JSON 导出用）
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<(Cycle, SimEvent)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按标签统计事件数
    pub fn count_tag(&self, tag: &str) -> usize {
        self.events.iter().filter(|(_, ev)| ev.tag() == tag).count()
    }

    pub fn events_of<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a (Cycle, SimEvent)> + 'a {
        self.events.iter().filter(move |(_, ev)| ev.tag() == tag)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        self.events.push((cycle, event.clone()));
    }
}

/// 控制台输出：按事件类型映射到 tracing 级别，颜色由 subscriber 负责。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        let tag = event.tag();
        match event {
            SimEvent::Queued { .. } | SimEvent::Assigned { .. } => {
                debug!(cycle = cycle.0, tag, "{}", event.render(cycle));
            }
            SimEvent::Blocked { .. } | SimEvent::Warn { .. } => {
                warn!(cycle = cycle.0, tag, "{}", event.render(cycle));
            }
            SimEvent::Error { .. } => {
                error!(cycle = cycle.0, tag, "{}", event.render(cycle));
            }
            // 汇总由调用方直接打印到控制台
            SimEvent::Summary { stats, log_file } => {
                for line in SimEvent::summary_lines(stats, log_file.as_deref()) {
                    debug!(tag, "{line}");
                }
            }
            _ => {
                info!(cycle = cycle.0, tag, "{}", event.render(cycle));
            }
        }
    }
}

/// 日志文件：打开时截断，之后只追加 `[TAG] message` 行。
#[derive(Debug)]
pub struct LogFileSink {
    path: PathBuf,
    out: BufWriter<File>,
    failed: bool,
}

impl LogFileSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(&mut self, cycle: Cycle, event: &SimEvent) -> io::Result<()> {
        let tag = event.tag();
        match event {
            SimEvent::Summary { stats, log_file } => {
                writeln!(self.out)?;
                for line in SimEvent::summary_lines(stats, log_file.as_deref()) {
                    writeln!(self.out, "[{tag}] {line}")?;
                }
            }
            _ => writeln!(self.out, "[{tag}] {}", event.render(cycle))?,
        }
        Ok(())
    }
}

impl EventSink for LogFileSink {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        if self.failed {
            return;
        }
        if let Err(err) = self.write_event(cycle, event) {
            // 只报告一次，之后静默丢弃
            warn!(path = %self.path.display(), %err, "写日志文件失败，停止写入");
            self.failed = true;
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// 把同一事件广播给多个 sink
#[derive(Default)]
pub struct FanOut<'a> {
    sinks: Vec<Box<dyn EventSink + 'a>>,
}

impl<'a> FanOut<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: impl EventSink + 'a) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: impl EventSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanOut<'_> {
    fn emit(&mut self, cycle: Cycle, event: &SimEvent) {
        for sink in &mut self.sinks {
            sink.emit(cycle, event);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.flush() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
