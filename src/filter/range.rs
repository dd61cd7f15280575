//! 地址区间与过滤器
//!
//! 支持三种写法：`A-B`、`A/len`（CIDR）和单个地址。

use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::{debug, trace};

use super::addr::{AddrError, parse_address};

/// 区间注册失败的原因；失败时不会存入任何区间。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid address {text:?}: {source}")]
    Address {
        text: String,
        #[source]
        source: AddrError,
    },
    #[error("invalid prefix length {0:?}")]
    BadPrefix(String),
    #[error("prefix length {0} is outside 0..=32")]
    PrefixOutOfRange(u32),
}

/// 闭区间 `[low, high]`，`low <= high`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub low: u32,
    pub high: u32,
}

impl AddressRange {
    /// 构造区间，必要时交换两端
    pub fn new(a: u32, b: u32) -> Self {
        if a > b {
            Self { low: b, high: a }
        } else {
            Self { low: a, high: b }
        }
    }

    /// CIDR：`mask = 0`（len=0）或 `!0 << (32-len)`
    pub fn from_cidr(base: u32, prefix_len: u32) -> Result<Self, RangeError> {
        if prefix_len > 32 {
            return Err(RangeError::PrefixOutOfRange(prefix_len));
        }
        let mask = if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - prefix_len)
        };
        let low = base & mask;
        Ok(Self {
            low,
            high: low | !mask,
        })
    }

    pub fn contains(&self, value: u32) -> bool {
        self.low <= value && value <= self.high
    }
}

/// 地址黑名单：线性扫描所有区间，不合并、不排序。
#[derive(Debug, Clone, Default)]
pub struct AddressFilter {
    ranges: Vec<AddressRange>,
    labels: Vec<String>,
}

fn parse_for_range(text: &str) -> Result<u32, RangeError> {
    parse_address(text).map_err(|source| RangeError::Address {
        text: text.to_string(),
        source,
    })
}

impl AddressFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 `[low, high]`，两端顺序颠倒时自动交换
    pub fn add_range(&mut self, low: &str, high: &str) -> Result<(), RangeError> {
        let a = parse_for_range(low)?;
        let b = parse_for_range(high)?;
        self.push(AddressRange::new(a, b), format!("{low}-{high}"));
        Ok(())
    }

    /// 按 `A-B`、`A/len`、单地址的顺序尝试解析
    pub fn add_range_spec(&mut self, spec: &str) -> Result<(), RangeError> {
        if let Some((low, high)) = spec.split_once('-') {
            return self.add_range(low, high);
        }

        if let Some((base, prefix)) = spec.split_once('/') {
            let base = parse_for_range(base)?;
            if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RangeError::BadPrefix(prefix.to_string()));
            }
            let prefix_len: u32 = prefix
                .parse()
                .map_err(|_| RangeError::BadPrefix(prefix.to_string()))?;
            let range = AddressRange::from_cidr(base, prefix_len)?;
            self.push(range, spec.to_string());
            return Ok(());
        }

        self.add_range(spec, spec)
    }

    fn push(&mut self, range: AddressRange, label: String) {
        debug!(low = range.low, high = range.high, label = %label, "🚫 注册封禁区间");
        self.ranges.push(range);
        self.labels.push(label);
    }

    /// 无法解析的地址一律视为被封禁
    pub fn is_blocked(&self, text: &str) -> bool {
        match parse_address(text) {
            Ok(value) => self.contains(value),
            Err(err) => {
                trace!(addr = text, %err, "地址无法解析，按封禁处理");
                true
            }
        }
    }

    pub fn is_blocked_addr(&self, addr: Ipv4Addr) -> bool {
        self.contains(u32::from(addr))
    }

    fn contains(&self, value: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(value))
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    /// 注册时的原始文本（用于日志）
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
