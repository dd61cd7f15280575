//! 准入过滤（地址黑名单）
//!
//! 按闭区间存储被封禁的 IPv4 地址段，请求进入队列前按源地址检查。

mod addr;
mod range;

pub use addr::{AddrError, format_address, parse_address};
pub use range::{AddressFilter, AddressRange, RangeError};
