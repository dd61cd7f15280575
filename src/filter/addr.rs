//! 地址解析
//!
//! 点分十进制文本与大端打包 `u32` 之间的转换。

use thiserror::Error;

/// 地址文本解析失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrError {
    #[error("expected 4 octets, found {0}")]
    WrongOctetCount(usize),
    #[error("empty octet at position {0}")]
    EmptyOctet(usize),
    #[error("octet {0:?} contains a non-digit character")]
    NonDigit(String),
    #[error("octet {0:?} is outside 0..=255")]
    OutOfRange(String),
}

/// 解析点分十进制地址：恰好 4 段，每段只含数字且在 0..=255 之间。
///
/// 返回 `o0<<24 | o1<<16 | o2<<8 | o3`。
pub fn parse_address(text: &str) -> Result<u32, AddrError> {
    let tokens: Vec<&str> = text.split('.').collect();
    if tokens.len() != 4 {
        return Err(AddrError::WrongOctetCount(tokens.len()));
    }

    let mut packed = 0u32;
    for (idx, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(AddrError::EmptyOctet(idx));
        }
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddrError::NonDigit(token.to_string()));
        }
        // 只含数字时唯一的失败原因是溢出（前导零允许）
        let octet: u8 = token
            .parse()
            .map_err(|_| AddrError::OutOfRange(token.to_string()))?;
        packed = (packed << 8) | u32::from(octet);
    }
    Ok(packed)
}

/// 打包值转回点分十进制文本
pub fn format_address(packed: u32) -> String {
    let [a, b, c, d] = packed.to_be_bytes();
    format!("{a}.{b}.{c}.{d}")
}
