//! 凭证码格式化
//!
//! 序号到凭证码字符串的确定性映射，以及反向解析。
//! 纯函数、无状态——输出的唯一性完全取决于调用方提供唯一序号。
//!
//! ## 格式规则
//!
//! - 序号 < 1_000_000：`{前缀}-{序号补零到 6 位}`，如 `SUM-000001`
//! - 序号 >= 1_000_000：前缀追加段字母（第 2 个百万段为 A，第 3 段为 B，
//!   依此类推），余数补零到 6 位，如 `SUMA-000000`、`SUMB-000000`

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{Result, VoucherError};

/// 每个段字母覆盖的序号数量
pub const BLOCK_SIZE: i64 = 1_000_000;

/// 可格式化的最大序号
///
/// 无字母段 + A-Z 共 27 个百万段，超出即无合法段字母可用
pub const MAX_ORDINAL: i64 = 27 * BLOCK_SIZE - 1;

/// 将序号格式化为凭证码
///
/// 序号超过 [`MAX_ORDINAL`] 时返回内部错误，绝不输出非字母后缀
pub fn format_code(prefix: &str, ordinal: i64) -> Result<String> {
    let block = ordinal / BLOCK_SIZE;
    let remainder = ordinal % BLOCK_SIZE;

    if block == 0 {
        Ok(format!("{}-{:06}", prefix, ordinal))
    } else if block <= 26 {
        let letter = (b'A' + (block - 1) as u8) as char;
        Ok(format!("{}{}-{:06}", prefix, letter, remainder))
    } else {
        Err(VoucherError::Internal(format!(
            "序号超出段字母容量: prefix={}, ordinal={}",
            prefix, ordinal
        )))
    }
}

/// 从凭证码反解析序号
///
/// 码不属于该前缀或格式不符时返回 None
pub fn parse_ordinal(prefix: &str, code: &str) -> Result<Option<i64>> {
    let pattern = ordinal_pattern(prefix)?;
    Ok(parse_with(&pattern, code))
}

/// 扫描一批凭证码，收集属于该前缀的全部序号
///
/// 供批量发放的扫描式播种使用：正则只编译一次
pub fn scan_ordinals<'a, I>(prefix: &str, codes: I) -> Result<BTreeSet<i64>>
where
    I: IntoIterator<Item = &'a str>,
{
    let pattern = ordinal_pattern(prefix)?;
    Ok(codes
        .into_iter()
        .filter_map(|code| parse_with(&pattern, code))
        .collect())
}

/// 构建该前缀的码格式正则
fn ordinal_pattern(prefix: &str) -> Result<Regex> {
    Regex::new(&format!(
        r"^{}([A-Z])?-(\d{{6}})$",
        regex::escape(prefix)
    ))
    .map_err(|e| VoucherError::Internal(format!("前缀正则构建失败: {}", e)))
}

fn parse_with(pattern: &Regex, code: &str) -> Option<i64> {
    let captures = pattern.captures(code)?;
    let block = match captures.get(1) {
        Some(letter) => (letter.as_str().as_bytes()[0] - b'A') as i64 + 1,
        None => 0,
    };
    let remainder: i64 = captures.get(2)?.as_str().parse().ok()?;
    Some(block * BLOCK_SIZE + remainder)
}
