//! 序列计数器实体定义

use serde::{Deserialize, Serialize};

/// 按前缀维护的序列计数器
///
/// `last_number` 只增不减，分配失败的序号不会被回收（允许空洞）。
/// 计数器行在首次分配时由数据库惰性创建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCounter {
    /// 凭证码前缀（唯一键）
    pub prefix: String,
    /// 最近分配的序号
    pub last_number: i64,
}
