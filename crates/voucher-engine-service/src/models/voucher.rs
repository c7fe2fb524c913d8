//! 凭证实体定义
//!
//! 凭证由外部管理端创建和维护，本引擎只读消费

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{VoucherStatus, VoucherType};

/// 凭证定义
///
/// 描述一张优惠凭证的领取策略：类型（自助/定向）、有效期、领取上限。
/// 凭证码的生成以 `prefix` 作为前缀
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: i64,
    /// 凭证名称
    pub name: String,
    /// 折扣力度（百分比）
    pub discount: i32,
    /// 凭证码前缀（短缩写，如 "SUM"）
    pub prefix: String,
    /// 凭证类型
    pub voucher_type: VoucherType,
    /// 凭证状态
    pub status: VoucherStatus,
    /// 过期时间
    pub expiration: DateTime<Utc>,
    /// 领取上限（None 表示不限量）
    #[sqlx(default)]
    pub max_claims: Option<i32>,
    /// 赞助方 ID
    #[sqlx(default)]
    pub sponsor_id: Option<i64>,
    /// 自由格式元数据
    #[sqlx(default)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// 检查是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration
    }

    /// 检查是否设置了领取上限
    pub fn has_claim_limit(&self) -> bool {
        self.max_claims.is_some()
    }
}
