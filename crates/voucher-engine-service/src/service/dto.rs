//! 服务层数据传输对象

use serde::{Deserialize, Serialize};

use crate::models::Voucher;

/// 凭证可领取性视图
///
/// 面向用户的凭证列表项：该用户是否已领取、池中余量、是否可领
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimableVoucherDto {
    /// 凭证定义
    pub voucher: Voucher,
    /// 凭证类型是否支持自助领取
    pub is_claimable: bool,
    /// 该用户是否已持有此凭证的码
    pub user_has: bool,
    /// 可用数量（自助类型为 0/1，定向类型为池中余量）
    pub available_count: i64,
    /// 是否已过期
    pub expired: bool,
    /// 该用户当前是否可领取
    pub can_claim: bool,
}
