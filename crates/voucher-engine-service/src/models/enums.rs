//! 凭证枚举类型定义

use serde::{Deserialize, Serialize};

/// 凭证类型
///
/// 决定凭证码的发放渠道：GLOBAL 允许用户自助领取，
/// PERSONAL 只能通过管理端批量发放
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum VoucherType {
    /// 全局凭证 - 任何用户可自助领取
    #[default]
    Global,
    /// 个人凭证 - 仅通过管理端批量发放
    Personal,
}

impl VoucherType {
    /// 是否支持自助领取
    pub fn is_claimable(&self) -> bool {
        matches!(self, Self::Global)
    }
}

/// 凭证状态
///
/// 控制凭证的可领取性和可核销性
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum VoucherStatus {
    /// 启用 - 正常可用
    #[default]
    Active,
    /// 禁用 - 不可领取、不可核销
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_type_claimable() {
        assert!(VoucherType::Global.is_claimable());
        assert!(!VoucherType::Personal.is_claimable());
    }

    #[test]
    fn test_voucher_type_serde() {
        assert_eq!(
            serde_json::to_string(&VoucherType::Global).unwrap(),
            "\"GLOBAL\""
        );
        assert_eq!(
            serde_json::from_str::<VoucherType>("\"PERSONAL\"").unwrap(),
            VoucherType::Personal
        );
    }

    #[test]
    fn test_voucher_status_serde() {
        assert_eq!(
            serde_json::to_string(&VoucherStatus::Inactive).unwrap(),
            "\"INACTIVE\""
        );
    }
}
