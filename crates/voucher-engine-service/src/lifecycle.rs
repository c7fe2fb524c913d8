//! 凭证生命周期校验
//!
//! 纯函数校验，无副作用。领取和核销两条写路径在任何变更之前
//! 都必须先通过此校验

use chrono::{DateTime, Utc};

use crate::error::{Result, VoucherError};
use crate::models::{Voucher, VoucherStatus};

/// 校验凭证是否可用
///
/// 过期检查先于状态检查：一张已过期又被禁用的凭证报告过期
pub fn validate_active(voucher: &Voucher, now: DateTime<Utc>) -> Result<()> {
    if voucher.is_expired(now) {
        return Err(VoucherError::VoucherExpired(voucher.id));
    }
    if voucher.status != VoucherStatus::Active {
        return Err(VoucherError::VoucherInactive(voucher.id));
    }
    Ok(())
}
