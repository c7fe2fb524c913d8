//! 核销服务
//!
//! 处理凭证码的核销（一次性使用）。核销是单向翻转：`is_used` 一旦
//! 置位永不回退，同一个码终生最多核销一次。
//!
//! ## 核销流程
//!
//! 1. 码存在 -> 2. 所属凭证存在且生命周期有效 -> 3. 调用方是持有人
//! 4. 条件更新翻转 is_used，竞争下恰有一个调用方成功

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::error::{Result, VoucherError};
use crate::lifecycle;
use crate::models::VoucherCode;
use crate::repository::{VoucherCodeRepositoryTrait, VoucherRepositoryTrait};

/// 核销服务
pub struct RedemptionService<VR, CR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
{
    voucher_repo: Arc<VR>,
    code_repo: Arc<CR>,
}

impl<VR, CR> RedemptionService<VR, CR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
{
    pub fn new(voucher_repo: Arc<VR>, code_repo: Arc<CR>) -> Self {
        Self {
            voucher_repo,
            code_repo,
        }
    }

    /// 核销凭证码
    ///
    /// 只有持有人本人可以核销。已核销的码无论读取时刻还是条件更新
    /// 时刻被发现，都返回 `AlreadyUsed`
    #[instrument(skip(self), fields(user_id = %user_id, code_id = %code_id))]
    pub async fn redeem(&self, user_id: &str, code_id: i64) -> Result<VoucherCode> {
        // 1. 码存在
        let code = self
            .code_repo
            .get_code(code_id)
            .await?
            .ok_or(VoucherError::CodeNotFound(code_id))?;

        // 2. 所属凭证存在且可用
        let voucher = self
            .voucher_repo
            .get_voucher(code.voucher_id)
            .await?
            .ok_or(VoucherError::VoucherNotFound(code.voucher_id))?;

        lifecycle::validate_active(&voucher, Utc::now())?;

        // 3. 持有人校验
        if !code.is_held_by(user_id) {
            return Err(VoucherError::NotOwner { code_id });
        }

        // 4. 读取时已核销：快速失败
        if code.is_used {
            return Err(VoucherError::AlreadyUsed(code_id));
        }

        // 5. 条件翻转；None 表示读取之后到更新之前被他处核销了
        let Some(redeemed) = self.code_repo.mark_used(code_id).await? else {
            warn!(code_id = %code_id, "核销竞争失败，码已被核销");
            return Err(VoucherError::AlreadyUsed(code_id));
        };

        info!(
            user_id = %user_id,
            code = %redeemed.code,
            voucher_id = %redeemed.voucher_id,
            "核销成功"
        );

        Ok(redeemed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Voucher, VoucherStatus, VoucherType};
    use crate::repository::{MockVoucherCodeRepositoryTrait, MockVoucherRepositoryTrait};
    use chrono::Duration;

    fn test_voucher(id: i64) -> Voucher {
        Voucher {
            id,
            name: "Summer Discount".to_string(),
            discount: 20,
            prefix: "SUM".to_string(),
            voucher_type: VoucherType::Global,
            status: VoucherStatus::Active,
            expiration: Utc::now() + Duration::days(7),
            max_claims: None,
            sponsor_id: None,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_code(id: i64, holder: Option<&str>, is_used: bool) -> VoucherCode {
        VoucherCode {
            id,
            code: "SUM-000001".to_string(),
            voucher_id: 1,
            holder_id: holder.map(str::to_string),
            is_used,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_redeem_success() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, Some("user-1"), false))));
        code_repo.expect_mark_used().returning(|id| {
            let mut code = test_code(id, Some("user-1"), true);
            code.is_used = true;
            Ok(Some(code))
        });

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo
            .expect_get_voucher()
            .returning(|id| Ok(Some(test_voucher(id))));

        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let redeemed = svc.redeem("user-1", 10).await.unwrap();
        assert!(redeemed.is_used);
    }

    #[tokio::test]
    async fn test_redeem_code_not_found() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo.expect_get_code().returning(|_| Ok(None));

        let svc = RedemptionService::new(
            Arc::new(MockVoucherRepositoryTrait::new()),
            Arc::new(code_repo),
        );

        let err = svc.redeem("user-1", 99).await.unwrap_err();
        assert!(matches!(err, VoucherError::CodeNotFound(99)));
    }

    #[tokio::test]
    async fn test_redeem_not_owner() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, Some("user-1"), false))));

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo
            .expect_get_voucher()
            .returning(|id| Ok(Some(test_voucher(id))));

        // mark_used 未设置期望：持有人校验失败后不应发生任何变更
        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let err = svc.redeem("user-2", 10).await.unwrap_err();
        assert!(matches!(err, VoucherError::NotOwner { code_id: 10 }));
    }

    #[tokio::test]
    async fn test_redeem_unclaimed_code_rejected() {
        // 池中未领取的码没有持有人，任何人核销都是 NotOwner
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, None, false))));

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo
            .expect_get_voucher()
            .returning(|id| Ok(Some(test_voucher(id))));

        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let err = svc.redeem("user-1", 10).await.unwrap_err();
        assert!(matches!(err, VoucherError::NotOwner { .. }));
    }

    #[tokio::test]
    async fn test_redeem_already_used_fast_path() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, Some("user-1"), true))));

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo
            .expect_get_voucher()
            .returning(|id| Ok(Some(test_voucher(id))));

        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let err = svc.redeem("user-1", 10).await.unwrap_err();
        assert!(matches!(err, VoucherError::AlreadyUsed(10)));
    }

    #[tokio::test]
    async fn test_redeem_race_loser_gets_already_used() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, Some("user-1"), false))));
        // 读取时未核销，条件更新时已被他处翻转
        code_repo.expect_mark_used().returning(|_| Ok(None));

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo
            .expect_get_voucher()
            .returning(|id| Ok(Some(test_voucher(id))));

        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let err = svc.redeem("user-1", 10).await.unwrap_err();
        assert!(matches!(err, VoucherError::AlreadyUsed(10)));
    }

    #[tokio::test]
    async fn test_redeem_expired_voucher_rejected() {
        let mut code_repo = MockVoucherCodeRepositoryTrait::new();
        code_repo
            .expect_get_code()
            .returning(|id| Ok(Some(test_code(id, Some("user-1"), false))));

        let mut voucher_repo = MockVoucherRepositoryTrait::new();
        voucher_repo.expect_get_voucher().returning(|id| {
            let mut voucher = test_voucher(id);
            voucher.expiration = Utc::now() - Duration::hours(1);
            Ok(Some(voucher))
        });

        let svc = RedemptionService::new(Arc::new(voucher_repo), Arc::new(code_repo));

        let err = svc.redeem("user-1", 10).await.unwrap_err();
        assert!(matches!(err, VoucherError::VoucherExpired(1)));
    }
}
