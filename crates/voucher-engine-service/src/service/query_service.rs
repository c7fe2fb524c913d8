//! 凭证查询服务
//!
//! 面向用户与管理端的只读视图。查询结果是时点快照，
//! 不承诺与并发写入严格一致

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use super::dto::ClaimableVoucherDto;
use crate::error::Result;
use crate::models::{Voucher, VoucherCode, VoucherStatus, VoucherType};
use crate::repository::{VoucherCodeRepositoryTrait, VoucherRepositoryTrait};

/// 凭证查询服务
pub struct VoucherQueryService<VR, CR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
{
    voucher_repo: Arc<VR>,
    code_repo: Arc<CR>,
}

impl<VR, CR> VoucherQueryService<VR, CR>
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

    /// 列出全部凭证及该用户的可领取性
    ///
    /// 每张凭证附带：是否过期、该用户是否已持有、可用数量、能否领取。
    /// 自助类型的可用数量按用户视角给出（已持有为 0，否则为 1）；
    /// 定向类型给出池中余量
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_claimable(&self, user_id: &str) -> Result<Vec<ClaimableVoucherDto>> {
        let vouchers = self.voucher_repo.list_vouchers().await?;
        let now = Utc::now();

        let mut result = Vec::with_capacity(vouchers.len());
        for voucher in vouchers {
            result.push(self.claimable_view(voucher, user_id, now).await?);
        }

        Ok(result)
    }

    async fn claimable_view(
        &self,
        voucher: Voucher,
        user_id: &str,
        now: chrono::DateTime<Utc>,
    ) -> Result<ClaimableVoucherDto> {
        let expired = voucher.is_expired(now);
        let is_claimable = voucher.voucher_type.is_claimable();
        let user_has = self.code_repo.exists_claim(user_id, voucher.id).await?;

        let available_count = match voucher.voucher_type {
            // 自助类型按需铸码，数量就是"该用户还能领几个"
            VoucherType::Global => i64::from(!user_has),
            // 定向类型只能消耗池中预生成的码
            VoucherType::Personal => self.code_repo.count_pooled(voucher.id).await?,
        };

        let can_claim =
            is_claimable && !user_has && !expired && voucher.status == VoucherStatus::Active;

        Ok(ClaimableVoucherDto {
            voucher,
            is_claimable,
            user_has,
            available_count,
            expired,
            can_claim,
        })
    }

    /// 检查用户是否已核销过该凭证的码
    pub async fn has_used_code(&self, user_id: &str, voucher_id: i64) -> Result<bool> {
        self.code_repo.has_used_code(user_id, voucher_id).await
    }

    /// 按码字符串查询
    pub async fn find_by_code(&self, code: &str) -> Result<Option<VoucherCode>> {
        self.code_repo.find_by_code(code).await
    }

    /// 列出凭证下的全部码（管理端审计用）
    pub async fn list_codes(&self, voucher_id: i64) -> Result<Vec<VoucherCode>> {
        self.code_repo.list_codes(voucher_id).await
    }
}
