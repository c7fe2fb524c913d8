//! 自助领取服务
//!
//! 处理用户自助领取凭证码的核心业务逻辑。
//!
//! ## 领取流程
//!
//! 1. 凭证存在 -> 2. 生命周期校验 -> 3. 类型允许自助领取
//! 4. 未重复领取 -> 5. 未达领取上限 -> 6. 优先复用池中码 -> 7. 铸造新码
//!
//! ## 并发控制策略
//!
//! - 资格检查（重复领取、领取上限）是 check-then-act，竞争下尽力而为
//! - 码字符串唯一性是硬保证：序列分配器 + 唯一索引兜底
//! - 铸码撞上唯一索引时消耗新序号重试，最多 3 次尝试后向调用方
//!   透出可重试的 `CodeGenerationConflict`

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};

use voucher_shared::retry::{RetryPolicy, retry_with_policy};

use crate::codegen;
use crate::error::{Result, VoucherError};
use crate::lifecycle;
use crate::models::{CodeMetadata, NewVoucherCode, Voucher, VoucherCode};
use crate::repository::{
    SequenceRepositoryTrait, VoucherCodeRepositoryTrait, VoucherRepositoryTrait,
};

/// 铸码最大尝试次数（首次 + 重试）
const MAX_MINT_ATTEMPTS: u32 = 3;

/// 自助领取服务
///
/// 每次成功调用恰好创建或改派一行凭证码
pub struct ClaimService<VR, CR, SR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
    SR: SequenceRepositoryTrait,
{
    voucher_repo: Arc<VR>,
    code_repo: Arc<CR>,
    sequence_repo: Arc<SR>,
    mint_retry_policy: RetryPolicy,
}

impl<VR, CR, SR> ClaimService<VR, CR, SR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
    SR: SequenceRepositoryTrait,
{
    pub fn new(voucher_repo: Arc<VR>, code_repo: Arc<CR>, sequence_repo: Arc<SR>) -> Self {
        Self {
            voucher_repo,
            code_repo,
            sequence_repo,
            // 铸码冲突是行级瞬时竞争，退避保持在毫秒级即可
            mint_retry_policy: RetryPolicy {
                max_retries: MAX_MINT_ATTEMPTS - 1,
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                multiplier: 2.0,
            },
        }
    }

    /// 覆盖铸码重试策略（测试用）
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.mint_retry_policy = policy;
        self
    }

    /// 用户自助领取凭证码
    ///
    /// 所有前置校验通过之前不发生任何变更。分配顺序：
    /// 先尝试原子改派一个池中未领取的码，池空时才铸造新码
    #[instrument(skip(self), fields(user_id = %user_id, voucher_id = %voucher_id))]
    pub async fn claim(&self, user_id: &str, voucher_id: i64) -> Result<VoucherCode> {
        // 1. 凭证存在
        let voucher = self
            .voucher_repo
            .get_voucher(voucher_id)
            .await?
            .ok_or(VoucherError::VoucherNotFound(voucher_id))?;

        // 2. 生命周期校验
        lifecycle::validate_active(&voucher, Utc::now())?;

        // 3. 仅 GLOBAL 类型支持自助领取
        if !voucher.voucher_type.is_claimable() {
            return Err(VoucherError::ClaimNotAllowed(voucher_id));
        }

        // 4. 重复领取检查
        if self.code_repo.exists_claim(user_id, voucher_id).await? {
            return Err(VoucherError::DuplicateClaim {
                user_id: user_id.to_string(),
                voucher_id,
            });
        }

        // 5. 领取上限检查
        if let Some(max_claims) = voucher.max_claims {
            let claimed = self.code_repo.count_claimed(voucher_id).await?;
            if claimed >= max_claims as i64 {
                return Err(VoucherError::MaxClaimsReached {
                    voucher_id,
                    max_claims,
                });
            }
        }

        // 6. 优先复用池中码：查找与设置持有人是同一条原子更新
        if let Some(code) = self.code_repo.assign_pooled_code(voucher_id, user_id).await? {
            info!(
                user_id = %user_id,
                voucher_id = %voucher_id,
                code = %code.code,
                "领取成功（复用池中码）"
            );
            return Ok(code);
        }

        // 7. 池空，铸造新码
        let minted = self.mint_code(&voucher, user_id).await?;

        info!(
            user_id = %user_id,
            voucher_id = %voucher_id,
            code = %minted.code,
            "领取成功（铸造新码）"
        );

        Ok(minted)
    }

    /// 铸造新码（有界重试）
    ///
    /// 每次尝试都分配一个新序号；插入撞上唯一索引时该序号永久作废，
    /// 用新序号再试。仅生成冲突会被重试，其余错误原样透出
    async fn mint_code(&self, voucher: &Voucher, user_id: &str) -> Result<VoucherCode> {
        let metadata = CodeMetadata::at_issuance(voucher.expiration).to_value()?;

        retry_with_policy(
            &self.mint_retry_policy,
            "mint_voucher_code",
            |e: &VoucherError| matches!(e, VoucherError::CodeGenerationConflict { .. }),
            || {
                let metadata = metadata.clone();
                async move {
                    let ordinal = self.sequence_repo.next_ordinal(&voucher.prefix).await?;
                    let new_code = NewVoucherCode {
                        code: codegen::format_code(&voucher.prefix, ordinal)?,
                        voucher_id: voucher.id,
                        holder_id: Some(user_id.to_string()),
                        metadata,
                    };
                    self.code_repo.insert_code(&new_code).await
                }
            },
        )
        .await
    }
}
