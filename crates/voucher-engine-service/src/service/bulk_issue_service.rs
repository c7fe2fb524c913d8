//! 批量发放服务
//!
//! 管理端为指定用户一次性发放多个凭证码。
//!
//! ## 扫描式播种
//!
//! 批量路径不走序列计数器，而是扫描该前缀下已存在的码，从最大序号
//! 之后连续编号（空洞不回填）。整批在单个事务内插入，任何一条冲突
//! 都回滚整批。扫描与插入之间的并发占用由 `code` 唯一索引兜底。

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::codegen;
use crate::error::{Result, VoucherError};
use crate::lifecycle;
use crate::models::{CodeMetadata, NewVoucherCode, VoucherCode};
use crate::repository::{VoucherCodeRepositoryTrait, VoucherRepositoryTrait};

/// 批量发放服务
pub struct BulkIssueService<VR, CR>
where
    VR: VoucherRepositoryTrait,
    CR: VoucherCodeRepositoryTrait,
{
    voucher_repo: Arc<VR>,
    code_repo: Arc<CR>,
}

impl<VR, CR> BulkIssueService<VR, CR>
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

    /// 为用户批量发放凭证码
    ///
    /// 流程：
    /// 1. 凭证存在且生命周期有效
    /// 2. 扫描该前缀已占用的序号，起始序号取最大序号 + 1
    /// 3. 从起始序号开始连续取 count 个序号
    /// 4. 单事务整批插入，全部成功或全部回滚
    ///
    /// count 为 1 时同样返回单元素列表，调用方无需区分单发与批发
    #[instrument(skip(self), fields(user_id = %user_id, voucher_id = %voucher_id, count = %count))]
    pub async fn issue(
        &self,
        voucher_id: i64,
        user_id: &str,
        count: u32,
    ) -> Result<Vec<VoucherCode>> {
        if count == 0 {
            return Err(VoucherError::Validation(
                "发放数量必须大于 0".to_string(),
            ));
        }

        let voucher = self
            .voucher_repo
            .get_voucher(voucher_id)
            .await?
            .ok_or(VoucherError::VoucherNotFound(voucher_id))?;

        lifecycle::validate_active(&voucher, Utc::now())?;

        // 扫描播种：从该前缀的最大已知序号之后连续编号，空洞不回填
        let existing = self
            .code_repo
            .list_code_strings_by_prefix(&voucher.prefix)
            .await?;
        let taken = codegen::scan_ordinals(
            &voucher.prefix,
            existing.iter().map(String::as_str),
        )?;
        let start = taken.iter().next_back().map_or(1, |max| max + 1);

        let metadata = CodeMetadata::at_issuance(voucher.expiration).to_value()?;

        let new_codes = (start..start + count as i64)
            .map(|ordinal| {
                Ok(NewVoucherCode {
                    code: codegen::format_code(&voucher.prefix, ordinal)?,
                    voucher_id: voucher.id,
                    holder_id: Some(user_id.to_string()),
                    metadata: metadata.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let issued = self.code_repo.insert_codes(&new_codes).await?;

        info!(
            user_id = %user_id,
            voucher_id = %voucher_id,
            count = issued.len(),
            first_code = %issued.first().map(|c| c.code.as_str()).unwrap_or(""),
            "批量发放完成"
        );

        Ok(issued)
    }
}
