//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewVoucherCode, SequenceCounter, Voucher, VoucherCode};

/// 凭证仓储接口
///
/// 凭证由外部管理端维护，本引擎只读
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherRepositoryTrait: Send + Sync {
    async fn get_voucher(&self, id: i64) -> Result<Option<Voucher>>;
    async fn list_vouchers(&self) -> Result<Vec<Voucher>>;
}

/// 凭证码仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherCodeRepositoryTrait: Send + Sync {
    // 查询
    async fn get_code(&self, id: i64) -> Result<Option<VoucherCode>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<VoucherCode>>;
    async fn list_codes(&self, voucher_id: i64) -> Result<Vec<VoucherCode>>;
    async fn list_code_strings_by_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    // 领取资格检查（check-then-act，竞争下尽力而为）
    async fn exists_claim(&self, user_id: &str, voucher_id: i64) -> Result<bool>;
    async fn count_claimed(&self, voucher_id: i64) -> Result<i64>;
    async fn count_pooled(&self, voucher_id: i64) -> Result<i64>;
    async fn has_used_code(&self, user_id: &str, voucher_id: i64) -> Result<bool>;

    // 写路径（原子操作）
    async fn assign_pooled_code(
        &self,
        voucher_id: i64,
        user_id: &str,
    ) -> Result<Option<VoucherCode>>;
    async fn insert_code(&self, new_code: &NewVoucherCode) -> Result<VoucherCode>;
    async fn insert_codes(&self, new_codes: &[NewVoucherCode]) -> Result<Vec<VoucherCode>>;
    async fn mark_used(&self, code_id: i64) -> Result<Option<VoucherCode>>;
}

/// 序列计数器仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SequenceRepositoryTrait: Send + Sync {
    async fn next_ordinal(&self, prefix: &str) -> Result<i64>;
    async fn get_counter(&self, prefix: &str) -> Result<Option<SequenceCounter>>;
}
