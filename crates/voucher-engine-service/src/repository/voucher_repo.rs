//! 凭证仓储
//!
//! 提供凭证定义的只读数据访问

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::VoucherRepositoryTrait;
use crate::error::Result;
use crate::models::Voucher;

/// 凭证仓储
pub struct VoucherRepository {
    pool: PgPool,
}

impl VoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoucherRepositoryTrait for VoucherRepository {
    /// 获取单个凭证
    async fn get_voucher(&self, id: i64) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            SELECT id, name, discount, prefix, voucher_type, status, expiration,
                   max_claims, sponsor_id, metadata, created_at, updated_at
            FROM vouchers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 列出所有凭证
    ///
    /// 供可领取性查询使用，过期/禁用过滤由服务层完成
    async fn list_vouchers(&self) -> Result<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(
            r#"
            SELECT id, name, discount, prefix, voucher_type, status, expiration,
                   max_claims, sponsor_id, metadata, created_at, updated_at
            FROM vouchers
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }
}
