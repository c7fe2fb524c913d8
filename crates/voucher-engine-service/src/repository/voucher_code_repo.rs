//! 凭证码仓储
//!
//! 提供凭证码的数据访问。写路径的三个关键操作都是单条原子语句：
//!
//! - `assign_pooled_code`：在同一条 UPDATE 中查找一个未领取的池中码并
//!   设置持有人（`FOR UPDATE SKIP LOCKED` 子查询，竞争者各取一行）
//! - `insert_code`：依赖 `code` 列的唯一索引，违反时映射为
//!   `CodeGenerationConflict` 供上层有界重试
//! - `mark_used`：条件更新 `WHERE is_used = false`，竞争下恰有一个
//!   调用方成功，失败方观察到"已核销"

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::VoucherCodeRepositoryTrait;
use crate::error::{Result, VoucherError};
use crate::models::{NewVoucherCode, VoucherCode};

const CODE_COLUMNS: &str =
    "id, code, voucher_id, holder_id, is_used, metadata, created_at, updated_at";

/// 凭证码仓储
pub struct VoucherCodeRepository {
    pool: PgPool,
}

impl VoucherCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 将唯一键冲突映射为可重试的生成冲突错误
    fn map_insert_error(err: sqlx::Error, code: &str) -> VoucherError {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return VoucherError::CodeGenerationConflict {
                    code: code.to_string(),
                };
            }
        }
        VoucherError::Database(err)
    }
}

#[async_trait]
impl VoucherCodeRepositoryTrait for VoucherCodeRepository {
    /// 获取单个凭证码
    async fn get_code(&self, id: i64) -> Result<Option<VoucherCode>> {
        let code = sqlx::query_as::<_, VoucherCode>(&format!(
            "SELECT {} FROM voucher_codes WHERE id = $1",
            CODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    /// 按码字符串查询
    async fn find_by_code(&self, code: &str) -> Result<Option<VoucherCode>> {
        let found = sqlx::query_as::<_, VoucherCode>(&format!(
            "SELECT {} FROM voucher_codes WHERE code = $1",
            CODE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    /// 列出凭证下的全部码（管理端审计用）
    async fn list_codes(&self, voucher_id: i64) -> Result<Vec<VoucherCode>> {
        let codes = sqlx::query_as::<_, VoucherCode>(&format!(
            "SELECT {} FROM voucher_codes WHERE voucher_id = $1 ORDER BY id ASC",
            CODE_COLUMNS
        ))
        .bind(voucher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// 列出指定前缀的全部码字符串
    ///
    /// 供批量发放的扫描式播种使用；LIKE 前缀匹配后由调用方按格式精确过滤
    async fn list_code_strings_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT code FROM voucher_codes
            WHERE code LIKE $1 || '%'
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// 检查用户是否已持有该凭证的码
    async fn exists_claim(&self, user_id: &str, voucher_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM voucher_codes
                WHERE holder_id = $1 AND voucher_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(voucher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 统计凭证已被领取的码数量（有持有人的码）
    async fn count_claimed(&self, voucher_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM voucher_codes
            WHERE voucher_id = $1 AND holder_id IS NOT NULL
            "#,
        )
        .bind(voucher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 统计凭证池中未领取且未核销的码数量
    async fn count_pooled(&self, voucher_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM voucher_codes
            WHERE voucher_id = $1 AND holder_id IS NULL AND is_used = false
            "#,
        )
        .bind(voucher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 检查用户是否已核销过该凭证的码
    async fn has_used_code(&self, user_id: &str, voucher_id: i64) -> Result<bool> {
        let used: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM voucher_codes
                WHERE holder_id = $1 AND voucher_id = $2 AND is_used = true
            )
            "#,
        )
        .bind(user_id)
        .bind(voucher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(used)
    }

    /// 原子领取一个池中码
    ///
    /// 查找与设置持有人在同一条语句内完成。SKIP LOCKED 让并发领取者
    /// 各自跳过已被锁定的行，互不阻塞；无可用码时返回 None
    async fn assign_pooled_code(
        &self,
        voucher_id: i64,
        user_id: &str,
    ) -> Result<Option<VoucherCode>> {
        let assigned = sqlx::query_as::<_, VoucherCode>(&format!(
            r#"
            UPDATE voucher_codes
            SET holder_id = $2, updated_at = NOW()
            WHERE id = (
                SELECT id FROM voucher_codes
                WHERE voucher_id = $1 AND holder_id IS NULL AND is_used = false
                ORDER BY id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            CODE_COLUMNS
        ))
        .bind(voucher_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assigned)
    }

    /// 插入单个新码
    ///
    /// `code` 唯一索引被违反时返回 `CodeGenerationConflict`
    async fn insert_code(&self, new_code: &NewVoucherCode) -> Result<VoucherCode> {
        let inserted = sqlx::query_as::<_, VoucherCode>(&format!(
            r#"
            INSERT INTO voucher_codes (code, voucher_id, holder_id, is_used, metadata,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, false, $4, NOW(), NOW())
            RETURNING {}
            "#,
            CODE_COLUMNS
        ))
        .bind(&new_code.code)
        .bind(new_code.voucher_id)
        .bind(&new_code.holder_id)
        .bind(&new_code.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error(e, &new_code.code))?;

        Ok(inserted)
    }

    /// 在单个事务中批量插入新码
    ///
    /// 任何一条违反唯一索引都会回滚整批
    async fn insert_codes(&self, new_codes: &[NewVoucherCode]) -> Result<Vec<VoucherCode>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(new_codes.len());

        for new_code in new_codes {
            let code = sqlx::query_as::<_, VoucherCode>(&format!(
                r#"
                INSERT INTO voucher_codes (code, voucher_id, holder_id, is_used, metadata,
                                           created_at, updated_at)
                VALUES ($1, $2, $3, false, $4, NOW(), NOW())
                RETURNING {}
                "#,
                CODE_COLUMNS
            ))
            .bind(&new_code.code)
            .bind(new_code.voucher_id)
            .bind(&new_code.holder_id)
            .bind(&new_code.metadata)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| Self::map_insert_error(e, &new_code.code))?;

            inserted.push(code);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// 核销翻转
    ///
    /// 条件更新 `WHERE is_used = false`：返回 None 表示该码已被核销
    /// （本次调用输掉了竞争，或此前已核销）
    async fn mark_used(&self, code_id: i64) -> Result<Option<VoucherCode>> {
        let flipped = sqlx::query_as::<_, VoucherCode>(&format!(
            r#"
            UPDATE voucher_codes
            SET is_used = true, updated_at = NOW()
            WHERE id = $1 AND is_used = false
            RETURNING {}
            "#,
            CODE_COLUMNS
        ))
        .bind(code_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flipped)
    }
}
