//! 序列计数器仓储
//!
//! 按前缀分配严格递增的序号。计数器是同一前缀下铸码的唯一串行化点，
//! 分配必须是单条不可分割的数据库操作，绝不能读取后再写回

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::SequenceRepositoryTrait;
use crate::error::Result;
use crate::models::SequenceCounter;

/// 序列计数器仓储
pub struct SequenceRepository {
    pool: PgPool,
}

impl SequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepositoryTrait for SequenceRepository {
    /// 分配下一个序号
    ///
    /// 单条 upsert-and-increment 语句：计数器不存在时创建并返回 1，
    /// 存在时自增并返回新值。任意并发下同一前缀不会返回重复序号。
    /// 调用方分配后中止的序号永久作废，不会被复用（允许空洞）
    async fn next_ordinal(&self, prefix: &str) -> Result<i64> {
        let ordinal: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO voucher_code_sequences (prefix, last_number)
            VALUES ($1, 1)
            ON CONFLICT (prefix)
            DO UPDATE SET last_number = voucher_code_sequences.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(ordinal)
    }

    /// 读取计数器当前值（诊断用，不参与分配）
    async fn get_counter(&self, prefix: &str) -> Result<Option<SequenceCounter>> {
        let counter = sqlx::query_as::<_, SequenceCounter>(
            r#"
            SELECT prefix, last_number
            FROM voucher_code_sequences
            WHERE prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(counter)
    }
}
