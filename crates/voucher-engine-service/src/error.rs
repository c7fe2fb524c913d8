//! 凭证引擎错误类型
//!
//! 定义服务层的业务错误和系统错误。业务错误是终态、不重试、
//! 原样透出给调用方；仅凭证码生成冲突属于瞬时错误，引擎内部有界重试

use thiserror::Error;

/// 凭证引擎错误类型
#[derive(Debug, Error)]
pub enum VoucherError {
    // === 凭证相关错误 ===
    #[error("凭证不存在: {0}")]
    VoucherNotFound(i64),

    #[error("凭证已禁用: {0}")]
    VoucherInactive(i64),

    #[error("凭证已过期: {0}")]
    VoucherExpired(i64),

    // === 领取相关错误 ===
    #[error("该类型凭证不支持自助领取: voucher_id={0}")]
    ClaimNotAllowed(i64),

    #[error("用户已领取过该凭证: user_id={user_id}, voucher_id={voucher_id}")]
    DuplicateClaim { user_id: String, voucher_id: i64 },

    #[error("凭证领取数量已达上限: voucher_id={voucher_id}, 上限 {max_claims}")]
    MaxClaimsReached { voucher_id: i64, max_claims: i32 },

    #[error("凭证码生成冲突: {code}")]
    CodeGenerationConflict { code: String },

    // === 核销相关错误 ===
    #[error("凭证码不存在: {0}")]
    CodeNotFound(i64),

    #[error("凭证码不属于该用户: code_id={code_id}")]
    NotOwner { code_id: i64 },

    #[error("凭证码已被核销: {0}")]
    AlreadyUsed(i64),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error("参数校验失败: {0}")]
    Validation(String),
}

/// 凭证引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, VoucherError>;

impl VoucherError {
    /// 检查是否为可重试的错误
    ///
    /// 只有瞬时竞争类错误可以从头重试整个操作
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::CodeGenerationConflict { .. }
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::Serialization(_)
                | Self::Internal(_)
                | Self::CodeGenerationConflict { .. }
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherInactive(_) => "VOUCHER_INACTIVE",
            Self::VoucherExpired(_) => "VOUCHER_EXPIRED",
            Self::ClaimNotAllowed(_) => "CLAIM_NOT_ALLOWED",
            Self::DuplicateClaim { .. } => "DUPLICATE_CLAIM",
            Self::MaxClaimsReached { .. } => "MAX_CLAIMS_REACHED",
            Self::CodeGenerationConflict { .. } => "CODE_GENERATION_CONFLICT",
            Self::CodeNotFound(_) => "CODE_NOT_FOUND",
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::AlreadyUsed(_) => "ALREADY_USED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
