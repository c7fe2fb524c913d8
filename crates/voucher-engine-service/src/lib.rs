//! 凭证码发放与核销引擎
//!
//! 校园活动平台的凭证码引擎：按需铸造唯一凭证码、支持用户自助领取、
//! 管理端批量发放，以及一次性核销。
//!
//! ## 核心功能
//!
//! - **自助领取**：用户领取 GLOBAL 类型凭证，优先复用池中码，池空时铸造新码
//! - **批量发放**：管理端为指定用户一次性发放多个码，扫描式播种编号
//! - **一次性核销**：持有人核销自己的码，`is_used` 单向翻转，竞争下恰有一人成功
//! - **序列分配**：按前缀严格递增的序号，原子 upsert-and-increment
//! - **码格式化**：序号到码字符串的确定性映射，含百万段字母扩展
//! - **可领取视图**：面向用户的凭证列表，附可领取性与余量
//!
//! ## 不变量
//!
//! - 码字符串全局唯一且永不复用（唯一索引兜底）
//! - 码的持有人一经设置永不改派
//! - `is_used` 只能从 false 翻到 true，核销是终态
//! - 同一前缀的序号严格递增，允许空洞、不回填
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `lifecycle`: 凭证生命周期校验
//! - `codegen`: 凭证码格式化与解析
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层

pub mod codegen;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{Result, VoucherError};
pub use models::*;
pub use repository::{
    SequenceRepository, SequenceRepositoryTrait, VoucherCodeRepository,
    VoucherCodeRepositoryTrait, VoucherRepository, VoucherRepositoryTrait,
};
pub use service::{
    BulkIssueService, ClaimService, ClaimableVoucherDto, RedemptionService, VoucherQueryService,
};
