//! 业务服务层
//!
//! 服务对仓储 Trait 泛型，持有 Arc 包装的仓储实例。
//! 写路径（领取、发放、核销）各自独立成服务，只读视图归查询服务

mod bulk_issue_service;
mod claim_service;
mod dto;
mod query_service;
mod redemption_service;

pub use bulk_issue_service::BulkIssueService;
pub use claim_service::ClaimService;
pub use dto::ClaimableVoucherDto;
pub use query_service::VoucherQueryService;
pub use redemption_service::RedemptionService;
