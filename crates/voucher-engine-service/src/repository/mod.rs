//! 数据库仓储层
//!
//! 所有可变状态都在数据库中，进程内不保存任何跨调用状态。
//! 并发协调完全委托给数据库的原子操作

mod sequence_repo;
mod traits;
mod voucher_code_repo;
mod voucher_repo;

pub use sequence_repo::SequenceRepository;
pub use traits::{SequenceRepositoryTrait, VoucherCodeRepositoryTrait, VoucherRepositoryTrait};
pub use voucher_code_repo::VoucherCodeRepository;
pub use voucher_repo::VoucherRepository;

#[cfg(test)]
pub use traits::{
    MockSequenceRepositoryTrait, MockVoucherCodeRepositoryTrait, MockVoucherRepositoryTrait,
};
