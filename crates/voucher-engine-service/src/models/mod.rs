//! 领域模型定义
//!
//! 包含凭证、凭证码、序列计数器等核心实体

mod enums;
mod sequence;
mod voucher;
mod voucher_code;

pub use enums::{VoucherStatus, VoucherType};
pub use sequence::SequenceCounter;
pub use voucher::Voucher;
pub use voucher_code::{CodeMetadata, CodeState, NewVoucherCode, VoucherCode};
