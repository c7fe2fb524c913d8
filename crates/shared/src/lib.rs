//! 共享库
//!
//! 包含凭证系统各组件共用的配置、错误处理、数据库连接、
//! 重试执行器等基础设施代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
pub mod retry;
pub mod test_utils;
