//! 凭证码实体定义
//!
//! 凭证码是凭证的一次可核销实例，由全局唯一的字符串标识。
//! 状态机：未领取（holder 为空）-> 已领取 -> 已核销，已核销为终态

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 凭证码状态
///
/// 由 holder 与 is_used 两个字段推导，不单独持久化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeState {
    /// 未领取 - 池中预生成、尚无持有人
    Unclaimed,
    /// 已领取 - 有持有人，尚未核销
    Claimed,
    /// 已核销 - 终态
    Used,
}

/// 凭证码
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VoucherCode {
    pub id: i64,
    /// 凭证码字符串（全局唯一）
    pub code: String,
    /// 所属凭证 ID
    pub voucher_id: i64,
    /// 持有人 ID（None 表示未领取）
    #[sqlx(default)]
    pub holder_id: Option<String>,
    /// 是否已核销
    pub is_used: bool,
    /// 发放时刻的元数据快照（如当时的过期时间）
    #[sqlx(default)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VoucherCode {
    /// 推导当前状态
    pub fn state(&self) -> CodeState {
        if self.is_used {
            CodeState::Used
        } else if self.holder_id.is_some() {
            CodeState::Claimed
        } else {
            CodeState::Unclaimed
        }
    }

    /// 检查是否由指定用户持有
    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.holder_id.as_deref() == Some(user_id)
    }

    /// 解析元数据快照
    pub fn parse_metadata(&self) -> Result<Option<CodeMetadata>, serde_json::Error> {
        self.metadata
            .clone()
            .map(serde_json::from_value)
            .transpose()
    }
}

/// 发放时刻的元数据快照
///
/// 固化凭证在发放那一刻的关键属性，凭证后续被修改不影响已发放的码
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetadata {
    /// 发放时凭证的过期时间
    pub expiration: DateTime<Utc>,
}

impl CodeMetadata {
    /// 构造发放时刻的快照
    pub fn at_issuance(expiration: DateTime<Utc>) -> Self {
        Self { expiration }
    }

    /// 序列化为 JSON 值（用于入库）
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// 待插入的凭证码
///
/// 入库前的新码，id 与时间戳由数据库生成
#[derive(Debug, Clone)]
pub struct NewVoucherCode {
    pub code: String,
    pub voucher_id: i64,
    pub holder_id: Option<String>,
    pub metadata: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_code() -> VoucherCode {
        VoucherCode {
            id: 1,
            code: "SUM-000001".to_string(),
            voucher_id: 1,
            holder_id: None,
            is_used: false,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_code_state_machine() {
        let mut code = create_test_code();
        assert_eq!(code.state(), CodeState::Unclaimed);

        code.holder_id = Some("user-123".to_string());
        assert_eq!(code.state(), CodeState::Claimed);

        code.is_used = true;
        assert_eq!(code.state(), CodeState::Used);
    }

    #[test]
    fn test_is_held_by() {
        let mut code = create_test_code();
        assert!(!code.is_held_by("user-123"));

        code.holder_id = Some("user-123".to_string());
        assert!(code.is_held_by("user-123"));
        assert!(!code.is_held_by("user-456"));
    }

    #[test]
    fn test_metadata_snapshot_roundtrip() {
        let expiration = Utc::now();
        let snapshot = CodeMetadata::at_issuance(expiration);
        let value = snapshot.to_value().unwrap();

        let mut code = create_test_code();
        code.metadata = Some(value);

        let parsed = code.parse_metadata().unwrap().unwrap();
        assert_eq!(parsed.expiration, expiration);
    }

    #[test]
    fn test_parse_metadata_absent() {
        let code = create_test_code();
        assert!(code.parse_metadata().unwrap().is_none());
    }

    #[test]
    fn test_parse_metadata_malformed() {
        let mut code = create_test_code();
        code.metadata = Some(json!({"expiration": "not-a-date"}));
        assert!(code.parse_metadata().is_err());
    }
}
