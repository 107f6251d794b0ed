use serde::{Deserialize, Serialize};
use std::fmt;

/// 貸出ID - 貸出記録の識別子（DB採番）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(i64);

impl LoanId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 書籍ID - カタログ上の書籍の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 利用者ID - 認証済みの利用者を指す
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 所蔵冊数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// 1冊未満は登録できない
    NotPositive,
}

/// 所蔵冊数
///
/// 不変条件：1冊以上。
/// 0冊の書籍は貸出対象にならないため、型で排除する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(QuantityError::NotPositive);
        }
        Ok(Self(value))
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityError::NotPositive => write!(f, "quantity must be at least 1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_try_from_valid() {
        let quantity = Quantity::try_from(1);
        assert!(quantity.is_ok());
        assert_eq!(quantity.unwrap().value(), 1);

        let quantity = Quantity::try_from(42);
        assert_eq!(quantity.unwrap().value(), 42);
    }

    #[test]
    fn test_quantity_try_from_invalid() {
        assert_eq!(Quantity::try_from(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::try_from(-3), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_ids_roundtrip_value() {
        assert_eq!(LoanId::from_i64(7).value(), 7);
        assert_eq!(BookId::from_i64(8).value(), 8);
        assert_eq!(UserId::from_i64(9).value(), 9);
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&BookId::from_i64(12)).unwrap();
        assert_eq!(json, "12");
    }
}
