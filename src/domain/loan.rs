use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanAccessError, LoanId, OpenLoanError, ReturnLoanError, UserId};

/// 貸出ステータス
///
/// 状態遷移は `Open → Returned` の一方向のみ。Returnedは終端状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    /// 貸出中
    Open,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "open",
            LoanStatus::Returned => "returned",
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 不変条件：`is_returned`と`returned_at`は同時に、一度だけ設定される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: DateTime<Utc>,
    /// 返却予定日
    pub return_date: DateTime<Utc>,
    /// 実際の返却日時
    pub returned_at: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        if self.is_returned {
            LoanStatus::Returned
        } else {
            LoanStatus::Open
        }
    }

    /// 純粋関数：返却済みにした新しいLoanを返す
    ///
    /// 副作用なし。永続化はストア側の責務。
    pub fn mark_returned(&self, returned_at: DateTime<Utc>) -> Result<Loan, ReturnLoanError> {
        if self.is_returned {
            return Err(ReturnLoanError::AlreadyReturned);
        }

        Ok(Loan {
            returned_at: Some(returned_at),
            is_returned: true,
            updated_at: returned_at,
            ..self.clone()
        })
    }
}

/// 新規貸出（ID採番前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
}

impl NewLoan {
    /// 採番されたIDで貸出中のLoanを組み立てる
    pub fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            user_id: self.user_id,
            book_id: self.book_id,
            loan_date: self.loan_date,
            return_date: self.return_date,
            returned_at: None,
            is_returned: false,
            created_at: self.loan_date,
            updated_at: self.loan_date,
        }
    }
}

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却予定日は申請時刻より後であること
///
/// 在庫の確認はトランザクション内で行うため、ここでは扱わない。
pub fn open_loan(
    user_id: UserId,
    book_id: BookId,
    return_date: DateTime<Utc>,
    requested_at: DateTime<Utc>,
) -> Result<NewLoan, OpenLoanError> {
    if return_date <= requested_at {
        return Err(OpenLoanError::ReturnDateNotInFuture);
    }

    Ok(NewLoan {
        user_id,
        book_id,
        loan_date: requested_at,
        return_date,
    })
}

/// 純粋関数：貸出の所有者確認
///
/// 管理者であっても他人の貸出は参照できない。
pub fn ensure_owner(owner: UserId, requester: UserId) -> Result<(), LoanAccessError> {
    if owner != requester {
        return Err(LoanAccessError::NotOwner);
    }
    Ok(())
}

/// 純粋関数：返却可能か確認する
///
/// 所有者確認を先に行い、他人の貸出の状態は漏らさない。
pub fn ensure_returnable(
    owner: UserId,
    status: LoanStatus,
    requester: UserId,
) -> Result<(), ReturnLoanError> {
    ensure_owner(owner, requester)?;

    if status.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }
    Ok(())
}
