/// 貸出開始のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLoanError {
    /// 返却予定日が現在時刻以前
    ReturnDateNotInFuture,
}

/// 貸出参照のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanAccessError {
    /// 他の利用者の貸出
    NotOwner,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 他の利用者の貸出
    NotOwner,
    /// 既に返却済み
    AlreadyReturned,
}

impl From<LoanAccessError> for ReturnLoanError {
    fn from(err: LoanAccessError) -> Self {
        match err {
            LoanAccessError::NotOwner => ReturnLoanError::NotOwner,
        }
    }
}
