pub mod book_store;
pub mod loan_store;
pub mod unit_of_work;
pub mod user_store;

pub use book_store::BookAvailabilityStore;
pub use loan_store::{LoanRecordStore, LoanView};
pub use unit_of_work::{LoanTransaction, UnitOfWork};
pub use user_store::UserStore;

/// 削除操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// 貸出記録から参照されているため削除しなかった
    Referenced,
}
