pub mod account;
pub mod catalog;
pub mod loan;

use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、各アプリケーション関数に引数として渡す。
/// 本番ではPostgreSQLアダプター、テストではインメモリアダプターを差し込む。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub book_store: Arc<dyn BookAvailabilityStore>,
    pub loan_store: Arc<dyn LoanRecordStore>,
    pub user_store: Arc<dyn UserStore>,
}
