use crate::application::ServiceDependencies;
use crate::domain::{self, LoanId, UserId, commands::*, loan::NewLoan};
use crate::ports::*;

use super::errors::{LoanApplicationError, Result};

/// トランザクション内で失敗した場合にロールバックしてエラーを返すヘルパー関数
///
/// ロールバック自体の失敗はログに残し、元のエラーを優先して返す。
/// （未コミットのトランザクションはドロップ時にも破棄される）
async fn abort<T>(tx: Box<dyn LoanTransaction>, err: LoanApplicationError) -> Result<T> {
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(error = %rollback_err, "Failed to roll back loan transaction");
    }
    Err(err)
}

/// コミット後の貸出ビューを取得するヘルパー関数
async fn load_view(deps: &ServiceDependencies, loan_id: LoanId) -> Result<LoanView> {
    deps.loan_store
        .find_by_id(loan_id)
        .await
        .map_err(LoanApplicationError::StoreFailure)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 1冊確保して貸出を登録する（トランザクション内）
///
/// 在庫の減算は保存済みの値に対する条件付き相対更新のため、
/// 同じ書籍への同時貸出は行ロックで直列化され、確保できなかった側は
/// `BookUnavailable`になる。
async fn reserve_copy(tx: &mut dyn LoanTransaction, new_loan: NewLoan) -> Result<LoanId> {
    let book = tx
        .find_book(new_loan.book_id)
        .await
        .map_err(LoanApplicationError::StoreFailure)?
        .ok_or(LoanApplicationError::BookNotFound)?;

    if !book.has_available_copy() {
        return Err(LoanApplicationError::BookUnavailable);
    }

    let reserved = tx
        .decrement_available(book.id)
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    if !reserved {
        return Err(LoanApplicationError::BookUnavailable);
    }

    let loan = tx
        .insert_loan(new_loan)
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    Ok(loan.id)
}

/// 貸出を返却済みにして1冊戻す（トランザクション内）
///
/// 事前確認の後に別の返却が割り込んだ場合に備えて、行ロックを取って再取得する。
async fn release_copy(tx: &mut dyn LoanTransaction, cmd: &ReturnLoan) -> Result<()> {
    let loan = tx
        .find_loan_for_update(cmd.loan_id)
        .await
        .map_err(LoanApplicationError::StoreFailure)?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    domain::loan::ensure_returnable(loan.user_id, loan.status(), cmd.user_id)?;

    let marked = tx
        .mark_returned(loan.id, cmd.returned_at)
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    if !marked {
        return Err(LoanApplicationError::AlreadyReturned);
    }

    tx.increment_available(loan.book_id)
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    Ok(())
}

/// 書籍を借りる
///
/// ビジネスルール：
/// - 返却予定日が申請時刻より後であること（ストアに触れる前に検証）
/// - 書籍が存在すること
/// - 貸出可能な冊数が1冊以上あること
///
/// # 一貫性保証
///
/// 在庫の減算と貸出記録の登録は1つのトランザクションでコミットされる。
/// どちらかが失敗した場合は両方ロールバックされ、在庫と貸出は変化しない。
///
/// # 戻り値
/// 書籍タイトルと利用者名を含む、作成された貸出のビュー
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<LoanView> {
    // 1. ドメイン層の純粋関数で返却予定日を検証
    let new_loan =
        domain::loan::open_loan(cmd.user_id, cmd.book_id, cmd.return_date, cmd.requested_at)?;

    // 2. トランザクション内で在庫確保と貸出登録
    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    let loan_id = match reserve_copy(tx.as_mut(), new_loan).await {
        Ok(loan_id) => loan_id,
        Err(err) => return abort(tx, err).await,
    };

    tx.commit()
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    // 3. 結合済みのビューを返す
    let view = load_view(deps, loan_id).await?;

    tracing::info!(
        loan_id = %loan_id,
        book_id = %cmd.book_id,
        user_id = %cmd.user_id,
        status = view.status().as_str(),
        "Loan created"
    );

    Ok(view)
}

/// 貸出を1件取得する
///
/// 所有者以外は`AccessDenied`。管理者も例外ではない。
pub async fn get_loan(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    requester: UserId,
) -> Result<LoanView> {
    let view = load_view(deps, loan_id).await?;

    domain::loan::ensure_owner(view.user_id, requester)?;

    Ok(view)
}

/// 利用者の全貸出を取得する
///
/// 貸出がない場合は空のVec（エラーではない）。
pub async fn list_loans_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<LoanView>> {
    deps.loan_store
        .find_by_user_id(user_id)
        .await
        .map_err(LoanApplicationError::StoreFailure)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 貸出が要求者のものであること
/// - 未返却であること
///
/// # 一貫性保証
///
/// 返却済みへの更新と在庫の加算は1つのトランザクションでコミットされる。
/// 同じ貸出への同時返却は片方のみ成功し、在庫は1冊だけ増える。
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<LoanView> {
    // 1. 事前確認（トランザクションを開かずに弾けるものを弾く）
    let current = load_view(deps, cmd.loan_id).await?;
    domain::loan::ensure_returnable(current.user_id, current.status(), cmd.user_id)?;

    // 2. トランザクション内で再確認して返却
    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    if let Err(err) = release_copy(tx.as_mut(), &cmd).await {
        return abort(tx, err).await;
    }

    tx.commit()
        .await
        .map_err(LoanApplicationError::StoreFailure)?;

    let view = load_view(deps, cmd.loan_id).await?;

    tracing::info!(
        loan_id = %cmd.loan_id,
        book_id = %view.book_id,
        user_id = %cmd.user_id,
        status = view.status().as_str(),
        "Loan returned"
    );

    Ok(view)
}
