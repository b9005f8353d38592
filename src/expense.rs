//! The route handlers for expense records.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseUpdate, NewExpense, Totals, parse_amount, timestamp_now},
    receipts::{
        ReceiptFolder, ReceiptStore, delete_remote_receipt,
        form::ReceiptForm,
    },
    state::AppState,
};

/// List all expense records, most recent first.
pub async fn get_expenses<R: ReceiptStore>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Expense>>, Error> {
    let expenses = Expense::select_all(&state.db_connection().lock().unwrap())?;

    Ok(Json(expenses))
}

/// Get the grouped sum and count over all expense records.
pub async fn get_expense_total<R: ReceiptStore>(
    State(state): State<AppState<R>>,
) -> Result<Json<Totals>, Error> {
    let totals = Expense::total(&state.db_connection().lock().unwrap())?;

    Ok(Json(totals))
}

/// Create an expense record from a multipart form with an optional receipt.
///
/// Like collection creation, fields are validated before the receipt upload.
pub async fn create_expense<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let form = ReceiptForm::read(&mut multipart).await?;

    let amount = parse_amount(form.require("amount")?)?;
    let description = form.require("description")?.to_owned();
    let purpose = form.require("purpose")?.to_owned();
    let spent_by = form.require("spentBy")?.to_owned();

    let receipt_url = match &form.receipt {
        Some(file) => Some(
            state
                .receipt_store()
                .upload(ReceiptFolder::Expenses, file)
                .await
                .map_err(|error| Error::RemoteStoreError(error.to_string()))?,
        ),
        None => None,
    };

    let expense = NewExpense {
        amount,
        description,
        purpose,
        spent_by,
        receipt_url,
        date: timestamp_now(),
    }
    .insert(&state.db_connection().lock().unwrap())?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// Replace an expense record's fields, optionally swapping its receipt.
///
/// When a new receipt is attached, the old remote file is deleted
/// best-effort only after the new upload succeeds; without one the existing
/// URL is kept.
pub async fn update_expense<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    Path(expense_id): Path<DatabaseID>,
    mut multipart: Multipart,
) -> Result<Json<Expense>, Error> {
    let existing = {
        let connection = state.db_connection().lock().unwrap();
        Expense::select(expense_id, &connection)?
    };

    let form = ReceiptForm::read(&mut multipart).await?;

    let amount = parse_amount(form.require("amount")?)?;
    let description = form.require("description")?.to_owned();
    let purpose = form.require("purpose")?.to_owned();
    let spent_by = form.require("spentBy")?.to_owned();

    let receipt_url = match &form.receipt {
        Some(file) => {
            let new_url = state
                .receipt_store()
                .upload(ReceiptFolder::Expenses, file)
                .await
                .map_err(|error| Error::RemoteStoreError(error.to_string()))?;

            if let Some(old_url) = &existing.receipt_url {
                delete_remote_receipt(state.receipt_store(), old_url).await;
            }

            Some(new_url)
        }
        None => existing.receipt_url,
    };

    let updated = ExpenseUpdate {
        amount,
        description,
        purpose,
        spent_by,
        receipt_url,
    }
    .apply(expense_id, &state.db_connection().lock().unwrap())?;

    Ok(Json(updated))
}

/// Delete an expense record and, best-effort, its remote receipt.
pub async fn delete_expense<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    Path(expense_id): Path<DatabaseID>,
) -> Result<Json<Value>, Error> {
    let expense = {
        let connection = state.db_connection().lock().unwrap();
        Expense::select(expense_id, &connection)?
    };

    if let Some(receipt_url) = &expense.receipt_url {
        delete_remote_receipt(state.receipt_store(), receipt_url).await;
    }

    Expense::delete(expense_id, &state.db_connection().lock().unwrap())?;

    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}
