//! The financial summary route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{Collection, Expense},
    receipts::ReceiptStore,
    state::AppState,
};

/// The organization's overall financial position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// The sum of all collection amounts.
    pub total_collections: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// Collections minus expenses.
    pub remaining_balance: f64,
    /// The number of collection records.
    pub collection_count: i64,
    /// The number of expense records.
    pub expense_count: i64,
}

/// Compute the collection and expense totals concurrently and derive the
/// remaining balance.
pub async fn get_financial_summary<R: ReceiptStore>(
    State(state): State<AppState<R>>,
) -> Result<Json<FinancialSummary>, Error> {
    let (collection_totals, expense_totals) = tokio::join!(
        async { Collection::total(&state.db_connection().lock().unwrap()) },
        async { Expense::total(&state.db_connection().lock().unwrap()) },
    );
    let collection_totals = collection_totals?;
    let expense_totals = expense_totals?;

    Ok(Json(FinancialSummary {
        total_collections: collection_totals.total_amount,
        total_expenses: expense_totals.total_amount,
        remaining_balance: collection_totals.total_amount - expense_totals.total_amount,
        collection_count: collection_totals.total_count,
        expense_count: expense_totals.total_count,
    }))
}
