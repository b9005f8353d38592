//! The endpoints (paths) for the application's routes.

/// The liveness route.
pub const ROOT: &str = "/";

/// The login route.
pub const LOG_IN: &str = "/api/auth/login";

/// List (GET) and create (POST) collection records.
pub const COLLECTIONS: &str = "/api/collections";

/// The grouped total over all collection records.
pub const COLLECTION_TOTAL: &str = "/api/collections/total";

/// Delete (DELETE) a single collection record.
pub const COLLECTION: &str = "/api/collections/{collection_id}";

/// List (GET) and create (POST) expense records.
pub const EXPENSES: &str = "/api/expenses";

/// The grouped total over all expense records.
pub const EXPENSE_TOTAL: &str = "/api/expenses/total";

/// Update (PUT) and delete (DELETE) a single expense record.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";

/// The combined financial summary.
pub const FINANCIAL_SUMMARY: &str = "/api/financialSummary";
