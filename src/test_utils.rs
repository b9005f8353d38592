//! Shared helpers for tests.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    AppState,
    auth::encode_token,
    db::initialize,
    models::{NewUser, PasswordHash, Role, User},
    receipts::{ReceiptError, ReceiptFile, ReceiptFolder, ReceiptStore},
};

/// A receipt store that records calls instead of touching the network.
///
/// Uploaded files get URLs in the same shape the real store produces, so the
/// remote-id derivation on delete is exercised end to end.
#[derive(Debug, Clone, Default)]
pub struct FakeReceiptStore {
    uploads: Arc<Mutex<Vec<String>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    fail_deletes: bool,
    fail_uploads: bool,
}

impl FakeReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose delete calls always fail.
    pub fn with_failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    /// A store whose upload calls always fail.
    pub fn with_failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    /// The URLs of all uploaded receipts, in upload order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// The remote IDs of all attempted deletes, in call order.
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

impl ReceiptStore for FakeReceiptStore {
    async fn upload(
        &self,
        folder: ReceiptFolder,
        _file: &ReceiptFile,
    ) -> Result<String, ReceiptError> {
        if self.fail_uploads {
            return Err(ReceiptError::Rejected("simulated failure".to_owned()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        let url = format!(
            "https://res.example.com/demo/image/upload/v1/{}/receipt-{}.jpg",
            folder.as_str(),
            uploads.len()
        );
        uploads.push(url.clone());

        Ok(url)
    }

    async fn delete(&self, remote_id: &str) -> Result<(), ReceiptError> {
        self.deletes.lock().unwrap().push(remote_id.to_owned());

        if self.fail_deletes {
            Err(ReceiptError::Rejected("simulated failure".to_owned()))
        } else {
            Ok(())
        }
    }
}

/// Application state backed by an empty in-memory database and a
/// [FakeReceiptStore].
pub fn test_state() -> AppState<FakeReceiptStore> {
    test_state_with(FakeReceiptStore::new())
}

/// Like [test_state], but with the given receipt store.
pub fn test_state_with(receipt_store: FakeReceiptStore) -> AppState<FakeReceiptStore> {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not create tables");

    AppState::new(connection, "test secret", receipt_store)
}

/// Insert a user with a placeholder password hash.
///
/// Tests that exercise the login route should insert a real hash instead.
pub fn insert_test_user(
    state: &AppState<FakeReceiptStore>,
    email: &str,
    role: Role,
) -> User {
    let connection = state.db_connection().lock().unwrap();

    NewUser {
        name: "Test User".to_owned(),
        email: EmailAddress::from_str(email).unwrap(),
        password_hash: PasswordHash::new_unchecked("not a real hash".to_owned()),
        role,
    }
    .insert(&connection)
    .unwrap()
}

/// Insert an admin user and return a valid bearer token for them.
pub fn admin_token(state: &AppState<FakeReceiptStore>) -> String {
    let user = insert_test_user(state, "admin@example.com", Role::Admin);
    encode_token(user.id, state.encoding_key()).unwrap()
}

/// Insert a member user and return a valid bearer token for them.
pub fn member_token(state: &AppState<FakeReceiptStore>) -> String {
    let user = insert_test_user(state, "member@example.com", Role::Member);
    encode_token(user.id, state.encoding_key()).unwrap()
}
