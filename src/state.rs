//! The state shared between route handlers.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

use crate::receipts::ReceiptStore;

/// The keys used to sign and verify auth tokens.
#[derive(Clone)]
struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// The state shared between all route handlers.
///
/// Generic over the receipt store so tests can substitute a fake that does
/// not touch the network.
#[derive(Clone)]
pub struct AppState<R: ReceiptStore> {
    db_connection: Arc<Mutex<Connection>>,
    jwt_keys: JwtKeys,
    receipt_store: R,
}

impl<R: ReceiptStore> AppState<R> {
    /// Create the shared application state.
    pub fn new(db_connection: Connection, jwt_secret: &str, receipt_store: R) -> Self {
        Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            receipt_store,
        }
    }

    /// The shared database connection.
    pub fn db_connection(&self) -> &Mutex<Connection> {
        &self.db_connection
    }

    /// The key used to sign auth tokens.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_keys.encoding
    }

    /// The key used to verify auth tokens.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_keys.decoding
    }

    /// The store that holds receipt files.
    pub fn receipt_store(&self) -> &R {
        &self.receipt_store
    }
}
