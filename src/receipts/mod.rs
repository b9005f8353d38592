//! Storage of receipt files in a remote image host.

use std::future::Future;

use bytes::Bytes;

mod cloudinary;
pub(crate) mod form;

pub use cloudinary::CloudinaryStore;

/// Errors that can occur while talking to the remote receipt store.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// The remote store answered, but rejected the request.
    #[error("the remote store rejected the request: {0}")]
    Rejected(String),

    /// The remote store could not be reached.
    #[error("could not reach the remote store: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The folder a receipt is filed under in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptFolder {
    /// Receipts attached to collection records.
    Collections,
    /// Receipts attached to expense records.
    Expenses,
}

impl ReceiptFolder {
    /// The folder name used in remote paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptFolder::Collections => "collections",
            ReceiptFolder::Expenses => "expenses",
        }
    }
}

/// A receipt file extracted from a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptFile {
    /// The client-supplied file name.
    pub file_name: String,
    /// The file's MIME type.
    pub content_type: String,
    /// The file contents.
    pub bytes: Bytes,
}

/// A remote store that holds receipt files and serves them by URL.
pub trait ReceiptStore: Clone + Send + Sync + 'static {
    /// Upload `file` under `folder` and return the URL it can be retrieved
    /// from.
    fn upload(
        &self,
        folder: ReceiptFolder,
        file: &ReceiptFile,
    ) -> impl Future<Output = Result<String, ReceiptError>> + Send;

    /// Delete the remote object with the given identifier.
    fn delete(&self, remote_id: &str) -> impl Future<Output = Result<(), ReceiptError>> + Send;
}

/// Derive the remote object identifier from a stored receipt URL.
///
/// The remote store addresses objects as `folder/basename` without the file
/// extension, so the last two URL segments are rejoined and truncated at the
/// first `.`.
pub fn remote_id_from_url(url: &str) -> Option<String> {
    let mut segments = url.rsplit('/');
    let basename = segments.next()?;
    let folder = segments.next()?;

    if basename.is_empty() || folder.is_empty() {
        return None;
    }

    let remote_id = match basename.split_once('.') {
        Some((stem, _)) => format!("{folder}/{stem}"),
        None => format!("{folder}/{basename}"),
    };

    Some(remote_id)
}

/// Delete the remote receipt behind `receipt_url`, logging failures instead
/// of propagating them.
///
/// Record deletion must succeed even when the remote store is unreachable,
/// so the orphaned file is only reported.
pub(crate) async fn delete_remote_receipt<R: ReceiptStore>(store: &R, receipt_url: &str) {
    let Some(remote_id) = remote_id_from_url(receipt_url) else {
        tracing::warn!("could not derive a remote object id from receipt URL {receipt_url}");
        return;
    };

    if let Err(error) = store.delete(&remote_id).await {
        tracing::warn!("could not delete remote receipt {remote_id}: {error}");
    }
}
