//! Reading the multipart forms used to create and update records.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::{Error, receipts::ReceiptFile};

/// The multipart field name the receipt file is sent under.
pub(crate) const RECEIPT_FIELD: &str = "receipt";

/// The largest receipt file accepted, in bytes.
pub(crate) const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

fn is_supported_receipt_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// The text fields and optional receipt file of a record form.
#[derive(Debug, Default)]
pub(crate) struct ReceiptForm {
    fields: HashMap<String, String>,
    /// The uploaded receipt, if the form carried one.
    pub receipt: Option<ReceiptFile>,
}

impl ReceiptForm {
    /// Drain `multipart` into text fields and at most one receipt file.
    ///
    /// The receipt is validated here, before the caller looks at any field,
    /// so an unsupported or oversized file rejects the request no matter
    /// which fields are present.
    pub async fn read(multipart: &mut Multipart) -> Result<Self, Error> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == RECEIPT_FIELD {
                let content_type = field
                    .content_type()
                    .map(str::to_owned)
                    .ok_or(Error::UnsupportedReceiptType)?;

                if !is_supported_receipt_type(&content_type) {
                    return Err(Error::UnsupportedReceiptType);
                }

                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| RECEIPT_FIELD.to_owned());

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;

                if bytes.len() > MAX_RECEIPT_BYTES {
                    return Err(Error::ReceiptTooLarge);
                }

                form.receipt = Some(ReceiptFile {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;

                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Get the trimmed value of a required text field.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if the field is absent or blank.
    pub fn require(&self, name: &'static str) -> Result<&str, Error> {
        match self.fields.get(name).map(|value| value.trim()) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingField(name)),
        }
    }

    /// Get the trimmed value of an optional text field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|value| value.trim())
    }
}
