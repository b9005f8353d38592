//! The route handlers for collection records.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    Error,
    models::{Collection, DatabaseID, NewCollection, Totals, parse_amount, timestamp_now},
    receipts::{
        ReceiptFolder, ReceiptStore, delete_remote_receipt,
        form::ReceiptForm,
    },
    state::AppState,
};

/// List all collection records, most recent first.
pub async fn get_collections<R: ReceiptStore>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Collection>>, Error> {
    let collections = Collection::select_all(&state.db_connection().lock().unwrap())?;

    Ok(Json(collections))
}

/// Get the grouped sum and count over all collection records.
pub async fn get_collection_total<R: ReceiptStore>(
    State(state): State<AppState<R>>,
) -> Result<Json<Totals>, Error> {
    let totals = Collection::total(&state.db_connection().lock().unwrap())?;

    Ok(Json(totals))
}

/// Create a collection record from a multipart form with an optional receipt.
///
/// All fields are validated before the receipt is uploaded, so a rejected
/// request never leaves a file in the remote store.
pub async fn create_collection<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Collection>), Error> {
    let form = ReceiptForm::read(&mut multipart).await?;

    let amount = parse_amount(form.require("amount")?)?;
    let collected_by = form.require("collectedBy")?.to_owned();
    let collected_from = form.require("collectedFrom")?.to_owned();
    let description = form.get("description").unwrap_or_default().to_owned();

    let receipt_url = match &form.receipt {
        Some(file) => Some(
            state
                .receipt_store()
                .upload(ReceiptFolder::Collections, file)
                .await
                .map_err(|error| Error::RemoteStoreError(error.to_string()))?,
        ),
        None => None,
    };

    let collection = NewCollection {
        amount,
        collected_by,
        collected_from,
        description,
        receipt_url,
        date: timestamp_now(),
    }
    .insert(&state.db_connection().lock().unwrap())?;

    Ok((StatusCode::CREATED, Json(collection)))
}

/// Delete a collection record and, best-effort, its remote receipt.
pub async fn delete_collection<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    Path(collection_id): Path<DatabaseID>,
) -> Result<Json<Value>, Error> {
    let collection = {
        let connection = state.db_connection().lock().unwrap();
        Collection::select(collection_id, &connection)?
    };

    if let Some(receipt_url) = &collection.receipt_url {
        delete_remote_receipt(state.receipt_store(), receipt_url).await;
    }

    Collection::delete(collection_id, &state.db_connection().lock().unwrap())?;

    Ok(Json(json!({ "message": "Collection deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    use crate::{
        AppState,
        endpoints,
        models::{Collection, NewCollection, Totals},
        receipts::form::MAX_RECEIPT_BYTES,
        routing::build_router,
        test_utils::{FakeReceiptStore, admin_token, member_token, test_state, test_state_with},
    };

    fn collection_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("amount", "250")
            .add_text("collectedBy", "Ganesh")
            .add_text("collectedFrom", "Ramesh")
            .add_text("description", "monthly contribution")
    }

    fn jpeg_part(bytes: Vec<u8>) -> Part {
        Part::bytes(bytes)
            .file_name("receipt.jpg")
            .mime_type("image/jpeg")
    }

    fn insert_collection(
        state: &AppState<FakeReceiptStore>,
        receipt_url: Option<&str>,
        timestamp: i64,
    ) -> Collection {
        let connection = state.db_connection().lock().unwrap();

        NewCollection {
            amount: 100.0,
            collected_by: "Ganesh".to_owned(),
            collected_from: "Ramesh".to_owned(),
            description: String::new(),
            receipt_url: receipt_url.map(str::to_owned),
            date: OffsetDateTime::from_unix_timestamp(timestamp).unwrap(),
        }
        .insert(&connection)
        .unwrap()
    }

    #[tokio::test]
    async fn admin_can_create_a_collection_with_a_receipt() {
        let state = test_state();
        let token = admin_token(&state);
        let store = state.receipt_store().clone();
        let server = TestServer::new(build_router(state));

        let response = server
            .post(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .multipart(collection_form().add_part("receipt", jpeg_part(vec![0xFF, 0xD8, 0xFF])))
            .await;

        response.assert_status(StatusCode::CREATED);
        let collection: Collection = response.json();
        assert_eq!(collection.amount, 250.0);
        assert_eq!(collection.collected_by, "Ganesh");
        assert_eq!(collection.collected_from, "Ramesh");
        assert_eq!(collection.description, "monthly contribution");
        assert_eq!(collection.receipt_url.as_deref(), store.uploads().first().map(String::as_str));

        let list = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;
        let listed: Vec<Collection> = list.json();
        assert_eq!(listed, vec![collection]);
    }

    #[tokio::test]
    async fn create_without_a_receipt_stores_no_url() {
        let state = test_state();
        let token = admin_token(&state);
        let server = TestServer::new(build_router(state));

        let response = server
            .post(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .multipart(collection_form())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["receiptUrl"], Value::Null);
    }

    #[tokio::test]
    async fn create_rejects_each_missing_required_field() {
        let state = test_state();
        let token = admin_token(&state);
        let server = TestServer::new(build_router(state));

        for missing in ["amount", "collectedBy", "collectedFrom"] {
            let mut form = MultipartForm::new();
            for (name, value) in [
                ("amount", "250"),
                ("collectedBy", "Ganesh"),
                ("collectedFrom", "Ramesh"),
            ] {
                if name != missing {
                    form = form.add_text(name, value);
                }
            }

            let response = server
                .post(endpoints::COLLECTIONS)
                .authorization_bearer(&token)
                .multipart(form)
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert!(
                body["error"].as_str().unwrap().contains(missing),
                "error for missing {missing} was {body}"
            );
        }

        let list = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;
        assert_eq!(list.json::<Vec<Collection>>(), vec![]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_amounts_before_uploading() {
        let state = test_state();
        let token = admin_token(&state);
        let store = state.receipt_store().clone();
        let server = TestServer::new(build_router(state));

        for amount in ["0", "-5", "not a number"] {
            let form = MultipartForm::new()
                .add_text("amount", amount)
                .add_text("collectedBy", "Ganesh")
                .add_text("collectedFrom", "Ramesh")
                .add_part("receipt", jpeg_part(vec![0xFF, 0xD8, 0xFF]));

            let response = server
                .post(endpoints::COLLECTIONS)
                .authorization_bearer(&token)
                .multipart(form)
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({ "error": "amount must be a positive number" }));
        }

        assert!(
            store.uploads().is_empty(),
            "invalid requests must not upload receipts"
        );
    }

    #[tokio::test]
    async fn create_rejects_unsupported_receipt_types() {
        let state = test_state();
        let token = admin_token(&state);
        let server = TestServer::new(build_router(state));

        let form = collection_form().add_part(
            "receipt",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );

        let response = server
            .post(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_oversized_receipts() {
        let state = test_state();
        let token = admin_token(&state);
        let server = TestServer::new(build_router(state));

        let form =
            collection_form().add_part("receipt", jpeg_part(vec![0; MAX_RECEIPT_BYTES + 1]));

        let response = server
            .post(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn member_cannot_create_collections() {
        let state = test_state();
        let token = member_token(&state);
        let server = TestServer::new(build_router(state));

        let response = server
            .post(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .multipart(collection_form())
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn listing_is_ordered_by_date_descending() {
        let state = test_state();
        let token = member_token(&state);
        let middle = insert_collection(&state, None, 2_000);
        let newest = insert_collection(&state, None, 3_000);
        let oldest = insert_collection(&state, None, 1_000);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Vec<Collection>>(),
            vec![newest, middle, oldest]
        );
    }

    #[tokio::test]
    async fn total_of_empty_table_is_zero() {
        let state = test_state();
        let token = member_token(&state);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::COLLECTION_TOTAL)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Totals>(),
            Totals {
                total_amount: 0.0,
                total_count: 0
            }
        );
        response.assert_json(&json!({ "totalAmount": 0.0, "totalCount": 0 }));
    }

    #[tokio::test]
    async fn delete_removes_the_record_and_the_remote_receipt() {
        let state = test_state();
        let token = admin_token(&state);
        let store = state.receipt_store().clone();
        let collection = insert_collection(
            &state,
            Some("https://res.example.com/demo/image/upload/v1/collections/abc123.jpg"),
            1_000,
        );
        let server = TestServer::new(build_router(state));

        let response = server
            .delete(&format!("{}/{}", endpoints::COLLECTIONS, collection.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Collection deleted successfully" }));
        assert_eq!(store.deletes(), vec!["collections/abc123".to_owned()]);

        let list = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;
        assert_eq!(list.json::<Vec<Collection>>(), vec![]);
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_the_remote_delete_fails() {
        let state = test_state_with(FakeReceiptStore::with_failing_deletes());
        let token = admin_token(&state);
        let collection = insert_collection(
            &state,
            Some("https://res.example.com/demo/image/upload/v1/collections/abc123.jpg"),
            1_000,
        );
        let server = TestServer::new(build_router(state));

        let response = server
            .delete(&format!("{}/{}", endpoints::COLLECTIONS, collection.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let list = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;
        assert_eq!(list.json::<Vec<Collection>>(), vec![]);
    }

    #[tokio::test]
    async fn delete_of_a_missing_record_is_not_found() {
        let state = test_state();
        let token = admin_token(&state);
        let existing = insert_collection(&state, None, 1_000);
        let server = TestServer::new(build_router(state));

        let response = server
            .delete(&format!("{}/{}", endpoints::COLLECTIONS, existing.id + 1))
            .authorization_bearer(&token)
            .await;

        response.assert_status_not_found();

        let list = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(&token)
            .await;
        assert_eq!(list.json::<Vec<Collection>>(), vec![existing]);
    }
}
