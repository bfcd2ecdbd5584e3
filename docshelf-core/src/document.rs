//! Document handles.
//!
//! A [`Document`] addresses one document inside a collection. It carries no cached content,
//! only the identifier that the backend last confirmed. That identifier can change as a side
//! effect of [`Document::set`].

use mea::rwlock::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::debug;

use crate::{
    collection::Collection,
    error::{ShelfError, ShelfResult},
    executor::{Envelope, backend_error},
    transport::Method,
};

/// A handle to one document, typed by its payload `T`.
///
/// Clones share the same identifier, so an id adopted through one clone is seen by all of
/// them. The parent collection is shared the same way: renaming the collection through any
/// of its handles re-targets every document handle it produced.
pub struct Document<T> {
    collection: Collection,
    id: Arc<RwLock<String>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Document<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            id: self.id.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Document<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("collection", &self.collection)
            .field("id", &self.id)
            .finish()
    }
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub(crate) fn new(collection: Collection, id: String) -> Self {
        Self {
            collection,
            id: Arc::new(RwLock::new(id)),
            _marker: PhantomData,
        }
    }

    /// Returns the identifier this handle currently addresses.
    pub async fn id(&self) -> String {
        self.id.read().await.clone()
    }

    /// Returns the collection this document belongs to.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Reinterprets this handle with a different payload type. The identifier stays shared.
    pub fn with_type<U>(&self) -> Document<U> {
        Document {
            collection: self.collection.clone(),
            id: self.id.clone(),
            _marker: PhantomData,
        }
    }

    async fn path(&self) -> String {
        format!("{}/documents/{}", self.collection.path().await, self.id().await)
    }

    /// Fetches the document, returning `None` if the backend answers 404 or sends a `null`
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Backend`] for any other non-2xx status.
    pub async fn safe_load(&self) -> ShelfResult<Option<T>> {
        let response = self
            .collection
            .executor()
            .request(Method::Get, self.path().await)
            .auth(self.collection.auth())
            .send_raw()
            .await?;

        if response.status == 404 {
            return Ok(None);
        }

        if !response.is_success() {
            return Err(backend_error(response, "fetching document"));
        }

        let envelope: Envelope<Option<T>> = serde_json::from_slice(&response.body)?;

        Ok(envelope.data)
    }

    /// Fetches the document.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::NotFound`] if the document does not exist, and
    /// [`ShelfError::Backend`] for any non-2xx status other than 404.
    pub async fn load(&self) -> ShelfResult<T> {
        match self.safe_load().await? {
            Some(document) => Ok(document),
            None => Err(ShelfError::NotFound(self.id().await)),
        }
    }

    /// Deletes the document.
    pub async fn remove(&self) -> ShelfResult<()> {
        self.collection
            .executor()
            .request(Method::Delete, self.path().await)
            .auth(self.collection.auth())
            .send("deleting document")
            .await?;

        Ok(())
    }

    /// Writes `body` and adopts the identifier the backend returns.
    ///
    /// If `body` declares a non-null `id` that is not the current identifier as a JSON string,
    /// the document under the current identifier is deleted first. A numeric `4` therefore
    /// differs from `"4"`. The body is then posted to the collection's `setDocument`
    /// endpoint, which decides whether it creates or overwrites.
    pub async fn set(&self, body: &T) -> ShelfResult<()> {
        let body = serde_json::to_value(body)?;
        let current = self.id().await;

        if let Some(declared) = declared_id(&body) {
            if declared.as_str() != Some(current.as_str()) {
                debug!(from = %current, to = %declared, "document id changes, removing old document");
                self.remove().await?;
            }
        }

        let new_id = self.collection.post_document(&body).await?;
        *self.id.write().await = new_id;

        Ok(())
    }
}

/// Returns the `id` declared by a payload, unless it is absent or `null`.
fn declared_id(body: &Value) -> Option<&Value> {
    body.get("id").filter(|id| !id.is_null())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::{instance::Instance, testing::RecordingTransport};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Order {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        item: String,
    }

    fn orders(transport: &RecordingTransport) -> Collection {
        Instance::from_shared("http://db.local", transport.shared())
            .database("shop", Default::default())
            .collection("orders")
    }

    #[tokio::test]
    async fn safe_load_maps_404_to_none() {
        let transport = RecordingTransport::new();
        transport.respond_json(404, json!({ "error": "missing" }));
        transport.respond_json(200, json!({ "data": { "item": "x" } }));

        let doc = orders(&transport).document::<Order>("d1");

        assert_eq!(doc.safe_load().await.unwrap(), None);
        assert_eq!(
            doc.safe_load().await.unwrap(),
            Some(Order { id: None, item: "x".into() })
        );
        assert_eq!(
            transport.calls(),
            vec![
                "GET /shop/collections/orders/documents/d1",
                "GET /shop/collections/orders/documents/d1",
            ]
        );
    }

    #[tokio::test]
    async fn safe_load_fails_on_other_statuses() {
        let transport = RecordingTransport::new();
        transport.respond_json(401, json!({ "error": "unauthorized" }));

        let err = orders(&transport)
            .document::<Order>("d1")
            .safe_load()
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn load_reports_missing_document_by_id() {
        let transport = RecordingTransport::new();
        transport.respond_json(404, json!({}));

        let err = orders(&transport)
            .document::<Order>("d9")
            .load()
            .await
            .unwrap_err();

        assert!(matches!(err, ShelfError::NotFound(id) if id == "d9"));
    }

    #[tokio::test]
    async fn set_with_new_id_removes_then_recreates() {
        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({}));
        transport.respond_json(200, json!({ "data": "d2" }));

        let doc = orders(&transport).document::<Order>("d1");
        doc.set(&Order { id: Some("d2".into()), item: "y".into() })
            .await
            .unwrap();

        assert_eq!(doc.id().await, "d2");
        assert_eq!(
            transport.calls(),
            vec![
                "DELETE /shop/collections/orders/documents/d1",
                "POST /shop/collections/orders/setDocument",
            ]
        );
        assert_eq!(
            transport.requests()[1].body,
            Some(json!({ "id": "d2", "item": "y" }))
        );
    }

    #[tokio::test]
    async fn set_with_same_or_no_id_only_posts() {
        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({ "data": "d1" }));
        transport.respond_json(200, json!({ "data": "d7" }));

        let doc = orders(&transport).document::<Order>("d1");
        doc.set(&Order { id: Some("d1".into()), item: "y".into() })
            .await
            .unwrap();
        assert_eq!(doc.id().await, "d1");

        doc.set(&Order { id: None, item: "z".into() }).await.unwrap();
        assert_eq!(doc.id().await, "d7");

        assert_eq!(
            transport.calls(),
            vec![
                "POST /shop/collections/orders/setDocument",
                "POST /shop/collections/orders/setDocument",
            ]
        );
    }

    #[tokio::test]
    async fn failed_removal_aborts_set() {
        let transport = RecordingTransport::new();
        transport.respond_json(500, json!({ "error": "boom" }));

        let doc = orders(&transport).document::<Order>("d1");
        let err = doc
            .set(&Order { id: Some("d2".into()), item: "y".into() })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(doc.id().await, "d1");
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_the_adopted_id() {
        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({ "data": "d5" }));

        let doc = orders(&transport).document::<Value>("d1");
        let other = doc.clone();
        doc.set(&json!({ "item": "x" })).await.unwrap();

        assert_eq!(other.id().await, "d5");
    }

    #[tokio::test]
    async fn numeric_id_differs_from_its_string_form() {
        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({}));
        transport.respond_json(200, json!({ "data": "4" }));

        let doc = orders(&transport).document::<Value>("4");
        doc.set(&json!({ "id": 4, "item": "y" })).await.unwrap();

        assert_eq!(doc.id().await, "4");
        assert_eq!(
            transport.calls(),
            vec![
                "DELETE /shop/collections/orders/documents/4",
                "POST /shop/collections/orders/setDocument",
            ]
        );
    }

    #[tokio::test]
    async fn null_payload_counts_as_missing() {
        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({ "data": null }));
        transport.respond_json(200, json!({ "data": null }));

        let doc = orders(&transport).document::<Value>("d1");

        assert_eq!(doc.safe_load().await.unwrap(), None);
        assert!(matches!(doc.load().await, Err(ShelfError::NotFound(id)) if id == "d1"));
    }

    #[test]
    fn declared_id_skips_absent_and_null() {
        assert_eq!(declared_id(&json!({ "id": "a" })), Some(&json!("a")));
        assert_eq!(declared_id(&json!({ "id": 4 })), Some(&json!(4)));
        assert_eq!(declared_id(&json!({ "id": null })), None);
        assert_eq!(declared_id(&json!({ "item": "x" })), None);
        assert_eq!(declared_id(&json!("scalar")), None);
    }
}
