//! In-Memory Document Store
//!
//! Process-local implementation of the document store contract, used by
//! the test suite and when `database.url = "memory"`. Collections are
//! created on first use and dropped with the store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::domain::store::{
    store_timestamp, Collection, Document, DocumentStore, Filter, Sort, StoreError,
    CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use crate::shared::object_id::{ObjectId, ObjectIdGenerator};

/// In-memory document store
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Arc<InMemoryCollection>>>,
    ids: Arc<ObjectIdGenerator>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            ids: Arc::new(ObjectIdGenerator::new()),
        }
    }

    fn get_or_create(&self, name: &str) -> Arc<InMemoryCollection> {
        if let Some(existing) = self.collections.read().get(name) {
            return existing.clone();
        }

        self.collections
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCollection::new(self.ids.clone())))
            .clone()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.get_or_create(name)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {
        let dropped = {
            let mut collections = self.collections.write();
            let count = collections.len();
            collections.clear();
            count
        };
        tracing::debug!(collections = dropped, "In-memory store closed");
    }
}

/// One in-memory collection, keyed by id.
pub struct InMemoryCollection {
    documents: RwLock<BTreeMap<ObjectId, Document>>,
    ids: Arc<ObjectIdGenerator>,
}

impl InMemoryCollection {
    fn new(ids: Arc<ObjectIdGenerator>) -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            ids,
        }
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .values()
            .find(|doc| filter.matches(doc))
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn find(
        &self,
        filter: &Filter,
        sort: &Sort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let mut matching: Vec<Document> = self
            .documents
            .read()
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        let count = self
            .documents
            .read()
            .values()
            .filter(|doc| filter.matches(doc))
            .count();
        Ok(count as u64)
    }

    async fn create(&self, mut doc: Document) -> Result<Document, StoreError> {
        let id = self.ids.generate();
        let now = store_timestamp(Utc::now());

        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
        doc.insert(CREATED_AT_FIELD.into(), now.clone());
        doc.insert(UPDATED_AT_FIELD.into(), now);

        self.documents.write().insert(id, doc.clone());
        Ok(doc)
    }

    async fn find_by_id_and_update(
        &self,
        id: &ObjectId,
        patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut documents = self.documents.write();
        let Some(doc) = documents.get_mut(id) else {
            return Ok(None);
        };

        for (field, value) in patch {
            if field == ID_FIELD || field == CREATED_AT_FIELD {
                continue;
            }
            doc.insert(field, value);
        }
        doc.insert(UPDATED_AT_FIELD.into(), store_timestamp(Utc::now()));

        Ok(Some(doc.clone()))
    }

    async fn find_by_id_and_delete(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.write().remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = InMemoryDocumentStore::new();
        let skills = store.collection("skills");

        let created = skills.create(doc(json!({ "name": "Rust" }))).await.unwrap();

        let id: ObjectId = created[ID_FIELD].as_str().unwrap().parse().unwrap();
        assert_eq!(created[CREATED_AT_FIELD], created[UPDATED_AT_FIELD]);
        assert_eq!(skills.find_by_id(&id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_collections_are_shared_by_name() {
        let store = InMemoryDocumentStore::new();
        store.collection("skills").create(doc(json!({ "name": "Rust" }))).await.unwrap();

        assert_eq!(store.collection("skills").count_documents(&Filter::All).await.unwrap(), 1);
        assert_eq!(store.collection("projects").count_documents(&Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_sorts_and_pages() {
        let store = InMemoryDocumentStore::new();
        let skills = store.collection("skills");
        for (name, level) in [("a", 30), ("b", 10), ("c", 20)] {
            skills.create(doc(json!({ "name": name, "level": level }))).await.unwrap();
        }

        let page = skills.find(&Filter::All, &Sort::asc("level"), 1, 1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["name"], "c");
    }

    #[tokio::test]
    async fn test_find_newest_first() {
        let store = InMemoryDocumentStore::new();
        let posts = store.collection("blog_posts");
        for title in ["first", "second", "third"] {
            posts.create(doc(json!({ "title": title }))).await.unwrap();
        }

        let titles: Vec<String> = posts
            .find(&Filter::All, &Sort::newest_first(), 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_protects_system_fields() {
        let store = InMemoryDocumentStore::new();
        let skills = store.collection("skills");
        let created = skills
            .create(doc(json!({ "name": "Rust", "category": "Languages" })))
            .await
            .unwrap();
        let id: ObjectId = created[ID_FIELD].as_str().unwrap().parse().unwrap();

        let updated = skills
            .find_by_id_and_update(&id, doc(json!({ "category": "Systems", "_id": "x" })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["name"], "Rust");
        assert_eq!(updated["category"], "Systems");
        assert_eq!(updated[ID_FIELD], created[ID_FIELD]);
        assert_eq!(updated[CREATED_AT_FIELD], created[CREATED_AT_FIELD]);
    }

    #[tokio::test]
    async fn test_update_and_delete_absent_return_none() {
        let store = InMemoryDocumentStore::new();
        let skills = store.collection("skills");
        let id = ObjectIdGenerator::new().generate();

        assert!(skills.find_by_id_and_update(&id, Document::new()).await.unwrap().is_none());
        assert!(skills.find_by_id_and_delete(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes() {
        let store = InMemoryDocumentStore::new();
        let skills = store.collection("skills");
        let created = skills.create(doc(json!({ "name": "Rust" }))).await.unwrap();
        let id: ObjectId = created[ID_FIELD].as_str().unwrap().parse().unwrap();

        assert_eq!(skills.find_by_id_and_delete(&id).await.unwrap(), Some(created));
        assert!(skills.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_drops_collections() {
        let store = InMemoryDocumentStore::new();
        store.collection("skills").create(doc(json!({ "name": "Rust" }))).await.unwrap();

        store.close().await;

        assert_eq!(store.collection("skills").count_documents(&Filter::All).await.unwrap(), 0);
    }
}
