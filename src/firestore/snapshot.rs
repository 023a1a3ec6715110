use super::models::Document;
use super::reference::convert_fields_to_serde_value;
use super::FirestoreError;
use serde::de::DeserializeOwned;

/// A snapshot of a document read from Firestore.
///
/// The data can be extracted with `.data()`.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub(crate) id: String,
    pub(crate) document: Document,
}

impl From<Document> for DocumentSnapshot {
    fn from(document: Document) -> Self {
        Self {
            id: document.id().to_string(),
            document,
        }
    }
}

impl DocumentSnapshot {
    /// The ID of the document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Decodes all fields in the document as `T`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, FirestoreError> {
        let serde_value = convert_fields_to_serde_value(self.document.fields.clone())?;
        Ok(serde_json::from_value(serde_value)?)
    }
}

/// A `QuerySnapshot` contains zero or more `DocumentSnapshot` objects.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    pub(crate) documents: Vec<DocumentSnapshot>,
    pub(crate) read_time: Option<String>,
}

impl QuerySnapshot {
    /// The documents in this snapshot.
    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    /// Returns `true` if there are no documents in the snapshot.
    pub fn empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The number of documents in the snapshot.
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    /// The time this snapshot was read, when the service reported one.
    pub fn read_time(&self) -> Option<&str> {
        self.read_time.as_deref()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentSnapshot> {
        self.documents.iter()
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuerySnapshot {
    type Item = &'a DocumentSnapshot;
    type IntoIter = std::slice::Iter<'a, DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
