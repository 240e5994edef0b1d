//! Spreadsheet ingestion pipeline.
//!
//! `ingest` runs one upload through the whole sequence:
//!
//! 1. request validation (a file is present, a name is present when the policy needs one)
//! 2. spreadsheet parsing (`spreadsheet`)
//! 3. empty check
//! 4. duplicate detection (`guard`)
//! 5. row transformation (`transform`) and a single batch insert
//! 6. policy bookkeeping (the content-hash identity record)
//!
//! Nothing is written to the store unless steps 1-4 succeed. The batch insert and the
//! identity record are two separate writes: the record is only written after the batch
//! went through, and a failure of either surfaces as `StorageWriteFailure`.

pub mod guard;
pub mod spreadsheet;
pub mod transform;

use crate::error::{IngestError, StoreError};
use crate::store::DocumentStore;
use guard::DuplicatePolicy;
use log::{info, warn};
use transform::{transform_rows, TopicRow};

/// A received spreadsheet file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the browser.
    pub name: String,
    pub bytes: Vec<u8>,
    /// Lowercase hex MD5 of `bytes`.
    pub md5: String,
}

impl UploadedFile {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mut md5_hasher = md5::Context::new();
        md5_hasher.consume(&bytes);
        UploadedFile {
            name: name.into(),
            md5: format!("{:x}", md5_hasher.finalize()),
            bytes,
        }
    }
}

/// Everything the upload form sent.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file: Option<UploadedFile>,
    pub collection_name: Option<String>,
}

/// What a successful ingestion stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub collection: String,
    pub inserted: usize,
}

pub fn ingest(
    store: &dyn DocumentStore,
    policy: &DuplicatePolicy,
    upload: Upload,
) -> Result<IngestReport, IngestError> {
    let file = upload.file.ok_or(IngestError::MissingFile)?;
    let plan = policy.plan(&file, upload.collection_name.as_deref())?;

    let records = spreadsheet::read_records(&file.name, &file.bytes)?;
    if records.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    if let Err(e) = plan.check(store) {
        warn!("rejected '{}': {}", file.name, e);
        return Err(e);
    }

    let rows: Vec<TopicRow> = records.iter().map(TopicRow::from_record).collect();
    let documents = transform_rows(&rows)
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;

    let inserted = store.insert_many(&plan.collection, &documents)?;
    if let Some(identity) = &plan.identity {
        store.record_upload(identity)?;
    }

    info!(
        "ingested '{}' ({}): {} document(s) into '{}'",
        file.name, file.md5, inserted, plan.collection
    );
    Ok(IngestReport {
        collection: plan.collection,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use common::model::upload::UploadRecord;
    use rust_xlsxwriter::Workbook;
    use serde_json::{json, Value};

    const GRAVITY_CSV: &[u8] = b"Topic,Subject,Class,Description,VR_URL,Video_URL,WebGL_URL\n\
Gravity,Physics,9,intro,v,m,w\n";

    fn content_hash() -> DuplicatePolicy {
        DuplicatePolicy::ContentHash {
            collection: "topics".to_string(),
        }
    }

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            file: Some(UploadedFile::new(name, bytes.to_vec())),
            collection_name: None,
        }
    }

    fn named(name: &str, bytes: &[u8], collection: &str) -> Upload {
        Upload {
            collection_name: Some(collection.to_string()),
            ..upload(name, bytes)
        }
    }

    fn gravity_xlsx() -> Vec<u8> {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        let header = ["Topic", "Subject", "Class", "Description", "VR_URL", "Video_URL", "WebGL_URL"];
        for (c, h) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_string(1, 0, "Gravity").unwrap();
        ws.write_string(1, 1, "Physics").unwrap();
        ws.write_number(1, 2, 9).unwrap();
        ws.write_string(1, 3, "intro").unwrap();
        ws.write_string(1, 4, "v").unwrap();
        ws.write_string(1, 5, "m").unwrap();
        ws.write_string(1, 6, "w").unwrap();
        wb.save_to_buffer().unwrap()
    }

    /// Accepts reads but refuses every batch write.
    struct RejectingStore(SqliteStore);

    impl DocumentStore for RejectingStore {
        fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
            self.0.collection_exists(name)
        }
        fn insert_many(&self, _: &str, _: &[Value]) -> Result<usize, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        fn upload_recorded(&self, file_hash: &str) -> Result<bool, StoreError> {
            self.0.upload_recorded(file_hash)
        }
        fn record_upload(&self, record: &UploadRecord) -> Result<(), StoreError> {
            self.0.record_upload(record)
        }
        fn count_documents(&self, collection: &str) -> Result<usize, StoreError> {
            self.0.count_documents(collection)
        }
    }

    #[test]
    fn gravity_workbook_end_to_end() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = ingest(&store, &content_hash(), upload("gravity.xlsx", &gravity_xlsx())).unwrap();
        assert_eq!(
            report,
            IngestReport {
                collection: "topics".to_string(),
                inserted: 1
            }
        );

        let docs = store.documents("topics").unwrap();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc["title"], json!("Gravity"));
        assert_eq!(doc["gradeLevel"], json!("9"));
        assert_eq!(doc["chapterNumber"], json!(1));
        assert_eq!(doc["curriculum"], json!("General"));
        assert_eq!(doc["topics"][0]["activities"][0]["title"], json!("Gravity Activity"));
        assert_eq!(
            doc["topics"][0]["activities"][0]["videos"],
            json!({"vrLink": "v", "mobileLink": "m", "demoLink": "w"})
        );
    }

    #[test]
    fn same_bytes_are_ingested_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let csv = b"Topic,Subject\nGravity,Physics\nOptics,Physics\nOptics,Physics\n";

        let first = ingest(&store, &content_hash(), upload("a.csv", csv)).unwrap();
        assert_eq!(first.inserted, 3);

        let second = ingest(&store, &content_hash(), upload("renamed.csv", csv)).unwrap_err();
        assert!(matches!(second, IngestError::DuplicateUpload(_)));
        assert_eq!(store.count_documents("topics").unwrap(), 3);
    }

    #[test]
    fn one_byte_difference_is_a_new_upload() {
        let store = SqliteStore::open_in_memory().unwrap();
        ingest(&store, &content_hash(), upload("a.csv", GRAVITY_CSV)).unwrap();

        let mut changed = GRAVITY_CSV.to_vec();
        changed.push(b'\n');
        ingest(&store, &content_hash(), upload("a.csv", &changed)).unwrap();
        assert_eq!(store.count_documents("topics").unwrap(), 2);
    }

    #[test]
    fn file_name_collision_is_rejected_regardless_of_content() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = ingest(&store, &DuplicatePolicy::FileName, upload("Physics 9.csv", GRAVITY_CSV)).unwrap();
        assert_eq!(report.collection, "physics_9");

        let other = b"Topic\nSomething else entirely\n";
        let err = ingest(&store, &DuplicatePolicy::FileName, upload("PHYSICS 9.CSV", other)).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateUpload(ref d) if d.contains("physics_9")));
        assert_eq!(store.count_documents("physics_9").unwrap(), 1);
    }

    #[test]
    fn user_named_collection_is_sanitized_and_guarded() {
        let store = SqliteStore::open_in_memory().unwrap();
        let policy = DuplicatePolicy::UserNamed;

        let report = ingest(&store, &policy, named("a.csv", GRAVITY_CSV, "My Topics!!")).unwrap();
        assert_eq!(report.collection, "my_topics");

        let err = ingest(&store, &policy, named("b.csv", b"Topic\nOptics\n", "my topics")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateUpload(ref d) if d.contains("my_topics")));

        let report = ingest(&store, &policy, named("c.csv", GRAVITY_CSV, "   ")).unwrap();
        assert_eq!(report.collection, guard::FALLBACK_COLLECTION);
    }

    #[test]
    fn missing_file_is_checked_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = ingest(&store, &DuplicatePolicy::UserNamed, Upload::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingFile));
    }

    #[test]
    fn missing_collection_name_is_checked_before_parsing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = ingest(&store, &DuplicatePolicy::UserNamed, upload("a.xlsx", b"not a workbook")).unwrap_err();
        assert!(matches!(err, IngestError::MissingCollectionName));
    }

    #[test]
    fn empty_file_leaves_the_store_untouched() {
        let store = SqliteStore::open_in_memory().unwrap();
        let header_only = b"Topic,Subject,Class\n";

        let err = ingest(&store, &content_hash(), upload("empty.csv", header_only)).unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile));
        assert!(!store.collection_exists("topics").unwrap());
        let digest = UploadedFile::new("empty.csv", header_only.to_vec()).md5;
        assert!(!store.upload_recorded(&digest).unwrap());
    }

    #[test]
    fn unreadable_file_leaves_the_store_untouched() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = ingest(&store, &DuplicatePolicy::FileName, upload("broken.xlsx", b"PK\x03\x04 broken")).unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure(_)));
        assert!(!store.collection_exists("broken").unwrap());
    }

    #[test]
    fn rejected_batch_fails_the_whole_request() {
        let store = RejectingStore(SqliteStore::open_in_memory().unwrap());
        let file = UploadedFile::new("a.csv", GRAVITY_CSV.to_vec());
        let digest = file.md5.clone();

        let err = ingest(
            &store,
            &content_hash(),
            Upload {
                file: Some(file),
                collection_name: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::StorageWriteFailure(_)));
        assert!(!store.upload_recorded(&digest).unwrap());
        assert_eq!(store.count_documents("topics").unwrap(), 0);
    }
}
