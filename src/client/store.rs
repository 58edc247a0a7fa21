use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::doc_file::StoredDocument;
use super::io_thread::IoThread;
use super::paths::DocPath;
use super::value::MapFieldValue;
use super::{DocumentSnapshot, Source};
use crate::pending::Pending;
use crate::status::{Code, OpError};

type DocumentCache = Arc<Mutex<BTreeMap<DocPath, MapFieldValue>>>;

/// File-backed documents for one project and host.
pub struct Store {
    root: PathBuf,
    io_thread: IoThread,
    cache: DocumentCache,
}

impl Store {
    pub fn open(root: PathBuf) -> Result<Store> {
        let io_thread = IoThread::start(root.clone())?;

        Ok(Store {
            root,
            io_thread,
            cache: Arc::new(Mutex::new(BTreeMap::new())),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl Store {
    pub fn get(&self, doc: &DocPath, source: Source) -> Pending<DocumentSnapshot> {
        debug!("get {} from {:?}", doc, source);
        let doc = doc.clone();
        let cache = self.cache.clone();
        self.io_thread.run(move |cx| {
            if source == Source::Cache {
                let map = cache.lock().expect("poison");
                return match map.get(&doc) {
                    Some(fields) => Ok(DocumentSnapshot::new(fields.clone(), true)),
                    None => Err(OpError::new(Code::Unavailable, format!("document {} is not cached", doc))),
                };
            }

            match cx.read_document(&doc) {
                Ok(Some(stored)) => {
                    let mut map = cache.lock().expect("poison");
                    map.insert(doc.clone(), stored.fields.clone());
                    Ok(DocumentSnapshot::new(stored.fields, false))
                }
                Ok(None) => {
                    // A fetch that reached storage knows the document is gone.
                    cache.lock().expect("poison").remove(&doc);
                    Err(OpError::new(Code::NotFound, format!("no document at {}", doc)))
                }
                Err(e) => Err(e),
            }
        })
    }

    pub fn set(&self, doc: &DocPath, fields: MapFieldValue) -> Pending<()> {
        debug!("set {} with {} fields", doc, fields.len());
        let doc = doc.clone();
        let cache = self.cache.clone();
        self.io_thread.run(move |cx| {
            let stored = StoredDocument {
                path: doc.to_string(),
                fields,
            };
            cx.write_document(&stored)?;

            let mut map = cache.lock().expect("poison");
            map.insert(doc, stored.fields);
            Ok(())
        })
    }
}
