//! A small document database client backed by local files.
//!
//! `App` carries the project options, `Client` binds an app to a host, and
//! `DocumentReference` issues gets and sets that complete asynchronously on
//! the client's I/O thread.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::fs;
use std::sync::Arc;

mod doc_file;
mod io_thread;
mod options;
mod paths;
mod store;
mod value;

pub use options::{AppOptions, CONFIG_ENV, CONFIG_FILE, DATA_DIR_ENV};
pub use paths::DocPath;
pub use value::{FieldValue, MapFieldValue};

use crate::pending::Pending;
use store::Store;

pub const DEFAULT_HOST: &str = "docs.local:443";
pub const EMULATOR_HOST: &str = "localhost:8080";

#[derive(Debug)]
pub struct App {
    options: AppOptions,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    host: String,
    ssl_enabled: bool,
}

pub struct Client {
    options: AppOptions,
    settings: Settings,
    store: Arc<Store>,
}

#[derive(Clone)]
pub struct DocumentReference {
    path: DocPath,
    store: Arc<Store>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    fields: MapFieldValue,
    from_cache: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Source {
    Server,
    Cache,
}

impl App {
    pub fn create(options: AppOptions) -> Result<App> {
        if options.project_id.trim().is_empty() {
            bail!("project id must not be empty");
        }
        fs::create_dir_all(&options.data_dir)
            .with_context(|| format!("creating data directory {}", options.data_dir.display()))?;

        Ok(App { options })
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }
}

impl Settings {
    pub fn emulator() -> Settings {
        Settings {
            host: EMULATOR_HOST.to_string(),
            ssl_enabled: false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    pub fn is_ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            host: DEFAULT_HOST.to_string(),
            ssl_enabled: true,
        }
    }
}

impl Client {
    pub fn get_instance(app: &App) -> Result<Client> {
        let options = app.options().clone();
        let settings = Settings::default();
        let store = open_store(&options, &settings)?;

        Ok(Client {
            options,
            settings,
            store,
        })
    }

    pub fn settings(&self) -> Settings {
        self.settings.clone()
    }

    /// Rebinds the client to another host. References resolved earlier keep
    /// talking to the old host.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        if settings.host.trim().is_empty() {
            bail!("host must not be empty");
        }
        self.store = open_store(&self.options, &settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn document(&self, path: &str) -> Result<DocumentReference> {
        Ok(DocumentReference {
            path: DocPath::parse(path)?,
            store: self.store.clone(),
        })
    }
}

fn open_store(options: &AppOptions, settings: &Settings) -> Result<Arc<Store>> {
    let root = paths::store_root(&options.data_dir, &options.project_id, &settings.host)?;
    let store = Store::open(root)?;
    info!("Connected to {} (ssl {})", settings.host, if settings.ssl_enabled { "on" } else { "off" });
    debug!("store root {}", store.root().display());
    Ok(Arc::new(store))
}

impl DocumentReference {
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn get(&self, source: Source) -> Pending<DocumentSnapshot> {
        self.store.get(&self.path, source)
    }

    /// Overwrites the whole document with `fields`.
    pub fn set(&self, fields: MapFieldValue) -> Pending<()> {
        self.store.set(&self.path, fields)
    }
}

impl DocumentSnapshot {
    fn new(fields: MapFieldValue, from_cache: bool) -> DocumentSnapshot {
        DocumentSnapshot {
            fields,
            from_cache,
        }
    }

    pub fn get_data(&self) -> &MapFieldValue {
        &self.fields
    }

    pub fn into_data(self) -> MapFieldValue {
        self.fields
    }

    pub fn is_from_cache(&self) -> bool {
        self.from_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::AwaitableCompletion;
    use crate::status::Code;

    fn app_in(dir: &tempfile::TempDir) -> App {
        App::create(AppOptions {
            project_id: "test".to_string(),
            data_dir: dir.path().join("data"),
        }).unwrap()
    }

    #[test]
    fn app_requires_a_project() {
        let dir = tempfile::tempdir().unwrap();
        let result = App::create(AppOptions {
            project_id: " ".to_string(),
            data_dir: dir.path().to_path_buf(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn app_creates_its_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        assert!(app.options().data_dir.is_dir());
    }

    #[test]
    fn document_paths_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::get_instance(&app_in(&dir)).unwrap();
        assert!(client.document("only-a-collection").is_err());
        let doc = client.document("DocProbe/TestDoc").unwrap();
        assert_eq!(doc.id(), "TestDoc");
        assert_eq!(doc.path().to_string(), "DocProbe/TestDoc");
    }

    #[test]
    fn hosts_do_not_share_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = Client::get_instance(&app_in(&dir)).unwrap();
        let doc = client.document("c/d").unwrap();

        let mut fields = MapFieldValue::new();
        fields.insert("k".to_string(), FieldValue::from("v"));
        let set = doc.set(fields);
        AwaitableCompletion::new(&set).await_invoked().unwrap();
        assert_eq!(set.outcome(), Some(Ok(())));

        client.set_settings(Settings::emulator()).unwrap();
        assert_eq!(client.settings().host(), EMULATOR_HOST);
        assert!(!client.settings().is_ssl_enabled());

        let get = client.document("c/d").unwrap().get(Source::Server);
        AwaitableCompletion::new(&get).await_invoked().unwrap();
        let err = get.outcome().unwrap().unwrap_err();
        assert_eq!(err.code(), Some(Code::NotFound));
    }

    #[test]
    fn empty_host_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = Client::get_instance(&app_in(&dir)).unwrap();
        let mut settings = client.settings();
        settings.set_host("");
        assert!(client.set_settings(settings).is_err());
        assert_eq!(client.settings().host(), DEFAULT_HOST);
    }
}
