use anyhow::{Context, Result};
use async_channel::{Receiver, Sender};
use futures::executor::block_on;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use super::doc_file::StoredDocument;
use super::paths::{self, DocPath};
use crate::pending::{self, Pending};
use crate::status::{Code, OpError};

type Job = Box<dyn FnOnce(&mut IoThreadContext) + Send>;

/// The client's worker thread. Requests run one at a time in submission
/// order and complete their handles from this thread.
pub struct IoThread {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

pub struct IoThreadContext {
    root: PathBuf,
}

impl Drop for IoThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl IoThread {
    pub fn start(root: PathBuf) -> Result<IoThread> {
        fs::create_dir_all(&root)
            .with_context(|| format!("creating store directory {}", root.display()))?;

        let (tx, rx) = async_channel::unbounded();
        let handle = thread::Builder::new()
            .name("docprobe-io".to_string())
            .spawn(move || run_jobs(rx, IoThreadContext { root }))
            .context("spawning client I/O thread")?;

        Ok(IoThread {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn run<F, R>(&self, f: F) -> Pending<R>
    where F: FnOnce(&mut IoThreadContext) -> Result<R, OpError> + Send + 'static,
          R: Send + 'static,
    {
        let (pending, completer) = pending::pending();
        let job: Job = Box::new(move |cx| {
            completer.complete(f(cx));
        });

        let tx = self.tx.as_ref().expect("running");
        if tx.try_send(job).is_err() {
            // Dropping the job drops its completer, which cancels the handle.
            warn!("client I/O thread is gone; cancelling request");
        }

        pending
    }
}

impl IoThread {
    fn shutdown(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("client I/O thread panicked");
            }
        }
    }
}

fn run_jobs(rx: Receiver<Job>, mut cx: IoThreadContext) {
    debug!("client I/O thread started at {}", cx.root.display());
    while let Ok(job) = block_on(rx.recv()) {
        job(&mut cx);
    }
    debug!("client I/O thread stopped");
}

impl IoThreadContext {
    pub fn read_document(&mut self, doc: &DocPath) -> Result<Option<StoredDocument>, OpError> {
        let path = paths::document_path(&self.root, doc).map_err(internal)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };

        let stored = StoredDocument::read(&mut BufReader::new(file)).map_err(|e| {
            OpError::new(Code::DataLoss, format!("corrupt document file {}: {}", path.display(), e))
        })?;

        Ok(Some(stored))
    }

    /// Replaces the whole document. The new contents land in a temp file
    /// that is renamed over the old one.
    pub fn write_document(&mut self, stored: &StoredDocument) -> Result<(), OpError> {
        let doc = DocPath::parse(&stored.path).map_err(|e| OpError::new(Code::InvalidArgument, e.to_string()))?;
        let path = paths::document_path(&self.root, &doc).map_err(internal)?;
        let temp = paths::temp_path(&path).map_err(internal)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(unavailable)?;
        }

        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp)?;
            stored.write(&mut file).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            file.flush()?;
            file.sync_all()?;
            fs::rename(&temp, &path)?;
            Ok(())
        })();

        if let Err(e) = result {
            match fs::remove_file(&temp) {
                Ok(()) => {}
                Err(rm) if rm.kind() == io::ErrorKind::NotFound => {}
                Err(rm) => warn!("leaving temp file {}: {}", temp.display(), rm),
            }
            return Err(unavailable(e));
        }

        Ok(())
    }
}

fn internal(e: anyhow::Error) -> OpError {
    OpError::new(Code::Internal, e.to_string())
}

fn unavailable(e: io::Error) -> OpError {
    OpError::new(Code::Unavailable, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FieldValue, MapFieldValue};
    use crate::completion::AwaitableCompletion;

    fn wait<T: Clone>(pending: &Pending<T>) -> Result<T, OpError> {
        AwaitableCompletion::new(pending).await_invoked().unwrap();
        pending.outcome().expect("complete")
    }

    #[test]
    fn jobs_run_in_order_off_the_caller_thread() {
        let dir = tempfile::tempdir().unwrap();
        let io = IoThread::start(dir.path().to_path_buf()).unwrap();
        let caller = thread::current().id();

        let handles = (0..5)
            .map(|i| io.run(move |_| Ok((i, thread::current().id()))))
            .collect::<Vec<_>>();

        for (i, handle) in handles.iter().enumerate() {
            let (n, id) = wait(handle).unwrap();
            assert_eq!(n, i);
            assert_ne!(id, caller);
        }
    }

    #[test]
    fn documents_are_replaced_whole() {
        let dir = tempfile::tempdir().unwrap();
        let io = IoThread::start(dir.path().to_path_buf()).unwrap();
        let doc = DocPath::parse("c/d").unwrap();

        let mut first = MapFieldValue::new();
        first.insert("a".to_string(), FieldValue::from(1i64));
        first.insert("b".to_string(), FieldValue::from(2i64));
        let mut second = MapFieldValue::new();
        second.insert("c".to_string(), FieldValue::from("three"));

        for fields in vec![first, second.clone()] {
            let stored = StoredDocument { path: "c/d".to_string(), fields };
            wait(&io.run(move |cx| cx.write_document(&stored))).unwrap();
        }

        let read = wait(&io.run(move |cx| cx.read_document(&doc))).unwrap();
        assert_eq!(read.unwrap().fields, second);
        assert!(!dir.path().join("c").join("d.json-tmp").exists());
    }

    #[test]
    fn missing_and_corrupt_documents() {
        let dir = tempfile::tempdir().unwrap();
        let io = IoThread::start(dir.path().to_path_buf()).unwrap();

        let doc = DocPath::parse("c/missing").unwrap();
        assert_eq!(wait(&io.run(move |cx| cx.read_document(&doc))).unwrap(), None);

        fs::create_dir_all(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c").join("bad.json"), "{oops").unwrap();
        let doc = DocPath::parse("c/bad").unwrap();
        let err = wait(&io.run(move |cx| cx.read_document(&doc))).unwrap_err();
        assert_eq!(err.code(), Some(Code::DataLoss));
    }

    #[test]
    fn failed_write_removes_its_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let io = IoThread::start(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(dir.path().join("c").join("d.json")).unwrap();

        let stored = StoredDocument { path: "c/d".to_string(), fields: MapFieldValue::new() };
        let err = wait(&io.run(move |cx| cx.write_document(&stored))).unwrap_err();
        assert_eq!(err.code(), Some(Code::Unavailable));
        assert!(!dir.path().join("c").join("d.json-tmp").exists());
        assert!(dir.path().join("c").join("d.json").is_dir());
    }

    #[test]
    fn panicking_job_cancels_its_request() {
        let dir = tempfile::tempdir().unwrap();
        let io = IoThread::start(dir.path().to_path_buf()).unwrap();
        let handle = io.run(|_| -> Result<(), OpError> { panic!("boom") });
        let err = wait(&handle).unwrap_err();
        assert_eq!(err.code(), Some(Code::Cancelled));
    }
}
