use anyhow::{Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt;
use std::path::{Path, PathBuf};

/// A `collection/document[/collection/document...]` path.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    pub fn parse(path: &str) -> Result<DocPath> {
        let segments = path.split('/').map(str::to_string).collect::<Vec<_>>();
        if segments.iter().any(|s| s.is_empty()) {
            bail!("invalid document path '{}': empty segment", path);
        }
        if segments.len() % 2 != 0 {
            bail!("invalid document path '{}': expected an even number of segments", path);
        }
        Ok(DocPath { segments })
    }

    pub fn id(&self) -> &str {
        self.segments.last().expect("segment")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

pub fn store_root(data_dir: &Path, project_id: &str, host: &str) -> Result<PathBuf> {
    Ok(data_dir.join(escape_segment(project_id)).join(escape_segment(host)))
}

pub fn document_path(store_root: &Path, doc: &DocPath) -> Result<PathBuf> {
    let mut path = store_root.to_path_buf();
    for segment in doc.segments() {
        path.push(escape_segment(segment));
    }
    let file_name = path.file_name().expect("document segment");
    let file_name = format!("{}.json", file_name.to_string_lossy());
    Ok(path.with_file_name(file_name))
}

pub fn temp_path(document_path: &Path) -> Result<PathBuf> {
    let file_name = document_path.file_name().expect("document file");
    let file_name = file_name.to_string_lossy();
    let file_name = format!("{}-tmp", file_name);
    Ok(document_path.with_file_name(file_name))
}

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
