use anyhow::Result;
use serde::{Serialize, Deserialize};
use std::io::{Read, Write};

use super::value::MapFieldValue;

/// On-disk form of one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredDocument {
    pub path: String,
    pub fields: MapFieldValue,
}

impl StoredDocument {
    pub fn write<W>(&self, writer: &mut W) -> Result<u64> where W: Write {
        let mut buf = serde_json::to_string_pretty(self)?;
        buf.push('\n');
        writer.write_all(buf.as_bytes())?;
        Ok(buf.len() as u64)
    }

    pub fn read<R>(reader: &mut R) -> Result<StoredDocument> where R: Read {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FieldValue;

    #[test]
    fn written_documents_read_back() {
        let mut fields = MapFieldValue::new();
        fields.insert("color".to_string(), FieldValue::from("blue"));
        fields.insert("count".to_string(), FieldValue::from(2i64));
        let doc = StoredDocument {
            path: "DocProbe/TestDoc".to_string(),
            fields,
        };

        let mut buf = Vec::new();
        let bytes = doc.write(&mut buf).unwrap();
        assert_eq!(bytes, buf.len() as u64);
        assert!(buf.ends_with(b"\n"));

        let read = StoredDocument::read(&mut &buf[..]).unwrap();
        assert_eq!(read, doc);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(StoredDocument::read(&mut &b"{not json"[..]).is_err());
        assert!(StoredDocument::read(&mut &br#"{"path": "a/b", "fields": {}, "x": 1}"#[..]).is_err());
    }
}
