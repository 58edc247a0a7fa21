use log::{info, warn};
use std::time::Instant;

use crate::client::{DocumentReference, FieldValue, MapFieldValue, Source};
use crate::completion::AwaitableCompletion;
use crate::pending::PendingBase;
use crate::status::{Code, OpError};

const SEPARATOR: &str = "=======================================";

pub fn do_read(doc: &DocumentReference) -> Result<MapFieldValue, OpError> {
    info!("{}", SEPARATOR);
    info!("do_read() doc={}", doc.path());

    let future = doc.get(Source::Server);
    await_completion(&future, "DocumentReference.get()")?;

    let snapshot = future.result()
        .ok_or_else(|| OpError::new(Code::Internal, "get completed without a snapshot"))?;
    let data = snapshot.into_data();
    info!("Document num key/value pairs: {}", data.len());
    for (i, (key, value)) in data.iter().enumerate() {
        info!("Entry #{}: {}={}", i + 1, key, value);
    }

    Ok(data)
}

pub fn do_write(doc: &DocumentReference, key: &str, value: &str) -> Result<(), OpError> {
    info!("{}", SEPARATOR);
    info!("do_write() doc={} setting {}={}", doc.path(), key, value);

    let mut map = MapFieldValue::new();
    map.insert(key.to_string(), FieldValue::from(value));
    let future = doc.set(map);
    await_completion(&future, "DocumentReference.set()")
}

fn await_completion(future: &dyn PendingBase, name: &str) -> Result<(), OpError> {
    info!("{} start", name);
    let start = Instant::now();
    let completion = AwaitableCompletion::new(future);
    let waited = completion.await_invoked();
    let elapsed = format!("{:.2}s", start.elapsed().as_secs_f64());

    let result = match waited {
        Err(e) => Err(OpError::new(Code::Internal, e.to_string())),
        Ok(()) if future.error() != Code::Ok as i32 => Err(OpError {
            code: future.error(),
            message: future.error_message(),
        }),
        Ok(()) => Ok(()),
    };

    match &result {
        Ok(()) => info!("{} done in {}", name, elapsed),
        Err(e) => warn!("{} FAILED in {}: {}", name, elapsed, e),
    }

    result
}
