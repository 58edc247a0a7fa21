//! One-shot asynchronous results handed out by the document client.
//!
//! A `Pending<T>` is the caller's side; the client keeps the matching
//! `Completer<T>` and resolves it exactly once, usually from its I/O thread.

use std::sync::{Arc, Mutex};
use log::debug;

use crate::status::{Code, OpError};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FutureStatus {
    Pending,
    Complete,
}

pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// The untyped view of a pending handle.
pub trait PendingBase {
    fn status(&self) -> FutureStatus;

    /// Raw status code of the outcome; `Code::Ok` while still pending.
    fn error(&self) -> i32;

    fn error_message(&self) -> String;

    /// Attach the completion callback, replacing any earlier one. Fires
    /// immediately if the handle has already completed.
    fn on_completion(&self, cb: CompletionCallback);
}

pub struct Pending<T> {
    shared: Arc<Mutex<State<T>>>,
}

pub struct Completer<T> {
    shared: Arc<Mutex<State<T>>>,
    completed: bool,
}

struct State<T> {
    outcome: Option<Result<T, OpError>>,
    callback: Option<CompletionCallback>,
}

pub fn pending<T>() -> (Pending<T>, Completer<T>) {
    let shared = Arc::new(Mutex::new(State {
        outcome: None,
        callback: None,
    }));
    let pending = Pending {
        shared: shared.clone(),
    };
    let completer = Completer {
        shared,
        completed: false,
    };
    (pending, completer)
}

impl<T> Clone for Pending<T> {
    fn clone(&self) -> Pending<T> {
        Pending {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Pending<T> {
    pub fn result(&self) -> Option<T> where T: Clone {
        let state = self.shared.lock().expect("poison");
        match &state.outcome {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Result<T, OpError>> where T: Clone {
        let state = self.shared.lock().expect("poison");
        state.outcome.clone()
    }
}

impl<T> PendingBase for Pending<T> {
    fn status(&self) -> FutureStatus {
        let state = self.shared.lock().expect("poison");
        if state.outcome.is_some() {
            FutureStatus::Complete
        } else {
            FutureStatus::Pending
        }
    }

    fn error(&self) -> i32 {
        let state = self.shared.lock().expect("poison");
        match &state.outcome {
            Some(Err(e)) => e.code,
            _ => Code::Ok as i32,
        }
    }

    fn error_message(&self) -> String {
        let state = self.shared.lock().expect("poison");
        match &state.outcome {
            Some(Err(e)) => e.message.clone(),
            _ => String::new(),
        }
    }

    fn on_completion(&self, cb: CompletionCallback) {
        let mut state = self.shared.lock().expect("poison");
        if state.outcome.is_some() {
            drop(state);
            cb();
        } else {
            if state.callback.is_some() {
                debug!("replacing completion callback on pending operation");
            }
            state.callback = Some(cb);
        }
    }
}

impl<T> Completer<T> {
    pub fn complete(mut self, outcome: Result<T, OpError>) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Result<T, OpError>) {
        assert!(!self.completed);
        self.completed = true;

        // The callback runs outside the lock so it may query the handle.
        let callback = {
            let mut state = self.shared.lock().expect("poison");
            assert!(state.outcome.is_none());
            state.outcome = Some(outcome);
            state.callback.take()
        };

        if let Some(callback) = callback {
            callback();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if !self.completed {
            self.finish(Err(OpError::new(Code::Cancelled, "operation abandoned before completion")));
        }
    }
}
