//! Single-threaded promises: a value or a rejection that becomes known once,
//! with `then`/`catch` chaining and the `all`/`race` combinators.
//!
//! Handlers never run on the caller's stack. They are handed to a
//! [`Scheduler`], by default the calling thread's [`TaskQueue`], and run
//! when that queue is drained, either explicitly, through
//! [`Promise::wait`], or by awaiting the promise.
//!
//! # Reason types
//!
//! Constructing and settling a promise works with any `Clone` reason type.
//! Chaining (`then`, `and_then`, `catch`, `forward`, `resolve`, `all`,
//! `race`) and [`Resolver::adopt`] also need `E: From<Error>`, since a
//! promise that ends up waiting on itself rejects with [`Error::Cycle`].
//! `String` has that impl already. Reason types from other crates can't get
//! one here; wrap them in a local type that implements `From<Error>`.
//!
//! # Examples
//!
//! ```
//! use promise_chain::Promise;
//! use futures::executor::block_on;
//!
//! let (resolver, promise) = Promise::<i32, String>::pair();
//! let next = promise
//!     .and_then(|value| Ok(value + 1))
//!     .and_then(|value| Promise::fulfilled(value * 10))
//!     .catch(|reason| Ok(reason.len() as i32));
//! resolver.resolve(1);
//! assert_eq!(block_on(next), Ok(20));
//! ```
//!
mod combinators;
pub mod promise;
pub mod queue;

pub use promise::{IntoResolution, Promise, Resolution, Resolver, State};
pub use queue::{Scheduler, Task, TaskQueue};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A promise was resolved with itself, directly or through other
    /// promises that follow it. Delivered as the promise's rejection.
    #[error("promise resolved with itself")]
    Cycle,
    /// [`Promise::wait`] drained the task queue and the promise is still
    /// pending.
    #[error("promise still pending after the task queue ran dry")]
    Stalled,
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
