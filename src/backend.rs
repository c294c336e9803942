use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Type alias for the future returned by complete
pub type CompletionFuture = Pin<Box<dyn Future<Output = Result<Bytes>> + Send>>;

/// Trait for upstream chat-completion backends
///
/// The Dispatcher talks to the backend only through this seam so that
/// fallback behavior can be tested without a network.
pub trait ChatBackend: Send + Sync {
    /// Issue one chat-completion round-trip against the backend
    ///
    /// # Arguments
    /// * `model` - The model tier identifier for this attempt
    /// * `credential` - The caller's bearer credential, passed through
    /// * `body` - The serialized request body
    ///
    /// # Returns
    /// The raw success payload; failures carry the upstream error body so the
    /// dispatcher can classify them.
    fn complete(&self, model: &str, credential: &str, body: Bytes) -> CompletionFuture;

    /// Get the backend name for logging
    fn name(&self) -> &str;
}
