//! Timeout decorator.
//!
//! Wraps another [`ShareClient`] and bounds every remote operation (connect,
//! list, open, and each chunk of a file read) with a deadline. An operation
//! that runs past it fails with [`Timeout`](ErrorKind::Timeout), which counts
//! as a connectivity failure.

use crate::backend::{ByteStream, SessionHandle, ShareClient, ShareSession};
use crate::error::{ErrorKind, Result};
use crate::models::ShareEntry;
use crate::ShareHandle;
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

async fn bounded<T>(limit: Duration, operation: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_elapsed) => exn::bail!(ErrorKind::Timeout(limit)),
    }
}

/// Share client with a deadline on every remote operation.
#[derive(Clone)]
pub struct TimeoutShare {
    inner: ShareHandle,
    limit: Duration,
}
impl TimeoutShare {
    pub fn new(inner: ShareHandle, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl ShareClient for TimeoutShare {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn connect(&self) -> Result<SessionHandle> {
        let inner = bounded(self.limit, self.inner.connect()).await?;
        Ok(Box::new(TimeoutSession { inner, limit: self.limit }))
    }
}

struct TimeoutSession {
    inner: SessionHandle,
    limit: Duration,
}

#[async_trait]
impl ShareSession for TimeoutSession {
    async fn list(&self, path: &Path) -> Result<Vec<ShareEntry>> {
        bounded(self.limit, self.inner.list(path)).await
    }

    async fn open<'a>(&'a self, path: &'a Path) -> Result<ByteStream<'a>> {
        let mut chunks = bounded(self.limit, self.inner.open(path)).await?;
        let limit = self.limit;
        Ok(Box::pin(stream! {
            loop {
                match tokio::time::timeout(limit, chunks.next()).await {
                    Ok(Some(chunk)) => yield chunk,
                    Ok(None) => break,
                    Err(_elapsed) => {
                        tracing::warn!(path = %path.display(), "Share stopped sending file contents");
                        yield Err(exn::Exn::from(ErrorKind::Timeout(limit)));
                        break;
                    },
                }
            }
        }))
    }

    async fn close(&self) {
        // Same deadline as every other operation, then the session is dropped.
        if tokio::time::timeout(self.limit, self.inner.close()).await.is_err() {
            tracing::warn!("Timed out closing share session; dropping it");
        }
    }
}
