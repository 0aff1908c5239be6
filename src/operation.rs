//! Interrupt operations.
//!
//! A request may carry an [`AsyncOperation`] that runs after the old content
//! has been unloaded and before the new one is loaded. It is the usual place
//! to call another verb, which cancels the one carrying it.

use crate::error::check;
use crate::progress::TransitionProgress;
use crate::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait AsyncOperation: Send + Sync {
    async fn execute(&self, progress: TransitionProgress, cancel: CancellationToken) -> Result<()>;
}

struct Empty;

#[async_trait]
impl AsyncOperation for Empty {
    async fn execute(
        &self,
        _progress: TransitionProgress,
        _cancel: CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}

/// An operation that does nothing.
pub fn empty() -> Arc<dyn AsyncOperation> {
    Arc::new(Empty)
}

struct FromFn<F>(F);

#[async_trait]
impl<F> AsyncOperation for FromFn<F>
where
    F: Fn(TransitionProgress, CancellationToken) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn execute(&self, progress: TransitionProgress, cancel: CancellationToken) -> Result<()> {
        (self.0)(progress, cancel).await
    }
}

/// Wrap a closure returning a future.
///
/// ```ignore
/// let op = operation::from_fn(move |_progress, _cancel| {
///     let nav = nav.clone();
///     async move { nav.pop(PopRequest::default(), CancellationToken::new()).await }
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> Arc<dyn AsyncOperation>
where
    F: Fn(TransitionProgress, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FromFn(
        move |progress: TransitionProgress,
              cancel: CancellationToken|
              -> BoxFuture<'static, Result<()>> { Box::pin(f(progress, cancel)) },
    ))
}

struct Combined(Vec<Arc<dyn AsyncOperation>>);

#[async_trait]
impl AsyncOperation for Combined {
    async fn execute(&self, progress: TransitionProgress, cancel: CancellationToken) -> Result<()> {
        for op in &self.0 {
            check(&cancel)?;
            op.execute(progress.clone(), cancel.clone()).await?;
        }
        check(&cancel)
    }
}

/// Run operations in order, stopping at the first failure or cancellation.
pub fn combine(ops: impl IntoIterator<Item = Arc<dyn AsyncOperation>>) -> Arc<dyn AsyncOperation> {
    Arc::new(Combined(ops.into_iter().collect()))
}
