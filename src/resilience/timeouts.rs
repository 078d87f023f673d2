//! Deadline enforcement for upstream calls.
//!
//! The call deadline covers the wait for response headers. The relayed body
//! is then bounded by [`IdleTimeoutBody`], which fails the stream when no
//! frame arrives within the same window.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::BoxError;
use hyper::body::{Body, Frame, SizeHint};
use tokio::time::{Instant, Sleep};

use crate::error::TransportError;
use crate::load_balancer::backend::Backend;

/// Run an upstream call under `deadline`.
///
/// Both a failed call and an expired deadline come back as [`TransportError`].
pub async fn with_deadline<F, T>(
    backend: &Backend,
    deadline: Duration,
    call: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, hyper_util::client::legacy::Error>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(TransportError::Connect {
            backend: backend.clone(),
            source,
        }),
        Err(_) => Err(TransportError::DeadlineExceeded {
            backend: backend.clone(),
            after: deadline,
        }),
    }
}

/// Body wrapper that ends with [`TransportError::DeadlineExceeded`] once the
/// upstream goes `idle` without producing a frame.
pub struct IdleTimeoutBody<B> {
    inner: B,
    backend: Backend,
    idle: Duration,
    sleep: Pin<Box<Sleep>>,
    expired: bool,
}

impl<B> IdleTimeoutBody<B> {
    pub fn new(inner: B, backend: Backend, idle: Duration) -> Self {
        Self {
            inner,
            backend,
            idle,
            sleep: Box::pin(tokio::time::sleep(idle)),
            expired: false,
        }
    }
}

impl<B> Body for IdleTimeoutBody<B>
where
    B: Body + Unpin,
    B::Error: Into<BoxError>,
{
    type Data = B::Data;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.expired {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(frame) => {
                this.sleep.as_mut().reset(Instant::now() + this.idle);
                Poll::Ready(frame.map(|r| r.map_err(Into::into)))
            }
            Poll::Pending => {
                if this.sleep.as_mut().poll(cx).is_pending() {
                    return Poll::Pending;
                }
                this.expired = true;
                tracing::warn!(
                    backend = %this.backend,
                    idle = ?this.idle,
                    "Upstream body stalled, aborting relay"
                );
                Poll::Ready(Some(Err(TransportError::DeadlineExceeded {
                    backend: this.backend.clone(),
                    after: this.idle,
                }
                .into())))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.expired || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
