//! Cooperative request cancellation

use std::{fmt, future::Future, sync::Arc};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{HttpError, Result};

/// Cancellation signal shared between a request and its canceller.
///
/// The first `cancel` wins; later calls, and calls after the request
/// finished, change nothing observable.
#[derive(Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancelSignal {
    /// Create an unsignalled controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation
    pub fn cancel(&self, reason: Option<&str>) {
        let mut slot = self.reason.lock();
        if self.token.is_cancelled() {
            return;
        }
        *slot = reason.map(str::to_string);
        self.token.cancel();
    }

    /// Whether cancellation was signalled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation is signalled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Underlying token, for transports that observe it directly
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Error a cancelled request resolves to
    pub fn to_error(&self) -> HttpError {
        HttpError::Cancelled {
            reason: self.reason.lock().clone(),
        }
    }
}

impl fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &*self.reason.lock())
            .finish()
    }
}

/// A pending request paired with the handle that cancels it
pub struct CancelableRequest<T> {
    pub request: BoxFuture<'static, Result<T>>,
    pub handle: CancelSignal,
}

impl<T> CancelableRequest<T> {
    /// Signal cancellation of `request`
    pub fn cancel(&self, reason: Option<&str>) {
        self.handle.cancel(reason);
    }
}

impl<T> fmt::Debug for CancelableRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelableRequest")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Allocate one signal, start `request_fn` with it, and return both halves
pub fn create_cancelable_request<T, F, Fut>(request_fn: F) -> CancelableRequest<T>
where
    F: FnOnce(CancelSignal) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let handle = CancelSignal::new();
    CancelableRequest {
        request: Box::pin(request_fn(handle.clone())),
        handle,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::is_cancel;

    #[test]
    fn test_first_reason_wins() {
        let signal = CancelSignal::new();
        signal.cancel(Some("first"));
        signal.cancel(Some("second"));
        assert!(signal.is_cancelled());
        assert!(matches!(
            signal.to_error(),
            HttpError::Cancelled { reason: Some(r) } if r == "first"
        ));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_request() {
        let pending = create_cancelable_request(|signal| async move {
            tokio::select! {
                _ = signal.cancelled() => Err(signal.to_error()),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(42),
            }
        });

        pending.cancel(None);
        let err = pending.request.await.unwrap_err();
        assert!(is_cancel(&err));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let CancelableRequest { request, handle } =
            create_cancelable_request(|_signal| async { Ok::<_, HttpError>("done") });

        assert_eq!(request.await.unwrap(), "done");
        handle.cancel(Some("too late"));
        assert!(handle.is_cancelled());
    }
}
