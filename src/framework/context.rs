// Query Context - request-scoped cancellation and deadline carried into every statement

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Context handed to the DAO for one unit of work
#[derive(Clone, Debug)]
pub struct QueryContext {
    request_id: Uuid,
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::background()
    }
}

impl QueryContext {
    /// Context with no deadline that is only cancelled explicitly
    pub fn background() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
            token: CancellationToken::new(),
        }
    }

    /// Child context expiring after `timeout`. A timeout too large to
    /// represent as an instant leaves the current deadline in place.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(self.deadline),
        }
    }

    /// Child context cancelled along with this one; the earlier deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        self.child(Some(deadline))
    }

    fn child(&self, deadline: Option<Instant>) -> Self {
        Self {
            request_id: self.request_id,
            deadline,
            token: self.token.child_token(),
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Err if the context is already cancelled or past its deadline
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(self.cancelled_error());
        }
        if matches!(self.remaining(), Some(d) if d.is_zero()) {
            return Err(self.deadline_error());
        }
        Ok(())
    }

    /// Drive `fut` unless cancellation or the deadline comes first
    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(self.cancelled_error()),
            _ = deadline => Err(self.deadline_error()),
            result = fut => result,
        }
    }

    fn cancelled_error(&self) -> AppError {
        AppError::Cancelled(format!("request {} was cancelled", self.request_id))
    }

    fn deadline_error(&self) -> AppError {
        AppError::TimeoutError(format!("request {} exceeded its deadline", self.request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let cx = QueryContext::background();
        let value = cx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(cx.deadline().is_none());
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let cx = QueryContext::background();
        cx.cancel();
        let err = cx.run(async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_cancel_while_running() {
        let cx = QueryContext::background();
        let canceller = cx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = cx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let cx = QueryContext::background().with_timeout(Duration::from_millis(10));
        let err = cx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TimeoutError(_)));
    }

    #[test]
    fn test_child_keeps_earlier_deadline_and_parent_cancellation() {
        let parent = QueryContext::background().with_timeout(Duration::from_millis(50));
        let child = parent.with_timeout(Duration::from_secs(60));

        assert_eq!(child.deadline(), parent.deadline());
        assert_eq!(child.request_id(), parent.request_id());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = QueryContext::background();
        let child = parent.with_timeout(Duration::from_secs(5));

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_keeps_parent_deadline() {
        let unbounded = QueryContext::background().with_timeout(Duration::MAX);
        assert!(unbounded.deadline().is_none());
        assert_eq!(unbounded.run(async { Ok(1) }).await.unwrap(), 1);

        let bounded = QueryContext::background().with_timeout(Duration::from_secs(10));
        let child = bounded.with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), bounded.deadline());
    }
}
