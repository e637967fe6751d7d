//! Loading/error bookkeeping for a single asynchronous operation.

use crate::errors::AppError;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Observable state of one async operation.
#[derive(Debug, Clone)]
pub enum AsyncState<T> {
    Idle,
    Loading,
    Success(T),
    Failure(AppError),
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        AsyncState::Idle
    }
}

impl<T> AsyncState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            AsyncState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            AsyncState::Failure(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs futures against a shared [`AsyncState`] and can be cancelled.
///
/// Once cancelled (the owning view went away), pending and future runs
/// resolve to `AppError::Cancelled` and never write to the state.
#[derive(Clone)]
pub struct AsyncTask<T> {
    state: Arc<Mutex<AsyncState<T>>>,
    cancel: CancellationToken,
}

impl<T> Default for AsyncTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncTask<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AsyncState::Idle)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn set(&self, next: AsyncState<T>) {
        if self.cancel.is_cancelled() {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// Mutates the value in place when the task holds a success and has not
    /// been cancelled. Returns whether `f` ran.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if self.cancel.is_cancelled() {
            return false;
        }
        match self.state.lock() {
            Ok(mut state) => match state.value_mut() {
                Some(value) => {
                    f(value);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

impl<T: Clone> AsyncTask<T> {
    pub fn snapshot(&self) -> AsyncState<T> {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(AsyncState::Idle)
    }

    /// Drives `fut` to completion: Idle/any → Loading → Success | Failure.
    pub async fn run<F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        self.set(AsyncState::Loading);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!("Async task cancelled while pending");
                return Err(AppError::Cancelled);
            }
            result = fut => result,
        };

        match &result {
            Ok(value) => self.set(AsyncState::Success(value.clone())),
            Err(err) => {
                tracing::warn!("Async task failed: {}", err);
                self.set(AsyncState::Failure(err.clone()));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_success_path() {
        let task: AsyncTask<u32> = AsyncTask::new();
        assert!(matches!(task.snapshot(), AsyncState::Idle));

        let value = task.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(task.snapshot().value(), Some(&7));
    }

    #[tokio::test]
    async fn test_failure_path() {
        let task: AsyncTask<u32> = AsyncTask::new();
        let result = task
            .run(async { Err(AppError::NotFound("Property not found".into())) })
            .await;
        assert!(result.is_err());
        assert!(task.snapshot().error().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_cancel_while_pending_leaves_state_loading() {
        let task: AsyncTask<u32> = AsyncTask::new();
        let runner = task.clone();

        let handle = tokio::spawn(async move {
            runner
                .run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(1)
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        task.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(task.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_update_after_cancel_is_ignored() {
        let task: AsyncTask<u32> = AsyncTask::new();
        task.run(async { Ok(1) }).await.unwrap();
        assert!(task.update(|v| *v += 1));
        assert_eq!(task.snapshot().value(), Some(&2));

        task.cancel();
        assert!(!task.update(|v| *v += 1));
        assert_eq!(task.snapshot().value(), Some(&2));
    }

    #[tokio::test]
    async fn test_run_after_cancel_is_rejected() {
        let task: AsyncTask<u32> = AsyncTask::new();
        task.cancel();
        assert!(matches!(
            task.run(async { Ok(1) }).await,
            Err(AppError::Cancelled)
        ));
        assert!(matches!(task.snapshot(), AsyncState::Idle));
    }
}
