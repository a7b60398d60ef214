use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::app::{FeedError, Result};
use crate::domain::Model;
use crate::fetcher::{Api, Parameters};

/// Receives the result of a callback-style fetch.
pub type RowsCallback<T> = Box<dyn FnOnce(Result<Vec<T>>) + Send + 'static>;

/// A fetch capability that reports through a callback instead of a future.
///
/// Wrap it in [`Callbacks`] to use it wherever an [`Api`] is expected.
pub trait CallbackApi<T: Model>: Send + Sync {
    fn fetch_rows_with(&self, url: &str, parameters: &Parameters, callback: RowsCallback<T>);
}

/// Adapts a [`CallbackApi`] into an awaitable [`Api`].
pub struct Callbacks<C>(pub C);

#[async_trait]
impl<T: Model, C: CallbackApi<T>> Api<T> for Callbacks<C> {
    async fn fetch_rows(&self, url: &str, parameters: &Parameters) -> Result<Vec<T>> {
        let (tx, rx) = oneshot::channel();
        self.0.fetch_rows_with(
            url,
            parameters,
            Box::new(move |rows| {
                // The awaiting side may be gone already
                let _ = tx.send(rows);
            }),
        );
        rx.await.map_err(|_| FeedError::CallbackDropped)?
    }
}
