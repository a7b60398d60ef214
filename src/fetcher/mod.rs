pub mod callback;
pub mod memory;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::app::Result;
use crate::domain::Model;

pub use callback::{CallbackApi, Callbacks, RowsCallback};
pub use memory::MemoryApi;

/// Query parameters sent with every page request.
pub type Parameters = BTreeMap<String, String>;

/// Name of the parameter carrying the page cursor.
pub const PAGE_PARAMETER: &str = "page";

/// A remote collection of `T` that can be fetched page by page.
///
/// An `Err` means no rows were obtained by this call. Callers cannot tell a
/// network failure from a decode failure, and are not meant to.
#[async_trait]
pub trait Api<T: Model>: Send + Sync {
    async fn fetch_rows(&self, url: &str, parameters: &Parameters) -> Result<Vec<T>>;

    /// Callback flavour of [`Api::fetch_rows`]. The request runs on the
    /// tokio runtime and `callback` receives its result.
    fn fetch_rows_with(
        self: Arc<Self>,
        url: String,
        parameters: Parameters,
        callback: RowsCallback<T>,
    ) -> JoinHandle<()>
    where
        Self: Sized + 'static,
    {
        tokio::spawn(async move {
            let rows = (*self).fetch_rows(&url, &parameters).await;
            callback(rows);
        })
    }
}

#[async_trait]
impl<T: Model, A: Api<T> + ?Sized> Api<T> for Arc<A> {
    async fn fetch_rows(&self, url: &str, parameters: &Parameters) -> Result<Vec<T>> {
        (**self).fetch_rows(url, parameters).await
    }
}

/// Returns `parameters` with the page cursor merged in. An existing `page`
/// entry is overwritten.
pub fn paging(parameters: &Parameters, page: usize) -> Parameters {
    let mut merged = parameters.clone();
    merged.insert(PAGE_PARAMETER.to_string(), page.to_string());
    merged
}
