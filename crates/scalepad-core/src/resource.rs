//! Generic list/get operations for one API collection.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::contract::{decode, enforce, ContractCheck, Envelope, Shape};
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{Items, Page, Pages};
use crate::query::{ListOptions, SortParam};

/// A collection endpoint such as `/core/v1/clients`.
///
/// Every successful response is contract-checked once: list responses against
/// the page envelope wrapping the item check, single items against the item
/// check. The default item check is "deserializes into `T`".
pub struct Resource<T = Value> {
    http: Arc<HttpClient>,
    base_path: String,
    sort_param: SortParam,
    item_check: Arc<dyn ContractCheck>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            base_path: self.base_path.clone(),
            sort_param: self.sort_param,
            item_check: Arc::clone(&self.item_check),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("base_path", &self.base_path)
            .field("sort_param", &self.sort_param)
            .finish_non_exhaustive()
    }
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(http: Arc<HttpClient>, base_path: impl Into<String>, sort_param: SortParam) -> Self {
        Self {
            http,
            base_path: base_path.into(),
            sort_param,
            item_check: Arc::new(Shape::<T>::new()),
            _item: PhantomData,
        }
    }

    /// Replaces the per-item contract check.
    pub fn with_contract(mut self, check: impl ContractCheck + 'static) -> Self {
        self.item_check = Arc::new(check);
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn sort_param(&self) -> SortParam {
        self.sort_param
    }

    /// Fetches one page.
    pub async fn list(&self, options: &ListOptions) -> Result<Page<T>> {
        let query = options.to_query(self.sort_param);
        let value = self
            .http
            .get(&self.base_path, &query)
            .await?
            .unwrap_or(Value::Null);
        enforce(&Envelope::new(Arc::clone(&self.item_check)), &value)?;
        decode(value)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<T> {
        let path = format!("{}/{}", self.base_path, id);
        let value = self.http.get(&path, &[]).await?.unwrap_or(Value::Null);
        enforce(self.item_check.as_ref(), &value)?;
        decode(value)
    }

    /// Lazy page sequence starting at `options.cursor` (or the first page).
    pub fn pages(&self, options: ListOptions) -> Pages<'static, T> {
        let resource = self.clone();
        Pages::new(move |cursor: Option<String>| {
            let resource = resource.clone();
            let mut options = options.clone();
            if cursor.is_some() {
                options.cursor = cursor;
            }
            Box::pin(async move { resource.list(&options).await })
        })
    }

    pub fn items(&self, options: ListOptions) -> Items<'static, T> {
        self.pages(options).items()
    }

    /// Every item of every page. Unbounded; prefer [`Resource::items`] for
    /// large collections.
    pub async fn collect_all(&self, options: ListOptions) -> Result<Vec<T>> {
        self.pages(options).collect_all().await
    }
}
