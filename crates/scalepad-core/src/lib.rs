pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod logging;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod resources;
pub mod retry;

pub use client::ScalePadClient;
pub use config::{ClientConfig, ConfigError, RetryConfig};
pub use error::{ApiError, ErrorItem, Result};
pub use pagination::{Items, Page, Pages};
pub use query::{FilterClause, FilterOp, FilterValue, Filters, ListOptions, SortParam};
pub use resource::Resource;
pub use resources::{Core, CoreV1, ResourceKind};
