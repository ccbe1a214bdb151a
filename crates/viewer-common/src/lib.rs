//! Common types shared by the product service, the selector and the viewer engine.

pub mod error;
pub mod product;
pub mod query;
pub mod time;

pub use error::{ViewerError, ViewerResult};
pub use product::ProductResponse;
pub use query::{DomainKey, ProductQuery, QueryParameters};
pub use time::{EndTime, TimeRange, END_TIME_FORMAT, REALTIME_SENTINEL};
