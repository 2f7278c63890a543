//! Search domain: result records, upstream outcomes and the gateway seam.

pub mod model;
pub mod service;

pub use model::{ResultRecord, SourceEncoding};
pub use service::{SearchGateway, SearchOutcome, SearchRequest};
