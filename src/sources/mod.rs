pub mod http;

use async_trait::async_trait;
use serde_json::Value;

pub use crate::error::SourceError;
pub use http::HttpSupplySource;

/// Something that can hand back the latest supply info document.
#[async_trait]
pub trait SupplySource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_supply(&self) -> Result<Value, SourceError>;
}
