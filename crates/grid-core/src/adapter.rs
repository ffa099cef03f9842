//! The data-fetching boundary of a table

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Something that answers a variables object with a raw response
///
/// Implementations may be backed by GraphQL, REST or in-memory fixtures;
/// the table never looks past this trait. The response is decoded with
/// [`crate::response::Connection::from_response`].
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    /// Run the query for one set of variables
    async fn fetch(&self, variables: &Value) -> Result<Value>;

    /// Name used in logs
    fn source_name(&self) -> &str;
}

