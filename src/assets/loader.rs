use std::future::Future;

use crate::assets::model::LoadedModel;
use crate::errors::Result;

/// Produces a [`LoadedModel`] (node hierarchy plus named clips) from a URI.
///
/// Loading resolves exactly once; a failure is reported through the
/// returned error and the caller keeps its stage inert.
pub trait ModelLoader: Send + Sync {
    fn load(&self, uri: &str) -> impl Future<Output = Result<LoadedModel>> + Send;
}
