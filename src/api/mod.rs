//! Endpoint wrappers: each builds a request and hands the transport call to
//! the normalizer. None of them look at response bodies.

pub mod auth;
pub mod storage;

use std::sync::Arc;

use crate::envelope::{NormalizedResult, Normalizer};
use crate::transport::{RequestDescriptor, Transport};

#[derive(Debug)]
pub struct ApiClient<T: Transport> {
    transport: Arc<T>,
    normalizer: Normalizer,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: Arc<T>, normalizer: Normalizer) -> Self {
        Self {
            transport,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Best-effort call for endpoints that may answer with plain text
    pub async fn call(&self, request: RequestDescriptor, suppress_notify: bool) -> NormalizedResult {
        self.normalizer
            .normalize(self.transport.perform(request), suppress_notify)
            .await
    }

    /// Call for endpoints that always answer JSON
    pub async fn call_strict(&self, request: RequestDescriptor) -> NormalizedResult {
        self.normalizer
            .normalize_strict(self.transport.perform(request))
            .await
    }
}
