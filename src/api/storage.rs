use super::ApiClient;
use crate::envelope::NormalizedResult;
use crate::transport::{RequestDescriptor, Transport};

pub const MOUNTS_PATH: &str = "/cosmos/api/mounts";

impl<T: Transport> ApiClient<T> {
    /// Mount listing, passed through as the backend returns it
    pub async fn mounts(&self) -> NormalizedResult {
        self.call(RequestDescriptor::get(MOUNTS_PATH), false).await
    }
}
