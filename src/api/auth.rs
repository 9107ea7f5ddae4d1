use serde_json::json;

use super::ApiClient;
use crate::envelope::NormalizedResult;
use crate::transport::{RequestDescriptor, Transport};

pub const DEFAULT_SUDO_PATH: &str = "/cosmos/api/sudo";

impl<T: Transport> ApiClient<T> {
    /// POST the password to the elevation endpoint. Only the status decides
    /// the outcome; the success body is opaque.
    pub async fn sudo(&self, path: &str, password: &str, suppress_notify: bool) -> NormalizedResult {
        let request = RequestDescriptor::post_json(path, json!({ "password": password }));
        self.call(request, suppress_notify).await
    }
}
