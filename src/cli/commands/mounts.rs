use crate::api::ApiClient;
use crate::cli::utils::{output_error, output_value};
use crate::cli::OutputFormat;
use crate::transport::Transport;

pub async fn handle<T: Transport>(client: ApiClient<T>, output_format: OutputFormat) -> anyhow::Result<()> {
    match client.mounts().await {
        Ok(body) => output_value(&output_format, &body),
        Err(err) => {
            output_error(&output_format, &err)?;
            Err(err.into())
        }
    }
}
