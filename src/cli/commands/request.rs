use clap::Args;
use reqwest::Method;
use serde_json::Value;

use crate::api::ApiClient;
use crate::cli::utils::{output_error, output_value};
use crate::cli::OutputFormat;
use crate::transport::{RequestDescriptor, Transport};

#[derive(Args)]
pub struct RequestArgs {
    #[arg(help = "HTTP method (GET, POST, ...)")]
    pub method: String,

    #[arg(help = "Path relative to the configured base URL")]
    pub path: String,

    #[arg(long, help = "JSON request body")]
    pub data: Option<String>,

    #[arg(long, help = "Endpoint always answers JSON; fail on any status >= 400")]
    pub strict: bool,

    #[arg(long, help = "Do not raise notifications (best-effort mode only)")]
    pub quiet: bool,
}

pub async fn handle<T: Transport>(
    args: RequestArgs,
    client: ApiClient<T>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())?;
    let mut request = RequestDescriptor::new(method, args.path);
    if let Some(data) = args.data {
        request = request.json(serde_json::from_str::<Value>(&data)?);
    }

    let result = if args.strict {
        client.call_strict(request).await
    } else {
        client.call(request, args.quiet).await
    };

    match result {
        Ok(body) => output_value(&output_format, &body),
        Err(err) => {
            output_error(&output_format, &err)?;
            Err(err.into())
        }
    }
}
