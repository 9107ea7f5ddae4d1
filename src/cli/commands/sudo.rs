use clap::Args;
use serde_json::json;

use crate::api::ApiClient;
use crate::cli::utils::{output_success, prompt_line};
use crate::cli::OutputFormat;
use crate::config::ClientConfig;
use crate::sudo::{Identity, Role, SessionHandle, SudoWorkflow, WorkflowState};
use crate::transport::Transport;

#[derive(Args)]
pub struct SudoArgs {
    #[arg(long, help = "Password (will prompt if not provided)")]
    pub password: Option<String>,

    #[arg(long, default_value = "admin", help = "Role of the logged-in account")]
    pub base_role: Role,

    #[arg(long, default_value = "user", help = "Role the session currently acts as")]
    pub active_role: Role,
}

pub async fn handle<T: Transport>(
    args: SudoArgs,
    client: ApiClient<T>,
    config: &ClientConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let identity = Identity::new(args.base_role, args.active_role);
    let session = SessionHandle::new();
    let mut workflow = SudoWorkflow::new(client, config.sudo.clone(), identity, session.clone());

    workflow.open()?;
    let password = match args.password {
        Some(password) => password,
        None => prompt_line("Password: ")?,
    };
    workflow.set_password(password)?;

    match workflow.submit().await? {
        WorkflowState::Elevated => {
            let snapshot = session.snapshot();
            output_success(
                &output_format,
                "Admin privileges enabled",
                Some(json!({ "session": snapshot })),
            )
        }
        _ => Err(anyhow::anyhow!(
            "{}",
            workflow.field_error().unwrap_or("Elevation failed")
        )),
    }
}
