use clap::Subcommand;
use serde_json::json;
use validator::Validate;

use crate::app::AppState;
use crate::cli::utils::{output_success, print_fields};
use crate::cli::OutputFormat;
use crate::database::models::NewTenant;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Create new tenant")]
    Create {
        #[arg(long, help = "Tenant name")]
        name: String,
        #[arg(long, help = "Contact email (unique)")]
        email: String,
        #[arg(long, help = "Domain (unique when set)")]
        domain: Option<String>,
        #[arg(long, default_value = "free", help = "Plan: free, pro or enterprise")]
        plan: String,
    },
}

pub async fn handle(cmd: TenantCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Create {
            name,
            email,
            domain,
            plan,
        } => {
            let input: NewTenant = serde_json::from_value(json!({
                "name": name,
                "email": email,
                "domain": domain,
                "plan": plan,
            }))
            .map_err(|e| anyhow::anyhow!("Invalid tenant: {}", e))?;
            input.validate()?;

            let tenant = state.tenants.create(input).await?;
            let record = serde_json::to_value(&tenant)?;

            output_success(
                output_format,
                &format!("Tenant '{}' created", tenant.name),
                Some(json!({ "tenant": record })),
            )?;
            if output_format == OutputFormat::Text {
                print_fields(&record, &["id", "email", "domain", "plan"]);
            }
            Ok(())
        }
    }
}
