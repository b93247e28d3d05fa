use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::cli::utils::{output_success, print_fields};
use crate::cli::OutputFormat;
use crate::database::models::RegisterUser;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user inside an existing tenant")]
    Create {
        #[arg(long, help = "Tenant id")]
        tenant_id: Uuid,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email (unique)")]
        email: String,
        #[arg(long, help = "Initial password")]
        password: String,
        #[arg(long, default_value = "sales", help = "Role: admin, sales or manager")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            tenant_id,
            name,
            email,
            password,
            role,
        } => {
            let input: RegisterUser = serde_json::from_value(json!({
                "tenantId": tenant_id,
                "name": name,
                "email": email,
                "password": password,
                "role": role,
            }))
            .map_err(|e| anyhow::anyhow!("Invalid user: {}", e))?;
            input.validate()?;

            let (tenant_id, user) = input.into_parts();
            let profile = state.users.register(tenant_id, user).await?;
            let record = serde_json::to_value(&profile)?;

            output_success(
                output_format,
                &format!("User '{}' created", profile.email),
                Some(json!({ "user": record })),
            )?;
            if output_format == OutputFormat::Text {
                print_fields(&record, &["id", "tenantId", "role", "status"]);
            }
            Ok(())
        }
    }
}
