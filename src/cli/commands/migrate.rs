use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{Collection, PgStore};
use serde_json::json;

pub async fn handle(store: &PgStore, output_format: OutputFormat) -> anyhow::Result<()> {
    store.migrate().await?;

    let collections: Vec<&str> = Collection::ALL.iter().map(|c| c.name()).collect();
    output_success(
        output_format,
        &format!("Schema ready ({})", collections.join(", ")),
        Some(json!({ "collections": collections })),
    )
}
