use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message, with `data` merged into the JSON object form.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print `key: value` lines for the scalar fields of a record.
pub fn print_fields(record: &Value, fields: &[&str]) {
    for field in fields {
        match record.get(*field) {
            Some(Value::String(s)) => println!("  {:<10} {}", format!("{}:", field), s),
            Some(Value::Null) | None => {}
            Some(other) => println!("  {:<10} {}", format!("{}:", field), other),
        }
    }
}
