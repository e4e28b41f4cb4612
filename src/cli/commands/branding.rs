//! Check-Branding Command
//!
//! Validate a customization file without generating anything. Every invalid
//! field is reported, not just the first.

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::read_json;
use crate::document::CustomizationOptions;
use crate::types::{LeadError, Result};

pub async fn run(path: &Path, format: &str) -> Result<()> {
    let options: CustomizationOptions = read_json(path).await?;
    let errors = options.validate_all();

    if format == "json" {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "valid": errors.is_empty(),
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let out = Output::new();
        if errors.is_empty() {
            out.success(&format!("{} is valid", path.display()));
        }
        for error in &errors {
            out.error(&error.to_string());
        }
    }

    match errors.into_iter().next() {
        Some(first) => Err(LeadError::Validation(first)),
        None => Ok(()),
    }
}
