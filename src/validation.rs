use crate::error::{RelayError, Result};
use crate::models::gemini::GenerateRequest;

/// Validate an inbound request before any window extraction or dispatch.
pub fn validate_generate_request(req: &GenerateRequest) -> Result<()> {
    if req.contents.is_empty() {
        return Err(RelayError::InvalidRequest(
            "No contents provided".to_string(),
        ));
    }

    for content in &req.contents {
        if content.role != "user" && content.role != "model" {
            return Err(RelayError::InvalidRequest(format!(
                "Invalid role: {}. Expected \"user\" or \"model\"",
                content.role
            )));
        }
    }

    Ok(())
}
