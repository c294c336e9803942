pub mod parts;
pub mod request;
pub mod response;
pub mod window;

pub use parts::*;
pub use request::*;
pub use response::*;
pub use window::*;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Upstream content-part encoding dialect.
///
/// The two targeted backends accept the same `{model, messages}` envelope but
/// disagree on how parts and roles are spelled inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Typed parts: `{"type":"text"}` / `{"type":"image_url"}`, role "assistant"
    #[default]
    OpenAi,
    /// Bare parts: `{"text"}` (trimmed) / `{"inlineData"}`, role preserved
    Inline,
}

impl std::str::FromStr for Dialect {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(Dialect::OpenAi),
            "inline" => Ok(Dialect::Inline),
            other => Err(RelayError::ConfigError(format!(
                "Unknown dialect: {other}. Expected \"openai\" or \"inline\""
            ))),
        }
    }
}

/// Maps a caller role onto the upstream role name for the given dialect.
pub fn upstream_role(role: &str, dialect: Dialect) -> Result<&'static str> {
    match (role, dialect) {
        ("user", _) => Ok("user"),
        ("model", Dialect::OpenAi) => Ok("assistant"),
        ("model", Dialect::Inline) => Ok("model"),
        (other, _) => Err(RelayError::InvalidRequest(format!("Invalid role: {other}"))),
    }
}
