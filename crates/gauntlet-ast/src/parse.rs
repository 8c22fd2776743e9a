use crate::types::SourceUnit;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_unit(json: &str) -> Result<SourceUnit, ParseError> {
    Ok(serde_json::from_str(json)?)
}
