use std::collections::HashSet;

use gauntlet_ast::types::CallableDecl;

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("callable has an empty name")]
    EmptyName,

    #[error("callable '{callable}' has a parameter with an empty name")]
    EmptyParamName { callable: String },

    #[error("callable '{callable}' declares parameter '{param}' more than once")]
    DuplicateParam { callable: String, param: String },
}

/// Structural checks on a single declaration. Failures skip this callable
/// only; siblings in the unit are unaffected.
pub fn validate_callable(decl: &CallableDecl) -> Result<(), Vec<ValidateError>> {
    let mut errors = Vec::new();

    if decl.name.is_empty() {
        errors.push(ValidateError::EmptyName);
    }

    let mut seen = HashSet::new();
    for param in &decl.params {
        if param.name.is_empty() {
            errors.push(ValidateError::EmptyParamName {
                callable: decl.name.clone(),
            });
            continue;
        }
        if !seen.insert(param.name.as_str()) {
            errors.push(ValidateError::DuplicateParam {
                callable: decl.name.clone(),
                param: param.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
