use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("branch name cannot be empty")]
    Empty,
    #[error("branch name cannot start with '{character}'")]
    InvalidFirstCharacter { character: char },
    #[error("branch name contains invalid character {character:?}")]
    InvalidCharacter { character: char },
    #[error("branch name contains invalid sequence '{sequence}'")]
    InvalidSequence { sequence: &'static str },
    #[error("branch name cannot end with '{suffix}'")]
    InvalidSuffix { suffix: &'static str },
    #[error("branch name component cannot start with '.'")]
    HiddenComponent,
}

/// Checks a local branch name against git's ref-name rules before it is
/// passed to any git command line.
pub fn validate_branch_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    if name == "@" {
        return Err(NameError::InvalidCharacter { character: '@' });
    }

    let first = name.chars().next().ok_or(NameError::Empty)?;
    if first == '-' || first == '/' {
        return Err(NameError::InvalidFirstCharacter { character: first });
    }

    for character in name.chars() {
        if character.is_ascii_control()
            || matches!(character, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        {
            return Err(NameError::InvalidCharacter { character });
        }
    }

    for sequence in ["..", "@{", "//"] {
        if name.contains(sequence) {
            return Err(NameError::InvalidSequence { sequence });
        }
    }

    for suffix in [".lock", "/", "."] {
        if name.ends_with(suffix) {
            return Err(NameError::InvalidSuffix { suffix });
        }
    }

    if name.split('/').any(|component| component.starts_with('.')) {
        return Err(NameError::HiddenComponent);
    }

    Ok(())
}
