//! Field rules applied by `init`, interactively and from flags.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Outcome of a single rule: `Err` carries the reason shown to the user.
pub type Check = Result<(), String>;

pub fn validate_name(name: &str) -> Check {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err("name must not contain whitespace or path separators".to_string());
    }
    Ok(())
}

/// `MAJOR.MINOR.PATCH` with an optional pre-release/build suffix.
pub fn validate_version(version: &str) -> Check {
    static SEMVER: OnceLock<Regex> = OnceLock::new();
    let re = SEMVER.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.\-+]+)?$").expect("static regex")
    });
    if re.is_match(version.trim()) {
        Ok(())
    } else {
        Err(format!(
            "'{}' is not a semantic version (expected e.g. 1.0.0)",
            version
        ))
    }
}

/// The entrypoint must exist relative to the project root.
pub fn validate_entrypoint(root: &Path, entrypoint: &str) -> Check {
    if entrypoint.trim().is_empty() {
        return Err("entrypoint must not be empty".to_string());
    }
    let path = root.join(entrypoint);
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("entrypoint '{}' does not exist in {}", entrypoint, root.display()))
    }
}

/// A finite price; JSON has no representation for NaN or infinity.
pub fn validate_amount(amount: &str) -> Result<f64, String> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{}' is not a number", amount))
}

/// Empty is allowed at init time; push requires a URL later.
pub fn validate_repository_url(url: &str) -> Check {
    let url = url.trim();
    if url.is_empty()
        || url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("git@")
    {
        Ok(())
    } else {
        Err(format!("'{}' is not an http(s) or git@ repository URL", url))
    }
}
