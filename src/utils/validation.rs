use crate::config::env::VarSource;
use crate::utils::error::{InvoiceError, Result};
use url::Url;

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(InvoiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(InvoiceError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(InvoiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Resolves every name in `names`; blank values count as missing.
///
/// Returns the values in the same order, or a single
/// [`InvoiceError::MissingConfigError`] naming all missing variables.
pub fn require_vars<const N: usize>(
    source: &dyn VarSource,
    names: [&str; N],
) -> Result<[String; N]> {
    let resolved = names.map(|name| source.var(name).filter(|v| !v.trim().is_empty()));

    let missing: Vec<String> = names
        .iter()
        .zip(resolved.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(InvoiceError::MissingConfigError { fields: missing });
    }

    Ok(resolved.map(Option::unwrap_or_default))
}

/// Optional variable; blank is treated as unset.
pub fn optional_var(source: &dyn VarSource, name: &str) -> Option<String> {
    source.var(name).filter(|v| !v.trim().is_empty())
}
