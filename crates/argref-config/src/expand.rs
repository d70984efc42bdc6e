//! Environment variable expansion for configuration strings.
//!
//! Only braced references are expanded. A bare `$` is ordinary URL text
//! (`?$filter=`), so `$VAR` without braces stays literal.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// `field` names the config field in error messages. An unclosed `${` is
/// kept as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    // Fast path: no expansion needed
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let end = start + len + 1;
        result.push_str(&rest[..start]);
        result.push_str(&expand_reference(&rest[start..end], field)?);
        rest = &rest[end..];
    }
    result.push_str(rest);

    Ok(result)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, UnsetVar> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(UnsetVar {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct UnsetVar {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passthrough() {
        assert_eq!(
            expand_env("https://x/<num>", "f").unwrap(),
            "https://x/<num>"
        );
    }

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ARGREF_EXPAND_TEST_ORG", "acme");
        }

        assert_eq!(
            expand_env("https://github.com/${ARGREF_EXPAND_TEST_ORG}/issues/<num>", "f").unwrap(),
            "https://github.com/acme/issues/<num>"
        );

        unsafe {
            std::env::remove_var("ARGREF_EXPAND_TEST_ORG");
        }
    }

    #[test]
    fn test_expand_default() {
        assert_eq!(
            expand_env("${ARGREF_EXPAND_TEST_UNSET:-https://x}/<num>", "f").unwrap(),
            "https://x/<num>"
        );
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ARGREF_EXPAND_TEST_BARE", "oops");
        }

        assert_eq!(
            expand_env("https://x/api?$filter=<num>&v=$ARGREF_EXPAND_TEST_BARE", "f").unwrap(),
            "https://x/api?$filter=<num>&v=$ARGREF_EXPAND_TEST_BARE"
        );

        unsafe {
            std::env::remove_var("ARGREF_EXPAND_TEST_BARE");
        }
    }

    #[test]
    fn test_bare_dollar_next_to_braced_var() {
        assert_eq!(
            expand_env("${ARGREF_EXPAND_TEST_HOST:-https://x}/api?$top=1&id=<num>", "f").unwrap(),
            "https://x/api?$top=1&id=<num>"
        );
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        assert_eq!(expand_env("https://x/${oops/<num>", "f").unwrap(), "https://x/${oops/<num>");
    }

    #[test]
    fn test_expand_missing_var() {
        let err = expand_env("${ARGREF_EXPAND_TEST_MISSING}/<num>", "autolinks[0].target_url")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("ARGREF_EXPAND_TEST_MISSING"));
        assert!(msg.contains("autolinks[0].target_url"));
    }
}
