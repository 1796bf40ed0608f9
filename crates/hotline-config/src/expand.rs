//! Environment variable expansion for configuration strings.

use std::env::VarError;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` is the config field path used in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| {
            let message = match e.cause {
                VarError::NotPresent => format!("${{{}}} not set", e.var_name),
                VarError::NotUnicode(_) => format!("${{{}}} is not valid unicode", e.var_name),
            };
            ConfigError::EnvVar {
                field: field.to_owned(),
                message,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(
            expand_env("http://127.0.0.1:7979", "client.url").unwrap(),
            "http://127.0.0.1:7979"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        let value = expand_env(
            "http://${HOTLINE_EXPAND_TEST_UNSET_HOST:-localhost}:8080",
            "client.url",
        )
        .unwrap();

        assert_eq!(value, "http://localhost:8080");
    }

    #[test]
    fn test_missing_var_names_field() {
        let err = expand_env("${HOTLINE_EXPAND_TEST_MISSING}", "reload.command").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("reload.command"));
        assert!(message.contains("HOTLINE_EXPAND_TEST_MISSING"));
    }
}
