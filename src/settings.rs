use serde::{Deserialize, Serialize};

use crate::error::Error;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Re-attach comments and pragmas to the declarations and statements
    /// that follow them.
    #[serde(default = "default_true")]
    pub attach_comments: bool,
    /// Keep the successful files of a batch even when another file failed.
    #[serde(default)]
    pub keep_partial: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            attach_comments: true,
            keep_partial: false,
        }
    }
}

/// Example settings JSON embedded as a constant.
pub const EXAMPLE_SETTINGS_JSON: &str = r#"{
  "attach_comments": true,
  "keep_partial": false
}"#;

/// Parse a settings JSON string. Missing fields take their defaults; an
/// empty (or blank) string yields the defaults as well.
pub fn parse_settings_from_text(s: &str) -> Result<Settings, Error> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_json::from_str::<Settings>(trimmed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_settings_json_parses() {
        let s = parse_settings_from_text(EXAMPLE_SETTINGS_JSON).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s = parse_settings_from_text(r#"{ "keep_partial": true }"#).unwrap();
        assert!(s.attach_comments);
        assert!(s.keep_partial);
        assert_eq!(parse_settings_from_text("  ").unwrap(), Settings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_settings_from_text(r#"{ "attach_coments": false }"#).unwrap_err();
        assert_eq!(err.kind(), "SettingsError");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_settings_from_text("{ attach_comments: "),
            Err(Error::Settings(_))
        ));
    }
}
