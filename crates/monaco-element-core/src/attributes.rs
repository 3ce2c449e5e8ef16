//! Parsing of the custom element's HTML attributes.

use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::layout::bound_from_px;
use crate::state::{DEFAULT_LANGUAGE, DEFAULT_THEME};

/// Attributes the element observes.
pub const OBSERVED_ATTRIBUTES: [&str; 7] = [
    "value",
    "language",
    "theme",
    "autogrow",
    "max-height",
    "min-height",
    "lib-path",
];

/// A parsed attribute write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeChange {
    Value(String),
    Language(SmolStr),
    Theme(SmolStr),
    Autogrow(bool),
    MaxHeight(Option<u32>),
    MinHeight(Option<u32>),
    LibPath(Option<String>),
}

/// Parse an attribute change as delivered by `attributeChangedCallback`.
///
/// `None` means the attribute was removed, which restores the default.
/// Returns `Ok(None)` for attributes the element does not observe.
pub fn parse_attribute(
    name: &str,
    value: Option<&str>,
) -> Result<Option<AttributeChange>, ConfigError> {
    let change = match name {
        "value" => AttributeChange::Value(value.unwrap_or_default().to_owned()),
        "language" => AttributeChange::Language(identifier(value, DEFAULT_LANGUAGE)),
        "theme" => AttributeChange::Theme(identifier(value, DEFAULT_THEME)),
        // Boolean attribute: present means on, except an explicit "false".
        "autogrow" => AttributeChange::Autogrow(matches!(value, Some(v) if v != "false")),
        "max-height" => AttributeChange::MaxHeight(height_bound("max-height", value)?),
        "min-height" => AttributeChange::MinHeight(height_bound("min-height", value)?),
        "lib-path" => AttributeChange::LibPath(
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
        ),
        _ => return Ok(None),
    };
    Ok(Some(change))
}

fn identifier(value: Option<&str>, default: &'static str) -> SmolStr {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => SmolStr::new(v),
        _ => SmolStr::new_static(default),
    }
}

fn height_bound(attribute: &'static str, value: Option<&str>) -> Result<Option<u32>, ConfigError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    let px: f64 = raw.parse().map_err(|_| ConfigError::InvalidAttribute {
        attribute,
        value: raw.to_owned(),
    })?;
    if !px.is_finite() {
        return Err(ConfigError::InvalidAttribute {
            attribute,
            value: raw.to_owned(),
        });
    }
    Ok(bound_from_px(px))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_attributes_restore_defaults() {
        assert_eq!(
            parse_attribute("language", None).unwrap(),
            Some(AttributeChange::Language("javascript".into()))
        );
        assert_eq!(
            parse_attribute("theme", Some("")).unwrap(),
            Some(AttributeChange::Theme("vs-dark".into()))
        );
        assert_eq!(
            parse_attribute("value", None).unwrap(),
            Some(AttributeChange::Value(String::new()))
        );
    }

    #[test]
    fn test_autogrow_is_boolean_attribute() {
        assert_eq!(
            parse_attribute("autogrow", Some("")).unwrap(),
            Some(AttributeChange::Autogrow(true))
        );
        assert_eq!(
            parse_attribute("autogrow", Some("false")).unwrap(),
            Some(AttributeChange::Autogrow(false))
        );
        assert_eq!(
            parse_attribute("autogrow", None).unwrap(),
            Some(AttributeChange::Autogrow(false))
        );
    }

    #[test]
    fn test_height_bounds() {
        assert_eq!(
            parse_attribute("max-height", Some("300")).unwrap(),
            Some(AttributeChange::MaxHeight(Some(300)))
        );
        assert_eq!(
            parse_attribute("min-height", Some("50px")).unwrap(),
            Some(AttributeChange::MinHeight(Some(50)))
        );
        assert_eq!(
            parse_attribute("max-height", Some("-1")).unwrap(),
            Some(AttributeChange::MaxHeight(None))
        );
        assert!(matches!(
            parse_attribute("max-height", Some("tall")),
            Err(ConfigError::InvalidAttribute { attribute: "max-height", .. })
        ));
    }

    #[test]
    fn test_unobserved_attribute() {
        assert_eq!(parse_attribute("class", Some("x")).unwrap(), None);
    }

    #[test]
    fn test_lib_path() {
        assert_eq!(
            parse_attribute("lib-path", Some(" /vs ")).unwrap(),
            Some(AttributeChange::LibPath(Some("/vs".into())))
        );
        assert_eq!(
            parse_attribute("lib-path", None).unwrap(),
            Some(AttributeChange::LibPath(None))
        );
    }
}
