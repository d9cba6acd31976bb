use osq_core::{Preset, Property, Result, StringPreset, ValueKind};
use serde_json::Value;

use super::{mismatched, ClientSideHandler, PresetMappings};
use crate::args::FilterArgs;

/// Pattern and literal membership tests on string properties.
#[derive(Debug, Clone)]
pub struct StringHandler<P> {
    pub(crate) mappings: PresetMappings<P>,
}

impl<P: Property> StringHandler<P> {
    pub fn new(mappings: PresetMappings<P>) -> Self {
        Self { mappings }
    }
}

impl<P: Property> ClientSideHandler<P> for StringHandler<P> {
    fn kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn mappings(&self) -> &PresetMappings<P> {
        &self.mappings
    }

    fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool> {
        match (preset, args) {
            (Preset::String(StringPreset::MatchesRegex), FilterArgs::Pattern(re)) => {
                // Anchored at the start only; trailing text may follow the match.
                Ok(value
                    .as_str()
                    .and_then(|s| re.find(s))
                    .map_or(false, |m| m.start() == 0))
            }
            (Preset::String(p), FilterArgs::Values(list)) => match p.membership() {
                Some(membership) => Ok(membership.matches(list, value)),
                None => Err(mismatched(preset, "a regex pattern")),
            },
            _ => Err(mismatched(preset, "string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    osq_core::define_properties! {
        enum Prop for Server {
            Name => "name": String,
        }
    }

    fn eval(preset: StringPreset, value: Value, raw: Value) -> bool {
        let args = FilterArgs::parse(preset.into(), &raw).unwrap();
        StringHandler::<Prop>::new(PresetMappings::for_kind(ValueKind::String))
            .evaluate(preset.into(), &value, &args)
            .unwrap()
    }

    #[test]
    fn test_regex_matches_at_start_only() {
        assert!(eval(StringPreset::MatchesRegex, json!("web-01"), json!("web")));
        assert!(eval(StringPreset::MatchesRegex, json!("web-01"), json!("web-\\d+$")));
        assert!(!eval(StringPreset::MatchesRegex, json!("my-web-01"), json!("web")));
    }

    #[test]
    fn test_regex_needs_a_string_value() {
        assert!(!eval(StringPreset::MatchesRegex, Value::Null, json!(".*")));
        assert!(!eval(StringPreset::MatchesRegex, json!(42), json!("4")));
    }

    #[test]
    fn test_membership() {
        assert!(eval(StringPreset::AnyIn, json!("ERROR"), json!(["ERROR", "SHUTOFF"])));
        assert!(!eval(StringPreset::AnyIn, json!("error"), json!(["ERROR"])));
        assert!(eval(StringPreset::NotAnyIn, json!("ACTIVE"), json!(["ERROR"])));
        assert!(eval(StringPreset::NotAnyIn, Value::Null, json!(["ERROR"])));
    }
}
