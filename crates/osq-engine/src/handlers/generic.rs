use osq_core::{Preset, Property, Result, ValueKind};
use serde_json::Value;

use super::{mismatched, ClientSideHandler, PresetMappings};
use crate::args::FilterArgs;

/// Equality-based membership, valid on any property kind.
#[derive(Debug, Clone)]
pub struct GenericHandler<P> {
    pub(crate) mappings: PresetMappings<P>,
}

impl<P: Property> GenericHandler<P> {
    pub fn new(mappings: PresetMappings<P>) -> Self {
        Self { mappings }
    }
}

impl<P: Property> ClientSideHandler<P> for GenericHandler<P> {
    fn kind(&self) -> ValueKind {
        ValueKind::Generic
    }

    fn mappings(&self) -> &PresetMappings<P> {
        &self.mappings
    }

    fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool> {
        let (Preset::Generic(membership), FilterArgs::Values(list)) = (preset, args) else {
            return Err(mismatched(preset, "generic membership"));
        };
        // Exact JSON equality, null included.
        Ok(membership.matches(list, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osq_core::{GenericPreset, QueryError};
    use serde_json::json;

    osq_core::define_properties! {
        enum Prop for Project {
            Enabled => "enabled": Generic,
        }
    }

    fn handler() -> GenericHandler<Prop> {
        GenericHandler::new(PresetMappings::for_kind(ValueKind::Generic))
    }

    fn eval(preset: GenericPreset, value: Value, list: Value) -> bool {
        let args = FilterArgs::parse(preset.into(), &list).unwrap();
        handler().evaluate(preset.into(), &value, &args).unwrap()
    }

    #[test]
    fn test_any_in_is_exact_membership() {
        assert!(eval(GenericPreset::AnyIn, json!(true), json!([true])));
        assert!(eval(GenericPreset::AnyIn, json!(3), json!([1, 2, 3])));
        assert!(!eval(GenericPreset::AnyIn, json!("3"), json!([1, 2, 3])));
    }

    #[test]
    fn test_not_any_in_negates_any_in() {
        let values = [json!(null), json!(true), json!("a"), json!(1), json!({"id": "x"})];
        let lists = [json!([true]), json!(["a", 1]), json!([null]), json!([{"id": "x"}])];
        for v in &values {
            for l in &lists {
                assert_eq!(
                    eval(GenericPreset::NotAnyIn, v.clone(), l.clone()),
                    !eval(GenericPreset::AnyIn, v.clone(), l.clone())
                );
            }
        }
    }

    #[test]
    fn test_wrong_argument_shape() {
        let err = handler()
            .evaluate(GenericPreset::AnyIn.into(), &json!(1), &FilterArgs::Threshold(1))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }));
    }
}
