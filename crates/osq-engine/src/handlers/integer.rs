use osq_core::{Preset, Property, Result, ValueKind};
use serde_json::Value;

use super::{mismatched, ClientSideHandler, PresetMappings};
use crate::args::FilterArgs;

/// Relational comparison of an integer property against a threshold.
#[derive(Debug, Clone)]
pub struct IntegerHandler<P> {
    pub(crate) mappings: PresetMappings<P>,
}

impl<P: Property> IntegerHandler<P> {
    pub fn new(mappings: PresetMappings<P>) -> Self {
        Self { mappings }
    }
}

impl<P: Property> ClientSideHandler<P> for IntegerHandler<P> {
    fn kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn mappings(&self) -> &PresetMappings<P> {
        &self.mappings
    }

    fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool> {
        let (Preset::Integer(op), FilterArgs::Threshold(threshold)) = (preset, args) else {
            return Err(mismatched(preset, "integer threshold"));
        };
        Ok(as_integer(value).map_or(false, |v| op.compare(v, *threshold)))
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osq_core::IntegerPreset;
    use serde_json::json;

    osq_core::define_properties! {
        enum Prop for VolumeSnapshot {
            Size => "size": Integer,
        }
    }

    fn eval(op: IntegerPreset, value: Value, threshold: i64) -> bool {
        IntegerHandler::<Prop>::new(PresetMappings::for_kind(ValueKind::Integer))
            .evaluate(op.into(), &value, &FilterArgs::Threshold(threshold))
            .unwrap()
    }

    #[test]
    fn test_relational_presets_partition() {
        for v in -2i64..=2 {
            for t in -2i64..=2 {
                assert_eq!(eval(IntegerPreset::LessThan, json!(v), t), v < t);
                assert_eq!(eval(IntegerPreset::LessOrEqual, json!(v), t), v < t || v == t);
                assert_eq!(eval(IntegerPreset::GreaterThan, json!(v), t), v > t);
                assert_eq!(eval(IntegerPreset::GreaterOrEqual, json!(v), t), v > t || v == t);
            }
        }
    }

    #[test]
    fn test_non_integer_values_never_match() {
        for op in IntegerPreset::ALL {
            assert!(!eval(op, Value::Null, 0));
            assert!(!eval(op, json!("large"), 0));
            assert!(!eval(op, json!([1]), 0));
        }
        assert!(eval(IntegerPreset::GreaterThan, json!("12"), 10));
    }
}
