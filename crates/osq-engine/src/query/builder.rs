//! Query Builder: validates filter conditions and decides, per condition,
//! whether the listing call or the client-side stage will satisfy it.

use chrono::{DateTime, Utc};
use osq_core::{Preset, Property, QueryError, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::args::FilterArgs;
use crate::handlers::{ClientSideHandlers, ServerSideHandler};
use crate::lister::NativeFilters;
use crate::resources::QueryResource;

/// Which stage satisfies a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Server,
    Client,
}

/// One validated (property, preset, arguments) filter. Immutable once
/// attached, apart from being demoted to client-side evaluation.
#[derive(Debug, Clone)]
pub struct FilterCondition<P> {
    pub property: P,
    pub preset: Preset,
    pub args: FilterArgs,
    native: Option<NativeFilters>,
}

impl<P: Property> FilterCondition<P> {
    pub fn resolution(&self) -> Resolution {
        if self.native.is_some() {
            Resolution::Server
        } else {
            Resolution::Client
        }
    }

    /// Native filters folded for this condition, if resolved server-side.
    pub fn native(&self) -> Option<&NativeFilters> {
        self.native.as_ref()
    }
}

pub struct QueryBuilder<R: QueryResource> {
    client: ClientSideHandlers<R::Prop>,
    server: ServerSideHandler<R::Prop>,
    conditions: Vec<FilterCondition<R::Prop>>,
    raw: NativeFilters,
    server_side: bool,
    now: DateTime<Utc>,
}

impl<R: QueryResource> QueryBuilder<R> {
    pub fn new(now: DateTime<Utc>) -> Self {
        let mut client = R::client_side_handlers();
        client.set_now(now);
        Self {
            client,
            server: R::server_side_handler(),
            conditions: Vec::new(),
            raw: NativeFilters::new(),
            server_side: true,
            now,
        }
    }

    /// Disabling server-side resolution demotes every folded condition.
    pub fn set_server_side(&mut self, enabled: bool) {
        self.server_side = enabled;
        if !enabled {
            for condition in &mut self.conditions {
                condition.native = None;
            }
        }
    }

    /// Attach a preset-based filter. Fails fast on an unsupported preset
    /// or malformed arguments; nothing is attached on error.
    pub fn add_filter(&mut self, property: R::Prop, preset: Preset, raw_args: &Value) -> Result<()> {
        if !self.client.check_supported(preset, property) {
            return Err(QueryError::UnsupportedPreset {
                resource: R::RESOURCE_TYPE,
                property: property.name().to_string(),
                preset,
            });
        }
        let mut args = FilterArgs::parse(preset, raw_args)?;
        if let FilterArgs::Age(age) = &mut args {
            age.format.get_or_insert_with(|| R::TIMESTAMP_FORMAT.to_string());
        }

        let native = if self.server_side {
            self.server.translate(preset, property, &args, self.now)
        } else {
            None
        };
        let native = match native {
            Some(fragment) if self.collides(&fragment) => {
                debug!(%property, %preset, "native key already in use; evaluating client-side");
                None
            }
            other => other,
        };
        let condition = FilterCondition {
            property,
            preset,
            args,
            native,
        };
        debug!(%property, %preset, resolution = ?condition.resolution(), "filter attached");
        self.conditions.push(condition);
        Ok(())
    }

    /// Pass a native filter straight through to the lister. A folded
    /// condition using the same key with another value is demoted.
    pub fn add_native(&mut self, key: String, value: Value) {
        for condition in &mut self.conditions {
            let clash = condition
                .native
                .as_ref()
                .and_then(|fragment| fragment.get(&key))
                .map_or(false, |folded| *folded != value);
            if clash {
                warn!(
                    key = %key,
                    property = %condition.property,
                    preset = %condition.preset,
                    "raw filter overrides a pushed-down condition; evaluating it client-side"
                );
                condition.native = None;
            }
        }
        self.raw.insert(key, value);
    }

    fn collides(&self, fragment: &NativeFilters) -> bool {
        let folded = self.native_filters();
        fragment
            .iter()
            .any(|(key, value)| folded.get(key).map_or(false, |existing| existing != value))
    }

    /// Raw filters plus every folded fragment.
    pub fn native_filters(&self) -> NativeFilters {
        let mut filters = self.raw.clone();
        for fragment in self.conditions.iter().filter_map(|c| c.native.as_ref()) {
            for (key, value) in fragment {
                filters.insert(key.clone(), value.clone());
            }
        }
        filters
    }

    pub fn conditions(&self) -> &[FilterCondition<R::Prop>] {
        &self.conditions
    }

    /// Conditions the client-side stage must evaluate. With `recheck` the
    /// pushed-down ones are evaluated again.
    pub fn client_conditions(&self, recheck: bool) -> Vec<&FilterCondition<R::Prop>> {
        self.conditions
            .iter()
            .filter(|c| recheck || c.resolution() == Resolution::Client)
            .collect()
    }

    pub fn handlers(&self) -> &ClientSideHandlers<R::Prop> {
        &self.client
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{FloatingIp, FloatingIpProperty, Server, ServerProperty};
    use chrono::TimeZone;
    use osq_core::{DateTimePreset, IntegerPreset, StringPreset};
    use serde_json::json;

    fn builder() -> QueryBuilder<Server> {
        QueryBuilder::new(Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap())
    }

    const ANY_IN: Preset = Preset::String(StringPreset::AnyIn);

    #[test]
    fn test_kind_mismatch_is_unsupported_at_build_time() {
        let mut b = builder();
        let err = b
            .add_filter(ServerProperty::Status, IntegerPreset::LessThan.into(), &json!(3))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedPreset { .. }));
        assert!(b.conditions().is_empty());
    }

    #[test]
    fn test_single_value_is_pushed_down() {
        let mut b = builder();
        b.add_filter(ServerProperty::Status, ANY_IN, &json!(["ACTIVE"])).unwrap();
        b.add_filter(ServerProperty::Name, ANY_IN, &json!(["web"])).unwrap();
        assert_eq!(b.conditions()[0].resolution(), Resolution::Server);
        assert_eq!(b.conditions()[1].resolution(), Resolution::Client);
        assert_eq!(b.native_filters().get("status"), Some(&json!("ACTIVE")));
        assert_eq!(b.client_conditions(false).len(), 1);
        assert_eq!(b.client_conditions(true).len(), 2);
    }

    #[test]
    fn test_second_condition_on_same_key_stays_client_side() {
        let mut b = builder();
        b.add_filter(ServerProperty::Status, ANY_IN, &json!(["ACTIVE"])).unwrap();
        b.add_filter(ServerProperty::Status, ANY_IN, &json!(["ERROR"])).unwrap();
        assert_eq!(b.conditions()[1].resolution(), Resolution::Client);
        assert_eq!(b.native_filters().get("status"), Some(&json!("ACTIVE")));
    }

    #[test]
    fn test_raw_filter_demotes_colliding_condition() {
        let mut b = builder();
        b.add_filter(ServerProperty::Status, ANY_IN, &json!(["ACTIVE"])).unwrap();
        b.add_native("status".to_string(), json!("SHUTOFF"));
        assert_eq!(b.conditions()[0].resolution(), Resolution::Client);
        assert_eq!(b.native_filters().get("status"), Some(&json!("SHUTOFF")));
    }

    #[test]
    fn test_datetime_cutoff_and_default_format() {
        let mut fips = QueryBuilder::<FloatingIp>::new(Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap());
        fips.add_filter(FloatingIpProperty::UpdatedAt, DateTimePreset::YoungerThanOrEqual.into(), &json!(20))
            .unwrap();
        assert_eq!(
            fips.native_filters().get("changes_since"),
            Some(&json!("2021-07-12T00:00:00Z"))
        );

        let mut b = builder();
        b.add_filter(ServerProperty::UpdatedAt, DateTimePreset::OlderThan.into(), &json!(20))
            .unwrap();
        assert_eq!(b.conditions()[0].resolution(), Resolution::Client);
        assert!(b.native_filters().is_empty());
        match &b.conditions()[0].args {
            FilterArgs::Age(age) => assert_eq!(age.format.as_deref(), Some(Server::TIMESTAMP_FORMAT)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_disabling_server_side_demotes_everything() {
        let mut b = builder();
        b.add_filter(ServerProperty::Status, ANY_IN, &json!(["ACTIVE"])).unwrap();
        b.set_server_side(false);
        b.add_filter(ServerProperty::UserId, ANY_IN, &json!(["u1"])).unwrap();
        assert!(b.native_filters().is_empty());
        assert!(b.conditions().iter().all(|c| c.resolution() == Resolution::Client));
    }

    #[test]
    fn test_bad_arguments_fail_fast() {
        let mut b = builder();
        assert!(matches!(
            b.add_filter(ServerProperty::Status, ANY_IN, &json!([])),
            Err(QueryError::MissingMandatoryParam { .. })
        ));
        assert!(matches!(
            b.add_filter(ServerProperty::Name, StringPreset::MatchesRegex.into(), &json!("(")),
            Err(QueryError::InvalidArgument { .. })
        ));
        assert!(b.conditions().is_empty());
    }
}
