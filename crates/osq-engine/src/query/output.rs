//! Query Output: projection into ordered records, grouping and rendering.

use std::collections::BTreeMap;

use osq_core::{Property, ResourceType};
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

use super::runner::QueryRunner;
use crate::resources::QueryResource;

/// Requested property name → value, in requested order.
pub type ResultRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultBody {
    Flat(Vec<ResultRecord>),
    /// Keyed by the rendered group value; null renders as "".
    Grouped(BTreeMap<String, Vec<ResultRecord>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResults {
    pub resource: ResourceType,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(rename = "results")]
    pub body: ResultBody,
}

impl QueryResults {
    pub fn len(&self) -> usize {
        match &self.body {
            ResultBody::Flat(records) => records.len(),
            ResultBody::Grouped(groups) => groups.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record; grouped results are walked in key order.
    pub fn records(&self) -> Vec<&ResultRecord> {
        match &self.body {
            ResultBody::Flat(records) => records.iter().collect(),
            ResultBody::Grouped(groups) => groups.values().flatten().collect(),
        }
    }

    /// One table, or one titled table per group.
    pub fn render(&self, pretty: bool) -> String {
        match &self.body {
            ResultBody::Flat(records) => render_table(&self.columns, records, pretty),
            ResultBody::Grouped(groups) => {
                let title = self.group_by.as_deref().unwrap_or("group");
                groups
                    .iter()
                    .map(|(key, records)| {
                        let key = if key.is_empty() { "(none)" } else { key.as_str() };
                        format!("{}: {}\n{}", title, key, render_table(&self.columns, records, pretty))
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn render_table(columns: &[String], records: &[ResultRecord], pretty: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for record in records {
        builder.push_record(columns.iter().map(|c| cell(record.get(c))));
    }
    let mut table = builder.build();
    if pretty {
        table.with(Style::modern());
    } else {
        table.with(Style::psql());
    }
    table.to_string()
}

/// Rendered group key: strings verbatim, null as "", anything else as JSON.
pub fn group_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct QueryOutput<P> {
    columns: Vec<P>,
    group_by: Option<P>,
}

impl<P: Property> Default for QueryOutput<P> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            group_by: None,
        }
    }
}

impl<P: Property> QueryOutput<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append output columns; repeats are collapsed to their first position.
    pub fn select(&mut self, props: impl IntoIterator<Item = P>) {
        for prop in props {
            if !self.columns.contains(&prop) {
                self.columns.push(prop);
            }
        }
    }

    pub fn set_group_by(&mut self, prop: P) {
        self.group_by = Some(prop);
    }

    pub fn group_by(&self) -> Option<P> {
        self.group_by
    }

    pub fn columns<R: QueryResource<Prop = P>>(&self) -> &[P] {
        if self.columns.is_empty() {
            R::DEFAULT_COLUMNS
        } else {
            &self.columns
        }
    }

    pub fn project<R: QueryResource<Prop = P>>(
        &self,
        resources: &[R],
        runner: &mut QueryRunner<'_>,
    ) -> Vec<ResultRecord> {
        let columns = self.columns::<R>();
        let mut records = Vec::with_capacity(resources.len());
        for resource in resources {
            let mut record = ResultRecord::new();
            for prop in columns {
                record.insert(prop.name().to_string(), runner.value(resource, *prop));
            }
            records.push(record);
        }
        records
    }

    /// Partition projected records by the group-by property, which need
    /// not be one of the output columns.
    pub fn group<R: QueryResource<Prop = P>>(
        &self,
        prop: P,
        resources: &[R],
        records: Vec<ResultRecord>,
        runner: &mut QueryRunner<'_>,
    ) -> BTreeMap<String, Vec<ResultRecord>> {
        let mut groups: BTreeMap<String, Vec<ResultRecord>> = BTreeMap::new();
        for (resource, record) in resources.iter().zip(records) {
            let key = group_key(&runner.value(resource, prop));
            groups.entry(key).or_default().push(record);
        }
        groups
    }

    pub fn results<R: QueryResource<Prop = P>>(&self, body: ResultBody) -> QueryResults {
        QueryResults {
            resource: R::RESOURCE_TYPE,
            columns: self.columns::<R>().iter().map(|p| p.name().to_string()).collect(),
            group_by: self.group_by.map(|p| p.name().to_string()),
            body,
        }
    }
}
