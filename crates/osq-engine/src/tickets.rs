//! # Tickets
//!
//! Every record a check matches becomes one ticket, rendered from a
//! title/body template with `{property}` placeholders. Submission goes
//! through a [`TicketSink`] supplied by the caller.

use std::sync::OnceLock;

use osq_core::BoxError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::query::ResultRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTemplate {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub title: String,
    pub body: String,
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"))
}

/// Substitute `{name}` with the record's value; unknown or null values
/// render as `null`.
fn fill(template: &str, record: &ResultRecord) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| match record.get(&caps[1]) {
            None | Some(Value::Null) => "null".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}

impl TicketTemplate {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn render(&self, record: &ResultRecord) -> Ticket {
        Ticket {
            title: fill(&self.title, record),
            body: fill(&self.body, record),
        }
    }
}

/// Files tickets somewhere (a service desk, a log).
pub trait TicketSink {
    fn submit(&self, ticket: &Ticket) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub submitted: usize,
    pub failed: usize,
}

/// Submit every ticket. One failure is logged and counted; the rest are
/// still attempted.
pub fn dispatch(tickets: &[Ticket], sink: &dyn TicketSink) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    if tickets.is_empty() {
        info!("no issues found");
        return summary;
    }
    for ticket in tickets {
        match sink.submit(ticket) {
            Ok(()) => {
                summary.submitted += 1;
                info!(title = %ticket.title, "ticket submitted");
            }
            Err(e) => {
                summary.failed += 1;
                error!(title = %ticket.title, error = %e, "ticket submission failed");
            }
        }
    }
    summary
}
