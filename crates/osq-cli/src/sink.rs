//! Ticket sinks: the service desk, and a logging sink for dry runs.

use osq_core::BoxError;
use osq_engine::{Ticket, TicketSink};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::config::TicketConfig;

/// Files each ticket as a customer request on a service desk.
pub struct ServiceDeskSink {
    http: Client,
    url: String,
    service_desk_id: String,
    request_type_id: String,
    email: String,
    api_key: String,
}

impl ServiceDeskSink {
    pub fn from_config(tickets: &TicketConfig) -> Result<Self, BoxError> {
        if tickets.base_url.is_empty() {
            return Err("[tickets] base_url is not set; use --dry-run to only log tickets".into());
        }
        if tickets.email.is_empty() {
            return Err("[tickets] email is not set".into());
        }
        let api_key = std::env::var(&tickets.api_key_env)
            .map_err(|_| format!("no service desk key: set {}", tickets.api_key_env))?;
        Ok(Self {
            http: Client::new(),
            url: format!("{}/rest/servicedeskapi/request", tickets.base_url.trim_end_matches('/')),
            service_desk_id: tickets.service_desk_id.clone(),
            request_type_id: tickets.request_type_id.clone(),
            email: tickets.email.clone(),
            api_key,
        })
    }

    fn payload(&self, ticket: &Ticket) -> Value {
        json!({
            "serviceDeskId": self.service_desk_id,
            "requestTypeId": self.request_type_id,
            "requestFieldValues": {
                "summary": ticket.title,
                "description": ticket.body,
            },
        })
    }
}

impl TicketSink for ServiceDeskSink {
    fn submit(&self, ticket: &Ticket) -> Result<(), BoxError> {
        self.http
            .post(&self.url)
            .basic_auth(&self.email, Some(&self.api_key))
            .json(&self.payload(ticket))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

/// Logs tickets instead of filing them.
#[derive(Debug, Default)]
pub struct LogSink;

impl TicketSink for LogSink {
    fn submit(&self, ticket: &Ticket) -> Result<(), BoxError> {
        info!(title = %ticket.title, body = %ticket.body, "dry run, not filed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> ServiceDeskSink {
        ServiceDeskSink {
            http: Client::new(),
            url: "https://desk.example.org/rest/servicedeskapi/request".into(),
            service_desk_id: "3".into(),
            request_type_id: "17".into(),
            email: "ops@example.org".into(),
            api_key: "k".into(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let ticket = Ticket {
            title: "Server s1 stuck deleting".into(),
            body: "host: hv01".into(),
        };
        assert_eq!(
            sink().payload(&ticket),
            json!({
                "serviceDeskId": "3",
                "requestTypeId": "17",
                "requestFieldValues": {
                    "summary": "Server s1 stuck deleting",
                    "description": "host: hv01",
                },
            })
        );
    }

    #[test]
    fn test_unconfigured_desk_is_rejected() {
        assert!(ServiceDeskSink::from_config(&TicketConfig::default()).is_err());
    }

    #[test]
    fn test_log_sink_accepts_everything() {
        let ticket = Ticket {
            title: "t".into(),
            body: "b".into(),
        };
        assert!(LogSink.submit(&ticket).is_ok());
    }
}
