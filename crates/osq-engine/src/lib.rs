//! # osq-engine
//!
//! Preset-driven queries over OpenStack resources.
//!
//! A caller picks a resource type, attaches filters as (property, preset,
//! arguments) and raw native filters, and runs the query against a
//! [`ResourceLister`]. Conditions the listing call can satisfy natively are
//! pushed down; everything is re-evaluated client-side by default, so the
//! remote filter is only ever an optimization. Matches are projected into
//! ordered records, optionally grouped, and rendered as tables or JSON.
//!
//! ```text
//! Query<R> ──► QueryBuilder ──► native filters ──► ResourceLister
//!                  │                                     │
//!                  └── client conditions ──► QueryRunner ◄┘
//!                                                │
//!                                 LookupCache ◄──┤
//!                                                ▼
//!                                           QueryOutput ──► QueryResults
//! ```
//!
//! [`checks`] builds the operational anomaly checks on top of queries and
//! turns their matches into [`tickets`].

pub mod args;
pub mod checks;
pub mod handlers;
pub mod lister;
pub mod lookup;
pub mod memory;
pub mod query;
pub mod resources;
pub mod tickets;

pub use args::{AgeArgs, FilterArgs};
pub use checks::{validate_checks, Check, CheckParams, CheckReport};
pub use lister::{AuxiliaryLookup, NativeFilters, NoLookup, ResourceLister};
pub use memory::MemoryLister;
pub use query::{
    FilterSpec, Query, QueryOptions, QueryRequest, QueryResults, ResultBody, ResultRecord,
};
pub use resources::{describe_type, validate_registries, PropertyInfo, QueryResource};
pub use tickets::{dispatch, DispatchSummary, Ticket, TicketSink, TicketTemplate};
