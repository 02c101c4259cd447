//! # Trust Router Daemon - Community Routing and Request Admission
//!
//! ## Purpose
//!
//! Wires the community table, filter engine and TRP codec into a running
//! router: applies received updates, decides which TID requests to serve,
//! builds advertisements for peers, expires stale memberships and answers
//! monitoring queries.
//!
//! ## Architecture Role
//!
//! ```mermaid
//! graph LR
//!     Peer[TRP peer] -->|update bytes| Update[update::handle_update]
//!     Update -->|trp_inbound| State[(RouterState)]
//!     Client[TID client] -->|TidRequest| Tid[tid::admit_tid_request]
//!     Tid -->|tid_inbound + membership| State
//!     State -->|trp_outbound| Advertise[advertise::outbound_records]
//!     Sweeper[sweeper task] -->|sweep_expired| State
//!     Monitor[monitor::MonitorHandlers] -->|to_json| State
//! ```
//!
//! Transport (GSS-authenticated connections, peer sessions) is outside this
//! crate; handlers take bytes or parsed requests and return decisions.

pub mod advertise;
pub mod error;
pub mod monitor;
pub mod state;
pub mod sweeper;
pub mod tid;
pub mod update;

pub use advertise::{outbound_records, outbound_update};
pub use error::{Result, RouterError};
pub use monitor::{MonitorCommand, MonitorHandler, MonitorHandlers};
pub use state::RouterState;
pub use sweeper::{spawn_sweeper, sweep_once, SweepStats};
pub use tid::{admit_tid_request, TidDecision};
pub use update::{handle_update, UpdateSummary};
