//! Monitoring handlers
//!
//! Read-only JSON views of router state, looked up by command. The registry
//! starts with the built-in views and accepts more at runtime.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::state::RouterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorCommand {
    ShowCommunities,
    ShowRealms,
    ShowFilters,
}

impl MonitorCommand {
    pub const ALL: [MonitorCommand; 3] = [
        MonitorCommand::ShowCommunities,
        MonitorCommand::ShowRealms,
        MonitorCommand::ShowFilters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorCommand::ShowCommunities => "show_communities",
            MonitorCommand::ShowRealms => "show_realms",
            MonitorCommand::ShowFilters => "show_filters",
        }
    }
}

impl FromStr for MonitorCommand {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        MonitorCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RouterError::UnknownMonitorCommand(s.to_string()))
    }
}

impl fmt::Display for MonitorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type MonitorHandler = Box<dyn Fn(&RouterState) -> Value + Send + Sync>;

#[derive(Default)]
pub struct MonitorHandlers {
    handlers: HashMap<MonitorCommand, MonitorHandler>,
}

impl MonitorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in views.
    pub fn with_defaults() -> Self {
        let mut handlers = Self::new();
        handlers.register(MonitorCommand::ShowCommunities, |state| state.table().to_json());
        handlers.register(MonitorCommand::ShowRealms, |state| state.table().realms().to_json());
        handlers.register(MonitorCommand::ShowFilters, |state| state.filters().to_json());
        handlers
    }

    /// Install `handler` for `command`, replacing any previous one.
    pub fn register<F>(&mut self, command: MonitorCommand, handler: F)
    where
        F: Fn(&RouterState) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(command, Box::new(handler));
    }

    pub fn handle(&self, command: MonitorCommand, state: &RouterState) -> Result<Value> {
        let handler = self
            .handlers
            .get(&command)
            .ok_or_else(|| RouterError::UnknownMonitorCommand(command.to_string()))?;
        debug!("Monitoring request: {}", command);
        Ok(json!({ "command": command.as_str(), "response": handler(state) }))
    }

    /// Parse a command name and handle it.
    pub fn dispatch(&self, command: &str, state: &RouterState) -> Result<Value> {
        self.handle(command.parse()?, state)
    }
}

impl fmt::Debug for MonitorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorHandlers")
            .field("commands", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use community::CommunityTable;
    use filter::FilterSet;
    use router_config::{populate_table, CommunityConfig};

    fn state() -> RouterState {
        let mut table = CommunityTable::new();
        let comm = CommunityConfig {
            id: "coi.alpha".to_string(),
            comm_type: "coi".to_string(),
            apcs: vec![],
            owner_realm: None,
            owner_contact: None,
            expiration_interval: Some(30),
            idp_realms: vec!["idp.example.org".to_string()],
            rp_realms: vec![],
        };
        populate_table(&[comm], 0, &mut table).unwrap();
        RouterState::new("tr.local.org", 3, table, FilterSet::new())
    }

    #[test]
    fn test_default_views() {
        let state = state();
        let handlers = MonitorHandlers::with_defaults();

        let comms = handlers.dispatch("show_communities", &state).unwrap();
        assert_eq!(comms["response"][0]["name"], "coi.alpha");
        assert_eq!(comms["response"][0]["memberships"][0]["realm"], "idp.example.org");

        let realms = handlers.handle(MonitorCommand::ShowRealms, &state).unwrap();
        assert_eq!(realms["response"]["idp_realms"][0]["realm"], "idp.example.org");

        let filters = handlers.handle(MonitorCommand::ShowFilters, &state).unwrap();
        assert_eq!(filters["command"], "show_filters");
    }

    #[test]
    fn test_unknown_and_unregistered_commands() {
        let state = state();
        let handlers = MonitorHandlers::new();
        assert!(matches!(
            handlers.dispatch("show_peers", &state),
            Err(RouterError::UnknownMonitorCommand(_))
        ));
        assert!(handlers.handle(MonitorCommand::ShowRealms, &state).is_err());
    }

    #[test]
    fn test_register_replaces_handler() {
        let state = state();
        let mut handlers = MonitorHandlers::with_defaults();
        handlers.register(MonitorCommand::ShowRealms, |state| json!(state.hostname()));
        let value = handlers.handle(MonitorCommand::ShowRealms, &state).unwrap();
        assert_eq!(value["response"], "tr.local.org");
    }
}
