//! Status indicators: visual projection of the last status each agent reported.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::agent::{AgentId, StatusValue};

/// Class every indicator carries regardless of status.
pub const BASE_CLASS: &str = "status-indicator";

/// A single indicator element: a set of visual classes plus a tooltip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndicatorElement {
    pub classes: BTreeSet<String>,
    pub title: String,
}

impl IndicatorElement {
    pub fn new() -> Self {
        let mut classes = BTreeSet::new();
        classes.insert(BASE_CLASS.to_string());
        Self {
            classes,
            title: String::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Status classes currently applied. At most one after any update.
    pub fn status_classes(&self) -> Vec<&str> {
        StatusValue::ALL
            .iter()
            .map(|s| s.css_class())
            .filter(|c| self.classes.contains(*c))
            .collect()
    }

    /// The status this element currently shows, if any.
    pub fn current_status(&self) -> Option<StatusValue> {
        StatusValue::ALL
            .into_iter()
            .find(|s| self.classes.contains(s.css_class()))
    }

    fn apply(&mut self, agent: AgentId, status: StatusValue) {
        for s in StatusValue::ALL {
            self.classes.remove(s.css_class());
        }
        self.classes.insert(status.css_class().to_string());
        self.title = tooltip(agent, status);
    }
}

/// Tooltip text for an agent in a given status.
pub fn tooltip(agent: AgentId, status: StatusValue) -> String {
    format!("{} is {}", agent.display_name(), status)
}

/// Indicator elements keyed by agent. Agents without an element are ignored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorBoard {
    elements: BTreeMap<AgentId, IndicatorElement>,
}

impl IndicatorBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with one fresh element for each given agent.
    pub fn with_agents(agents: impl IntoIterator<Item = AgentId>) -> Self {
        let mut board = Self::new();
        for agent in agents {
            board.attach(agent, IndicatorElement::new());
        }
        board
    }

    pub fn attach(&mut self, agent: AgentId, element: IndicatorElement) {
        self.elements.insert(agent, element);
    }

    pub fn element(&self, agent: AgentId) -> Option<&IndicatorElement> {
        self.elements.get(&agent)
    }

    /// Reflect `status` on the agent's indicator.
    ///
    /// Returns `false` (and changes nothing) when the agent has no element.
    pub fn update_status(&mut self, agent: AgentId, status: StatusValue) -> bool {
        match self.elements.get_mut(&agent) {
            Some(element) => {
                element.apply(agent, status);
                tracing::debug!(agent = %agent, status = %status, "Status indicator updated");
                true
            }
            None => {
                tracing::debug!(agent = %agent, "No status indicator for agent");
                false
            }
        }
    }

    /// Current status per agent with an element, in agent order.
    pub fn snapshot(&self) -> Vec<(AgentId, Option<StatusValue>, String)> {
        self.elements
            .iter()
            .map(|(agent, el)| (*agent, el.current_status(), el.title.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_single_status_class() {
        let mut board = IndicatorBoard::with_agents([AgentId::Lee]);

        assert!(board.update_status(AgentId::Lee, StatusValue::Online));
        assert!(board.update_status(AgentId::Lee, StatusValue::Busy));

        let el = board.element(AgentId::Lee).unwrap();
        assert_eq!(el.status_classes(), vec!["status-busy"]);
        assert_eq!(el.current_status(), Some(StatusValue::Busy));
        assert!(el.title.contains("Lee"));
        assert!(el.title.contains("busy"));
    }

    #[test]
    fn test_every_transition_is_allowed() {
        let mut board = IndicatorBoard::with_agents(AgentId::ALL);
        for from in StatusValue::ALL {
            for to in StatusValue::ALL {
                board.update_status(AgentId::Nicole, from);
                board.update_status(AgentId::Nicole, to);
                let el = board.element(AgentId::Nicole).unwrap();
                assert_eq!(el.status_classes(), vec![to.css_class()]);
            }
        }
    }

    #[test]
    fn test_other_classes_are_kept() {
        let mut element = IndicatorElement::new();
        element.classes.insert("pulse".to_string());
        let mut board = IndicatorBoard::new();
        board.attach(AgentId::Tim, element);

        board.update_status(AgentId::Tim, StatusValue::Away);

        let el = board.element(AgentId::Tim).unwrap();
        assert!(el.has_class("pulse"));
        assert!(el.has_class(BASE_CLASS));
        assert!(el.has_class("status-away"));
        assert_eq!(el.title, "Tim is away");
    }

    #[test]
    fn test_missing_element_is_noop() {
        let mut board = IndicatorBoard::with_agents([AgentId::Lee]);
        assert!(!board.update_status(AgentId::Leonard, StatusValue::Offline));
        assert!(board.element(AgentId::Leonard).is_none());
        assert_eq!(board.element(AgentId::Lee).unwrap().current_status(), None);
    }

    #[test]
    fn test_snapshot_lists_elements() {
        let mut board = IndicatorBoard::with_agents([AgentId::Tim, AgentId::Lee]);
        board.update_status(AgentId::Tim, StatusValue::Online);
        let snap = board.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].0, AgentId::Lee);
        assert_eq!(snap[1], (AgentId::Tim, Some(StatusValue::Online), "Tim is online".to_string()));
    }
}
