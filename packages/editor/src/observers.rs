//! Change notifications for views attached to a document.

use std::fmt;
use std::rc::Rc;

use csledit_tree::Node;
use serde::Serialize;

use crate::commands::Position;

/// Something that happened to the stored style
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StyleEvent {
    /// A whole new style was loaded
    NewStyle,

    #[serde(rename_all = "camelCase")]
    AddNode {
        parent_id: usize,
        position: usize,
        node: Node,
        nodes_added: isize,
    },

    #[serde(rename_all = "camelCase")]
    DeleteNode { id: usize, nodes_deleted: usize },

    #[serde(rename_all = "camelCase")]
    AmendNode { id: usize, node: Node },

    #[serde(rename_all = "camelCase")]
    MoveNode {
        from_id: usize,
        to_id: usize,
        position: Position,
    },

    /// Node content changed; anything rendered from the style is stale
    FormatCitations,
}

impl StyleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StyleEvent::NewStyle => "newStyle",
            StyleEvent::AddNode { .. } => "addNode",
            StyleEvent::DeleteNode { .. } => "deleteNode",
            StyleEvent::AmendNode { .. } => "amendNode",
            StyleEvent::MoveNode { .. } => "moveNode",
            StyleEvent::FormatCitations => "formatCitations",
        }
    }
}

/// View or controller interested in style changes
pub trait StyleObserver {
    fn on_style_changed(&self, event: &StyleEvent);
}

impl<F> StyleObserver for F
where
    F: Fn(&StyleEvent),
{
    fn on_style_changed(&self, event: &StyleEvent) {
        self(event)
    }
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered set of observers with an on/off switch.
///
/// While disabled, events are dropped, not queued.
pub struct ObserverRegistry {
    observers: Vec<(ObserverId, Rc<dyn StyleObserver>)>,
    next_id: u64,
    enabled: bool,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
            enabled: true,
        }
    }

    pub fn add(&mut self, observer: Rc<dyn StyleObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if `id` was not registered
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch delivery on or off, returning the previous setting
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.enabled, enabled)
    }

    /// Deliver to every observer in registration order
    pub fn emit(&self, event: &StyleEvent) {
        if !self.enabled {
            return;
        }
        for (_, observer) in &self.observers {
            observer.on_style_changed(event);
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Rc<dyn StyleObserver> {
        let log = Rc::clone(log);
        Rc::new(move |event: &StyleEvent| {
            log.borrow_mut().push(format!("{}:{}", tag, event.name()));
        })
    }

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.add(recorder(&log, "a"));
        registry.add(recorder(&log, "b"));

        registry.emit(&StyleEvent::NewStyle);
        assert_eq!(*log.borrow(), vec!["a:newStyle", "b:newStyle"]);
    }

    #[test]
    fn test_disabled_registry_drops_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.add(recorder(&log, "a"));

        assert!(registry.set_enabled(false));
        registry.emit(&StyleEvent::FormatCitations);
        assert!(!registry.set_enabled(true));
        registry.emit(&StyleEvent::NewStyle);

        // Nothing buffered while disabled
        assert_eq!(*log.borrow(), vec!["a:newStyle"]);
    }

    #[test]
    fn test_remove_by_handle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        let a = registry.add(recorder(&log, "a"));
        registry.add(recorder(&log, "b"));

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        registry.emit(&StyleEvent::FormatCitations);

        assert_eq!(*log.borrow(), vec!["b:formatCitations"]);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_event_wire_format() {
        let event = StyleEvent::DeleteNode {
            id: 3,
            nodes_deleted: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "deleteNode");
        assert_eq!(json["nodesDeleted"], 2);
    }
}
