//! A small in-memory document used by the replay tool and the test suites.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Node 0 is the body sentinel:
//! it is never reported by [`Document::elements`] and focusing it is the same
//! as having no active element.

use super::Document;
use crate::events::{NavEvent, NotificationKind};
use crate::geometry::BoundingBox;
use std::collections::{HashMap, HashSet};

/// Arena index of a node in a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The body sentinel, parent of every top-level element.
    pub const BODY: Self = Self(0);
}

/// Per-node data.
#[derive(Clone, Debug)]
struct NodeData {
    /// Tag name, lowercase.
    tag: String,
    /// Parent node, `None` only for the body.
    parent: Option<NodeId>,
    /// Children in insertion order.
    children: Vec<NodeId>,
    /// Attributes keyed by lowercase name.
    attrs: HashMap<String, String>,
    /// Layout box.
    rect: BoundingBox,
    /// False once the node (or an ancestor) has been detached.
    attached: bool,
}

/// Arena-backed document with explicit layout boxes.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    viewport: BoundingBox,
    active: Option<NodeId>,
    /// Every notification delivered through [`Document::dispatch`].
    event_log: Vec<(NodeId, NotificationKind)>,
    /// Host listeners that cancel a given notification on a given node.
    cancel_listeners: HashSet<(NodeId, NotificationKind)>,
}

impl MemoryDocument {
    /// Create an empty document with the given viewport.
    #[must_use]
    pub fn new(viewport: BoundingBox) -> Self {
        Self {
            nodes: vec![NodeData {
                tag: "body".to_owned(),
                parent: None,
                children: Vec::new(),
                attrs: HashMap::new(),
                rect: viewport,
                attached: true,
            }],
            viewport,
            active: None,
            event_log: Vec::new(),
            cancel_listeners: HashSet::new(),
        }
    }

    /// Append an element as the last child of `parent` (the body when `None`).
    pub fn append_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        rect: BoundingBox,
    ) -> NodeId {
        let parent_id = parent.unwrap_or(NodeId::BODY);
        let id = NodeId(self.nodes.len());
        let attached = self
            .nodes
            .get(parent_id.0)
            .is_some_and(|node| node.attached);
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent_id),
            children: Vec::new(),
            attrs: HashMap::new(),
            rect,
            attached,
        });
        if let Some(node) = self.nodes.get_mut(parent_id.0) {
            node.children.push(id);
        }
        id
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, node: NodeId, name: &str, value: &str) -> Self {
        Document::set_attribute(&mut self, node, name, value);
        self
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attrs.remove(&name.to_ascii_lowercase());
        }
    }

    /// Replace the layout box of a node.
    pub fn set_rect(&mut self, node: NodeId, rect: BoundingBox) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.rect = rect;
        }
    }

    /// Change the viewport.
    pub fn set_viewport(&mut self, viewport: BoundingBox) {
        self.viewport = viewport;
    }

    /// Detach a node and its subtree. Handles stay valid but report detached.
    pub fn detach(&mut self, node: NodeId) {
        if node == NodeId::BODY {
            return;
        }
        if let Some(parent) = self.nodes.get(node.0).and_then(|data| data.parent)
            && let Some(parent_data) = self.nodes.get_mut(parent.0)
        {
            parent_data.children.retain(|child| *child != node);
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(current.0) {
                data.attached = false;
                stack.extend(data.children.iter().copied());
            }
        }
        if self.active.is_some_and(|active| !self.is_attached(active)) {
            self.active = None;
        }
    }

    /// First attached element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Make host listeners on `node` cancel `kind`. Only cancelable
    /// notifications can be canceled.
    pub fn cancel_on(&mut self, node: NodeId, kind: NotificationKind) {
        self.cancel_listeners.insert((node, kind));
    }

    /// Notifications dispatched so far, oldest first.
    pub fn event_log(&self) -> &[(NodeId, NotificationKind)] {
        &self.event_log
    }

    /// Forget logged notifications.
    pub fn clear_event_log(&mut self) {
        self.event_log.clear();
    }

    /// Pre-order walk below `node`.
    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if let Some(data) = self.nodes.get(node.0) {
            for child in &data.children {
                out.push(*child);
                self.collect_subtree(*child, out);
            }
        }
    }

    /// Adjacent sibling of `element`, after it when `forward`.
    fn sibling(&self, element: NodeId, forward: bool) -> Option<NodeId> {
        let parent = self.nodes.get(element.0)?.parent?;
        let siblings = &self.nodes.get(parent.0)?.children;
        let index = siblings.iter().position(|child| *child == element)?;
        if forward {
            siblings.get(index.checked_add(1)?).copied()
        } else {
            siblings.get(index.checked_sub(1)?).copied()
        }
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;

    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_subtree(NodeId::BODY, &mut out);
        out
    }

    fn is_attached(&self, element: NodeId) -> bool {
        element != NodeId::BODY && self.nodes.get(element.0).is_some_and(|data| data.attached)
    }

    fn parent_element(&self, element: NodeId) -> Option<NodeId> {
        self.nodes
            .get(element.0)
            .and_then(|data| data.parent)
            .filter(|parent| *parent != NodeId::BODY)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.sibling(element, false)
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.sibling(element, true)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.nodes
            .get(element.0)
            .map_or("", |data| data.tag.as_str())
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(element.0)
            .and_then(|data| data.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(element.0) {
            data.attrs
                .insert(name.to_ascii_lowercase(), value.to_owned());
        }
    }

    fn bounding_box(&self, element: NodeId) -> BoundingBox {
        self.nodes
            .get(element.0)
            .map_or_else(BoundingBox::default, |data| data.rect)
    }

    fn viewport(&self) -> BoundingBox {
        self.viewport
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn focus(&mut self, element: NodeId) {
        if self.is_attached(element) {
            self.active = Some(element);
        }
    }

    fn blur(&mut self, element: NodeId) {
        if self.active == Some(element) {
            self.active = None;
        }
    }

    fn dispatch(&mut self, target: NodeId, event: &NavEvent<NodeId>) -> bool {
        self.event_log.push((target, event.kind));
        !event.cancelable || !self.cancel_listeners.contains(&(target, event.kind))
    }
}
