//! In-memory document surface.
//!
//! [`StaticPage`] is a flat, serde-loadable snapshot of a page: a node
//! list in document order with geometry and computed-style flags. It
//! implements every capability trait the engine consumes, records the
//! synthetic events dispatched on it, and stores mounted overlay markers
//! so tests and the CLI harness can assert on the full session outcome
//! without a rendered page.
//!
//! # Selector support
//!
//! A deliberate subset of CSS: comma-separated lists of compound
//! selectors built from a tag name (or `*`), `#id`, `.class`, `[attr]`
//! and `[attr=value]` (value optionally quoted). No combinators. This
//! covers every selector in the builtin site table; anything the parser
//! does not understand is a [`SelectorError`], which the scanner treats
//! as an empty scan.
//!
//! Attribute values containing `,` or `]` are outside the subset: the
//! list is split on commas before brackets are parsed, so a selector
//! like `[data-x="a,b"]` is rejected as malformed rather than matched.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ClickError, SelectorError};
use crate::surface::{
    DocumentQuery, InputSynthesis, Layout, MarkerId, NodeId, OverlayHost, Point, Rect, Size,
};

/// One element in the page snapshot. Vec order is document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    /// Lowercase tag name ("a", "button", "div", ...).
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Viewport-relative bounding box.
    pub rect: Rect,
    /// Computed `display: none` on this node itself.
    #[serde(default, skip_serializing_if = "is_false")]
    pub display_none: bool,
    /// Computed `visibility: hidden` on this node itself.
    #[serde(default, skip_serializing_if = "is_false")]
    pub visibility_hidden: bool,
    /// Index of the parent node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    /// Whether focusing this node puts the user in a text-editing
    /// context (inputs, textareas, content-editable regions).
    #[serde(default, skip_serializing_if = "is_false")]
    pub editable: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl PageNode {
    /// A node with just a tag and a bounding box; everything else off.
    #[must_use]
    pub fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            rect,
            display_none: false,
            visibility_hidden: false,
            parent: None,
            editable: false,
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent.0);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visibility_hidden = true;
        self
    }

    #[must_use]
    pub fn undisplayed(mut self) -> Self {
        self.display_none = true;
        self
    }

    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }
}

/// A mounted overlay marker, as the host would render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    /// Full display text (normalized case).
    pub text: String,
    pub center: Point,
    /// Typed portion, rendered de-emphasized.
    pub matched: String,
    /// Untyped remainder, rendered emphasized.
    pub rest: String,
    pub hidden: bool,
}

/// A synthetic event dispatched through [`InputSynthesis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntheticEvent {
    /// Native primary activation of a node.
    Activate { node: NodeId },
    /// Cancelable, bubbling secondary-button event at a point.
    ContextMenu { node: NodeId, point: Point },
}

/// Serializable page snapshot, the JSON fixture format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub viewport: Size,
    pub nodes: Vec<PageNode>,
    /// Index of the initially focused node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<u32>,
}

/// An in-memory document implementing the full surface contract.
#[derive(Debug)]
pub struct StaticPage {
    url: Option<String>,
    viewport: Size,
    nodes: Vec<PageNode>,
    focused: Option<NodeId>,
    detached: HashSet<NodeId>,
    container_created: bool,
    markers: Vec<Marker>,
    next_marker: u32,
    events: Vec<SyntheticEvent>,
}

impl StaticPage {
    /// An empty page with the given viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            url: None,
            viewport,
            nodes: Vec::new(),
            focused: None,
            detached: HashSet::new(),
            container_created: false,
            markers: Vec::new(),
            next_marker: 0,
            events: Vec::new(),
        }
    }

    /// Build a page from a deserialized fixture.
    #[must_use]
    pub fn from_fixture(fixture: PageFixture) -> Self {
        let focused = fixture.focused.map(NodeId);
        Self {
            url: fixture.url,
            viewport: fixture.viewport,
            nodes: fixture.nodes,
            focused,
            detached: HashSet::new(),
            container_created: false,
            markers: Vec::new(),
            next_marker: 0,
            events: Vec::new(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Append a node; returns its handle. Document order is push order.
    pub fn push(&mut self, node: PageNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() as u32 - 1)
    }

    /// Move focus to a node (or clear it with `None`).
    pub fn focus(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    /// Simulate the node being removed from the document after scan time.
    pub fn detach(&mut self, node: NodeId) {
        self.detached.insert(node);
    }

    /// The node behind a handle, unless it was detached.
    pub fn get(&self, id: NodeId) -> Option<&PageNode> {
        self.node(id)
    }

    /// Mounted markers, in mount order. Cleared markers are gone.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Markers currently visible (mounted and not hidden).
    pub fn visible_markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(|m| !m.hidden)
    }

    /// Whether the shared marker container has ever been created.
    pub fn container_created(&self) -> bool {
        self.container_created
    }

    /// Synthetic events dispatched so far, in order.
    pub fn events(&self) -> &[SyntheticEvent] {
        &self.events
    }

    fn node(&self, id: NodeId) -> Option<&PageNode> {
        if self.detached.contains(&id) {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Whether `node` is a descendant of `root` (strict).
    fn is_descendant_of(&self, node: NodeId, root: NodeId) -> bool {
        let mut current = self.nodes.get(node.0 as usize).and_then(|n| n.parent);
        while let Some(p) = current {
            if p == root.0 {
                return true;
            }
            current = self.nodes.get(p as usize).and_then(|n| n.parent);
        }
        false
    }

    fn matching_nodes(
        &self,
        selector: &str,
        root: Option<NodeId>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let compounds = parse_selector_list(selector)?;
        let mut out = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId(idx as u32);
            if self.detached.contains(&id) {
                continue;
            }
            if let Some(root) = root {
                if !self.is_descendant_of(id, root) {
                    continue;
                }
            }
            if compounds.iter().any(|c| c.matches(node)) {
                out.push(id);
            }
        }
        Ok(out)
    }
}

impl DocumentQuery for StaticPage {
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.matching_nodes(selector, None)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.matching_nodes(selector, Some(root))
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        // Render-tree attachment: display:none on the node or any
        // ancestor takes the whole subtree out of layout.
        let Some(mut current) = self.node(node) else {
            return false;
        };
        loop {
            if current.display_none {
                return false;
            }
            match current.parent {
                Some(p) => match self.nodes.get(p as usize) {
                    Some(parent) => current = parent,
                    None => return true,
                },
                None => return true,
            }
        }
    }

    fn active_element_is_editable(&self) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        let Some(node) = self.node(id) else {
            return false;
        };
        node.editable
            || matches!(node.tag.as_str(), "input" | "textarea")
            || node.attrs.contains_key("contenteditable")
    }
}

impl Layout for StaticPage {
    fn bounding_box(&self, node: NodeId) -> Rect {
        self.node(node)
            .map_or(Rect::new(0.0, 0.0, 0.0, 0.0), |n| n.rect)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn display_none(&self, node: NodeId) -> bool {
        !self.is_rendered(node)
    }

    fn visibility_hidden(&self, node: NodeId) -> bool {
        // visibility inherits; the nearest explicit flag on the ancestor
        // chain decides. No flag anywhere means visible.
        let mut current = self.node(node);
        while let Some(n) = current {
            if n.visibility_hidden {
                return true;
            }
            current = n.parent.and_then(|p| self.nodes.get(p as usize));
        }
        false
    }
}

impl OverlayHost for StaticPage {
    fn mount_marker(&mut self, text: &str, center: Point) -> MarkerId {
        self.container_created = true;
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.push(Marker {
            id,
            text: text.to_string(),
            center,
            matched: String::new(),
            rest: text.to_string(),
            hidden: false,
        });
        id
    }

    fn set_marker_match(&mut self, marker: MarkerId, matched: &str, rest: &str) {
        if let Some(m) = self.markers.iter_mut().find(|m| m.id == marker) {
            m.matched = matched.to_string();
            m.rest = rest.to_string();
            m.hidden = false;
        }
    }

    fn set_marker_hidden(&mut self, marker: MarkerId, hidden: bool) {
        if let Some(m) = self.markers.iter_mut().find(|m| m.id == marker) {
            m.hidden = hidden;
        }
    }

    fn clear_markers(&mut self) {
        // Empties the container; the container itself stays for reuse.
        self.markers.clear();
    }
}

impl InputSynthesis for StaticPage {
    fn activate(&mut self, node: NodeId) -> Result<(), ClickError> {
        if self.node(node).is_none() {
            return Err(ClickError::TargetDetached(node));
        }
        self.events.push(SyntheticEvent::Activate { node });
        Ok(())
    }

    fn dispatch_context_menu(&mut self, node: NodeId, point: Point) -> Result<(), ClickError> {
        if self.node(node).is_none() {
            return Err(ClickError::TargetDetached(node));
        }
        self.events.push(SyntheticEvent::ContextMenu { node, point });
        Ok(())
    }
}

// ============================================================================
// Selector parsing
// ============================================================================

/// One compound selector: `tag#id.class[attr=value]`.
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    universal: bool,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    /// (name, required value). `None` value means presence-only `[attr]`.
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, node: &PageNode) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        for class in &self.classes {
            if !node.classes.iter().any(|c| c == class) {
                return false;
            }
        }
        for (name, value) in &self.attrs {
            match (node.attrs.get(name), value) {
                (Some(actual), Some(expected)) if actual == expected => {}
                (Some(_), None) => {}
                _ => return false,
            }
        }
        true
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_selector_list(input: &str) -> Result<Vec<Compound>, SelectorError> {
    let mut out = Vec::new();
    for part in input.split(',') {
        out.push(parse_compound(part.trim(), input)?);
    }
    Ok(out)
}

fn parse_compound(part: &str, whole: &str) -> Result<Compound, SelectorError> {
    if part.is_empty() {
        return Err(SelectorError::new(whole, "empty selector in list"));
    }
    let mut compound = Compound::default();
    let mut chars = part.char_indices().peekable();

    // Optional leading tag name or universal selector
    if let Some(&(_, c)) = chars.peek() {
        if c == '*' {
            compound.universal = true;
            chars.next();
        } else if c.is_ascii_alphabetic() {
            let name = take_name(&mut chars);
            compound.tag = Some(name.to_ascii_lowercase());
        }
    }

    while let Some((idx, c)) = chars.next() {
        match c {
            '#' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(SelectorError::new(whole, "'#' with no id"));
                }
                compound.id = Some(name);
            }
            '.' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(SelectorError::new(whole, "'.' with no class name"));
                }
                compound.classes.push(name);
            }
            '[' => {
                let close = part[idx + 1..]
                    .find(']')
                    .ok_or_else(|| SelectorError::new(whole, "unclosed attribute bracket"))?;
                let body = &part[idx + 1..idx + 1 + close];
                compound.attrs.push(parse_attr(body, whole)?);
                // Skip past the consumed bracket body
                while let Some(&(j, _)) = chars.peek() {
                    if j > idx + close {
                        break;
                    }
                    chars.next();
                }
                chars.next(); // the ']'
            }
            _ if c.is_whitespace() => {
                return Err(SelectorError::new(whole, "combinators are not supported"));
            }
            _ => {
                return Err(SelectorError::new(
                    whole,
                    format!("unexpected character '{}'", c),
                ));
            }
        }
    }

    if compound == Compound::default() {
        return Err(SelectorError::new(whole, "selector matches nothing"));
    }
    Ok(compound)
}

fn take_name(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if is_name_char(c) {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn parse_attr(body: &str, whole: &str) -> Result<(String, Option<String>), SelectorError> {
    match body.split_once('=') {
        None => {
            if body.is_empty() || !body.chars().all(is_name_char) {
                return Err(SelectorError::new(whole, "bad attribute name"));
            }
            Ok((body.to_string(), None))
        }
        Some((name, value)) => {
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(SelectorError::new(whole, "bad attribute name"));
            }
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok((name.to_string(), Some(value.to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(nodes: Vec<PageNode>) -> StaticPage {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        for node in nodes {
            page.push(node);
        }
        page
    }

    fn rect() -> Rect {
        Rect::new(10.0, 10.0, 100.0, 20.0)
    }

    #[test]
    fn tag_selector_matches_in_document_order() {
        let page = page_with(vec![
            PageNode::new("a", rect()).with_attr("href", "/x"),
            PageNode::new("div", rect()),
            PageNode::new("a", rect()).with_attr("href", "/y"),
        ]);
        let hits = page.query_all("a").unwrap();
        assert_eq!(hits, vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn selector_list_deduplicates() {
        let page = page_with(vec![PageNode::new("a", rect()).with_attr("href", "/x")]);
        // Matches both halves of the list, but appears once
        let hits = page.query_all("a, a[href]").unwrap();
        assert_eq!(hits, vec![NodeId(0)]);
    }

    #[test]
    fn attribute_selectors() {
        let page = page_with(vec![
            PageNode::new("a", rect()),
            PageNode::new("a", rect()).with_attr("href", "/x"),
            PageNode::new("div", rect()).with_attr("role", "button"),
        ]);
        assert_eq!(page.query_all("a[href]").unwrap(), vec![NodeId(1)]);
        assert_eq!(
            page.query_all("[role=\"button\"]").unwrap(),
            vec![NodeId(2)]
        );
        assert_eq!(page.query_all("[role=button]").unwrap(), vec![NodeId(2)]);
    }

    #[test]
    fn id_and_class_selectors() {
        let page = page_with(vec![
            PageNode::new("a", rect()).with_id("thumbnail"),
            PageNode::new("div", rect()).with_class("menu").with_class("open"),
        ]);
        assert_eq!(page.query_all("a#thumbnail").unwrap(), vec![NodeId(0)]);
        assert_eq!(page.query_all(".menu.open").unwrap(), vec![NodeId(1)]);
        assert!(page.query_all("#missing").unwrap().is_empty());
    }

    #[test]
    fn universal_selector_matches_everything() {
        let page = page_with(vec![PageNode::new("a", rect()), PageNode::new("div", rect())]);
        assert_eq!(page.query_all("*").unwrap().len(), 2);
        assert_eq!(page.query_all("*[role=x]").unwrap().len(), 0);
    }

    #[test]
    fn malformed_selectors_error() {
        let page = page_with(vec![PageNode::new("a", rect())]);
        assert!(page.query_all("a[href").is_err());
        assert!(page.query_all("a, ").is_err());
        assert!(page.query_all("div p").is_err());
        assert!(page.query_all(".").is_err());
        assert!(page.query_all("a >").is_err());
    }

    #[test]
    fn attr_value_with_comma_is_outside_the_subset() {
        // The list splits on commas before brackets are parsed, so a
        // comma inside an attribute value is rejected, not matched.
        let page = page_with(vec![PageNode::new("div", rect()).with_attr("data-x", "a,b")]);
        assert!(page.query_all("[data-x=\"a,b\"]").is_err());
    }

    #[test]
    fn query_within_restricts_to_descendants() {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        let menu = page.push(PageNode::new("div", rect()).with_class("menu"));
        let inner = PageNode::new("a", rect())
            .with_attr("href", "/in")
            .with_parent(menu);
        let inside = page.push(inner);
        page.push(PageNode::new("a", rect()).with_attr("href", "/out"));

        let hits = page.query_within(menu, "a[href]").unwrap();
        assert_eq!(hits, vec![inside]);
    }

    #[test]
    fn is_rendered_respects_ancestor_display() {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        let hidden_root = page.push(PageNode::new("div", rect()).undisplayed());
        let child = page.push(PageNode::new("a", rect()).with_parent(hidden_root));
        let free = page.push(PageNode::new("a", rect()));

        assert!(!page.is_rendered(hidden_root));
        assert!(!page.is_rendered(child));
        assert!(page.is_rendered(free));
    }

    #[test]
    fn visibility_inherits_from_ancestors() {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        let root = page.push(PageNode::new("div", rect()).hidden());
        let child = page.push(PageNode::new("a", rect()).with_parent(root));
        assert!(page.visibility_hidden(child));
    }

    #[test]
    fn editable_focus_detection() {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        let input = page.push(PageNode::new("input", rect()));
        let link = page.push(PageNode::new("a", rect()));
        let editor = page.push(PageNode::new("div", rect()).with_attr("contenteditable", "true"));

        assert!(!page.active_element_is_editable());
        page.focus(Some(input));
        assert!(page.active_element_is_editable());
        page.focus(Some(link));
        assert!(!page.active_element_is_editable());
        page.focus(Some(editor));
        assert!(page.active_element_is_editable());
    }

    #[test]
    fn detached_nodes_fail_activation() {
        let mut page = page_with(vec![PageNode::new("button", rect())]);
        let node = NodeId(0);
        page.detach(node);
        assert!(matches!(
            page.activate(node),
            Err(ClickError::TargetDetached(_))
        ));
        assert!(page.events().is_empty());
    }

    #[test]
    fn markers_clear_but_container_survives() {
        let mut page = page_with(vec![]);
        let center = Point { x: 5.0, y: 5.0 };
        page.mount_marker("A", center);
        page.mount_marker("S", center);
        assert_eq!(page.markers().len(), 2);

        page.clear_markers();
        assert!(page.markers().is_empty());
        assert!(page.container_created());
    }

    #[test]
    fn fixture_round_trip() {
        let json = r#"{
            "viewport": {"width": 800.0, "height": 600.0},
            "url": "https://example.org/",
            "nodes": [
                {"tag": "a", "attrs": {"href": "/x"}, "rect": {"x": 1.0, "y": 2.0, "width": 30.0, "height": 10.0}}
            ]
        }"#;
        let fixture: PageFixture = serde_json::from_str(json).unwrap();
        let page = StaticPage::from_fixture(fixture);
        assert_eq!(page.url(), Some("https://example.org/"));
        assert_eq!(page.query_all("a[href]").unwrap(), vec![NodeId(0)]);
    }
}
