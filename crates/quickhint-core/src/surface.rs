//! Capability traits for the host document surface.
//!
//! The engine never touches a real rendered page directly. Everything it
//! needs from the host — selector queries, layout reads, overlay marker
//! nodes, synthetic click dispatch — goes through the narrow traits in
//! this module, so tests and the CLI harness can substitute
//! [`StaticPage`](crate::page::StaticPage) for a live document.
//!
//! The traits are deliberately split by concern:
//!
//! | Trait | Consumed by |
//! |-------|-------------|
//! | [`DocumentQuery`] | scanner, dispatcher focus guard |
//! | [`Layout`] | scanner visibility filter, overlay placement, click |
//! | [`OverlayHost`] | overlay renderer |
//! | [`InputSynthesis`] | click executor |

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

/// Opaque handle to an element in the host document.
///
/// Ordering follows document order: a node with a smaller id precedes one
/// with a larger id in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Opaque handle to a mounted overlay marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u32);

/// A point in viewport coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// An element's bounding box, viewport-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Whether the box has positive rendered area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether the box lies fully inside a viewport of the given size.
    ///
    /// Partially clipped boxes do not count: all four edges must be
    /// within bounds.
    #[must_use]
    pub fn inside_viewport(&self, viewport: Size) -> bool {
        self.y >= 0.0
            && self.x >= 0.0
            && self.y + self.height <= viewport.height
            && self.x + self.width <= viewport.width
    }
}

/// Selector queries and focus inspection.
pub trait DocumentQuery {
    /// All elements matching `selector`, in document order, deduplicated.
    ///
    /// `selector` may be a comma-separated selector list. A malformed
    /// selector yields [`SelectorError`]; implementations must not panic.
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// Like [`query_all`](Self::query_all), restricted to descendants of
    /// `root` (exclusive of `root` itself).
    fn query_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// Whether the node is attached to the render tree — laid out and not
    /// hidden by itself or an ancestor. This is stronger than DOM
    /// presence; a `display: none` subtree is present but not rendered.
    fn is_rendered(&self, node: NodeId) -> bool;

    /// Whether the currently focused element accepts text editing
    /// (text input, textarea, or a content-editable region).
    fn active_element_is_editable(&self) -> bool;
}

/// Layout geometry and computed-style reads.
pub trait Layout {
    /// Viewport-relative bounding box of the node.
    fn bounding_box(&self, node: NodeId) -> Rect;

    /// Current viewport dimensions.
    fn viewport(&self) -> Size;

    /// Computed `display: none`.
    fn display_none(&self, node: NodeId) -> bool;

    /// Computed `visibility: hidden` (or collapsed).
    fn visibility_hidden(&self, node: NodeId) -> bool;
}

/// Overlay marker mounting.
///
/// Implementations keep all markers in one shared container, created
/// lazily on first mount and emptied (not destroyed) by
/// [`clear_markers`](Self::clear_markers). Markers render above all page
/// content and must never intercept pointer events intended for the
/// page underneath.
pub trait OverlayHost {
    /// Mount a marker showing `text`, centered on `center`.
    fn mount_marker(&mut self, text: &str, center: Point) -> MarkerId;

    /// Update a marker to show a partially typed match: `matched` is the
    /// already-typed prefix (rendered de-emphasized), `rest` the
    /// remainder (rendered emphasized). Un-hides the marker if it was
    /// hidden.
    fn set_marker_match(&mut self, marker: MarkerId, matched: &str, rest: &str);

    /// Show or hide a marker without unmounting it.
    fn set_marker_hidden(&mut self, marker: MarkerId, hidden: bool);

    /// Remove every marker and empty the shared container in one step.
    fn clear_markers(&mut self);
}

/// Synthetic activation of page elements.
pub trait InputSynthesis {
    /// Invoke the element's native primary-activation behavior, as a
    /// user's primary-button click would.
    fn activate(&mut self, node: NodeId) -> Result<(), crate::error::ClickError>;

    /// Dispatch a cancelable, bubbling secondary-button (context-menu)
    /// event on the node at the given viewport point.
    fn dispatch_context_menu(
        &mut self,
        node: NodeId,
        point: Point,
    ) -> Result<(), crate::error::ClickError>;
}
