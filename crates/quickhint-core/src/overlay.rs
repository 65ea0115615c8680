//! Overlay marker rendering.
//!
//! A marker is a disposable visual proxy for one candidate: fixed
//! position, centered on the element's bounding box as captured at scan
//! time, and never repositioned afterwards — scroll or resize during an
//! active session leaves markers where they were mounted. Display text
//! is the label in uppercase; matching remains lowercase.

use crate::surface::{Layout, MarkerId, NodeId, OverlayHost, Point};

/// Mount one marker for a (label, element) pair.
///
/// The bounding box is read once, here; the returned marker is bound to
/// that position for its lifetime.
pub fn mount<S>(surface: &mut S, label: &str, node: NodeId) -> MarkerId
where
    S: Layout + OverlayHost,
{
    let center = surface.bounding_box(node).center();
    mount_at(surface, label, center)
}

/// Mount a marker at an already-captured center point.
pub fn mount_at<S>(surface: &mut S, label: &str, center: Point) -> MarkerId
where
    S: OverlayHost,
{
    surface.mount_marker(&label.to_uppercase(), center)
}

/// Reflect the typed prefix on one marker.
///
/// A marker whose label starts with `typed` shows the matched portion
/// de-emphasized and the remainder emphasized; any other marker is
/// hidden until the buffer shrinks back into its prefix.
pub fn update_highlight<S>(surface: &mut S, marker: MarkerId, label: &str, typed: &str)
where
    S: OverlayHost,
{
    if let Some(rest) = label.strip_prefix(typed) {
        surface.set_marker_match(marker, &typed.to_uppercase(), &rest.to_uppercase());
    } else {
        surface.set_marker_hidden(marker, true);
    }
}

/// Remove every marker and empty the shared container in one step.
pub fn unmount_all<S>(surface: &mut S)
where
    S: OverlayHost,
{
    surface.clear_markers();
}
