//! Click synthesis on a resolved target.

use serde::{Deserialize, Serialize};

use crate::error::ClickError;
use crate::surface::{InputSynthesis, Layout, NodeId};

/// Which button a resolved selection synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Primary-button click via the element's native activation.
    Left,
    /// Secondary-button (context-menu) interaction.
    Right,
}

/// Synthesize a click on `node`.
///
/// `Left` invokes the element's native primary activation. `Right`
/// dispatches a cancelable, bubbling secondary-button event at the
/// element's current bounding-box center, letting the page's own
/// context-menu handling respond.
///
/// Best-effort, no retries: the target may have been detached or made
/// unclickable since scan time, and any failure is the caller's to
/// report. Session teardown never depends on this outcome.
pub fn execute<S>(surface: &mut S, node: NodeId, mode: ClickMode) -> Result<(), ClickError>
where
    S: InputSynthesis + Layout,
{
    match mode {
        ClickMode::Left => surface.activate(node),
        ClickMode::Right => {
            let center = surface.bounding_box(node).center();
            surface.dispatch_context_menu(node, center)
        }
    }
}
