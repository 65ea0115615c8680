//! Structured output for harness runs.

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use quickhint_core::dispatch::KeyDisposition;
use quickhint_core::page::{Marker, StaticPage, SyntheticEvent};
use quickhint_core::session::HintSession;
use quickhint_core::surface::{NodeId, Rect};

/// What one scripted keystroke did.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// The token as written in the key sequence.
    pub key: String,
    pub disposition: &'static str,
}

impl StepReport {
    pub fn new(key: &str, disposition: KeyDisposition) -> Self {
        Self {
            key: key.to_string(),
            disposition: match disposition {
                KeyDisposition::Intercepted => "intercepted",
                KeyDisposition::PassThrough => "pass_through",
            },
        }
    }
}

/// Full outcome of a scripted run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Display name of the resolved site configuration.
    pub site: String,
    pub enabled: bool,
    pub steps: Vec<StepReport>,
    pub session_active: bool,
    /// Typed buffer, present while the session is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed: Option<String>,
    /// Markers still mounted at the end of the run.
    pub markers: Vec<Marker>,
    /// Synthetic events dispatched during the run.
    pub events: Vec<SyntheticEvent>,
}

impl RunReport {
    pub fn collect(
        site: &str,
        enabled: bool,
        steps: Vec<StepReport>,
        session: &HintSession,
        page: &StaticPage,
    ) -> Self {
        let typed = match session {
            HintSession::Active(active) => Some(active.typed().to_string()),
            HintSession::Inactive => None,
        };
        Self {
            site: site.to_string(),
            enabled,
            steps,
            session_active: session.is_active(),
            typed,
            markers: page.markers().to_vec(),
            events: page.events().to_vec(),
        }
    }
}

/// One scanned candidate, for `quickhint scan` output.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub node: NodeId,
    pub tag: String,
    pub rect: Rect,
    /// The label this candidate would receive on activation.
    pub label: Option<String>,
}

/// ASCII preview of the viewport with visible markers drawn in place.
///
/// The viewport is scaled onto a `cols` x `rows` character grid; each
/// visible marker's text is centered on its scaled position. Rendering
/// uses display widths, so the preview stays aligned even if a host
/// ever mounts non-ASCII marker text.
pub fn preview(page: &StaticPage, cols: usize, rows: usize) -> String {
    let viewport = quickhint_core::surface::Layout::viewport(page);
    let mut grid = vec![vec![' '; cols]; rows];

    for marker in page.visible_markers() {
        let col = scale(marker.center.x, viewport.width, cols);
        let row = scale(marker.center.y, viewport.height, rows);

        let text = &marker.text;
        let width = text.width();
        let start = col.saturating_sub(width / 2);
        let mut cursor = start;
        for c in text.chars() {
            if cursor >= cols {
                break;
            }
            grid[row][cursor] = c;
            cursor += unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);
        }
    }

    let mut out = String::new();
    out.push('+');
    out.push_str(&"-".repeat(cols));
    out.push_str("+\n");
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push_str("|\n");
    }
    out.push('+');
    out.push_str(&"-".repeat(cols));
    out.push_str("+\n");
    out
}

fn scale(value: f64, extent: f64, cells: usize) -> usize {
    if extent <= 0.0 {
        return 0;
    }
    let cell = (value / extent * cells as f64).floor();
    (cell.max(0.0) as usize).min(cells - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickhint_core::page::PageNode;
    use quickhint_core::surface::{OverlayHost, Point, Size};

    #[test]
    fn preview_places_marker_text() {
        let mut page = StaticPage::new(Size {
            width: 800.0,
            height: 600.0,
        });
        page.push(PageNode::new("a", Rect::new(0.0, 0.0, 10.0, 10.0)));
        page.mount_marker("AS", Point { x: 400.0, y: 300.0 });

        let rendered = preview(&page, 40, 12);
        assert!(rendered.contains("AS"));
        // Bordered: every line starts and ends with a frame character
        for line in rendered.lines() {
            assert!(line.starts_with('+') || line.starts_with('|'));
        }
    }

    #[test]
    fn hidden_markers_are_not_drawn() {
        let mut page = StaticPage::new(Size {
            width: 800.0,
            height: 600.0,
        });
        let id = page.mount_marker("D", Point { x: 100.0, y: 100.0 });
        page.set_marker_hidden(id, true);
        assert!(!preview(&page, 40, 12).contains('D'));
    }

    #[test]
    fn scale_clamps_to_grid() {
        assert_eq!(scale(-10.0, 800.0, 40), 0);
        assert_eq!(scale(800.0, 800.0, 40), 39);
        assert_eq!(scale(400.0, 800.0, 40), 20);
    }
}
