//! Candidate element discovery.
//!
//! The scanner is a pure read of current layout: it queries the document
//! surface, never mutates it, and is safe to call repeatedly. Discovery
//! runs in two modes:
//!
//! 1. **Popup scoping** — if the site configuration names a popup
//!    selector and a matching container is actually rendered, candidates
//!    come only from a fixed menu-item selector set inside that
//!    container. The requested scope is ignored while a popup is up.
//! 2. **Normal** — candidates come from the scope's selector list,
//!    anywhere in the document.
//!
//! Both branches apply the same visibility filter: positive rendered
//! area, not `visibility: hidden`, not `display: none`, and a bounding
//! box fully inside the viewport. Partially clipped elements are
//! excluded; there is no scrolling support.

use tracing::warn;

use crate::config::{Scope, SiteConfig};
use crate::surface::{DocumentQuery, Layout, NodeId};

/// Selector set used inside an active popup, regardless of scope.
const POPUP_ITEM_SELECTORS: &str =
    "[role=\"menuitem\"], [role=\"option\"], a[href], button";

/// Find visible clickable candidates, in document order, no duplicates.
///
/// A malformed selector is caught and logged; that scan yields an empty
/// candidate set rather than propagating, because the caller sits inside
/// the host page's capturing key handler.
pub fn scan<D>(doc: &D, config: &SiteConfig, scope: Scope) -> Vec<NodeId>
where
    D: DocumentQuery + Layout,
{
    let raw = if let Some(popup) = active_popup(doc, config) {
        match doc.query_within(popup, POPUP_ITEM_SELECTORS) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, "popup item query failed");
                return Vec::new();
            }
        }
    } else {
        let list = config.selector_list(scope);
        if list.is_empty() {
            return Vec::new();
        }
        match doc.query_all(&list) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, scope = ?scope, "candidate query failed");
                return Vec::new();
            }
        }
    };

    raw.into_iter().filter(|&n| is_visible(doc, n)).collect()
}

/// The popup container to confine scanning to, if one is configured,
/// present, and actually laid out. Render-tree attachment is the test,
/// not mere DOM presence: a popup kept in the DOM but display-none does
/// not count.
fn active_popup<D>(doc: &D, config: &SiteConfig) -> Option<NodeId>
where
    D: DocumentQuery,
{
    let selector = config.popup_selector.as_deref()?;
    let matches = match doc.query_all(selector) {
        Ok(nodes) => nodes,
        Err(err) => {
            warn!(%err, "popup selector query failed");
            return None;
        }
    };
    matches.into_iter().find(|&n| doc.is_rendered(n))
}

/// The visibility filter shared by both discovery branches.
fn is_visible<D>(doc: &D, node: NodeId) -> bool
where
    D: Layout,
{
    if doc.display_none(node) || doc.visibility_hidden(node) {
        return false;
    }
    let bbox = doc.bounding_box(node);
    bbox.has_area() && bbox.inside_viewport(doc.viewport())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use crate::page::{PageNode, StaticPage};
    use crate::surface::{Rect, Size};

    fn page() -> StaticPage {
        StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        })
    }

    fn link(x: f64, y: f64) -> PageNode {
        PageNode::new("a", Rect::new(x, y, 100.0, 20.0)).with_attr("href", "/x")
    }

    #[test]
    fn curated_scope_uses_curated_selectors() {
        let mut page = page();
        let a = page.push(link(10.0, 10.0));
        page.push(PageNode::new("input", Rect::new(10.0, 40.0, 100.0, 20.0)));
        let button = page.push(PageNode::new("button", Rect::new(10.0, 70.0, 80.0, 20.0)));

        let config = default_config();
        assert_eq!(scan(&page, &config, Scope::Curated), vec![a, button]);
        // The exhaustive scope also picks up the input
        assert_eq!(scan(&page, &config, Scope::All).len(), 3);
    }

    #[test]
    fn invisible_elements_are_excluded() {
        let mut page = page();
        let visible = page.push(link(10.0, 10.0));
        page.push(link(10.0, 40.0).hidden());
        page.push(link(10.0, 70.0).undisplayed());
        // Zero area
        page.push(PageNode::new("a", Rect::new(10.0, 100.0, 0.0, 20.0)).with_attr("href", "/x"));
        // Clipped by the viewport edge, and fully off-screen below
        page.push(link(1250.0, 10.0));
        page.push(link(10.0, 900.0));
        // Negative origin
        page.push(link(-5.0, 10.0));

        let config = default_config();
        assert_eq!(scan(&page, &config, Scope::Curated), vec![visible]);
    }

    #[test]
    fn hidden_ancestor_excludes_descendants() {
        let mut page = page();
        let wrapper = page.push(PageNode::new("div", Rect::new(0.0, 0.0, 200.0, 200.0)).undisplayed());
        page.push(link(10.0, 10.0).with_parent(wrapper));
        let free = page.push(link(10.0, 300.0));

        let config = default_config();
        assert_eq!(scan(&page, &config, Scope::Curated), vec![free]);
    }

    #[test]
    fn rendered_popup_confines_and_ignores_scope() {
        let mut page = page();
        // Outer-page elements that match the scope selectors
        page.push(link(10.0, 10.0));
        page.push(PageNode::new("button", Rect::new(10.0, 40.0, 80.0, 20.0)));

        let popup = page.push(
            PageNode::new("div", Rect::new(300.0, 100.0, 200.0, 300.0)).with_attr("role", "menu"),
        );
        let item = page.push(
            PageNode::new("div", Rect::new(310.0, 110.0, 180.0, 20.0))
                .with_attr("role", "menuitem")
                .with_parent(popup),
        );
        let item_link = page.push(
            PageNode::new("a", Rect::new(310.0, 140.0, 180.0, 20.0))
                .with_attr("href", "/in")
                .with_parent(popup),
        );

        let mut config = default_config();
        config.popup_selector = Some("[role=\"menu\"]".to_string());

        for scope in [Scope::Curated, Scope::All] {
            assert_eq!(scan(&page, &config, scope), vec![item, item_link]);
        }
    }

    #[test]
    fn undisplayed_popup_does_not_scope() {
        let mut page = page();
        let outer = page.push(link(10.0, 10.0));
        let popup = page.push(
            PageNode::new("div", Rect::new(300.0, 100.0, 200.0, 300.0))
                .with_attr("role", "menu")
                .undisplayed(),
        );
        page.push(
            PageNode::new("a", Rect::new(310.0, 140.0, 180.0, 20.0))
                .with_attr("href", "/in")
                .with_parent(popup),
        );

        let mut config = default_config();
        config.popup_selector = Some("[role=\"menu\"]".to_string());

        // Popup present in the DOM but not laid out: normal discovery.
        // Its own child is excluded by the visibility filter.
        assert_eq!(scan(&page, &config, Scope::Curated), vec![outer]);
    }

    #[test]
    fn malformed_selector_yields_empty_scan() {
        let mut page = page();
        page.push(link(10.0, 10.0));

        let mut config = default_config();
        config.curated_selectors = vec!["a[href".to_string()];
        assert!(scan(&page, &config, Scope::Curated).is_empty());
        // The other scope still works
        assert!(!scan(&page, &config, Scope::All).is_empty());
    }

    #[test]
    fn empty_selector_list_yields_empty_scan() {
        let mut page = page();
        page.push(link(10.0, 10.0));

        let mut config = default_config();
        config.curated_selectors = Vec::new();
        assert!(scan(&page, &config, Scope::Curated).is_empty());
    }
}
