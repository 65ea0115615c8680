//! The hint session state machine.
//!
//! At most one session exists per hosting context, owned by the
//! dispatcher. The session is a tagged variant — `Inactive` carries
//! nothing, `Active` carries everything — so there is no way to observe
//! a half-initialized session. All transitions run synchronously inside
//! the host's capturing key handler, which cannot re-enter itself; that
//! is the only mutual exclusion this type needs.
//!
//! # Transitions
//!
//! | State | Event | Result |
//! |-------|-------|--------|
//! | Inactive | activation binding | Active, or no-op when zero candidates |
//! | Active | char, one label matches | click, teardown (unconditional) |
//! | Active | char, several match | buffer grows, highlights refresh |
//! | Active | char, none match | char discarded, nothing changes |
//! | Active | backspace | buffer shrinks, highlights refresh |
//! | Active | escape | teardown |

use tracing::{debug, warn};

use crate::click::{self, ClickMode};
use crate::config::{Scope, SiteConfig};
use crate::error::ClickError;
use crate::label;
use crate::overlay;
use crate::scan;
use crate::surface::{DocumentQuery, InputSynthesis, Layout, MarkerId, NodeId, OverlayHost};

/// One labeled candidate: the label, its target, and its marker. The
/// 1:1 correspondence between labels and overlays is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub label: String,
    pub node: NodeId,
    pub marker: MarkerId,
}

/// Fields of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHints {
    pub click_mode: ClickMode,
    pub scope: Scope,
    hints: Vec<Hint>,
    typed: String,
}

impl ActiveHints {
    /// Labeled candidates, in document order.
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// The accumulated input buffer.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    fn matches(&self, prefix: &str) -> Vec<usize> {
        self.hints
            .iter()
            .enumerate()
            .filter(|(_, h)| h.label.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }
}

/// A key already classified by the dispatcher as belonging to the
/// active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    /// An alphabet character (lowercase).
    Char(char),
    Backspace,
    Escape,
}

/// The session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HintSession {
    #[default]
    Inactive,
    Active(ActiveHints),
}

impl HintSession {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, HintSession::Active(_))
    }

    /// Inactive → Active, triggered only by an activation binding match.
    ///
    /// Scans for candidates with the bound scope, labels them, mounts
    /// one marker per pair. Zero visible candidates leave the session
    /// Inactive with no visual change. An already-active session is torn
    /// down first.
    ///
    /// Returns whether the session ended up Active.
    pub fn activate<S>(
        &mut self,
        surface: &mut S,
        config: &SiteConfig,
        click_mode: ClickMode,
        scope: Scope,
    ) -> bool
    where
        S: DocumentQuery + Layout + OverlayHost,
    {
        if self.is_active() {
            self.deactivate(surface);
        }

        let candidates = scan::scan(surface, config, scope);
        if candidates.is_empty() {
            debug!(?scope, "activation requested but no visible candidates");
            return false;
        }

        let labels = label::generate(candidates.len());
        if labels.len() < candidates.len() {
            // Excess candidates stay unlabeled and unreachable this
            // session; a diagnostic, not an error.
            warn!(
                candidates = candidates.len(),
                labeled = labels.len(),
                "more candidates than representable labels"
            );
        }

        let hints = labels
            .into_iter()
            .zip(candidates)
            .map(|(label, node)| {
                let marker = overlay::mount(surface, &label, node);
                Hint {
                    label,
                    node,
                    marker,
                }
            })
            .collect::<Vec<_>>();

        debug!(hints = hints.len(), ?click_mode, ?scope, "session active");
        *self = HintSession::Active(ActiveHints {
            click_mode,
            scope,
            hints,
            typed: String::new(),
        });
        true
    }

    /// Active → Inactive: unmount every overlay, clear all state.
    pub fn deactivate<S>(&mut self, surface: &mut S)
    where
        S: OverlayHost,
    {
        if self.is_active() {
            overlay::unmount_all(surface);
            debug!("session deactivated");
        }
        *self = HintSession::Inactive;
    }

    /// Feed one session key. No-op while Inactive.
    ///
    /// A uniquely resolved label executes the click and then tears the
    /// session down unconditionally; the click's own failure is returned
    /// but never blocks the teardown.
    pub fn key<S>(&mut self, surface: &mut S, key: SessionKey) -> Result<(), ClickError>
    where
        S: InputSynthesis + Layout + OverlayHost,
    {
        let HintSession::Active(active) = self else {
            return Ok(());
        };

        match key {
            SessionKey::Escape => {
                self.deactivate(surface);
                Ok(())
            }
            SessionKey::Backspace => {
                active.typed.pop();
                let typed = active.typed.clone();
                Self::refresh_highlights(surface, active, &typed);
                Ok(())
            }
            SessionKey::Char(c) => {
                let mut candidate = active.typed.clone();
                candidate.push(c);
                let matches = active.matches(&candidate);
                match matches.len() {
                    // Discard the character; buffer and overlays unchanged.
                    0 => {
                        debug!(%candidate, "no label matches, dropping keystroke");
                        Ok(())
                    }
                    1 => {
                        let hint = &active.hints[matches[0]];
                        let node = hint.node;
                        let mode = active.click_mode;
                        debug!(label = %hint.label, ?node, "unique match, clicking");
                        let outcome = click::execute(surface, node, mode);
                        self.deactivate(surface);
                        outcome
                    }
                    _ => {
                        active.typed = candidate.clone();
                        Self::refresh_highlights(surface, active, &candidate);
                        Ok(())
                    }
                }
            }
        }
    }

    fn refresh_highlights<S>(surface: &mut S, active: &ActiveHints, typed: &str)
    where
        S: OverlayHost,
    {
        for hint in &active.hints {
            overlay::update_highlight(surface, hint.marker, &hint.label, typed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use crate::page::{PageNode, StaticPage, SyntheticEvent};
    use crate::surface::{Rect, Size};

    fn page_with_links(n: usize) -> StaticPage {
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        for i in 0..n {
            page.push(
                PageNode::new("a", Rect::new(10.0, 10.0 + 30.0 * i as f64, 100.0, 20.0))
                    .with_attr("href", "/x"),
            );
        }
        page
    }

    fn activated(page: &mut StaticPage, mode: ClickMode) -> HintSession {
        let mut session = HintSession::default();
        assert!(session.activate(page, &default_config(), mode, Scope::Curated));
        session
    }

    #[test]
    fn zero_candidates_stays_inactive() {
        let mut page = page_with_links(0);
        let mut session = HintSession::default();
        let active = session.activate(&mut page, &default_config(), ClickMode::Left, Scope::All);
        assert!(!active);
        assert!(!session.is_active());
        assert!(page.markers().is_empty());
    }

    #[test]
    fn activation_mounts_one_marker_per_candidate() {
        let mut page = page_with_links(3);
        let session = activated(&mut page, ClickMode::Left);

        let HintSession::Active(active) = &session else {
            panic!("expected active session");
        };
        assert_eq!(active.hints().len(), 3);
        assert_eq!(page.markers().len(), 3);
        assert_eq!(active.typed(), "");
        let labels: Vec<_> = active.hints().iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "s", "d"]);
    }

    #[test]
    fn unique_match_clicks_and_tears_down() {
        let mut page = page_with_links(3);
        let mut session = activated(&mut page, ClickMode::Left);

        session.key(&mut page, SessionKey::Char('a')).unwrap();
        assert!(!session.is_active());
        assert!(page.markers().is_empty());
        assert_eq!(
            page.events(),
            &[SyntheticEvent::Activate { node: crate::surface::NodeId(0) }]
        );
    }

    #[test]
    fn ambiguous_prefix_grows_buffer_and_highlights() {
        let mut page = page_with_links(20); // needs the aa/as/ad/af extensions
        let mut session = activated(&mut page, ClickMode::Left);

        session.key(&mut page, SessionKey::Char('a')).unwrap();
        let HintSession::Active(active) = &session else {
            panic!("still active");
        };
        // "a" itself was withdrawn for its extensions, so the keystroke
        // is ambiguous across all four of them
        assert_eq!(active.typed(), "a");
        assert!(session.is_active());
        // Non-matching markers hidden, matching ones split
        let visible: Vec<_> = page.visible_markers().map(|m| m.text.as_str()).collect();
        assert_eq!(visible, vec!["AA", "AS", "AD", "AF"]);
    }

    #[test]
    fn shortfall_leaves_excess_candidates_unlabeled() {
        let cap = label::capacity();
        let mut page = StaticPage::new(Size {
            width: 1280.0,
            height: 800.0,
        });
        // Stacked in place so every one of them passes the viewport check
        for _ in 0..cap + 5 {
            page.push(PageNode::new("a", Rect::new(10.0, 10.0, 100.0, 20.0)).with_attr("href", "/x"));
        }
        let mut session = HintSession::default();

        let active = session.activate(&mut page, &default_config(), ClickMode::Left, Scope::All);
        assert!(active);

        let HintSession::Active(state) = &session else {
            panic!("expected active session");
        };
        assert_eq!(state.hints().len(), cap);
        assert_eq!(page.markers().len(), cap);

        session.key(&mut page, SessionKey::Escape).unwrap();
        assert!(page.markers().is_empty());
    }

    #[test]
    fn zero_match_discards_character() {
        let mut page = page_with_links(2); // labels a, s
        let mut session = activated(&mut page, ClickMode::Left);

        session.key(&mut page, SessionKey::Char('d')).unwrap();
        let HintSession::Active(active) = &session else {
            panic!("still active");
        };
        assert_eq!(active.typed(), "");
        assert!(page.visible_markers().count() == 2);
    }

    #[test]
    fn backspace_shrinks_buffer_and_reshows() {
        let mut page = page_with_links(20);
        let mut session = activated(&mut page, ClickMode::Left);

        session.key(&mut page, SessionKey::Char('a')).unwrap();
        assert!(page.visible_markers().count() < page.markers().len());

        session.key(&mut page, SessionKey::Backspace).unwrap();
        let HintSession::Active(active) = &session else {
            panic!("still active");
        };
        assert_eq!(active.typed(), "");
        assert_eq!(page.visible_markers().count(), page.markers().len());

        // Backspace on an empty buffer is a no-op
        session.key(&mut page, SessionKey::Backspace).unwrap();
        assert!(session.is_active());
    }

    #[test]
    fn escape_tears_down() {
        let mut page = page_with_links(3);
        let mut session = activated(&mut page, ClickMode::Left);

        session.key(&mut page, SessionKey::Escape).unwrap();
        assert!(!session.is_active());
        assert!(page.markers().is_empty());
        assert!(page.events().is_empty());
    }

    #[test]
    fn reactivation_tears_down_prior_session() {
        let mut page = page_with_links(3);
        let mut session = activated(&mut page, ClickMode::Left);
        assert_eq!(page.markers().len(), 3);

        assert!(session.activate(
            &mut page,
            &default_config(),
            ClickMode::Right,
            Scope::Curated
        ));
        // Old markers gone, fresh set mounted
        assert_eq!(page.markers().len(), 3);
        let HintSession::Active(active) = &session else {
            panic!("active");
        };
        assert_eq!(active.click_mode, ClickMode::Right);
    }

    #[test]
    fn click_failure_still_tears_down() {
        let mut page = page_with_links(1);
        let mut session = activated(&mut page, ClickMode::Left);

        page.detach(crate::surface::NodeId(0));
        let outcome = session.key(&mut page, SessionKey::Char('a'));
        assert!(outcome.is_err());
        assert!(!session.is_active());
        assert!(page.markers().is_empty());
    }

    #[test]
    fn right_mode_dispatches_context_menu() {
        let mut page = page_with_links(1);
        let mut session = activated(&mut page, ClickMode::Right);

        session.key(&mut page, SessionKey::Char('a')).unwrap();
        assert!(matches!(
            page.events()[0],
            SyntheticEvent::ContextMenu { .. }
        ));
    }

    #[test]
    fn keys_while_inactive_are_ignored() {
        let mut page = page_with_links(1);
        let mut session = HintSession::default();
        session.key(&mut page, SessionKey::Char('a')).unwrap();
        assert!(page.events().is_empty());
    }
}
