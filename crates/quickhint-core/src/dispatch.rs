//! Key-event dispatch.
//!
//! The dispatcher is the engine's only entry point. The host installs it
//! once, listening in the event-capturing phase so it sees keys before
//! the page's own handlers, and forwards every keystroke to
//! [`InputDispatcher::on_key`]. The returned [`KeyDisposition`] tells
//! the host whether to suppress default handling and stop propagation.
//!
//! While the session is Inactive, keystrokes are matched only against
//! the static [`BINDINGS`] table, and never while focus sits in a text
//! input, textarea, or content-editable region. That guard is
//! re-evaluated per keystroke while Inactive but deliberately not once a
//! session is Active: an in-progress session keeps consuming keystrokes
//! even if focus moves.

use tracing::warn;

use crate::click::ClickMode;
use crate::config::{Scope, SiteConfig};
use crate::label;
use crate::session::{HintSession, SessionKey};
use crate::surface::{DocumentQuery, InputSynthesis, Layout, OverlayHost};

/// Modifier set of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    pub const ALT_SHIFT: Modifiers = Modifiers {
        alt: true,
        shift: true,
        ..Modifiers::NONE
    };

    /// Any of control, alt, or meta held. Shift is excluded: it changes
    /// the produced character, not the chord.
    #[must_use]
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A keystroke as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key code, DOM `code` style ("KeyF", "Escape", ...).
    pub code: String,
    /// Produced character, if the key produces one.
    pub ch: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: &str, ch: Option<char>, modifiers: Modifiers) -> Self {
        Self {
            code: code.to_string(),
            ch,
            modifiers,
        }
    }

    /// A plain character key with no modifiers.
    #[must_use]
    pub fn character(c: char) -> Self {
        Self {
            code: format!("Key{}", c.to_ascii_uppercase()),
            ch: Some(c),
            modifiers: Modifiers::NONE,
        }
    }
}

/// One activation binding: physical key + modifier set → initial
/// session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationBinding {
    pub code: &'static str,
    pub modifiers: Modifiers,
    pub click_mode: ClickMode,
    pub scope: Scope,
}

/// The static activation table. Defined once, immutable.
pub const BINDINGS: &[ActivationBinding] = &[
    ActivationBinding {
        code: "KeyF",
        modifiers: Modifiers::ALT,
        click_mode: ClickMode::Left,
        scope: Scope::Curated,
    },
    ActivationBinding {
        code: "KeyF",
        modifiers: Modifiers::ALT_SHIFT,
        click_mode: ClickMode::Left,
        scope: Scope::All,
    },
    ActivationBinding {
        code: "KeyD",
        modifiers: Modifiers::ALT,
        click_mode: ClickMode::Right,
        scope: Scope::Curated,
    },
    ActivationBinding {
        code: "KeyD",
        modifiers: Modifiers::ALT_SHIFT,
        click_mode: ClickMode::Right,
        scope: Scope::All,
    },
];

fn binding_for(event: &KeyEvent) -> Option<&'static ActivationBinding> {
    BINDINGS
        .iter()
        .find(|b| b.code == event.code && b.modifiers == event.modifiers)
}

/// What the host should do with the event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Suppress default behavior and stop propagation.
    Intercepted,
    /// Let the page handle the event normally.
    PassThrough,
}

/// The single global key-event entry point.
///
/// Owns the one [`HintSession`] and the configuration resolved for this
/// page. Construct it only after configuration resolution has finished,
/// so no keystroke can observe a partially resolved configuration.
#[derive(Debug)]
pub struct InputDispatcher {
    config: SiteConfig,
    session: HintSession,
}

impl InputDispatcher {
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            session: HintSession::Inactive,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn session(&self) -> &HintSession {
        &self.session
    }

    /// Handle one keystroke from the capturing listener.
    pub fn on_key<S>(&mut self, surface: &mut S, event: &KeyEvent) -> KeyDisposition
    where
        S: DocumentQuery + Layout + OverlayHost + InputSynthesis,
    {
        if self.session.is_active() {
            self.on_key_active(surface, event)
        } else {
            self.on_key_inactive(surface, event)
        }
    }

    fn on_key_inactive<S>(&mut self, surface: &mut S, event: &KeyEvent) -> KeyDisposition
    where
        S: DocumentQuery + Layout + OverlayHost + InputSynthesis,
    {
        if !self.config.enabled {
            return KeyDisposition::PassThrough;
        }
        // Never steal keys from a text-editing context. Re-checked on
        // every keystroke while Inactive only.
        if surface.active_element_is_editable() {
            return KeyDisposition::PassThrough;
        }
        let Some(binding) = binding_for(event) else {
            return KeyDisposition::PassThrough;
        };
        // The chord is intercepted even when activation finds nothing to
        // label; the page never sees a bound combination.
        self.session
            .activate(surface, &self.config, binding.click_mode, binding.scope);
        KeyDisposition::Intercepted
    }

    fn on_key_active<S>(&mut self, surface: &mut S, event: &KeyEvent) -> KeyDisposition
    where
        S: DocumentQuery + Layout + OverlayHost + InputSynthesis,
    {
        let Some(key) = session_key(event) else {
            // Anything that is not an alphabet character, escape, or
            // backspace falls through to the page untouched.
            return KeyDisposition::PassThrough;
        };
        if let Err(err) = self.session.key(surface, key) {
            // The session is already torn down; the click was best-effort.
            warn!(%err, "click synthesis failed");
        }
        KeyDisposition::Intercepted
    }
}

/// Classify a keystroke for an active session.
fn session_key(event: &KeyEvent) -> Option<SessionKey> {
    match event.code.as_str() {
        "Escape" => return Some(SessionKey::Escape),
        "Backspace" => return Some(SessionKey::Backspace),
        _ => {}
    }
    if event.modifiers.has_command_modifier() {
        return None;
    }
    let c = event.ch?.to_ascii_lowercase();
    label::in_alphabet(c).then_some(SessionKey::Char(c))
}
