//! Parsing scripted key sequences into dispatcher events.
//!
//! A sequence is whitespace-separated tokens:
//!
//! - chords: `Alt+F`, `Shift+Alt+D`, `Ctrl+Alt+K`
//! - bare characters: `a`, `s`, `7`
//! - named keys: `Esc`/`Escape`, `Backspace`, `Enter`, `Tab`,
//!   `ArrowUp`/`ArrowDown`/`ArrowLeft`/`ArrowRight`

use anyhow::{bail, Context, Result};

use quickhint_core::dispatch::{KeyEvent, Modifiers};

/// Parse a whole sequence.
pub fn parse_sequence(input: &str) -> Result<Vec<KeyEvent>> {
    input
        .split_whitespace()
        .map(|token| parse_token(token).with_context(|| format!("bad key token '{}'", token)))
        .collect()
}

/// Parse one token into a key event.
pub fn parse_token(token: &str) -> Result<KeyEvent> {
    let mut modifiers = Modifiers::NONE;
    let mut key_part = None;

    for part in token.split('+') {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.ctrl = true,
            "alt" | "option" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            "meta" | "cmd" | "super" => modifiers.meta = true,
            _ => {
                if key_part.is_some() {
                    bail!("more than one non-modifier part");
                }
                key_part = Some(part);
            }
        }
    }

    let Some(key) = key_part else {
        bail!("no key in token");
    };

    // Named keys first
    let named = match key.to_ascii_lowercase().as_str() {
        "esc" | "escape" => Some("Escape"),
        "backspace" | "bs" => Some("Backspace"),
        "enter" | "return" => Some("Enter"),
        "tab" => Some("Tab"),
        "space" => Some("Space"),
        "up" | "arrowup" => Some("ArrowUp"),
        "down" | "arrowdown" => Some("ArrowDown"),
        "left" | "arrowleft" => Some("ArrowLeft"),
        "right" | "arrowright" => Some("ArrowRight"),
        _ => None,
    };
    if let Some(code) = named {
        return Ok(KeyEvent::new(code, None, modifiers));
    }

    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        bail!("unrecognized key name");
    };

    if c.is_ascii_alphabetic() {
        let ch = if modifiers.shift {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        };
        // Chords are matched by physical code; only unmodified keys
        // carry a produced character.
        let produced = (!modifiers.ctrl && !modifiers.alt && !modifiers.meta).then_some(ch);
        Ok(KeyEvent::new(
            &format!("Key{}", c.to_ascii_uppercase()),
            produced,
            modifiers,
        ))
    } else if c.is_ascii_digit() {
        Ok(KeyEvent::new(&format!("Digit{}", c), Some(c), modifiers))
    } else {
        bail!("unrecognized key '{}'", c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_character() {
        let event = parse_token("a").unwrap();
        assert_eq!(event.code, "KeyA");
        assert_eq!(event.ch, Some('a'));
        assert_eq!(event.modifiers, Modifiers::NONE);
    }

    #[test]
    fn chord_with_modifiers() {
        let event = parse_token("Alt+F").unwrap();
        assert_eq!(event.code, "KeyF");
        assert_eq!(event.ch, None);
        assert_eq!(event.modifiers, Modifiers::ALT);

        let event = parse_token("Shift+Alt+D").unwrap();
        assert_eq!(event.modifiers, Modifiers::ALT_SHIFT);
    }

    #[test]
    fn named_keys() {
        assert_eq!(parse_token("Esc").unwrap().code, "Escape");
        assert_eq!(parse_token("escape").unwrap().code, "Escape");
        assert_eq!(parse_token("Backspace").unwrap().code, "Backspace");
        assert_eq!(parse_token("Down").unwrap().code, "ArrowDown");
    }

    #[test]
    fn sequence_splits_on_whitespace() {
        let events = parse_sequence("Alt+F a  s Esc").unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].code, "KeyF");
        assert_eq!(events[3].code, "Escape");
    }

    #[test]
    fn empty_sequence_is_empty() {
        assert!(parse_sequence("  ").unwrap().is_empty());
    }

    #[test]
    fn bad_tokens_error() {
        assert!(parse_token("Alt+").is_err());
        assert!(parse_token("NotAKey").is_err());
        assert!(parse_token("a+b").is_err());
        assert!(parse_token("?").is_err());
    }
}
