//! Trusted input dispatch for a CDP page session.

use serde_json::json;

use crate::cdp::protocol::{KeyEventType, MouseButton, MouseEventType};
use crate::error::BrowserError;

use super::core::PageSession;

/// One keyboard key in the form `Input.dispatchKeyEvent` wants it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyStroke {
    pub key: String,
    pub code: String,
    pub virtual_code: i64,
    /// Character the press inserts, when it inserts one.
    pub text: Option<String>,
}

impl PageSession {
    /// Click at viewport coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MousePressed,
                "x": x,
                "y": y,
                "button": MouseButton::Left,
                "clickCount": 1,
            })),
        )
        .await?;

        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseReleased,
                "x": x,
                "y": y,
                "button": MouseButton::Left,
                "clickCount": 1,
            })),
        )
        .await?;

        Ok(())
    }

    /// Press and release a single key.
    pub async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        let stroke = canonical_key(key);
        self.dispatch_key(KeyEventType::KeyDown, &stroke, 0, true)
            .await?;
        self.dispatch_key(KeyEventType::KeyUp, &stroke, 0, false)
            .await
    }

    /// Press a key combination such as `Enter` or `Control+A`.
    pub async fn press_key_combo(&self, combo: &str) -> Result<(), BrowserError> {
        let parts: Vec<&str> = combo.split('+').collect();
        let modifiers = Self::get_modifiers(&parts[..parts.len() - 1]);
        let stroke = canonical_key(parts.last().unwrap_or(&""));

        // Ctrl/Meta chords are commands, not text entry.
        let inserts_text = modifiers & (2 | 4) == 0;

        self.dispatch_key(KeyEventType::KeyDown, &stroke, modifiers, inserts_text)
            .await?;
        self.dispatch_key(KeyEventType::KeyUp, &stroke, modifiers, false)
            .await
    }

    async fn dispatch_key(
        &self,
        event_type: KeyEventType,
        stroke: &KeyStroke,
        modifiers: i64,
        include_text: bool,
    ) -> Result<(), BrowserError> {
        let mut params = json!({
            "type": event_type,
            "key": stroke.key,
            "modifiers": modifiers,
        });
        if !stroke.code.is_empty() {
            params["code"] = json!(stroke.code);
        }
        if stroke.virtual_code != 0 {
            params["windowsVirtualKeyCode"] = json!(stroke.virtual_code);
            params["nativeVirtualKeyCode"] = json!(stroke.virtual_code);
        }
        if include_text {
            if let Some(text) = &stroke.text {
                params["text"] = json!(text);
            }
        }

        self.call("Input.dispatchKeyEvent", Some(params)).await?;
        Ok(())
    }

    /// Modifier flags from modifier names (Alt=1, Ctrl=2, Meta=4, Shift=8).
    pub(crate) fn get_modifiers(modifiers: &[&str]) -> i64 {
        let mut flags = 0;
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "alt" => flags |= 1,
                "control" | "ctrl" => flags |= 2,
                "meta" | "command" | "cmd" => flags |= 4,
                "shift" => flags |= 8,
                _ => {}
            }
        }
        flags
    }
}

/// Normalize a key name into the event fields Chrome expects.
///
/// Accepts DOM key values in any case plus a few aliases (`esc`, `up`).
/// Unrecognized names pass through as the `key` field alone.
pub(crate) fn canonical_key(name: &str) -> KeyStroke {
    let named = |key: &str, virtual_code: i64, text: Option<&str>| KeyStroke {
        key: key.to_string(),
        code: key.to_string(),
        virtual_code,
        text: text.map(String::from),
    };

    match name.to_lowercase().as_str() {
        "enter" | "return" => named("Enter", 13, Some("\r")),
        "tab" => named("Tab", 9, None),
        "escape" | "esc" => named("Escape", 27, None),
        "backspace" => named("Backspace", 8, None),
        "delete" | "del" => named("Delete", 46, None),
        "arrowup" | "up" => named("ArrowUp", 38, None),
        "arrowdown" | "down" => named("ArrowDown", 40, None),
        "arrowleft" | "left" => named("ArrowLeft", 37, None),
        "arrowright" | "right" => named("ArrowRight", 39, None),
        "home" => named("Home", 36, None),
        "end" => named("End", 35, None),
        "pageup" => named("PageUp", 33, None),
        "pagedown" => named("PageDown", 34, None),
        "space" | " " => KeyStroke {
            key: " ".to_string(),
            code: "Space".to_string(),
            virtual_code: 32,
            text: Some(" ".to_string()),
        },
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    let upper = c.to_ascii_uppercase();
                    let code = if c.is_ascii_digit() {
                        format!("Digit{}", c)
                    } else {
                        format!("Key{}", upper)
                    };
                    KeyStroke {
                        key: c.to_string(),
                        code,
                        virtual_code: upper as i64,
                        text: Some(c.to_string()),
                    }
                }
                _ => KeyStroke {
                    key: name.to_string(),
                    code: String::new(),
                    virtual_code: 0,
                    text: None,
                },
            }
        }
    }
}
