//! Keyboard input encoded as xterm byte sequences.

use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Encode a key press for the terminal.
///
/// `app_cursor` selects SS3 cursor keys (DECCKM). Modified cursor, editing,
/// and function keys use the xterm `1;<mods>` parameter form.
pub fn encode_key(key: &Key, mods: ModifiersState, app_cursor: bool) -> Vec<u8> {
    match key {
        Key::Named(named) => encode_named(*named, mods, app_cursor),
        Key::Character(text) => encode_text(text, mods),
        _ => Vec::new(),
    }
}

/// xterm modifier parameter: 1 + shift + 2·alt + 4·ctrl.
fn modifier_param(mods: ModifiersState) -> u8 {
    1 + u8::from(mods.shift_key()) + 2 * u8::from(mods.alt_key()) + 4 * u8::from(mods.control_key())
}

fn encode_named(named: NamedKey, mods: ModifiersState, app_cursor: bool) -> Vec<u8> {
    let ctrl = mods.control_key();
    let alt_prefix: &[u8] = if mods.alt_key() { b"\x1b" } else { b"" };
    let param = modifier_param(mods);

    match named {
        // Editing keys
        NamedKey::Enter => [alt_prefix, b"\r"].concat(),
        NamedKey::Backspace if ctrl => [alt_prefix, b"\x08"].concat(),
        NamedKey::Backspace => [alt_prefix, b"\x7f"].concat(),
        NamedKey::Tab if mods.shift_key() => b"\x1b[Z".to_vec(),
        NamedKey::Tab => [alt_prefix, b"\t"].concat(),
        NamedKey::Escape => [alt_prefix, b"\x1b"].concat(),
        NamedKey::Space if ctrl => [alt_prefix, b"\0"].concat(),
        NamedKey::Space => [alt_prefix, b" "].concat(),
        NamedKey::Insert => tilde_key(2, param),
        NamedKey::Delete => tilde_key(3, param),

        // Cursor keys
        NamedKey::ArrowUp => cursor_key(b'A', param, app_cursor),
        NamedKey::ArrowDown => cursor_key(b'B', param, app_cursor),
        NamedKey::ArrowRight => cursor_key(b'C', param, app_cursor),
        NamedKey::ArrowLeft => cursor_key(b'D', param, app_cursor),
        NamedKey::Home => cursor_key(b'H', param, app_cursor),
        NamedKey::End => cursor_key(b'F', param, app_cursor),

        // Navigation
        NamedKey::PageUp => tilde_key(5, param),
        NamedKey::PageDown => tilde_key(6, param),

        // Function keys
        NamedKey::F1 => ss3_key(b'P', param),
        NamedKey::F2 => ss3_key(b'Q', param),
        NamedKey::F3 => ss3_key(b'R', param),
        NamedKey::F4 => ss3_key(b'S', param),
        NamedKey::F5 => tilde_key(15, param),
        NamedKey::F6 => tilde_key(17, param),
        NamedKey::F7 => tilde_key(18, param),
        NamedKey::F8 => tilde_key(19, param),
        NamedKey::F9 => tilde_key(20, param),
        NamedKey::F10 => tilde_key(21, param),
        NamedKey::F11 => tilde_key(23, param),
        NamedKey::F12 => tilde_key(24, param),

        _ => Vec::new(),
    }
}

fn encode_text(text: &str, mods: ModifiersState) -> Vec<u8> {
    let alt_prefix: &[u8] = if mods.alt_key() { b"\x1b" } else { b"" };

    if mods.control_key() {
        let mut chars = text.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(byte) = control_byte(ch) {
                return [alt_prefix, &[byte]].concat();
            }
        }
    }

    [alt_prefix, text.as_bytes()].concat()
}

/// The C0 byte for Ctrl+`ch`, using the VT220 digit aliases.
fn control_byte(ch: char) -> Option<u8> {
    match ch {
        'a'..='z' => Some(ch as u8 - b'a' + 1),
        'A'..='Z' => Some(ch as u8 - b'A' + 1),
        '@' | ' ' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '-' | '7' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

fn cursor_key(final_byte: u8, param: u8, app_cursor: bool) -> Vec<u8> {
    if param > 1 {
        format!("\x1b[1;{param}{}", final_byte as char).into_bytes()
    } else if app_cursor {
        vec![0x1b, b'O', final_byte]
    } else {
        vec![0x1b, b'[', final_byte]
    }
}

fn ss3_key(final_byte: u8, param: u8) -> Vec<u8> {
    if param > 1 {
        format!("\x1b[1;{param}{}", final_byte as char).into_bytes()
    } else {
        vec![0x1b, b'O', final_byte]
    }
}

fn tilde_key(code: u8, param: u8) -> Vec<u8> {
    if param > 1 {
        format!("\x1b[{code};{param}~").into_bytes()
    } else {
        format!("\x1b[{code}~").into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(s: &str) -> Key {
        Key::Character(s.into())
    }

    const NONE: ModifiersState = ModifiersState::empty();

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(encode_key(&ch("a"), NONE, false), b"a");
        assert_eq!(encode_key(&ch("é"), NONE, false), "é".as_bytes());
        assert_eq!(encode_key(&ch("A"), ModifiersState::SHIFT, false), b"A");
    }

    #[test]
    fn ctrl_letters_become_c0_bytes() {
        assert_eq!(encode_key(&ch("c"), ModifiersState::CONTROL, false), vec![0x03]);
        assert_eq!(encode_key(&ch("A"), ModifiersState::CONTROL, false), vec![0x01]);
        assert_eq!(encode_key(&ch("["), ModifiersState::CONTROL, false), vec![0x1b]);
        assert_eq!(encode_key(&ch("]"), ModifiersState::CONTROL, false), vec![0x1d]);
        assert_eq!(encode_key(&ch("6"), ModifiersState::CONTROL, false), vec![0x1e]);
    }

    #[test]
    fn ctrl_with_unmapped_char_sends_text() {
        assert_eq!(encode_key(&ch("1"), ModifiersState::CONTROL, false), b"1");
    }

    #[test]
    fn alt_prefixes_escape() {
        assert_eq!(encode_key(&ch("x"), ModifiersState::ALT, false), b"\x1bx");
        let ctrl_alt = ModifiersState::CONTROL | ModifiersState::ALT;
        assert_eq!(encode_key(&ch("w"), ctrl_alt, false), vec![0x1b, 0x17]);
        assert_eq!(
            encode_key(&Key::Named(NamedKey::Enter), ModifiersState::ALT, false),
            b"\x1b\r"
        );
    }

    #[test]
    fn editing_keys() {
        let named = |k| encode_key(&Key::Named(k), NONE, false);
        assert_eq!(named(NamedKey::Enter), b"\r");
        assert_eq!(named(NamedKey::Backspace), b"\x7f");
        assert_eq!(named(NamedKey::Escape), b"\x1b");
        assert_eq!(named(NamedKey::Space), b" ");
        assert_eq!(named(NamedKey::Delete), b"\x1b[3~");
        assert_eq!(
            encode_key(&Key::Named(NamedKey::Tab), ModifiersState::SHIFT, false),
            b"\x1b[Z"
        );
        assert_eq!(
            encode_key(&Key::Named(NamedKey::Space), ModifiersState::CONTROL, false),
            b"\0"
        );
    }

    #[test]
    fn cursor_keys_follow_decckm() {
        let up = Key::Named(NamedKey::ArrowUp);
        assert_eq!(encode_key(&up, NONE, false), b"\x1b[A");
        assert_eq!(encode_key(&up, NONE, true), b"\x1bOA");
        assert_eq!(encode_key(&Key::Named(NamedKey::End), NONE, true), b"\x1bOF");
    }

    #[test]
    fn modified_keys_use_parameter_form() {
        assert_eq!(
            encode_key(&Key::Named(NamedKey::ArrowLeft), ModifiersState::CONTROL, true),
            b"\x1b[1;5D"
        );
        assert_eq!(
            encode_key(&Key::Named(NamedKey::F1), ModifiersState::SHIFT, false),
            b"\x1b[1;2P"
        );
        assert_eq!(
            encode_key(&Key::Named(NamedKey::PageUp), ModifiersState::ALT, false),
            b"\x1b[5;3~"
        );
    }

    #[test]
    fn function_keys() {
        let named = |k| encode_key(&Key::Named(k), NONE, false);
        assert_eq!(named(NamedKey::F1), b"\x1bOP");
        assert_eq!(named(NamedKey::F5), b"\x1b[15~");
        assert_eq!(named(NamedKey::F12), b"\x1b[24~");
    }

    #[test]
    fn unsupported_keys_encode_to_nothing() {
        assert!(encode_key(&Key::Named(NamedKey::CapsLock), NONE, false).is_empty());
        assert!(encode_key(&Key::Dead(None), NONE, false).is_empty());
    }
}
