//! Per-section validators.

use crate::schema::LightNvimConfig;

use super::helpers::{validate_color, validate_non_empty, validate_range, validate_range_f32};

pub(crate) fn validate_editor(errors: &mut Vec<String>, config: &LightNvimConfig) {
    let editor = &config.editor;
    validate_non_empty(errors, "editor.program", &editor.program);
    validate_non_empty(errors, "editor.plugin_script", &editor.plugin_script);
    validate_non_empty(errors, "editor.listen_env", &editor.listen_env);
    if editor.listen_env.contains('=') {
        errors.push("editor.listen_env must not contain '='".into());
    }
    validate_range(
        errors,
        "editor.readiness_grace_ms",
        editor.readiness_grace_ms,
        0,
        5_000,
    );
}

pub(crate) fn validate_font(errors: &mut Vec<String>, config: &LightNvimConfig) {
    validate_non_empty(errors, "font.family", &config.font.family);
    validate_range_f32(errors, "font.size", config.font.size, 4.0, 72.0);
}

pub(crate) fn validate_window(errors: &mut Vec<String>, config: &LightNvimConfig) {
    let window = &config.window;
    validate_range(errors, "window.width", u64::from(window.width), 100, 16_384);
    validate_range(errors, "window.height", u64::from(window.height), 100, 16_384);
    validate_range(
        errors,
        "window.padding.horizontal",
        u64::from(window.padding.horizontal()),
        0,
        200,
    );
    validate_range(
        errors,
        "window.padding.vertical",
        u64::from(window.padding.vertical()),
        0,
        200,
    );
}

pub(crate) fn validate_terminal(errors: &mut Vec<String>, config: &LightNvimConfig) {
    let terminal = &config.terminal;
    validate_color(errors, "terminal.foreground", &terminal.foreground);
    validate_color(errors, "terminal.background", &terminal.background);
    validate_color(errors, "terminal.cursor_color", &terminal.cursor_color);
    validate_range(
        errors,
        "terminal.cursor_blink_interval_ms",
        u64::from(terminal.cursor_blink_interval_ms),
        100,
        2_000,
    );
    validate_range_f32(
        errors,
        "terminal.cursor_aspect_ratio",
        terminal.cursor_aspect_ratio,
        0.05,
        1.0,
    );
    validate_range(
        errors,
        "terminal.scrollback_lines",
        u64::from(terminal.scrollback_lines),
        0,
        100_000,
    );
}
