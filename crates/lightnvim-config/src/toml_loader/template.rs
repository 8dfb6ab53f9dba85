//! Commented default config written on first run.

pub(super) fn default_config_toml() -> &'static str {
    r##"# lightnvim configuration
# Only override what you want to change -- missing fields use defaults.

[editor]
# program = "nvim"
# runtime_dir = "/usr/share/lightnvim/runtime"   # default: auto-detect
# plugin_script = "plugin/lightnvim.vim"
# init_script = "ginit.vim"
# listen_env = "NVIM_LISTEN_ADDRESS"
# readiness_grace_ms = 100   # 0-5000

[font]
# family = "Monospace"
# size = 11.0                # 4-72, points

[window]
# title = "NVIM"
# width = 800
# height = 600
# icon = "/usr/share/pixmaps/nvim.png"

[window.padding]
# left = 1
# right = 1
# top = 1
# bottom = 1

[terminal]
# foreground = "#d0d0d0"
# background = "#000000"     # names, #rgb, #rrggbb, rgb(), rgba()
# cursor_color = "#d0d0d0"
# cursor_blink = true
# cursor_blink_interval_ms = 600
# cursor_aspect_ratio = 0.1
# mouse_autohide = true
# scrollback_lines = 1000

[logging]
# level = "INFO"             # TRACE, DEBUG, INFO, WARNING, ERROR
"##
}
