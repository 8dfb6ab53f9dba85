use std::path::PathBuf;

use clap::Parser;

/// lightnvim: a minimal GPU front-end that runs Neovim in a terminal.
#[derive(Parser, Debug)]
#[command(name = "lightnvim", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `lightnvim_rpc=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Arguments passed through to the editor.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub editor_args: Vec<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_args_are_forwarded_verbatim() {
        let args = Args::parse_from(["lightnvim", "-O", "a.txt", "+10", "--clean"]);
        assert_eq!(args.editor_args, vec!["-O", "a.txt", "+10", "--clean"]);
        assert!(args.config.is_none());
    }

    #[test]
    fn own_options_come_first() {
        let args = Args::parse_from([
            "lightnvim",
            "--config",
            "/tmp/c.toml",
            "--log-level",
            "debug",
            "notes.md",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.editor_args, vec!["notes.md"]);
    }

    #[test]
    fn no_arguments() {
        let args = Args::parse_from(["lightnvim"]);
        assert!(args.editor_args.is_empty());
        assert!(args.log_level.is_none());
    }
}
