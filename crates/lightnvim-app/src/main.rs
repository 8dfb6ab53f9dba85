mod app_state;
mod cli;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use app_state::{LightNvimApp, UserEvent};

const DEFAULT_LOG_DIRECTIVE: &str = "lightnvim=info";

/// `RUST_LOG`, plus one directive from `--log-level` or the config file.
fn init_logging(directive: &str) {
    let directive: Directive = directive.parse().unwrap_or_else(|e| {
        eprintln!("invalid log filter {directive:?} ({e}), using info");
        Directive::from(LevelFilter::INFO)
    });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

fn main() {
    // Parse CLI arguments
    let args = cli::parse();

    // Load config before logging so `[logging] level` applies; report after.
    let loaded = lightnvim_config::load_config(args.config.as_deref());
    let directive = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.directive().to_owned(),
        (None, Err(_)) => DEFAULT_LOG_DIRECTIVE.to_owned(),
    };
    init_logging(&directive);

    tracing::info!("lightnvim v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        lightnvim_config::LightNvimConfig::default()
    });
    tracing::info!(
        program = %config.editor.program,
        font = %config.font.descriptor(),
        "Config loaded"
    );

    // Create event loop and run
    let event_loop = match EventLoop::<UserEvent>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    let proxy = event_loop.create_proxy();
    let mut app = LightNvimApp::new(config, args.editor_args, proxy);

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
        std::process::exit(1);
    }

    let code = app.exit_code();
    drop(app);
    tracing::info!(code, "Shutdown complete");
    std::process::exit(code);
}
