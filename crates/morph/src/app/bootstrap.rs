use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;
use worldhost::{HostEvent, HostWorld};

use super::morphs::MorphCoordinator;

const DEMO_TICKS_ENV_VAR: &str = "MORPH_DEMO_TICKS";
const DEMO_TICKS_DEFAULT: u64 = 200;
const SAVE_PATH_ENV_VAR: &str = "MORPH_SAVE_PATH";

pub(crate) struct AppWiring {
    pub(crate) world: HostWorld,
    pub(crate) coordinator: MorphCoordinator,
    pub(crate) demo_ticks: u64,
    pub(crate) save_path: Option<PathBuf>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Morph Host Startup ===");

    let mut world = HostWorld::default();
    world.push_event(HostEvent::WorldReady);

    AppWiring {
        world,
        coordinator: MorphCoordinator::default(),
        demo_ticks: parse_demo_ticks_from_env(),
        save_path: parse_save_path_from_env(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_demo_ticks_from_env() -> u64 {
    std::env::var(DEMO_TICKS_ENV_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(DEMO_TICKS_DEFAULT)
}

fn parse_save_path_from_env() -> Option<PathBuf> {
    std::env::var_os(SAVE_PATH_ENV_VAR)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}
