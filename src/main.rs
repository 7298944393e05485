use std::path::{Path, PathBuf};

use nozzle::{Options, Viewer};

/// Options file picked up from the working directory when no path is given.
const DEFAULT_OPTIONS_FILE: &str = "nozzle.toml";

fn resolve_options_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Some(PathBuf::from(arg));
    }
    let local = Path::new(DEFAULT_OPTIONS_FILE);
    local.exists().then(|| local.to_path_buf())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let options = match resolve_options_path() {
        Some(path) => match Options::load(&path) {
            Ok(options) => {
                log::info!("loaded options from {}", path.display());
                options
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    if let Err(e) = Viewer::builder().with_options(options).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
