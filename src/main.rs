use anyhow::{Context, Result};
use std::path::PathBuf;

use framecycle::app::App;
use framecycle::config::Config;
use framecycle::logging;

fn load_config() -> Result<Config> {
    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => match Config::default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };
    Config::load_from_file(&path).with_context(|| format!("Failed to load {}", path.display()))
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    if let Err(e) = logging::init(tx.clone(), config.log_level_filter()) {
        eprintln!("Failed to install logger: {}", e);
    }

    let picker = ratatui_image::picker::Picker::from_query_stdio().unwrap_or_else(|e| {
        eprintln!("Failed to query terminal ({}), using fallback", e);
        ratatui_image::picker::Picker::from_fontsize((8, 16))
    });

    let mut app = App::new_with_picker(config, picker, tx, rx);
    if let Err(e) = app.run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
