//! Replay binary: runs fixture scripts and logs the focus trail.

use env_logger::{Builder, Env};
use log::{error, info};
use spatial_nav_replay::{discover, fixtures_dir, replay_file};
use std::env;
use std::path::PathBuf;
use std::process::exit;

/// Fixture paths from the command line, or every bundled fixture.
fn fixture_paths() -> anyhow::Result<Vec<PathBuf>> {
    let explicit: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if explicit.is_empty() {
        discover(&fixtures_dir())
    } else {
        Ok(explicit)
    }
}

fn main() {
    let _log_init: Result<(), _> = Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .is_test(false)
        .try_init();

    let paths = match fixture_paths() {
        Ok(paths) => paths,
        Err(err) => {
            error!("error: {err:#}");
            exit(1);
        }
    };

    let mut failed = 0_usize;
    for path in &paths {
        match replay_file(path) {
            Ok(steps) => info!("[REPLAY] {}: {} steps ok", path.display(), steps.len()),
            Err(err) => {
                error!("[REPLAY] {}: {err:#}", path.display());
                failed += 1;
            }
        }
    }
    info!("[REPLAY] {} fixtures, {failed} failed", paths.len());
    if failed > 0 {
        exit(1);
    }
}
