mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use galaxy_economy_core::{CommodityCatalog, EconomyConfig, Galaxy, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let galaxy = match resolve_config_path("galaxy.yaml")? {
        Some(path) => Galaxy::load_from_path(&path)?,
        None => Galaxy::from_embedded()?,
    };
    let catalog = match resolve_config_path("commodities.yaml")? {
        Some(path) => CommodityCatalog::load_from_path(&path)?,
        None => CommodityCatalog::from_embedded()?,
    };
    let config = match resolve_config_path("economy.yaml")? {
        Some(path) => EconomyConfig::load_from_path(&path)?,
        None => EconomyConfig::from_embedded()?,
    };

    let mut simulation =
        Simulation::new(galaxy, catalog, config).context("シミュレーションの初期化に失敗しました")?;
    cli::run(&mut simulation)
}

fn resolve_config_path(file_name: &str) -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir().context("カレントディレクトリの取得に失敗しました")?;
    let candidates = [
        cwd.join("config").join(file_name),
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("config")
            .join(file_name),
    ];

    for path in candidates {
        if path.exists() {
            info!(path = %path.display(), "設定ファイルを読み込みます");
            return Ok(Some(path));
        }
    }

    info!(file = file_name, "設定ファイルが見つからないため組み込みデータを使用します");
    Ok(None)
}
