use clap::Parser;
use std::path::PathBuf;
use thumbparams_editor::{run_gui, statics};

#[derive(Parser)]
#[command(name = "thumbparams-editor", about = "Edit a ThumbParams config.json")]
struct Cli {
    /// Config file to open (default: config.json next to the executable, when present)
    config: Option<PathBuf>,
}

fn default_config_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let path = exe.parent()?.join(statics::CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config.or_else(default_config_path);
    match &config {
        Some(path) => log::info!("opening {path:?}"),
        None => log::info!("no config given; starting empty"),
    }
    run_gui(config)
}
