// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SESSION_PATH: &str = "scene.json";

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-host")]
#[command(about = "Multi-window 3D scene host", long_about = None)]
pub struct Cli {
    /// Session document read at startup and written by "Save Scene"
    #[arg(long = "session", default_value = DEFAULT_SESSION_PATH)]
    pub session: PathBuf,

    /// Log filter (env_logger syntax), overrides RUST_LOG
    #[arg(long = "log")]
    pub log: Option<String>,
}
