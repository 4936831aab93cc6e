use anyhow::Context;
use boxtrack_lib::demo::{run_demo, DemoOptions};
use boxtrack_lib::SessionConfig;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    boxtrack_lib::init_tracing();
    tracing::info!("Starting boxtrack v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::var_os("BOXTRACK_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            SessionConfig::load(&path).with_context(|| format!("Failed to load config {:?}", path))?
        }
        None => SessionConfig::default(),
    };

    let mut options = DemoOptions::default();
    if let Some(output) = std::env::args_os().nth(1) {
        options.output = PathBuf::from(output);
    }

    match run_demo(&config, &options).await? {
        Some(last) => tracing::info!("Last tracked box: {:?}", last),
        None => tracing::warn!("No frames were tracked"),
    }
    Ok(())
}
