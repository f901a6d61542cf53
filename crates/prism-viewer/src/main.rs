use anyhow::Result;
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::{RenderConfig, Runtime};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RenderConfig::default().with_env_overrides();
    log::info!(
        "starting {}x{} \"{}\" with {:?} programs",
        config.width,
        config.height,
        config.title,
        config.shader_source
    );

    Runtime::run(config)
}
