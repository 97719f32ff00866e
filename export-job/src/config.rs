use export_config::load_config;
use export_config::shared::ExportJobConfig;

/// Loads the [`ExportJobConfig`] and validates it.
pub fn load_export_job_config() -> anyhow::Result<ExportJobConfig> {
    let config = load_config::<ExportJobConfig>()?;
    config.validate()?;

    Ok(config)
}
