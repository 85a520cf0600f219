use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "imagecap";
pub const CONFIG_FILENAME: &str = "config.json";
pub const ENDPOINT_ENV: &str = "IMAGECAP_ENDPOINT";

/// `<config dir>/imagecap/config.json`, or `./config.json` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILENAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}
