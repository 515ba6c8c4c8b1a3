//! 表单设置读写
//!
//! 将上一次使用的表单取值（背景色、标题、字号、Logo 开关、展示方式）以及
//! Logo / 字体 / 输出目录等路径保存为 JSON，下次启动时恢复。
//! 这里只记录偏好，不保存生成过的 Banner。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::banner::{DEFAULT_BACKGROUND, DEFAULT_FONT_SIZE, DisplayMode};
use crate::error::AppError;

pub const DEFAULT_LOGO_PATH: &str = "assets/logo.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerSettings {
    pub background_color: String,
    pub title: String,
    pub font_size: u32,
    pub show_logo: bool,
    pub display_mode: DisplayMode,
    pub asset_path: Option<PathBuf>,
    pub logo_path: PathBuf,
    pub font_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            title: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            show_logo: true,
            display_mode: DisplayMode::Crop,
            asset_path: None,
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            font_path: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// 读取设置文件；文件不存在时返回默认值。
pub fn load_settings(path: &Path) -> Result<BannerSettings, AppError> {
    if !path.exists() {
        log::debug!("设置文件不存在，使用默认设置: {}", path.display());
        return Ok(BannerSettings::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str::<BannerSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
}

/// 以格式化 JSON 写入设置文件。
pub fn save_settings(path: &Path, settings: &BannerSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_settings_path() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir()
            .join(format!("email_banner_settings_{}", nanos))
            .join("settings.json")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(&temp_settings_path()).unwrap();
        assert_eq!(settings, BannerSettings::default());
        assert_eq!(settings.font_size, 32);
        assert!(settings.show_logo);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_settings_path();
        let settings = BannerSettings {
            background_color: "#000000".to_string(),
            title: "Big Summer Sale".to_string(),
            font_size: 48,
            show_logo: false,
            display_mode: DisplayMode::Fit,
            ..BannerSettings::default()
        };

        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let path = temp_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "title": "Hi", "display_mode": "3d" }"#).unwrap();

        let loaded = load_settings(&path).unwrap();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded.title, "Hi");
        assert_eq!(loaded.display_mode, DisplayMode::Fit);
        assert_eq!(loaded.background_color, "#FFFFFF");
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = temp_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let result = load_settings(&path);
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert!(matches!(result, Err(AppError::Settings(_))));
    }
}
