//! # 导出模块
//!
//! 将合成结果编码为 PNG，并提供三种交付方式：
//! - 原始 PNG 字节
//! - 带时间戳文件名写入目录（`email-banner-<毫秒时间戳>.png`）
//! - `data:image/png;base64,` Data URL

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};

use crate::error::AppError;

const FILE_PREFIX: &str = "email-banner";

/// 编码为 PNG 字节。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, AppError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| AppError::Export(format!("PNG 编码失败: {}", e)))?;
    Ok(cursor.into_inner())
}

/// 默认下载文件名。
pub fn banner_file_name(at: DateTime<Utc>) -> String {
    format!("{}-{}.png", FILE_PREFIX, at.timestamp_millis())
}

/// 写入 `dir`（不存在时自动创建），返回文件完整路径。
pub fn save_png(image: &RgbaImage, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Export(format!("创建输出目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }

    let file_path = dir.join(banner_file_name(at));
    fs::write(&file_path, encode_png(image)?)?;

    log::info!("💾 Banner 已保存 - {}", file_path.display());
    Ok(file_path)
}

/// 编码为 PNG Data URL。
pub fn to_data_url(image: &RgbaImage) -> Result<String, AppError> {
    let png = encode_png(image)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    ))
}
