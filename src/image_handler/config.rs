//! # 配置模块
//!
//! ## 设计思路
//!
//! 将上传校验与解码阶段所有“可调阈值”集中到 `ImageConfig`，保证运行时行为可观测、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供与表单一致的限制：单文件 5MB。
//! - 像素与内存上限在完整解码前生效，防止超大分辨率图片撑爆内存。
//! - `resize_filter` 同时用于素材裁剪缩放与 Logo 缩放。

use image::imageops::FilterType;

/// 上传文件体积上限（字节），5MB。
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// 图片处理配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 上传文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_UPLOAD_BYTES,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::CatmullRom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_upload_limit_is_five_megabytes() {
        let config = ImageConfig::default();
        assert_eq!(config.max_file_size, 5_242_880);
        assert!(config.max_decoded_bytes >= config.max_decoded_pixels);
    }
}
