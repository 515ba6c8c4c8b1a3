//! # Banner 配置模型
//!
//! ## 设计思路
//!
//! 每次渲染都由会话层根据当前表单状态重新构建一个不可变的 `BannerConfig`，
//! 合成器只读它，不持有任何全局可变状态。
//!
//! - 画布尺寸在进程生命周期内固定（900x300）。
//! - 背景色在进入配置前就完成校验，渲染阶段不会再失败。
//! - 字号在写入时收敛到 16~72px，避免超大字号破坏固定画布布局。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::image_handler::DecodedImage;

pub const CANVAS_WIDTH: u32 = 900;
pub const CANVAS_HEIGHT: u32 = 300;

pub const FONT_SIZE_MIN: u32 = 16;
pub const FONT_SIZE_MAX: u32 = 72;
pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// 表单提供的背景色色板。
pub const BACKGROUND_SWATCHES: &[&str] = &["#FFFFFF", "#000000", "#F5F5F5", "#FF0000"];

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$")
        .expect("hex color pattern must compile")
});

/// `#RRGGBB` 形式的不透明颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor([u8; 3]);

impl HexColor {
    pub const WHITE: HexColor = HexColor([0xFF, 0xFF, 0xFF]);
    pub const BLACK: HexColor = HexColor([0x00, 0x00, 0x00]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// 解析 `#RRGGBB`（大小写均可）。
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let caps = HEX_COLOR
            .captures(value.trim())
            .ok_or_else(|| AppError::InvalidColor(value.to_string()))?;

        let channel = |idx: usize| -> Result<u8, AppError> {
            u8::from_str_radix(&caps[idx], 16).map_err(|_| AppError::InvalidColor(value.to_string()))
        };

        Ok(Self([channel(1)?, channel(2)?, channel(3)?]))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 标题文字颜色：仅纯黑背景用白字，其余一律深灰。
pub fn title_color_for(background: HexColor) -> HexColor {
    if background == HexColor::BLACK {
        HexColor::WHITE
    } else {
        HexColor::rgb(0x33, 0x33, 0x33)
    }
}

/// 将任意输入字号收敛到允许范围。
pub fn clamp_font_size(px: i64) -> u32 {
    px.clamp(FONT_SIZE_MIN as i64, FONT_SIZE_MAX as i64) as u32
}

/// 素材展示方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// 铺满右侧区域，多余部分居中裁掉（照片）。
    #[default]
    #[serde(alias = "photo")]
    Crop,
    /// 完整放入右侧区域并居中，保留透明背景（3D 素材）。
    #[serde(alias = "3d")]
    Fit,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Fit => "fit",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "crop" | "photo" => Ok(Self::Crop),
            "fit" | "3d" => Ok(Self::Fit),
            other => Err(format!("未知展示方式：{}（可选：crop / fit）", other)),
        }
    }
}

/// 用户上传的素材。
#[derive(Debug, Clone)]
pub struct Asset {
    pub image: Arc<DecodedImage>,
    pub display_mode: DisplayMode,
}

/// 单次渲染的完整输入。
#[derive(Debug, Clone)]
pub struct BannerConfig {
    pub background: HexColor,
    pub title: String,
    pub font_size_px: u32,
    pub show_logo: bool,
    /// 已加载的 Logo；`None` 表示仍在加载或加载失败，绘制占位图。
    pub logo: Option<Arc<DecodedImage>>,
    pub asset: Option<Asset>,
}

impl BannerConfig {
    pub fn canvas_size(&self) -> (u32, u32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            background: HexColor::WHITE,
            title: String::new(),
            font_size_px: DEFAULT_FONT_SIZE,
            show_logo: true,
            logo: None,
            asset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_cases() {
        assert_eq!(HexColor::parse("#ffffff").unwrap(), HexColor::WHITE);
        assert_eq!(HexColor::parse("#FF0000").unwrap(), HexColor::rgb(255, 0, 0));
        assert_eq!(HexColor::parse(" #000000 ").unwrap(), HexColor::BLACK);
    }

    #[test]
    fn parse_rejects_malformed_values() {
        for bad in ["", "#fff", "ffffff", "#GGGGGG", "#1234567", "red"] {
            assert!(
                matches!(HexColor::parse(bad), Err(AppError::InvalidColor(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn display_is_uppercase_hex() {
        assert_eq!(HexColor::rgb(0xab, 0x01, 0xff).to_string(), "#AB01FF");
    }

    #[test]
    fn only_pure_black_gets_white_title() {
        assert_eq!(title_color_for(HexColor::BLACK), HexColor::WHITE);
        for bg in ["#FFFFFF", "#ffffff", "#ff0000", "#010101", "#333333"] {
            let color = HexColor::parse(bg).unwrap();
            assert_eq!(title_color_for(color).to_string(), "#333333", "background {bg}");
        }
    }

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(clamp_font_size(4), FONT_SIZE_MIN);
        assert_eq!(clamp_font_size(32), 32);
        assert_eq!(clamp_font_size(500), FONT_SIZE_MAX);
        assert_eq!(clamp_font_size(-10), FONT_SIZE_MIN);
    }

    #[test]
    fn display_mode_accepts_legacy_names() {
        assert_eq!("photo".parse::<DisplayMode>(), Ok(DisplayMode::Crop));
        assert_eq!("3D".parse::<DisplayMode>(), Ok(DisplayMode::Fit));
        assert_eq!("fit".parse::<DisplayMode>(), Ok(DisplayMode::Fit));
        assert!("stretch".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn display_mode_serde_uses_lowercase_and_aliases() {
        assert_eq!(serde_json::to_string(&DisplayMode::Fit).unwrap(), "\"fit\"");
        let mode: DisplayMode = serde_json::from_str("\"photo\"").unwrap();
        assert_eq!(mode, DisplayMode::Crop);
    }

    #[test]
    fn swatches_are_valid_colors() {
        for swatch in BACKGROUND_SWATCHES {
            assert!(HexColor::parse(swatch).is_ok());
        }
        assert_eq!(BACKGROUND_SWATCHES[0], DEFAULT_BACKGROUND);
    }
}
