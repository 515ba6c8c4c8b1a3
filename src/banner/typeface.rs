//! # 字体模块
//!
//! ## 设计思路
//!
//! 合成器只依赖 `Typeface` trait（测量 + 绘制），不绑定具体字体实现：
//! 生产环境使用 `rusttype` 加载 TrueType 字体，测试可注入等宽假字体。
//!
//! ## 实现思路
//!
//! - 字号语义与浏览器 canvas 一致：`px` 为 em 大小，而非字形总高度。
//! - 绘制锚点为“左侧 + 垂直中线”（canvas `textBaseline = middle`）。
//! - 字体文件按路径缓存（LRU），重复渲染不重复解析字体。

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use lru::LruCache;
use once_cell::sync::Lazy;
use rusttype::{Font, Scale, point};

use crate::error::AppError;

/// 未显式配置字体时按顺序尝试的系统字体（优先 Arial 度量兼容的字体）。
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const FONT_CACHE_CAPACITY: usize = 8;

static FONT_CACHE: Lazy<Mutex<LruCache<PathBuf, Arc<Font<'static>>>>> = Lazy::new(|| {
    let capacity = NonZeroUsize::new(FONT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
    Mutex::new(LruCache::new(capacity))
});

/// 文字测量与绘制能力。
pub trait Typeface: Send + Sync {
    /// 文本在 `px` 字号下的排版宽度（像素）。
    fn measure(&self, text: &str, px: f32) -> f32;

    /// 以 `(x, center_y)` 为左侧中线锚点，将文本以 `color` 混合到画布上。
    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, center_y: f32, px: f32, color: Rgba<u8>);
}

/// 基于 `rusttype` 的 TrueType 字体。
pub struct TrueTypeFace {
    font: Arc<Font<'static>>,
}

impl TrueTypeFace {
    /// 从内存字节构建字体。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AppError> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| AppError::Font("字体数据无法解析".to_string()))?;
        Ok(Self {
            font: Arc::new(font),
        })
    }

    /// 从字体文件加载（带缓存）。
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        if let Ok(mut cache) = FONT_CACHE.lock() {
            if let Some(font) = cache.get(path) {
                log::debug!("♻️ 命中字体缓存 - {}", path.display());
                return Ok(Self {
                    font: Arc::clone(font),
                });
            }
        }

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Font(format!("无法读取字体文件 {}：{}", path.display(), e)))?;
        let face = Self::from_bytes(bytes)?;

        match FONT_CACHE.lock() {
            Ok(mut cache) => {
                cache.put(path.to_path_buf(), Arc::clone(&face.font));
            }
            Err(_) => log::warn!("⚠️ 字体缓存锁已中毒，跳过缓存"),
        }

        log::info!("🔤 字体已加载 - {}", path.display());
        Ok(face)
    }

    /// 按“显式配置 → 系统常见字体”的顺序查找可用字体。
    pub fn discover(configured: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = configured {
            return Self::from_path(path);
        }

        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                match Self::from_path(path) {
                    Ok(face) => return Ok(face),
                    Err(err) => log::warn!("⚠️ 跳过无法使用的系统字体：{}", err),
                }
            }
        }

        Err(AppError::Font(
            "未找到可用字体，请通过 --font 指定 TTF 文件".to_string(),
        ))
    }

    /// 将 em 字号换算为 rusttype 的字形总高度缩放。
    fn scale_for(&self, px: f32) -> Scale {
        let units_per_em = self.font.units_per_em() as f32;
        let metrics = self.font.v_metrics_unscaled();
        let glyph_height = metrics.ascent - metrics.descent;

        if units_per_em <= 0.0 || glyph_height <= 0.0 {
            return Scale::uniform(px);
        }
        Scale::uniform(px * glyph_height / units_per_em)
    }
}

impl Typeface for TrueTypeFace {
    fn measure(&self, text: &str, px: f32) -> f32 {
        let scale = self.scale_for(px);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, center_y: f32, px: f32, color: Rgba<u8>) {
        let scale = self.scale_for(px);
        let v_metrics = self.font.v_metrics(scale);
        // descent 为负值：基线 = 中线 + (ascent + descent) / 2
        let baseline_y = center_y + (v_metrics.ascent + v_metrics.descent) / 2.0;
        let (canvas_width, canvas_height) = canvas.dimensions();

        for glyph in self.font.layout(text, scale, point(x, baseline_y)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= canvas_width || py as u32 >= canvas_height {
                    return;
                }
                blend_pixel(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

/// 按覆盖率将 `color` 混合到目标像素（source-over）。
pub(crate) fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        dst.0[channel] = (color.0[channel] as f32 * alpha + dst.0[channel] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * alpha + dst.0[3] as f32 * inv).round() as u8;
}
