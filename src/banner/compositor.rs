//! # 合成器
//!
//! ## 设计思路
//!
//! `Compositor::render` 是 `BannerConfig` 的纯函数：同样的配置必然得到逐字节相同的像素。
//! 图层由后往前固定为：
//!
//! ```text
//! 背景色 → 右侧素材（裁剪铺满 / 等比适配）→ 左上角 Logo（图片或占位图）→ 标题
//! ```
//!
//! 画布上的 UI 副作用（遮罩、下载按钮状态）由会话层负责，合成器不感知。

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::config::{Asset, BannerConfig, CANVAS_HEIGHT, CANVAS_WIDTH, DisplayMode, HexColor};
use super::geometry::{Rect, crop_to_cover, fit_within};
use super::layout::{LOGO_SIZE, LOGO_X, LOGO_Y, layout_title};
use super::typeface::Typeface;
use crate::image_handler::{DecodedImage, resize_region};

/// 右侧素材区域：画布右半边，全高。
pub const ASSET_AREA: Rect = Rect::new(
    (CANVAS_WIDTH / 2) as f64,
    0.0,
    (CANVAS_WIDTH / 2) as f64,
    CANVAS_HEIGHT as f64,
);

const PLACEHOLDER_FILL: HexColor = HexColor::rgb(0xE0, 0xE0, 0xE0);
const PLACEHOLDER_BORDER: HexColor = HexColor::rgb(0xCC, 0xCC, 0xCC);
const PLACEHOLDER_LABEL: HexColor = HexColor::rgb(0x99, 0x99, 0x99);
const PLACEHOLDER_BORDER_WIDTH: u32 = 2;
const PLACEHOLDER_LABEL_PX: f32 = 16.0;
const PLACEHOLDER_TEXT: &str = "LOGO";

/// Banner 合成器。
#[derive(Clone)]
pub struct Compositor {
    typeface: Arc<dyn Typeface>,
    filter: FilterType,
}

impl Compositor {
    pub fn new(typeface: Arc<dyn Typeface>) -> Self {
        Self {
            typeface,
            filter: FilterType::CatmullRom,
        }
    }

    /// 指定素材 / Logo 缩放滤镜。
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// 按固定图层顺序渲染整张 Banner。
    pub fn render(&self, config: &BannerConfig) -> RgbaImage {
        let (width, height) = config.canvas_size();
        let mut canvas = RgbaImage::from_pixel(width, height, config.background.to_rgba());

        if let Some(asset) = &config.asset {
            self.draw_asset(&mut canvas, asset);
        }

        if config.show_logo {
            match &config.logo {
                Some(logo) => self.draw_logo(&mut canvas, logo),
                None => self.draw_placeholder_logo(&mut canvas),
            }
        }

        self.draw_title(&mut canvas, config);

        canvas
    }

    fn draw_asset(&self, canvas: &mut RgbaImage, asset: &Asset) {
        let source = asset.image.pixels();
        let (src_width, src_height) = source.dimensions();

        match asset.display_mode {
            DisplayMode::Crop => {
                let Some(window) = crop_to_cover(src_width, src_height, ASSET_AREA) else {
                    return;
                };
                let (x, y, w, h) = ASSET_AREA.to_pixels();
                let scaled = resize_region(source, Some(window), w, h, self.filter);
                imageops::overlay(canvas, &scaled, x, y);
            }
            DisplayMode::Fit => {
                let Some(rect) = fit_within(src_width, src_height, ASSET_AREA) else {
                    return;
                };
                let (x, y, w, h) = rect.to_pixels();
                let scaled = resize_region(source, None, w, h, self.filter);
                imageops::overlay(canvas, &scaled, x, y);
            }
        }
    }

    fn draw_logo(&self, canvas: &mut RgbaImage, logo: &DecodedImage) {
        let scaled = resize_region(logo.pixels(), None, LOGO_SIZE, LOGO_SIZE, self.filter);
        imageops::overlay(canvas, &scaled, LOGO_X as i64, LOGO_Y as i64);
    }

    /// 浅灰底 + 描边 + 居中 “LOGO” 字样。
    ///
    /// 描边沿边线居中（一半在框内、一半在框外），与浏览器 `strokeRect` 一致。
    fn draw_placeholder_logo(&self, canvas: &mut RgbaImage) {
        fill_rect(canvas, LOGO_X, LOGO_Y, LOGO_SIZE, LOGO_SIZE, PLACEHOLDER_FILL.to_rgba());

        let half = PLACEHOLDER_BORDER_WIDTH / 2;
        stroke_rect(
            canvas,
            LOGO_X - half,
            LOGO_Y - half,
            LOGO_SIZE + PLACEHOLDER_BORDER_WIDTH,
            PLACEHOLDER_BORDER_WIDTH,
            PLACEHOLDER_BORDER.to_rgba(),
        );

        let center_x = (LOGO_X + LOGO_SIZE / 2) as f32;
        let center_y = (LOGO_Y + LOGO_SIZE / 2) as f32;
        let label_width = self.typeface.measure(PLACEHOLDER_TEXT, PLACEHOLDER_LABEL_PX);
        self.typeface.draw(
            canvas,
            PLACEHOLDER_TEXT,
            center_x - label_width / 2.0,
            center_y,
            PLACEHOLDER_LABEL_PX,
            PLACEHOLDER_LABEL.to_rgba(),
        );
    }

    fn draw_title(&self, canvas: &mut RgbaImage, config: &BannerConfig) {
        let Some(layout) = layout_title(config, self.typeface.as_ref()) else {
            return;
        };

        let color = layout.color.to_rgba();
        for line in &layout.lines {
            self.typeface
                .draw(canvas, &line.text, layout.x, line.center_y, layout.font_size_px, color);
        }

        log::debug!(
            "标题排版完成 - 行数: {} 字号: {}px 左边距: {}",
            layout.lines.len(),
            layout.font_size_px,
            layout.x
        );
    }
}

/// 不透明填充矩形，超出画布部分忽略。
fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// 在 `(x, y, size, size)` 外框内侧画 `line_width` 宽的边框。
fn stroke_rect(canvas: &mut RgbaImage, x: u32, y: u32, size: u32, line_width: u32, color: Rgba<u8>) {
    let inner = size.saturating_sub(2 * line_width);
    fill_rect(canvas, x, y, size, line_width, color);
    fill_rect(canvas, x, y + size - line_width, size, line_width, color);
    fill_rect(canvas, x, y + line_width, line_width, inner, color);
    fill_rect(canvas, x + size - line_width, y + line_width, line_width, inner, color);
}
