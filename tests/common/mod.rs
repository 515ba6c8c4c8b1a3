//! 集成测试共用工具

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use email_banner::banner::{Compositor, Typeface};
use email_banner::image_handler::{ImageConfig, ImageHandler, ImageSource};
use email_banner::session::BannerSession;
use image::{ImageFormat, Rgba, RgbaImage};

/// 方块字体：每个字符宽 `px / 2`，非空白字符画成一个实心方块。
///
/// 不依赖系统字体，像素位置可以精确推算。
pub struct BlockFace;

impl Typeface for BlockFace {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px / 2.0
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, center_y: f32, px: f32, color: Rgba<u8>) {
        let advance = px / 2.0;
        let half_height = px * 0.3;
        let top = (center_y - half_height).max(0.0) as u32;
        let bottom = ((center_y + half_height) as u32).min(canvas.height());

        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (x + index as f32 * advance).max(0.0) as u32;
            let right = ((x + (index + 1) as f32 * advance - 1.0) as u32).min(canvas.width());
            for py in top..bottom {
                for px in left..right {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

pub fn compositor() -> Compositor {
    Compositor::new(Arc::new(BlockFace))
}

pub fn session() -> BannerSession {
    let handler = ImageHandler::new(ImageConfig::default()).expect("handler init failed");
    BannerSession::new(handler, compositor())
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("png encode failed");
    cursor.into_inner()
}

pub fn png_source(width: u32, height: u32, color: [u8; 4]) -> ImageSource {
    ImageSource::Bytes {
        bytes: png_bytes(&RgbaImage::from_pixel(width, height, Rgba(color))),
        mime: Some("image/png".to_string()),
    }
}

pub fn rgb(canvas: &RgbaImage, x: u32, y: u32) -> [u8; 3] {
    let p = canvas.get_pixel(x, y).0;
    [p[0], p[1], p[2]]
}

/// 经过缩放的像素允许 ±2 的误差。
pub fn assert_near(canvas: &RgbaImage, x: u32, y: u32, expected: [u8; 3]) {
    let actual = rgb(canvas, x, y);
    for channel in 0..3 {
        let diff = (actual[channel] as i16 - expected[channel] as i16).abs();
        assert!(diff <= 2, "({x}, {y}): {actual:?} != {expected:?}");
    }
}
