//! 素材摆放几何计算
//!
//! # 设计思路
//!
//! 两种摆放策略都是纯函数：输入源图尺寸与目标区域，输出唯一结果，便于测试。
//!
//! 1. **裁剪铺满** (`crop_to_cover`)：返回源图上需要取的窗口，
//!    窗口宽高比与目标区域一致，多出的部分沿长边对称裁掉。目标区域总是被完全覆盖。
//! 2. **等比适配** (`fit_within`)：返回目标区域内的绘制矩形，
//!    源图完整保留且宽高比不变，空余部分两侧均分。
//!
//! 零尺寸输入统一返回空结果，由调用方跳过绘制。

use crate::image_handler::CropWindow;

/// 画布上的浮点矩形（像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// 四舍五入到像素网格，返回 `(x, y, width, height)`，宽高至少为 1。
    pub fn to_pixels(&self) -> (i64, i64, u32, u32) {
        (
            self.x.round() as i64,
            self.y.round() as i64,
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// 计算“裁剪铺满”时源图上的取样窗口。
///
/// - 源图相对更宽：保留全高，宽度取 `src_h * target_aspect`，水平居中
/// - 否则：保留全宽，高度取 `src_w / target_aspect`，垂直居中
pub fn crop_to_cover(src_width: u32, src_height: u32, target: Rect) -> Option<CropWindow> {
    if src_width == 0 || src_height == 0 || target.is_empty() {
        return None;
    }

    let src_w = src_width as f64;
    let src_h = src_height as f64;
    let image_aspect = src_w / src_h;
    let target_aspect = target.width / target.height;

    let window = if image_aspect > target_aspect {
        let width = src_h * target_aspect;
        CropWindow {
            left: (src_w - width) / 2.0,
            top: 0.0,
            width,
            height: src_h,
        }
    } else {
        let height = src_w / target_aspect;
        CropWindow {
            left: 0.0,
            top: (src_h - height) / 2.0,
            width: src_w,
            height,
        }
    };

    Some(window)
}

/// 计算“等比适配”时在目标区域内的绘制矩形。
///
/// 会溢出的一边收敛到区域尺寸，另一边按比例缩放；小图同样会被放大到贴边。
pub fn fit_within(src_width: u32, src_height: u32, bounds: Rect) -> Option<Rect> {
    if src_width == 0 || src_height == 0 || bounds.is_empty() {
        return None;
    }

    let image_aspect = src_width as f64 / src_height as f64;
    let (width, height) = if image_aspect > bounds.width / bounds.height {
        (bounds.width, bounds.width / image_aspect)
    } else {
        (bounds.height * image_aspect, bounds.height)
    };

    Some(Rect {
        x: bounds.x + (bounds.width - width) / 2.0,
        y: bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Rect = Rect::new(450.0, 0.0, 450.0, 300.0);

    #[test]
    fn crop_wide_image_trims_sides() {
        let window = crop_to_cover(1200, 300, TARGET).unwrap();

        assert_eq!(window.height, 300.0);
        assert_eq!(window.width, 450.0);
        assert_eq!(window.left, 375.0);
        assert_eq!(window.top, 0.0);
    }

    #[test]
    fn crop_tall_image_trims_top_and_bottom() {
        let window = crop_to_cover(300, 900, TARGET).unwrap();

        assert_eq!(window.width, 300.0);
        assert_eq!(window.height, 200.0);
        assert_eq!(window.top, 350.0);
        assert_eq!(window.left, 0.0);
    }

    #[test]
    fn crop_same_aspect_keeps_everything() {
        let window = crop_to_cover(900, 600, TARGET).unwrap();

        assert_eq!(
            window,
            CropWindow {
                left: 0.0,
                top: 0.0,
                width: 900.0,
                height: 600.0
            }
        );
    }

    #[test]
    fn fit_wide_image_letterboxes_vertically() {
        let rect = fit_within(900, 300, TARGET).unwrap();

        assert_eq!(rect, Rect::new(450.0, 75.0, 450.0, 150.0));
    }

    #[test]
    fn fit_tall_image_pillarboxes_horizontally() {
        let rect = fit_within(100, 200, TARGET).unwrap();

        assert_eq!(rect, Rect::new(600.0, 0.0, 150.0, 300.0));
    }

    #[test]
    fn zero_sized_inputs_yield_nothing() {
        assert!(crop_to_cover(0, 10, TARGET).is_none());
        assert!(fit_within(10, 0, TARGET).is_none());
        assert!(fit_within(10, 10, Rect::new(0.0, 0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn to_pixels_rounds_and_keeps_at_least_one_pixel() {
        assert_eq!(Rect::new(600.4, 0.5, 149.6, 0.2).to_pixels(), (600, 1, 150, 1));
    }
}
