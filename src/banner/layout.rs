//! # 标题排版模块
//!
//! ## 设计思路
//!
//! 排版与绘制分离：先算出每行文字与位置（`TitleLayout`），再交给合成器绘制。
//! 这样换行、边距、垂直居中都可以脱离像素单独验证。
//!
//! ## 实现思路
//!
//! - 贪心换行：逐词追加，追加后超宽就另起一行；单词本身超宽时独占一行，绝不拆词。
//! - 左边距：显示 Logo 位（真实 Logo 或占位图）时 110px，否则 30px。
//! - 最大行宽：`画布宽 / 2 - 左边距 - 20`，右半边留给素材。
//! - 行高 `字号 * 1.2`，整段文字以画布中线为中心垂直居中。
//! - 字号在排版时再次收敛到 16~72px，合成器不会按越界字号栅格化。

use super::config::{
    BannerConfig, CANVAS_HEIGHT, CANVAS_WIDTH, HexColor, clamp_font_size, title_color_for,
};
use super::typeface::Typeface;

/// Logo 位左上角坐标与边长。
pub const LOGO_X: u32 = 20;
pub const LOGO_Y: u32 = 20;
pub const LOGO_SIZE: u32 = 80;

const MARGIN_WITH_LOGO: f32 = (LOGO_SIZE + 30) as f32;
const MARGIN_WITHOUT_LOGO: f32 = 30.0;
const GAP_BEFORE_ASSET: f32 = 20.0;
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// 排好的一行标题。
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLine {
    pub text: String,
    /// 该行垂直中线的 y 坐标。
    pub center_y: f32,
}

/// 标题排版结果。
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLayout {
    pub x: f32,
    pub max_width: f32,
    pub font_size_px: f32,
    pub line_height: f32,
    pub color: HexColor,
    pub lines: Vec<TitleLine>,
}

/// 左边距。
pub fn title_left_margin(show_logo: bool) -> f32 {
    if show_logo {
        MARGIN_WITH_LOGO
    } else {
        MARGIN_WITHOUT_LOGO
    }
}

/// 贪心换行。
///
/// 连续空白视为单个分隔符；返回的每一行都不含首尾空白。
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// 计算标题排版；标题去除首尾空白后为空时返回 `None`。
///
/// 字号超出 16~72px 时按边界排版。
pub fn layout_title(config: &BannerConfig, typeface: &dyn Typeface) -> Option<TitleLayout> {
    let title = config.title.trim();
    if title.is_empty() {
        return None;
    }

    // `BannerConfig` 字段公开，直接构造的配置同样收敛到 16~72px
    let font_size_px = clamp_font_size(config.font_size_px as i64) as f32;
    let x = title_left_margin(config.show_logo);
    let max_width = CANVAS_WIDTH as f32 / 2.0 - x - GAP_BEFORE_ASSET;
    let line_height = font_size_px * LINE_HEIGHT_FACTOR;

    let wrapped = wrap_words(title, max_width, |line| typeface.measure(line, font_size_px));

    let total_height = wrapped.len() as f32 * line_height;
    let first_center = CANVAS_HEIGHT as f32 / 2.0 - total_height / 2.0 + line_height / 2.0;

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(index, text)| TitleLine {
            text,
            center_y: first_center + index as f32 * line_height,
        })
        .collect();

    Some(TitleLayout {
        x,
        max_width,
        font_size_px,
        line_height,
        color: title_color_for(config.background),
        lines,
    })
}
