//! # Banner 合成模块
//!
//! - `config`：渲染输入（背景色、标题、字号、Logo、素材）与取值约束
//! - `geometry`：素材裁剪铺满 / 等比适配的几何计算
//! - `layout`：标题贪心换行与垂直居中
//! - `typeface`：字体测量与绘制
//! - `compositor`：按图层顺序合成整张画布
//! - `export`：PNG 编码、文件名、Data URL

pub mod compositor;
pub mod config;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod typeface;

pub use compositor::{ASSET_AREA, Compositor};
pub use config::{
    Asset, BACKGROUND_SWATCHES, BannerConfig, CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_BACKGROUND,
    DEFAULT_FONT_SIZE, DisplayMode, FONT_SIZE_MAX, FONT_SIZE_MIN, HexColor, clamp_font_size,
    title_color_for,
};
pub use geometry::Rect;
pub use layout::{TitleLayout, TitleLine, layout_title, wrap_words};
pub use typeface::{TrueTypeFace, Typeface};
