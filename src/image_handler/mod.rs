//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“来源识别 → 加载校验 → 解码 → 缩放”按职责拆分为多个子模块，
//! 合成器只拿到解码好的 RGBA 图像，不关心图片从哪里来。
//!
//! - `handler`：编排整条加载流水线（同步 / 异步入口）
//! - `loader`：负责文件 / 字节 / Base64 加载与类型、体积校验
//! - `pipeline`：负责解码、像素限制与缩放
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! BannerSession::upload_asset / load_logo
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（类型 → 体积校验）
//!    └─ pipeline.rs（header 尺寸 → 像素限制 → 解码）
//!    ↓
//! DecodedImage / ImageError
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;

pub use config::{ImageConfig, MAX_UPLOAD_BYTES};
pub use error::ImageError;
pub use handler::ImageHandler;
pub use pipeline::{CropWindow, resize_region};
pub use source::{DecodedImage, ImageSource};
