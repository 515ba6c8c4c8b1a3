//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `RawImageData` 表示已加载、已通过类型/体积校验但未解码的字节
//! - `DecodedImage` 表示可直接参与合成的 RGBA 图像

use std::path::PathBuf;

use image::RgbaImage;

/// 图片输入来源。
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(PathBuf),
    /// 内存字节来源，附带上传控件声明的 MIME 类型（可缺省）。
    Bytes {
        bytes: Vec<u8>,
        mime: Option<String>,
    },
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 解码阶段输出：RGBA 像素数据。
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
