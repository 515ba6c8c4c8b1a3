//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，会话层、设置、导出与 CLI 统一返回 `Result<T, AppError>`。
//! 所有错误都是非致命的：失败的操作不会修改会话状态，调用方可以继续渲染。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，供 CLI 的 JSON 输出使用。

use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片处理流水线错误（类型 / 体积 / 解码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 背景色不是 `#RRGGBB`
    #[error("无效的颜色值: {0}")]
    InvalidColor(String),

    /// 字体不可用
    #[error("字体错误: {0}")]
    Font(String),

    /// 设置文件读写失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 编码或写出失败
    #[error("导出失败: {0}")]
    Export(String),

    /// 清空后尚未重新生成，没有可导出的画面
    #[error("请先生成 Banner 再下载")]
    NothingToExport,
}

impl AppError {
    /// 稳定的错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Image(err) => err.code(),
            Self::Io(_) => "io",
            Self::InvalidColor(_) => "invalid_color",
            Self::Font(_) => "font",
            Self::Settings(_) => "settings",
            Self::Export(_) => "export",
            Self::NothingToExport => "nothing_to_export",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
