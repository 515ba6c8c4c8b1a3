//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片链路（上传校验 / 解码 / 缩放）中的所有错误来源，
//! 避免字符串拼接式错误处理。通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 除 `LogoUnavailable` 外，其余分支都会原样展示给用户；
//! Logo 加载失败只降级为占位图，不打断用户操作。

/// 图片处理统一错误类型。
///
/// 该类型会在会话层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("文件类型错误：{0}")]
    InvalidFileType(String),

    #[error("文件过大：{0}")]
    FileTooLarge(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("Logo 不可用：{0}")]
    LogoUnavailable(String),
}

impl ImageError {
    /// 稳定的错误码，供前端或 CLI 输出分支判断。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) => "invalid_file_type",
            Self::FileTooLarge(_) => "file_too_large",
            Self::Decode(_) => "decode_failure",
            Self::FileSystem(_) => "file_system",
            Self::ResourceLimit(_) => "resource_limit",
            Self::LogoUnavailable(_) => "logo_unavailable",
        }
    }

    /// 是否需要提示给用户。
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::LogoUnavailable(_))
    }
}
