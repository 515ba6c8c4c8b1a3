//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置管理，不关心图片最终画到哪里。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节（类型 / 体积校验）
//! 3. 解码为 RGBA
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ImageConfig>>` 共享，单次加载使用同一配置快照。
//! - 异步入口把阻塞的读取与解码丢到 tokio 阻塞线程池，结果只有成功 / 失败两种终态，
//!   不做重试、超时与取消；后发起的加载结果直接覆盖先前状态。
//! - 记录 `load/decode/total` 阶段耗时，便于性能诊断。

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::DecodedImage;
use super::{ImageConfig, ImageError, ImageSource};

/// 图片处理器。
#[derive(Clone)]
pub struct ImageHandler {
    pub(super) config: Arc<RwLock<ImageConfig>>,
}

impl ImageHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use email_banner::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// # Ok::<(), email_banner::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次加载链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<ImageConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 原地修改配置。
    pub fn update_config<F>(&self, apply: F) -> Result<(), ImageError>
    where
        F: FnOnce(&mut ImageConfig),
    {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        apply(&mut config);
        Ok(())
    }

    /// 处理主入口：从任意来源加载并解码图片（同步）。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use email_banner::image_handler::{ImageConfig, ImageHandler, ImageSource};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// let image = handler.load(ImageSource::FilePath("photo.jpg".into()))?;
    /// println!("{}x{}", image.width(), image.height());
    /// # Ok::<(), email_banner::image_handler::ImageError>(())
    /// ```
    pub fn load(&self, source: ImageSource) -> Result<DecodedImage, ImageError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = match source {
            ImageSource::FilePath(path) => self.load_from_file(&path, &config)?,
            ImageSource::Bytes { bytes, mime } => {
                self.load_from_bytes(bytes, mime.as_deref(), &config)?
            }
            ImageSource::Base64(data) => self.load_from_base64(&data, &config)?,
        };
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let decoded = self.decode_image(raw, &config)?;
        let decode_elapsed = decode_start.elapsed();

        log::info!(
            "✅ 图片加载完成 - load={}ms decode={}ms total={}ms",
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(decoded)
    }

    /// 异步加载：在阻塞线程池中执行 [`ImageHandler::load`]。
    pub async fn load_async(&self, source: ImageSource) -> Result<DecodedImage, ImageError> {
        let handler = self.clone();
        tokio::task::spawn_blocking(move || handler.load(source))
            .await
            .map_err(|e| ImageError::Decode(format!("图片加载任务异常结束：{}", e)))?
    }

    /// 加载 Logo。
    ///
    /// Logo 与用户上传走同一套校验：签名必须是图片，体积受 `max_file_size` 限制，
    /// 像素受解码限制约束。超出限制的 Logo 文件与缺失文件一样按不可用处理。
    /// 任何失败都统一映射为 `LogoUnavailable`，由调用方降级为占位图。
    pub async fn load_logo(&self, path: &Path) -> Result<DecodedImage, ImageError> {
        self.load_async(ImageSource::FilePath(path.to_path_buf()))
            .await
            .map_err(|err| ImageError::LogoUnavailable(format!("{}：{}", path.display(), err)))
    }
}
