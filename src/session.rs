//! # 会话层
//!
//! ## 设计思路
//!
//! `BannerSession` 持有表单当前状态，替代散落的全局变量：
//! 每条命令修改一个字段，然后重新构建不可变的 `BannerConfig` 并立即重新渲染。
//!
//! - 上传失败（类型 / 体积 / 解码）原样返回错误，会话状态保持不变。
//! - Logo 加载失败只记录告警并降级为占位图。
//! - 切换展示方式直接改写已上传素材的模式，无需重新上传。
//! - `clear_all` 恢复默认值并丢弃上一次渲染结果，重新生成前不允许导出。
//!
//! ## 实现思路
//!
//! 解码图片用 `Arc` 共享，重建配置只增加引用计数。
//! 异步加载在 `await` 返回后才写回状态，较晚完成的加载覆盖较早的结果。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use image::RgbaImage;

use crate::banner::export;
use crate::banner::{
    Asset, BannerConfig, Compositor, DEFAULT_FONT_SIZE, DisplayMode, HexColor, clamp_font_size,
};
use crate::error::AppError;
use crate::image_handler::{DecodedImage, ImageHandler, ImageSource};
use crate::settings::BannerSettings;

/// Logo 加载状态。
#[derive(Debug, Clone, Default)]
pub enum LogoState {
    /// 尚未加载完成。
    #[default]
    Pending,
    Loaded(Arc<DecodedImage>),
    /// 加载失败，绘制占位图。
    Unavailable,
}

impl LogoState {
    fn image(&self) -> Option<Arc<DecodedImage>> {
        match self {
            Self::Loaded(image) => Some(Arc::clone(image)),
            Self::Pending | Self::Unavailable => None,
        }
    }
}

/// Banner 编辑会话。
pub struct BannerSession {
    handler: ImageHandler,
    compositor: Compositor,
    background: HexColor,
    title: String,
    font_size_px: u32,
    show_logo: bool,
    display_mode: DisplayMode,
    asset: Option<Asset>,
    logo: LogoState,
    last_render: Option<RgbaImage>,
}

impl BannerSession {
    pub fn new(handler: ImageHandler, compositor: Compositor) -> Self {
        Self {
            handler,
            compositor,
            background: HexColor::WHITE,
            title: String::new(),
            font_size_px: DEFAULT_FONT_SIZE,
            show_logo: true,
            display_mode: DisplayMode::Crop,
            asset: None,
            logo: LogoState::Pending,
            last_render: None,
        }
    }

    /// 当前状态对应的渲染配置。
    pub fn config(&self) -> BannerConfig {
        BannerConfig {
            background: self.background,
            title: self.title.clone(),
            font_size_px: self.font_size_px,
            show_logo: self.show_logo,
            logo: self.logo.image(),
            asset: self.asset.clone(),
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    pub fn logo_state(&self) -> &LogoState {
        &self.logo
    }

    /// 上一次渲染结果；清空后为 `None`。
    pub fn last_render(&self) -> Option<&RgbaImage> {
        self.last_render.as_ref()
    }

    /// 立即按当前状态重新渲染。
    pub fn generate(&mut self) -> &RgbaImage {
        let rendered = self.compositor.render(&self.config());
        log::debug!("🖼️ Banner 已重新生成");
        self.last_render.insert(rendered)
    }

    pub fn set_background_color(&mut self, value: &str) -> Result<(), AppError> {
        self.background = HexColor::parse(value)?;
        log::debug!("背景色: {}", self.background);
        self.generate();
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.generate();
    }

    /// 设置字号，超出 16~72px 时收敛到边界。
    pub fn set_font_size(&mut self, px: i64) {
        let clamped = clamp_font_size(px);
        if clamped as i64 != px {
            log::debug!("字号 {}px 超出范围，已调整为 {}px", px, clamped);
        }
        self.font_size_px = clamped;
        self.generate();
    }

    pub fn font_size(&self) -> u32 {
        self.font_size_px
    }

    pub fn set_show_logo(&mut self, show: bool) {
        self.show_logo = show;
        log::debug!("Logo 显示: {}", show);
        self.generate();
    }

    /// 切换展示方式；已有素材时同步改写其模式并重新渲染。
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        if let Some(asset) = self.asset.as_mut() {
            asset.display_mode = mode;
            self.generate();
        }
    }

    /// 上传素材。失败时返回错误且不改动任何状态。
    pub async fn upload_asset(&mut self, source: ImageSource) -> Result<(), AppError> {
        let image = match self.handler.load_async(source).await {
            Ok(image) => image,
            Err(err) => {
                log::error!("素材上传失败 [{}]: {}", err.code(), err);
                return Err(err.into());
            }
        };

        log::info!(
            "📎 素材已加载 - 模式: {} 尺寸: {}x{}",
            self.display_mode.as_str(),
            image.width(),
            image.height()
        );
        self.asset = Some(Asset {
            image: Arc::new(image),
            display_mode: self.display_mode,
        });
        self.generate();
        Ok(())
    }

    /// 移除素材（上传控件被清空）。
    pub fn clear_asset(&mut self) {
        self.asset = None;
        self.generate();
    }

    /// 加载 Logo；失败时静默降级为占位图。
    pub async fn load_logo(&mut self, path: &Path) {
        self.logo = match self.handler.load_logo(path).await {
            Ok(image) => {
                log::info!("Logo 加载成功 - {}", path.display());
                LogoState::Loaded(Arc::new(image))
            }
            Err(err) => {
                log::warn!("⚠️ Logo 不可用，使用占位图: {}", err);
                LogoState::Unavailable
            }
        };
        self.generate();
    }

    /// 套用保存的表单设置（不包含素材与 Logo，它们需要异步加载）。
    pub fn apply_settings(&mut self, settings: &BannerSettings) -> Result<(), AppError> {
        let background = HexColor::parse(&settings.background_color)?;

        self.background = background;
        self.title = settings.title.clone();
        self.font_size_px = clamp_font_size(settings.font_size as i64);
        self.show_logo = settings.show_logo;
        self.set_display_mode(settings.display_mode);
        self.generate();
        Ok(())
    }

    /// 恢复全部默认值并清空画面；Logo 加载结果保留。
    pub fn clear_all(&mut self) {
        self.background = HexColor::WHITE;
        self.title.clear();
        self.font_size_px = DEFAULT_FONT_SIZE;
        self.show_logo = true;
        self.display_mode = DisplayMode::Crop;
        self.asset = None;
        self.last_render = None;
        log::info!("已清空全部设置");
    }

    fn rendered(&self) -> Result<&RgbaImage, AppError> {
        self.last_render.as_ref().ok_or(AppError::NothingToExport)
    }

    /// 导出为 PNG 字节。
    pub fn export_png(&self) -> Result<Vec<u8>, AppError> {
        export::encode_png(self.rendered()?)
    }

    /// 以默认文件名写入目录。
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, AppError> {
        export::save_png(self.rendered()?, dir, Utc::now())
    }

    /// 导出为 Data URL。
    pub fn export_data_url(&self) -> Result<String, AppError> {
        export::to_data_url(self.rendered()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::Typeface;
    use crate::image_handler::{ImageConfig, ImageError};
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    struct Silent;

    impl Typeface for Silent {
        fn measure(&self, text: &str, _px: f32) -> f32 {
            text.chars().count() as f32 * 8.0
        }

        fn draw(&self, _: &mut RgbaImage, _: &str, _: f32, _: f32, _: f32, _: Rgba<u8>) {}
    }

    fn session() -> BannerSession {
        let handler = ImageHandler::new(ImageConfig::default()).expect("handler init failed");
        BannerSession::new(handler, Compositor::new(Arc::new(Silent)))
    }

    fn png_source(width: u32, height: u32) -> ImageSource {
        let image = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, ImageFormat::Png).unwrap();
        ImageSource::Bytes {
            bytes: cursor.into_inner(),
            mime: Some("image/png".to_string()),
        }
    }

    #[test]
    fn setters_regenerate_immediately() {
        let mut session = session();
        assert!(session.last_render().is_none());

        session.set_background_color("#000000").unwrap();
        let pixel = *session.last_render().unwrap().get_pixel(200, 290);
        assert_eq!(pixel, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn invalid_color_keeps_previous_background() {
        let mut session = session();
        session.set_background_color("#F5F5F5").unwrap();

        let result = session.set_background_color("red");

        assert!(matches!(result, Err(AppError::InvalidColor(_))));
        assert_eq!(session.config().background, HexColor::rgb(0xF5, 0xF5, 0xF5));
    }

    #[test]
    fn font_size_is_clamped() {
        let mut session = session();
        session.set_font_size(8);
        assert_eq!(session.font_size(), 16);
        session.set_font_size(500);
        assert_eq!(session.font_size(), 72);
        session.set_font_size(40);
        assert_eq!(session.font_size(), 40);
    }

    #[tokio::test]
    async fn upload_then_switch_mode_without_reupload() {
        let mut session = session();
        session.upload_asset(png_source(100, 50)).await.unwrap();
        assert_eq!(session.asset().unwrap().display_mode, DisplayMode::Crop);

        session.set_display_mode(DisplayMode::Fit);

        let asset = session.asset().unwrap();
        assert_eq!(asset.display_mode, DisplayMode::Fit);
        assert_eq!(asset.image.width(), 100);
        // 适配模式下 100x50 → 450x225，上下留白
        let canvas = session.last_render().unwrap();
        assert_eq!(*canvas.get_pixel(675, 10), Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn failed_upload_leaves_state_untouched() {
        let mut session = session();
        session.upload_asset(png_source(20, 20)).await.unwrap();
        let before = session.last_render().cloned();

        let result = session
            .upload_asset(ImageSource::Bytes {
                bytes: b"plain text".to_vec(),
                mime: Some("text/plain".to_string()),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Image(ImageError::InvalidFileType(_)))
        ));
        assert_eq!(session.asset().unwrap().image.width(), 20);
        assert_eq!(session.last_render().cloned(), before);
    }

    #[tokio::test]
    async fn missing_logo_degrades_to_placeholder() {
        let mut session = session();
        session
            .load_logo(Path::new("/definitely/not/here/logo.png"))
            .await;

        assert!(matches!(session.logo_state(), LogoState::Unavailable));
        let canvas = session.last_render().unwrap();
        assert_eq!(*canvas.get_pixel(60, 60), Rgba([0xE0, 0xE0, 0xE0, 255]));
    }

    #[tokio::test]
    async fn clear_asset_restores_background_on_right_half() {
        let mut session = session();
        session.upload_asset(png_source(60, 40)).await.unwrap();
        assert_ne!(*session.last_render().unwrap().get_pixel(700, 150), Rgba([255, 255, 255, 255]));

        session.clear_asset();

        assert!(session.asset().is_none());
        assert_eq!(*session.last_render().unwrap().get_pixel(700, 150), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn clear_all_blocks_export_until_next_generate() {
        let mut session = session();
        session.set_title("Big Summer Sale");
        session.set_show_logo(false);
        assert!(session.export_png().is_ok());

        session.clear_all();

        assert!(matches!(session.export_png(), Err(AppError::NothingToExport)));
        assert!(matches!(session.export_data_url(), Err(AppError::NothingToExport)));
        let config = session.config();
        assert!(config.title.is_empty());
        assert!(config.show_logo);
        assert_eq!(config.font_size_px, DEFAULT_FONT_SIZE);

        session.generate();
        assert!(session.export_png().is_ok());
    }

    #[test]
    fn apply_settings_sets_form_values() {
        let mut session = session();
        let settings = BannerSettings {
            background_color: "#ff0000".to_string(),
            title: "Hello".to_string(),
            font_size: 99,
            show_logo: false,
            display_mode: DisplayMode::Fit,
            ..BannerSettings::default()
        };

        session.apply_settings(&settings).unwrap();

        let config = session.config();
        assert_eq!(config.background, HexColor::rgb(255, 0, 0));
        assert_eq!(config.title, "Hello");
        assert_eq!(config.font_size_px, 72);
        assert!(!config.show_logo);
        assert_eq!(session.display_mode(), DisplayMode::Fit);
    }
}
