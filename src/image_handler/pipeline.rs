//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! 同时提供合成阶段使用的缩放入口 [`resize_region`]：
//! 按浮点裁剪窗口取源图局部，再缩放到目标尺寸（素材裁剪 / 适配、Logo 拉伸都走这里）。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素与内存上限快速拒绝
//! 3. 完整解码并转换为 RGBA
//! 4. 缩放优先使用 `fast_image_resize`，失败时回退 `image::imageops`

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{GenericImageView, ImageBuffer, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

use super::source::{DecodedImage, RawImageData};
use super::{ImageConfig, ImageError, ImageHandler};

/// 源图上的浮点裁剪窗口（像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ImageHandler {
    /// 将原始字节解码为可参与合成的 RGBA 图像。
    pub(crate) fn decode_image(
        &self,
        raw: RawImageData,
        config: &ImageConfig,
    ) -> Result<DecodedImage, ImageError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败，请尝试其他文件：{}", e)))?;

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Decode("图片尺寸为空".to_string()));
        }
        Self::validate_pixel_limits(config, width, height)?;

        let rgba = decoded.to_rgba8();

        log::info!(
            "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
            raw.source_hint,
            width,
            height
        );

        Ok(DecodedImage::new(rgba))
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}

/// 取源图的 `crop` 窗口（缺省为整图）并缩放到 `target_width x target_height`。
///
/// 目标尺寸为 0 时返回空图，由调用方决定是否跳过绘制。
pub fn resize_region(
    source: &RgbaImage,
    crop: Option<CropWindow>,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbaImage {
    if target_width == 0 || target_height == 0 || source.width() == 0 || source.height() == 0 {
        return RgbaImage::new(target_width, target_height);
    }

    match resize_with_fast_image_resize(source, crop, target_width, target_height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::imageops：{}", err);
            resize_with_imageops(source, crop, target_width, target_height, filter)
        }
    }
}

fn resize_with_fast_image_resize(
    source: &RgbaImage,
    crop: Option<CropWindow>,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, ImageError> {
    let (src_width, src_height) = source.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        source.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));
    if let Some(window) = crop {
        options = options.crop(window.left, window.top, window.width, window.height);
    }

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn resize_with_imageops(
    source: &RgbaImage,
    crop: Option<CropWindow>,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbaImage {
    let (src_width, src_height) = source.dimensions();
    let window = crop.unwrap_or(CropWindow {
        left: 0.0,
        top: 0.0,
        width: src_width as f64,
        height: src_height as f64,
    });

    let left = (window.left.round().max(0.0) as u32).min(src_width - 1);
    let top = (window.top.round().max(0.0) as u32).min(src_height - 1);
    let width = (window.width.round().max(1.0) as u32).min(src_width - left);
    let height = (window.height.round().max(1.0) as u32).min(src_height - top);

    let region = image::imageops::crop_imm(source, left, top, width, height).to_image();
    image::imageops::resize(&region, target_width, target_height, filter)
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
