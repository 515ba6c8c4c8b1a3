//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 内存字节 / Base64）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! 校验顺序与上传表单一致：先判类型，再判体积，最后才交给解码阶段。
//!
//! - 文件：读取头部探测签名 → metadata 体积限制 → 同一句柄回到开头完整读取。
//! - 字节：声明的 MIME 类型 → 签名探测 → 体积限制。
//! - Base64：Data URL 媒体类型 → 预估解码体积 → 解码 → 签名探测。

use base64::{Engine as _, engine::general_purpose};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImageHandler};

const SIGNATURE_PROBE_BYTES: usize = 4096;

impl ImageHandler {
    /// 从本地路径加载图片原始字节。
    pub(super) fn load_from_file(
        &self,
        path: &Path,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(ImageError::FileSystem(format!("文件不存在：{}", path.display())));
        }

        let mut file = File::open(path)
            .map_err(|e| ImageError::FileSystem(format!("无法打开图片文件：{}", e)))?;

        let mut probe = Vec::with_capacity(SIGNATURE_PROBE_BYTES);
        (&mut file)
            .take(SIGNATURE_PROBE_BYTES as u64)
            .read_to_end(&mut probe)
            .map_err(|e| ImageError::FileSystem(format!("无法读取文件头：{}", e)))?;
        Self::validate_image_signature(&probe, false)?;

        let metadata = file
            .metadata()
            .map_err(|e| ImageError::FileSystem(format!("无法读取文件信息：{}", e)))?;
        Self::validate_file_size(metadata.len(), config)?;

        // 复用已打开的句柄，读取上限与体积校验一致
        file.seek(SeekFrom::Start(0))
            .map_err(|e| ImageError::FileSystem(format!("无法定位文件开头：{}", e)))?;
        let mut bytes = Vec::with_capacity(metadata.len() as usize);
        file.take(config.max_file_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_file_size(bytes.len() as u64, config)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }

    /// 从内存字节加载图片（上传控件场景）。
    ///
    /// `mime` 为上传控件声明的类型；缺省时完全依赖签名探测。
    pub(super) fn load_from_bytes(
        &self,
        bytes: Vec<u8>,
        mime: Option<&str>,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        log::info!(
            "📝 开始处理上传图片 - 声明类型: {} 体积: {} 字节",
            mime.unwrap_or("<未声明>"),
            bytes.len()
        );

        let declared_image = match mime {
            Some(mime) => {
                Self::validate_declared_mime(mime)?;
                true
            }
            None => false,
        };
        Self::validate_image_signature(&bytes, declared_image)?;
        Self::validate_file_size(bytes.len() as u64, config)?;

        Ok(RawImageData {
            bytes,
            source_hint: "bytes",
        })
    }

    /// 从 Base64 字符串加载图片原始字节。
    pub(super) fn load_from_base64(
        &self,
        data: &str,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        log::info!("📝 开始处理 base64 图片");

        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;
        Self::validate_file_size(bytes.len() as u64, config)?;
        Self::validate_image_signature(&bytes, false)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, ImageError> {
        let normalized = data.trim();

        let payload = match normalized.strip_prefix("data:") {
            Some(rest) => {
                let (media_type, payload) = rest
                    .split_once(";base64,")
                    .ok_or_else(|| ImageError::Decode("缺少 base64 标记".to_string()))?;
                Self::validate_declared_mime(media_type)?;
                payload
            }
            None => normalized,
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        // 预估值按 4 字节一组向上取整，最多多出 2 字节填充。
        if estimated_len.saturating_sub(2) > max_file_size {
            return Err(ImageError::FileTooLarge(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_declared_mime(mime: &str) -> Result<(), ImageError> {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            return Ok(());
        }

        Err(ImageError::InvalidFileType(format!(
            "请上传图片文件（当前类型：{}）",
            mime.trim()
        )))
    }

    fn validate_file_size(len: u64, config: &ImageConfig) -> Result<(), ImageError> {
        if len > config.max_file_size {
            return Err(ImageError::FileTooLarge(format!(
                "{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 按文件签名判断是否为图片。
    ///
    /// - 识别为非图片：一律拒绝
    /// - 无法识别：声明过图片类型时放行，交给解码阶段判定
    fn validate_image_signature(bytes: &[u8], declared_image: bool) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFileType("图片内容为空".to_string()));
        }

        match infer::get(bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(()),
            Some(kind) => Err(ImageError::InvalidFileType(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            ))),
            None if declared_image => Ok(()),
            None => Err(ImageError::InvalidFileType("无法识别图片类型".to_string())),
        }
    }
}
