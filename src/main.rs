//! # 邮件 Banner 生成器 — 命令行入口
//!
//! 读取设置文件，叠加命令行参数，生成一张 900×300 的 PNG。
//! 素材上传失败不会中断流程：错误会被报告，Banner 按无素材生成。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use email_banner::banner::{
    BACKGROUND_SWATCHES, Compositor, DisplayMode, TrueTypeFace, clamp_font_size,
};
use email_banner::error::AppError;
use email_banner::image_handler::{ImageConfig, ImageHandler, ImageSource};
use email_banner::session::BannerSession;
use email_banner::settings::{self, BannerSettings};

#[derive(Debug, Parser)]
#[command(name = "email-banner", version, about = "生成 900x300 的邮件 Banner 图片")]
struct Cli {
    /// 设置文件路径
    #[arg(long, default_value = "email-banner.json")]
    settings: PathBuf,

    /// 标题文字
    #[arg(long)]
    title: Option<String>,

    /// 背景色，#RRGGBB
    #[arg(long)]
    background: Option<String>,

    /// 字号（16~72，超出自动收敛）
    #[arg(long)]
    font_size: Option<i64>,

    /// 隐藏 Logo
    #[arg(long)]
    no_logo: bool,

    /// Logo 图片路径
    #[arg(long)]
    logo: Option<PathBuf>,

    /// 右半区素材图片
    #[arg(long)]
    asset: Option<PathBuf>,

    /// 素材展示方式：crop | fit
    #[arg(long)]
    mode: Option<DisplayMode>,

    /// TrueType 字体文件
    #[arg(long)]
    font: Option<PathBuf>,

    /// 输出目录
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// 输出 Data URL 而不是写文件
    #[arg(long)]
    data_url: bool,

    /// 将本次参数写回设置文件
    #[arg(long)]
    save_settings: bool,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,

    /// 列出预置背景色后退出
    #[arg(long)]
    list_swatches: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    code: &'static str,
    message: String,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl Cli {
    fn merge_into(&self, settings: &mut BannerSettings) {
        if let Some(title) = &self.title {
            settings.title = title.clone();
        }
        if let Some(background) = &self.background {
            settings.background_color = background.clone();
        }
        if let Some(px) = self.font_size {
            settings.font_size = clamp_font_size(px);
        }
        if self.no_logo {
            settings.show_logo = false;
        }
        if let Some(logo) = &self.logo {
            settings.logo_path = logo.clone();
        }
        if let Some(asset) = &self.asset {
            settings.asset_path = Some(asset.clone());
        }
        if let Some(mode) = self.mode {
            settings.display_mode = mode;
        }
        if let Some(font) = &self.font {
            settings.font_path = Some(font.clone());
        }
        if let Some(dir) = &self.out_dir {
            settings.output_dir = dir.clone();
        }
    }
}

async fn run(cli: &Cli) -> Result<Report, AppError> {
    let mut settings = settings::load_settings(&cli.settings)?;
    cli.merge_into(&mut settings);

    let typeface = TrueTypeFace::discover(settings.font_path.as_deref())?;
    let handler = ImageHandler::new(ImageConfig::default())?;
    let filter = handler.config_snapshot()?.resize_filter;
    let compositor = Compositor::new(Arc::new(typeface)).with_filter(filter);
    let mut session = BannerSession::new(handler, compositor);
    session.apply_settings(&settings)?;

    if settings.show_logo {
        session.load_logo(&settings.logo_path).await;
    }

    let mut asset_error = None;
    if let Some(path) = &settings.asset_path {
        if let Err(err) = session
            .upload_asset(ImageSource::FilePath(path.clone()))
            .await
        {
            log::warn!("⚠️ 素材未使用，按无素材生成: {}", err);
            asset_error = Some(ErrorReport::from(&err));
        }
    }

    session.generate();

    if cli.save_settings {
        settings::save_settings(&cli.settings, &settings)?;
        log::info!("📝 设置已保存 - {}", cli.settings.display());
    }

    if cli.data_url {
        return Ok(Report {
            path: None,
            data_url: Some(session.export_data_url()?),
            asset_error,
        });
    }

    let path = session.export_to_dir(&settings.output_dir)?;
    Ok(Report {
        path: Some(path),
        data_url: None,
        asset_error,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.list_swatches {
        if cli.json {
            println!("{}", serde_json::json!(BACKGROUND_SWATCHES));
        } else {
            BACKGROUND_SWATCHES.iter().for_each(|swatch| println!("{}", swatch));
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli).await {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string(&report) {
                    Ok(json) => println!("{}", json),
                    Err(err) => {
                        eprintln!("序列化结果失败: {}", err);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                if let Some(err) = &report.asset_error {
                    eprintln!("素材上传失败 [{}]: {}", err.code, err.message);
                }
                if let Some(path) = &report.path {
                    println!("{}", path.display());
                }
                if let Some(url) = &report.data_url {
                    println!("{}", url);
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if cli.json {
                let report = ErrorReport::from(&err);
                println!(
                    "{}",
                    serde_json::json!({ "error": report.code, "message": report.message })
                );
            } else {
                eprintln!("错误 [{}]: {}", err.code(), err);
            }
            ExitCode::FAILURE
        }
    }
}
