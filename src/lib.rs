//! # 邮件 Banner 生成器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 CLI (clap) / 调用方                       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  session ──── BannerSession (表单状态 + 即时重绘)          │
//! │       │                                                  │
//! │  ├─ image_handler   上传校验·解码·缩放                     │
//! │  ├─ banner                                               │
//! │  │   ├─ layout      标题换行与居中                         │
//! │  │   ├─ geometry    裁剪铺满 / 等比适配                     │
//! │  │   ├─ compositor  图层合成                              │
//! │  │   └─ export      PNG / 文件 / Data URL                 │
//! │  ├─ settings        表单设置 JSON                         │
//! │  └─ error           AppError (统一错误类型)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`image_handler`] | 从文件/字节/Base64 加载图片，类型与体积校验，解码与缩放 |
//! | [`banner`] | 900×300 画布的布局、合成与导出 |
//! | [`session`] | 编辑会话：每次修改后立即重新生成，负责导出与清空 |
//! | [`settings`] | 表单设置的读取与保存 |

pub mod banner;
pub mod error;
pub mod image_handler;
pub mod session;
pub mod settings;
