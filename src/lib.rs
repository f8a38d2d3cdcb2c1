//! # Faculty Cards
//!
//! 抓取法学院全职教师名录，导出 CSV 与 Anki 卡组
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露能力
//! - `Fetcher` / `HttpFetcher` - 按 URL 取回页面，404 与其他失败分开
//! - `Pacer` - 请求之间的随机等待
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ListingWalker` - 逐页取回列表
//! - `CardExtractor` - 解析教师卡片
//! - `ProfileEnricher` / `PublicationSearch` - 解析个人主页与外部学术库
//! - `Reconciler` - 去重与合并
//! - `MediaCache` - 头像本地缓存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一位教师"的完整处理流程
//! - `EntityCtx` - 上下文封装（序号 + 主页 URL）
//! - `FacultyFlow` - 流程编排（主页 → 合并 → 头像）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/directory_processor` - 整次运行，隔离单人失败，导出
//! - `orchestrator/listing_processor` - 翻页、解析、跨页去重
//!
//! 导出（`exporters/`）：CSV 必须成功，`.apkg` 卡组尽力而为
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod exporters;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Fetcher, HttpFetcher};
pub use models::{FacultyRecord, ListingEntry, ProfileRecord};
pub use orchestrator::{App, RunReport};
pub use workflow::{EntityCtx, FacultyFlow};
