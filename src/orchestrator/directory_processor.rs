//! 名录处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整抓取的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、打印启动信息、创建 HTTP 抓取器
//! 2. **列表阶段**：委托 listing_processor 翻页、解析、去重
//! 3. **逐人处理**：顺序执行 FacultyFlow，单人失败只跳过此人
//! 4. **导出阶段**：CSV 必须成功，卡组失败只报告
//! 5. **全局统计**：汇总为 `RunReport`
//!
//! ## 设计特点
//!
//! - **顺序执行**：不 spawn 任务，所有请求依次 await
//! - **资源所有者**：唯一持有抓取器的模块
//! - **向下委托**：单人流程交给 workflow 层

use crate::config::Config;
use crate::exporters::{export_all, ApkgWriter, DeckOutcome, DeckWriter};
use crate::infrastructure::{Fetcher, HttpFetcher};
use crate::models::FacultyRecord;
use crate::orchestrator::listing_processor::collect_listing;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::{EntityCtx, FacultyFlow, ImageStatus};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 导出的记录（顺序即输出顺序）
    pub records: Vec<FacultyRecord>,
    /// 有效列表页数
    pub pages: usize,
    /// 去重后的人数
    pub listed: usize,
    /// 跨页重复数
    pub duplicates: usize,
    /// 主页请求失败而跳过的人数
    pub skipped_profiles: usize,
    pub images_downloaded: usize,
    pub images_cached: usize,
    pub images_absent: usize,
    pub images_failed: usize,
    pub csv_path: PathBuf,
    pub deck: DeckOutcome,
}

/// 应用主结构
pub struct App<F: Fetcher = HttpFetcher> {
    config: Config,
    fetcher: F,
}

impl App<HttpFetcher> {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.log_file)?;
        log_startup(&config.base_url, &config.output_dir);

        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> App<F> {
    /// 用指定抓取器创建应用（测试时注入假抓取器）
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 运行应用主逻辑，卡组写为 `.apkg`
    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_writer(&ApkgWriter::new()).await
    }

    /// 运行应用主逻辑
    ///
    /// # 返回
    /// 列表页请求失败、CSV 写入失败时返回错误；其余失败记入 `RunReport`
    pub async fn run_with_writer(&self, writer: &impl DeckWriter) -> Result<RunReport> {
        let listing = collect_listing(&self.fetcher, &self.config).await?;

        if listing.entries.is_empty() {
            warn!("⚠️ 列表中没有找到任何教师");
        }

        let flow = FacultyFlow::new(&self.fetcher, &self.config)?;
        let total = listing.entries.len();
        let mut records = Vec::with_capacity(total);
        let mut stats = ImageStats::default();
        let mut skipped_profiles = 0;

        for (i, entry) in listing.entries.into_iter().enumerate() {
            let ctx = EntityCtx::new(i + 1, total, entry.profile_url.clone());

            match flow.run(entry, &ctx).await {
                Ok(outcome) => {
                    stats.count(outcome.image);
                    records.push(outcome.record);
                }
                Err(e) => {
                    error!("{} ❌ 个人主页处理失败，跳过: {}", ctx, e);
                    skipped_profiles += 1;
                }
            }
        }

        info!(
            "🖼️ 头像: 下载 {}, 缓存命中 {}, 缺失 {}, 失败 {}",
            stats.downloaded, stats.cached, stats.absent, stats.failed
        );

        let export = export_all(&records, &self.config, writer)?;

        print_final_stats(records.len(), skipped_profiles, total, &self.config.log_file);

        Ok(RunReport {
            records,
            pages: listing.pages,
            listed: total,
            duplicates: listing.duplicates,
            skipped_profiles,
            images_downloaded: stats.downloaded,
            images_cached: stats.cached,
            images_absent: stats.absent,
            images_failed: stats.failed,
            csv_path: export.csv_path,
            deck: export.deck,
        })
    }
}

/// 头像统计
#[derive(Debug, Default)]
struct ImageStats {
    downloaded: usize,
    cached: usize,
    absent: usize,
    failed: usize,
}

impl ImageStats {
    fn count(&mut self, status: ImageStatus) {
        match status {
            ImageStatus::Downloaded => self.downloaded += 1,
            ImageStatus::Cached => self.cached += 1,
            ImageStatus::Absent => self.absent += 1,
            ImageStatus::Failed => self.failed += 1,
        }
    }
}
