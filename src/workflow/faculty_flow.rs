//! 教师处理流程 - 流程层
//!
//! 核心职责：定义"一位教师"的完整处理流程
//!
//! 流程顺序：
//! 1. 取回并解析个人主页
//! 2. 与列表条目合并，记录数据缺口
//! 3. 解析头像到本地缓存（失败只记日志）

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{Fetcher, Pacer};
use crate::models::{FacultyRecord, ListingEntry};
use crate::services::{MediaCache, ProfileEnricher, Reconciler};
use crate::utils::logging::truncate_text;
use crate::workflow::entity_ctx::EntityCtx;

/// 头像处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// 没有头像
    Absent,
    /// 命中本地缓存
    Cached,
    /// 本次下载
    Downloaded,
    /// 下载失败
    Failed,
}

/// 单位教师的处理结果
#[derive(Debug, Clone)]
pub struct EntityOutcome {
    pub record: FacultyRecord,
    pub image: ImageStatus,
}

/// 教师处理流程
///
/// - 编排主页解析、合并、头像缓存
/// - 只依赖业务能力（services）
/// - 主页请求失败原样上抛，由编排层决定跳过
pub struct FacultyFlow<'a, F: Fetcher> {
    enricher: ProfileEnricher<'a, F>,
    media: MediaCache<'a, F>,
    profile_pacer: Pacer,
}

impl<'a, F: Fetcher> FacultyFlow<'a, F> {
    /// 创建新的处理流程（媒体目录不存在时创建）
    pub fn new(fetcher: &'a F, config: &Config) -> AppResult<Self> {
        Ok(Self {
            enricher: ProfileEnricher::new(fetcher, config)?,
            media: MediaCache::new(fetcher, config.media_dir(), Pacer::new(config.image_delay))?,
            profile_pacer: Pacer::new(config.profile_delay),
        })
    }

    pub async fn run(&self, entry: ListingEntry, ctx: &EntityCtx) -> AppResult<EntityOutcome> {
        info!("{} 🔍 解析个人主页: {}", ctx, ctx.identity);

        let profile = self.enricher.enrich(&entry.profile_url).await;
        self.profile_pacer.pause().await;
        let profile = profile?;

        let mut record = Reconciler::merge(entry, profile);
        Reconciler::report_gaps(&record);
        debug!("{} 简介: {}", ctx, truncate_text(&record.bio, 60));

        let image = match self.media.resolve(record.image_url.as_ref()).await {
            Ok(Some(cached)) => {
                record.image_filename = Some(cached.filename);
                if cached.downloaded {
                    ImageStatus::Downloaded
                } else {
                    ImageStatus::Cached
                }
            }
            Ok(None) => {
                warn!("{} ⚠️ 没有头像: {}", ctx, record.display_name());
                ImageStatus::Absent
            }
            Err(e) => {
                warn!("{} ⚠️ 头像下载失败，跳过图片: {}", ctx, e);
                ImageStatus::Failed
            }
        };

        info!(
            "{} ✓ {} ({} 条论文)",
            ctx,
            record.display_name(),
            record.publications.len()
        );

        Ok(EntityOutcome { record, image })
    }
}
