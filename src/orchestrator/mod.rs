//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次抓取的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `directory_processor` - 名录处理器
//! - 管理应用生命周期（初始化、运行）
//! - 顺序处理每位教师，隔离单人失败
//! - 调用导出层，汇总 `RunReport`
//!
//! ### `listing_processor` - 列表处理器
//! - 翻页直到空页或 404
//! - 解析卡片并跨页去重
//!
//! ## 层次关系
//!
//! ```text
//! directory_processor (处理 Vec<ListingEntry>)
//!     ↓
//! listing_processor (处理列表页)
//!     ↓
//! workflow::FacultyFlow (处理单位教师)
//!     ↓
//! services (能力层：cards / profile / media / reconcile)
//!     ↓
//! infrastructure (基础设施：Fetcher / Pacer)
//! ```

pub mod directory_processor;
pub mod listing_processor;

// 重新导出主要类型
pub use directory_processor::{App, RunReport};
pub use listing_processor::{collect_listing, ListingSummary};
