//! 请求节流
//!
//! 两次请求之间随机等待一段时间，区间为零时直接返回

use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    range: DelayRange,
}

impl Pacer {
    pub fn new(range: DelayRange) -> Self {
        Self { range }
    }

    /// 在区间内随机选取等待时长
    pub fn next_delay(&self) -> Duration {
        if self.range.is_zero() {
            return Duration::ZERO;
        }
        let low = self.range.min_ms.min(self.range.max_ms);
        let ms = rand::thread_rng().gen_range(low..=self.range.max_ms);
        Duration::from_millis(ms)
    }

    /// 等待一个随机间隔
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!("等待 {} ms", delay.as_millis());
        sleep(delay).await;
    }
}
