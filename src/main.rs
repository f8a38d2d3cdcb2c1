use anyhow::Result;
use faculty_cards::utils::logging;
use faculty_cards::{App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    if let Err(e) = App::initialize(config)?.run().await {
        error!("❌ 运行中止: {:#}", e);
        return Err(e);
    }

    Ok(())
}
