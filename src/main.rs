use kb_price_matcher::{api, kb, AppConfig, MatchingEngine, MatchingRules};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 匹配规则 (未配置时使用内置规则)
    let rules = match &config.rules.path {
        Some(path) => MatchingRules::load(path)?,
        None => {
            let rules = MatchingRules::builtin()?;
            info!("Using builtin matching rules v{}", rules.version);
            rules
        }
    };

    // 知识库: 启动时加载一次, 之后只读
    let index = kb::load_index(&config.knowledge_base.path, config.knowledge_base.repair_ditto, &rules)?;
    info!("KB summary: {:?}", index.summary());

    let engine = Arc::new(MatchingEngine::new(index, rules, config.matching.worker_threads)?);

    let app = api::router(api::AppState {
        engine,
        unmatched_log: config.export.unmatched_log.clone(),
    });

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/match/batch      - JSON results + unmatched log");
    info!("  POST /api/match/batch/csv  - CSV results");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
