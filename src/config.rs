use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "KBMATCH_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "kb-price-matcher.toml";
const ENV_PREFIX: &str = "KBMATCH";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// 单价知识库文件 (.json 或 .csv)
    pub path: PathBuf,
    /// 加载时解析「同上」「〃」行
    #[serde(default = "default_true")]
    pub repair_ditto: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// 匹配规则 JSON; 未设置时使用内置规则
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 专用 rayon 线程池大小; 未设置时使用全局线程池
    pub worker_threads: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 未匹配明细日志 (CSV, 追加写入)
    pub unmatched_log: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            knowledge_base: KnowledgeBaseConfig {
                path: PathBuf::from("kb/price_kb.json"),
                repair_ditto: true,
            },
            rules: RulesConfig::default(),
            matching: MatchingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 配置文件 (可选) -> KBMATCH__* 环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "knowledge_base.path",
                defaults.knowledge_base.path.to_string_lossy().into_owned(),
            )?
            .set_default("knowledge_base.repair_ditto", defaults.knowledge_base.repair_ditto)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_file() {
        let cfg = AppConfig::load_from("/nonexistent/kb-price-matcher").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.knowledge_base.path, PathBuf::from("kb/price_kb.json"));
        assert!(cfg.knowledge_base.repair_ditto);
        assert!(cfg.rules.path.is_none());
        assert!(cfg.matching.worker_threads.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[knowledge_base]
path = "data/kb.csv"
repair_ditto = false

[matching]
worker_threads = 4
"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.knowledge_base.path, PathBuf::from("data/kb.csv"));
        assert!(!cfg.knowledge_base.repair_ditto);
        assert_eq!(cfg.matching.worker_threads, Some(4));
    }
}
