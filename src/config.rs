use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 两个上游订单接口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// 订单明细接口 (ShopId / order_id)
    pub api1_url: String,
    /// 店铺与客户信息接口 (shop_id / order_id)
    pub api2_url: String,
    pub timeout_secs: u64,
}

/// 字体文件路径, 未配置时回退到内置 Helvetica
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default)]
    pub regular: Option<PathBuf>,
    #[serde(default)]
    pub bold: Option<PathBuf>,
    #[serde(default)]
    pub arabic: Option<PathBuf>,
    #[serde(default)]
    pub cjk: Option<PathBuf>,
    #[serde(default)]
    pub devanagari: Option<PathBuf>,
    #[serde(default)]
    pub gujarati: Option<PathBuf>,
}

const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("server.host", "SERVER_HOST"),
    ("server.port", "SERVER_PORT"),
    ("upstream.api1_url", "API1_URL"),
    ("upstream.api2_url", "API2_URL"),
    ("upstream.timeout_secs", "UPSTREAM_TIMEOUT_SECS"),
    ("fonts.regular", "FONT_REGULAR"),
    ("fonts.bold", "FONT_BOLD"),
    ("fonts.arabic", "FONT_ARABIC"),
    ("fonts.cjk", "FONT_CJK"),
    ("fonts.devanagari", "FONT_DEVANAGARI"),
    ("fonts.gujarati", "FONT_GUJARATI"),
];

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 默认值 + 变量覆盖; `lookup` 返回空串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("upstream.timeout_secs", 30)?;

        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var))?;
        }
        // 兼容旧部署使用的 PORT
        if lookup("SERVER_PORT").is_none() {
            builder = builder.set_override_option("server.port", lookup("PORT"))?;
        }

        builder.build()?.try_deserialize()
    }
}
