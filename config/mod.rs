use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Netroute 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetrouteConfig {
    /// 空间索引配置
    #[serde(default)]
    pub index: IndexConfig,

    /// 优先队列配置
    #[serde(default)]
    pub queue: QueueConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 空间索引配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// 退化矩形（点、水平/垂直线段）的初始填充尺寸
    #[serde(default = "default_initial_min_extent")]
    pub initial_min_extent: f64,
}

/// 优先队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// 初始容量
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_initial_min_extent() -> f64 {
    1.0
}

fn default_initial_capacity() -> usize {
    11
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_min_extent: default_initial_min_extent(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: default_log_output(),
            log_file: None,
        }
    }
}

impl NetrouteConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（NETROUTE__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use netroute::config::NetrouteConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = NetrouteConfig::from_file("netroute.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(path).required(false))
            // 例如 NETROUTE__INDEX__INITIAL_MIN_EXTENT=0.5
            .add_source(config::Environment::with_prefix("NETROUTE").separator("__"))
            .build()
            .map_err(|e| format!("Failed to load config: {}", e))?;

        Ok(settings
            .try_deserialize()
            .map_err(|e| format!("Failed to parse config: {}", e))?)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, toml_string)
            .map_err(|e| format!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), String> {
        let min_extent = self.index.initial_min_extent;
        if !min_extent.is_finite() || min_extent <= 0.0 {
            return Err(format!(
                "Invalid initial_min_extent: {}. Must be a positive finite number",
                min_extent
            ));
        }

        if self.queue.initial_capacity == 0 {
            return Err("Queue initial_capacity must be at least 1".to_string());
        }

        // 验证日志级别
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ))
            }
        }

        match self.logging.output.as_str() {
            "stdout" | "file" => {}
            _ => {
                return Err(format!(
                    "Invalid log output: '{}'. Must be one of: stdout, file",
                    self.logging.output
                ))
            }
        }

        // 验证日志文件配置
        if self.logging.output == "file" && self.logging.log_file.is_none() {
            return Err("Log output is 'file' but log_file path is not specified".to_string());
        }

        Ok(())
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("📋 Netroute Configuration:");
        println!("   Min Extent:  {}", self.index.initial_min_extent);
        println!("   Queue Capacity: {}", self.queue.initial_capacity);
        println!();
        println!("   Log Level:   {}", self.logging.level);
        println!("   Log Output:  {}", self.logging.output);
        if let Some(ref log_file) = self.logging.log_file {
            println!("   Log File:    {}", log_file.display());
        }
        println!();
    }
}
