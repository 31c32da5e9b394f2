use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::quadtree::DEFAULT_MAX_DEPTH;
use crate::simulation::SimulationConfig;

/// Crater 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraterConfig {
    /// 模拟参数
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 空间索引配置
    #[serde(default)]
    pub index: IndexConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 空间索引配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// 四叉树最大深度
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// 是否导出 GeoJSON 快照
    #[serde(default = "default_true")]
    pub write_snapshots: bool,

    /// 是否导出 report.json
    #[serde(default = "default_true")]
    pub write_report: bool,

    /// 模拟结束后保存四叉树的文件（.json 或 .bin）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_file: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_true() -> bool {
    true
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
            max_depth: default_max_depth(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_snapshots: true,
            write_report: true,
            tree_file: None,
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

impl CraterConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（CRATER__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use crater::config::CraterConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = CraterConfig::from_file("crater.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            // 1. 加载默认配置（内嵌）
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            // 2. 加载用户配置（可选，不存在不报错）
            .add_source(config::File::with_name(path).required(false))
            // 3. 加载环境变量（CRATER__SIMULATION__SEED=42 之类）
            .add_source(config::Environment::with_prefix("CRATER").separator("__"))
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
    ///
    /// 检查模拟参数、索引深度、日志设置，并尝试创建输出目录
    pub fn validate(&self) -> Result<(), String> {
        self.simulation
            .validate()
            .map_err(|e| format!("Invalid [simulation] section: {}", e))?;

        if self.index.max_depth == 0 {
            return Err("index.max_depth must be at least 1".to_string());
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ))
            }
        }

        if self.logging.output == "file" && self.logging.log_file.is_none() {
            return Err("Log output is 'file' but log_file path is not specified".to_string());
        }

        let needs_output_dir =
            self.output.write_snapshots || self.output.write_report || self.output.tree_file.is_some();
        if needs_output_dir && !self.output.dir.exists() {
            std::fs::create_dir_all(&self.output.dir).map_err(|e| {
                format!(
                    "Failed to create output directory '{}': {}",
                    self.output.dir.display(),
                    e
                )
            })?;
        }

        Ok(())
    }

    /// 是否导出快照：`write_snapshots` 打开且 `snapshot_interval` 不为 0
    ///
    /// 周期快照和最终快照使用同一个开关
    pub fn snapshots_enabled(&self) -> bool {
        self.output.write_snapshots && self.simulation.snapshot_interval > 0
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        let sim = &self.simulation;
        println!("📋 Crater Configuration:");
        println!(
            "   Study Area:  [{}, {}, {}, {}] km",
            sim.min_x, sim.min_y, sim.max_x, sim.max_y
        );
        println!("   Radius:      {} km (drawn at {} km)", sim.crater_radius, sim.display_radius);
        println!("   Step:        {} years", sim.years_per_step);
        println!("   Saturation:  x{}", sim.saturation_ratio);
        println!("   Max Steps:   {}", sim.max_steps);
        match sim.seed {
            Some(seed) => println!("   Seed:        {}", seed),
            None => println!("   Seed:        (entropy)"),
        }
        println!();
        println!("   Max Depth:   {}", self.index.max_depth);
        println!();
        println!("   Output Dir:  {}", self.output.dir.display());
        println!(
            "   Snapshots:   {}",
            if self.snapshots_enabled() {
                format!("every {} steps", sim.snapshot_interval)
            } else {
                "disabled".to_string()
            }
        );
        if let Some(ref tree_file) = self.output.tree_file {
            println!("   Tree File:   {}", tree_file.display());
        }
        println!();
        println!("   Log Level:   {}", self.logging.level);
        println!("   Log Output:  {}", self.logging.output);
        if let Some(ref log_file) = self.logging.log_file {
            println!("   Log File:    {}", log_file.display());
        }
        println!();
    }
}
