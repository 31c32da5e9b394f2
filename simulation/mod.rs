//! 陨石坑饱和模拟
//!
//! 在四叉树的公开接口之上实现：随机撞击、抹除半径内的旧陨石坑、加入新陨石坑，
//! 直到陨石坑数量趋于饱和。`NaiveCraterField` 用线性扫描实现同样的语义，
//! 用来交叉验证。

pub mod field;
pub mod naive;
pub mod runner;

pub use field::CraterField;
pub use naive::NaiveCraterField;
pub use runner::{CraterSimulation, SimulationConfig, SimulationReport, StepOutcome};

use crate::quadtree::{Point, QuadTreeError};

/// 模拟错误类型
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Index error: {0}")]
    Index(#[from] QuadTreeError),

    #[error("Crater {0} lies outside the study area")]
    OutOfBounds(Point),

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Step observer failed: {0}")]
    Observer(String),
}
