pub mod config;
pub mod export;
pub mod quadtree;
pub mod simulation;

use std::error::Error;

// 重新导出主要的公共接口
pub use quadtree::{Node, NodeKind, Point, QuadTree, QuadTreeError, Quadrant, Rectangle};

// 重新导出常用类型，便于二进制文件使用
pub use config::CraterConfig;
pub use simulation::{CraterField, CraterSimulation, NaiveCraterField, SimulationConfig};

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
