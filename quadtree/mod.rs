//! # 点四叉树空间索引
//!
//! 递归地把有界平面四等分的区域四叉树：每个叶子节点最多保存一个点，
//! 内部节点不保存点。删除之后会自动收缩，保持结构最小。
//!
//! ```
//! use crater::quadtree::QuadTree;
//!
//! let mut tree = QuadTree::new(0.0, 0.0, 100.0, 100.0).unwrap();
//! assert_eq!(tree.insert(5.0, 8.0), Ok(true));
//! assert_eq!(tree.insert(101.1, 3.3), Ok(false));
//! assert!(tree.contains(5.0, 8.0));
//! assert_eq!(tree.query_range(3.0, 5.0, 50.0, 50.0).len(), 1);
//! ```

pub mod algorithms;
pub mod error;
pub mod node;
#[allow(clippy::module_inception)]
pub mod quadtree;
pub mod rectangle;

// 重新导出主要类型
pub use algorithms::persistence::{PersistenceError, SerializationFormat};
pub use error::QuadTreeError;
pub use node::{Node, NodeKind, NodeState};
pub use quadtree::{QuadTree, TreeStats, DEFAULT_MAX_DEPTH};
pub use rectangle::{Point, Quadrant, Rectangle};
