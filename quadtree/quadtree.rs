use super::error::QuadTreeError;
use super::node::{Node, NodeKind, NodeState};
use super::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// 默认的最大细分深度
///
/// 两个点在这个深度之内仍落在同一象限时，插入返回 `DepthLimitExceeded`。
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeVisualization {
    /// 节点区域
    pub bounds: Rectangle,
    /// 节点类型
    pub kind: NodeKind,
    /// 节点深度
    pub depth: usize,
    /// 叶子节点保存的点
    pub point: Option<[f64; 2]>,
    /// 子节点（仅内部节点，按 NW, NE, SW, SE 顺序）
    pub children: Vec<NodeVisualization>,
}

/// 用于JSON序列化的树结构
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeVisualization {
    pub max_depth: usize,
    pub len: usize,
    pub root: NodeVisualization,
}

/// 树的结构统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub points: usize,
    pub empty_nodes: usize,
    pub leaf_nodes: usize,
    pub interior_nodes: usize,
    pub depth: usize,
}

impl TreeStats {
    pub fn total_nodes(&self) -> usize {
        self.empty_nodes + self.leaf_nodes + self.interior_nodes
    }
}

/// 点四叉树主结构
///
/// 每个叶子节点最多保存一个点，内部节点不保存点。
/// 不做内部同步，多线程修改需要调用者自行串行化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadTree {
    /// 根节点，区域即整棵树的范围
    pub(crate) root: Node,
    /// 允许的最大节点深度
    pub(crate) max_depth: usize,
}

impl QuadTree {
    /// 创建覆盖给定范围的空树
    ///
    /// 边界反转或不是有限值时返回 `InvalidBounds`
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, QuadTreeError> {
        Self::with_max_depth(min_x, min_y, max_x, max_y, DEFAULT_MAX_DEPTH)
    }

    /// 创建空树并指定最大细分深度
    pub fn with_max_depth(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        max_depth: usize,
    ) -> Result<Self, QuadTreeError> {
        let bounds = Rectangle::try_new(min_x, min_y, max_x, max_y)?;
        Self::from_rectangle(bounds, max_depth)
    }

    /// 用矩形创建空树
    ///
    /// 矩形反转或宽高不是有限值时返回 `InvalidBounds`
    pub fn from_rectangle(bounds: Rectangle, max_depth: usize) -> Result<Self, QuadTreeError> {
        let bounds = Rectangle::try_new(bounds.min_x(), bounds.min_y(), bounds.max_x(), bounds.max_y())?;
        Ok(QuadTree {
            root: Node::new(bounds, 0),
            max_depth,
        })
    }

    /// 树的范围
    pub fn bounds(&self) -> &Rectangle {
        self.root.bounds()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// 保存的点数
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// 检查树是否为空
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// 当前最深节点的深度，只有根节点时为 0
    pub fn depth(&self) -> usize {
        self.root.max_depth_below()
    }

    /// 统计各类节点的数量
    pub fn stats(&self) -> TreeStats {
        fn visit(node: &Node, stats: &mut TreeStats) {
            stats.depth = stats.depth.max(node.depth);
            match &node.state {
                NodeState::Empty => stats.empty_nodes += 1,
                NodeState::Leaf(_) => {
                    stats.leaf_nodes += 1;
                    stats.points += 1;
                }
                NodeState::Interior(children) => {
                    stats.interior_nodes += 1;
                    for child in children.iter() {
                        visit(child, stats);
                    }
                }
            }
        }

        let mut stats = TreeStats::default();
        visit(&self.root, &mut stats);
        stats
    }

    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串，用于可视化
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = TreeVisualization {
            max_depth: self.max_depth,
            len: self.len(),
            root: Self::create_node_visualization(&self.root),
        };
        serde_json::to_string_pretty(&visualization)
    }

    /// 递归创建节点的可视化结构
    fn create_node_visualization(node: &Node) -> NodeVisualization {
        NodeVisualization {
            bounds: node.bounds,
            kind: node.kind(),
            depth: node.depth,
            point: node.point().map(|p| [p.x, p.y]),
            children: node
                .children()
                .map(|children| children.iter().map(Self::create_node_visualization).collect())
                .unwrap_or_default(),
        }
    }
}
