use super::rectangle::{Point, Quadrant, Rectangle};
use serde::{Deserialize, Serialize};

/// 节点状态
///
/// 三种状态互斥：空节点、只保存一个点的叶子节点、以及拥有四个子节点的内部节点。
/// 用枚举表示后，"同时持有点和子节点"这种非法状态在类型上就无法构造。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeState {
    /// 没有点，也没有子节点
    Empty,
    /// 恰好保存一个点
    Leaf(Point),
    /// 不保存点，按 NW, NE, SW, SE 顺序独占四个子节点
    Interior(Box<[Node; 4]>),
}

/// 不携带数据的节点类型，便于统计和可视化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Empty,
    Leaf,
    Interior,
}

/// 四叉树节点
///
/// 节点的区域在构造之后不再改变；子节点由父节点独占，没有共享也没有回指。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 节点负责的区域
    pub(crate) bounds: Rectangle,

    /// 节点在树中的深度，根节点为 0
    pub(crate) depth: usize,

    /// 当前状态
    pub(crate) state: NodeState,
}

impl Node {
    /// 创建新的空节点，区域由调用者保证合法
    pub(crate) fn new(bounds: Rectangle, depth: usize) -> Self {
        Node {
            bounds,
            depth,
            state: NodeState::Empty,
        }
    }

    pub fn bounds(&self) -> &Rectangle {
        &self.bounds
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn kind(&self) -> NodeKind {
        match self.state {
            NodeState::Empty => NodeKind::Empty,
            NodeState::Leaf(_) => NodeKind::Leaf,
            NodeState::Interior(_) => NodeKind::Interior,
        }
    }

    /// 是否为空节点
    pub fn is_empty(&self) -> bool {
        matches!(self.state, NodeState::Empty)
    }

    /// 是否为叶子节点（保存一个点）
    pub fn is_leaf(&self) -> bool {
        matches!(self.state, NodeState::Leaf(_))
    }

    /// 是否为内部节点
    pub fn is_interior(&self) -> bool {
        matches!(self.state, NodeState::Interior(_))
    }

    /// 叶子节点保存的点
    pub fn point(&self) -> Option<Point> {
        match self.state {
            NodeState::Leaf(point) => Some(point),
            _ => None,
        }
    }

    /// 内部节点的四个子节点
    pub fn children(&self) -> Option<&[Node; 4]> {
        match &self.state {
            NodeState::Interior(children) => Some(children),
            _ => None,
        }
    }

    /// 指定象限的子节点
    pub fn child(&self, quadrant: Quadrant) -> Option<&Node> {
        self.children().map(|children| &children[quadrant.index()])
    }

    /// 子树中保存的点数
    pub fn len(&self) -> usize {
        match &self.state {
            NodeState::Empty => 0,
            NodeState::Leaf(_) => 1,
            NodeState::Interior(children) => children.iter().map(Node::len).sum(),
        }
    }

    /// 子树中是否至少有一个点
    pub(crate) fn has_points(&self) -> bool {
        match &self.state {
            NodeState::Empty => false,
            NodeState::Leaf(_) => true,
            NodeState::Interior(children) => children.iter().any(Node::has_points),
        }
    }

    /// 子树中最深节点的深度
    pub(crate) fn max_depth_below(&self) -> usize {
        match &self.state {
            NodeState::Interior(children) => children
                .iter()
                .map(Node::max_depth_below)
                .max()
                .unwrap_or(self.depth),
            _ => self.depth,
        }
    }
}
