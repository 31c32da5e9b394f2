use super::super::node::{Node, NodeState};
use super::super::quadtree::QuadTree;
use super::super::rectangle::Point;
use tracing::trace;

/// 四叉树删除算法实现
impl QuadTree {
    /// 删除指定坐标的点
    ///
    /// 点不存在或不在树的范围内时返回 false，树保持不变
    pub fn remove(&mut self, x: f64, y: f64) -> bool {
        self.root.remove(x, y)
    }

    /// 删除指定的点
    pub fn remove_point(&mut self, point: Point) -> bool {
        self.remove(point.x, point.y)
    }

    /// 清空整棵树，根节点回到空状态
    pub fn clear(&mut self) {
        self.root.state = NodeState::Empty;
    }
}

impl Node {
    pub(crate) fn remove(&mut self, x: f64, y: f64) -> bool {
        if !self.bounds.contains_point(x, y) {
            return false;
        }

        match self.state {
            NodeState::Empty => false,
            NodeState::Leaf(point) => {
                if point.x == x && point.y == y {
                    self.state = NodeState::Empty;
                    true
                } else {
                    false
                }
            }
            NodeState::Interior(ref mut children) => {
                // any 按 NW, NE, SW, SE 顺序短路
                let removed = children.iter_mut().any(|child| child.remove(x, y));
                if removed {
                    self.coalesce();
                }
                removed
            }
        }
    }

    /// 删除之后收缩内部节点
    ///
    /// - 没有非空子节点：变为空节点
    /// - 只剩一个非空子节点且它是叶子：把它的点提升上来，变为叶子节点
    /// - 其他情况保持内部节点
    fn coalesce(&mut self) {
        let NodeState::Interior(children) = &self.state else {
            return;
        };

        let mut occupied = children.iter().filter(|child| child.has_points());
        let next = match (occupied.next(), occupied.next()) {
            (None, _) => NodeState::Empty,
            (Some(only), None) => match only.state {
                NodeState::Leaf(point) => NodeState::Leaf(point),
                _ => return,
            },
            _ => return,
        };

        trace!("coalesced {} into {:?}", self.bounds, next);
        self.state = next;
    }
}
