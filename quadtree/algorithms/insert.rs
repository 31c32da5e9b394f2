use super::super::error::QuadTreeError;
use super::super::node::{Node, NodeState};
use super::super::quadtree::QuadTree;
use super::super::rectangle::{Point, Rectangle};
use tracing::trace;

/// 插入操作相关算法
impl QuadTree {
    /// 插入一个点
    ///
    /// 点不在树的范围内时返回 `Ok(false)` 且不修改树。
    /// 点已存在或无法在 `max_depth` 内与已有点分开时返回错误，同样不修改树。
    pub fn insert(&mut self, x: f64, y: f64) -> Result<bool, QuadTreeError> {
        if !self.root.bounds.contains_point(x, y) {
            return Ok(false);
        }

        // 先沿插入路径检查，保证出错时树保持原样
        self.root.check_insertable(x, y, self.max_depth)?;
        self.root.place(x, y)
    }

    /// 插入一个点
    pub fn insert_point(&mut self, point: Point) -> Result<bool, QuadTreeError> {
        self.insert(point.x, point.y)
    }
}

impl Node {
    /// 沿插入路径走到目标节点，检查插入是否会产生重复点或超过最大深度
    fn check_insertable(&self, x: f64, y: f64, max_depth: usize) -> Result<(), QuadTreeError> {
        let mut node = self;
        loop {
            match &node.state {
                NodeState::Empty => return Ok(()),
                NodeState::Leaf(existing) => {
                    if existing.x == x && existing.y == y {
                        return Err(QuadTreeError::DuplicatePoint { x, y });
                    }
                    return separation_depth(&node.bounds, node.depth, *existing, Point::new(x, y), max_depth)
                        .map(|_| ());
                }
                NodeState::Interior(children) => {
                    node = children
                        .iter()
                        .find(|child| child.bounds.contains_point(x, y))
                        .ok_or_else(|| unplaceable(&node.bounds, x, y))?;
                }
            }
        }
    }

    /// 把点放入子树，调用前必须已经通过 `check_insertable`
    fn place(&mut self, x: f64, y: f64) -> Result<bool, QuadTreeError> {
        if !self.bounds.contains_point(x, y) {
            return Ok(false);
        }

        match self.state {
            NodeState::Empty => {
                self.state = NodeState::Leaf(Point::new(x, y));
                return Ok(true);
            }
            NodeState::Leaf(_) => self.subdivide()?,
            NodeState::Interior(_) => {}
        }

        let NodeState::Interior(children) = &mut self.state else {
            return Err(unplaceable(&self.bounds, x, y));
        };
        for child in children.iter_mut() {
            if child.place(x, y)? {
                return Ok(true);
            }
        }

        Err(unplaceable(&self.bounds, x, y))
    }

    /// 细分叶子节点：创建四个空的象限子节点，把原有的点放进第一个接受它的子节点
    fn subdivide(&mut self) -> Result<(), QuadTreeError> {
        let NodeState::Leaf(point) = self.state else {
            return Ok(());
        };

        let depth = self.depth + 1;
        let mut children = Box::new(self.bounds.quadrants().map(|bounds| Node::new(bounds, depth)));

        let mut placed = false;
        for child in children.iter_mut() {
            if child.place(point.x, point.y)? {
                placed = true;
                break;
            }
        }
        if !placed {
            return Err(unplaceable(&self.bounds, point.x, point.y));
        }

        trace!("subdivided {} at depth {}", self.bounds, self.depth);
        self.state = NodeState::Interior(children);
        Ok(())
    }
}

/// 计算两个不同的点在哪一层被分到不同的象限
///
/// `depth` 是当前持有 `existing` 的叶子节点深度；返回两点分开时新叶子所在的深度。
/// 这个深度超过 `max_depth` 时返回 `DepthLimitExceeded`。
pub(crate) fn separation_depth(
    bounds: &Rectangle,
    depth: usize,
    existing: Point,
    incoming: Point,
    max_depth: usize,
) -> Result<usize, QuadTreeError> {
    let mut bounds = *bounds;
    let mut depth = depth;
    loop {
        if depth >= max_depth {
            return Err(QuadTreeError::DepthLimitExceeded {
                max_depth,
                x: incoming.x,
                y: incoming.y,
            });
        }
        depth += 1;

        let a = bounds
            .quadrant_of(existing.x, existing.y)
            .ok_or_else(|| unplaceable(&bounds, existing.x, existing.y))?;
        let b = bounds
            .quadrant_of(incoming.x, incoming.y)
            .ok_or_else(|| unplaceable(&bounds, incoming.x, incoming.y))?;
        if a != b {
            return Ok(depth);
        }
        bounds = bounds.quadrant(a);
    }
}

fn unplaceable(bounds: &Rectangle, x: f64, y: f64) -> QuadTreeError {
    QuadTreeError::InvariantViolation(format!(
        "no quadrant of {} accepted ({}, {})",
        bounds, x, y
    ))
}
