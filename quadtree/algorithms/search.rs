use super::super::node::{Node, NodeState};
use super::super::quadtree::QuadTree;
use super::super::rectangle::{Point, Rectangle};

/// 搜索操作相关算法
impl QuadTree {
    /// 判断树中是否保存了坐标完全相同的点
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.root.contains(x, y)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.contains(point.x, point.y)
    }

    /// 返回所有落在查询矩形内（含边界）的点
    ///
    /// 结果顺序不作保证，每个点只出现一次
    pub fn range_query(&self, query: &Rectangle) -> Vec<Point> {
        let mut results = Vec::new();
        self.root.search_recursive(query, &mut results);
        results
    }

    /// 以四个边界值给出查询矩形的范围查询
    ///
    /// 边界反转的查询矩形不包含任何点，返回空结果
    pub fn query_range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Point> {
        self.range_query(&Rectangle {
            min: [min_x, min_y],
            max: [max_x, max_y],
        })
    }

    /// 查找与中心点欧氏距离不超过 `radius` 的所有点
    ///
    /// 先用边长 2 * radius 的正方形窗口做范围查询，再按精确距离过滤
    pub fn within_radius(&self, center: Point, radius: f64) -> Vec<Point> {
        let mut candidates = self.range_query(&Rectangle::around(center, radius));
        candidates.retain(|p| p.distance(&center) <= radius);
        candidates
    }

    /// 枚举所有保存的点，顺序为深度优先的 NW, NE, SW, SE 顺序
    pub fn points(&self) -> Vec<Point> {
        let mut results = Vec::with_capacity(self.len());
        self.root.collect_all(&mut results);
        results
    }
}

impl Node {
    pub(crate) fn contains(&self, x: f64, y: f64) -> bool {
        if !self.bounds.contains_point(x, y) {
            return false;
        }

        match &self.state {
            NodeState::Empty => false,
            NodeState::Leaf(point) => point.x == x && point.y == y,
            NodeState::Interior(children) => children.iter().any(|child| child.contains(x, y)),
        }
    }

    /// 递归搜索，跳过与查询矩形不相交的子树
    fn search_recursive(&self, query: &Rectangle, results: &mut Vec<Point>) {
        match &self.state {
            NodeState::Empty => {}
            NodeState::Leaf(point) => {
                if query.contains_point(point.x, point.y) {
                    results.push(*point);
                }
            }
            NodeState::Interior(children) => {
                for child in children.iter() {
                    if child.bounds.intersects(query) {
                        child.search_recursive(query, results);
                    }
                }
            }
        }
    }

    pub(crate) fn collect_all(&self, results: &mut Vec<Point>) {
        match &self.state {
            NodeState::Empty => {}
            NodeState::Leaf(point) => results.push(*point),
            NodeState::Interior(children) => {
                for child in children.iter() {
                    child.collect_all(results);
                }
            }
        }
    }
}
