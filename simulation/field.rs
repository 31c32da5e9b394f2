use crate::quadtree::{Point, QuadTree, QuadTreeError, Rectangle};

use super::SimulationError;

/// 陨石坑集合
///
/// 模拟器只通过这个接口访问存储，四叉树和线性扫描的参考实现都实现了它
pub trait CraterField {
    /// 当前存活的陨石坑数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 研究区域
    fn bounds(&self) -> Rectangle;

    /// 抹去与 `center` 欧氏距离不超过 `radius` 的所有陨石坑，返回抹去的数量
    fn obliterate(&mut self, center: Point, radius: f64) -> Result<usize, SimulationError>;

    /// 加入一个新的陨石坑
    fn add(&mut self, crater: Point) -> Result<(), SimulationError>;

    /// 所有存活的陨石坑
    fn craters(&self) -> Vec<Point>;
}

impl CraterField for QuadTree {
    fn len(&self) -> usize {
        QuadTree::len(self)
    }

    fn bounds(&self) -> Rectangle {
        *QuadTree::bounds(self)
    }

    fn obliterate(&mut self, center: Point, radius: f64) -> Result<usize, SimulationError> {
        let doomed = self.within_radius(center, radius);
        for crater in &doomed {
            if !self.remove_point(*crater) {
                return Err(QuadTreeError::InvariantViolation(format!(
                    "range query returned {} but it could not be removed",
                    crater
                ))
                .into());
            }
        }
        Ok(doomed.len())
    }

    fn add(&mut self, crater: Point) -> Result<(), SimulationError> {
        if self.insert_point(crater)? {
            Ok(())
        } else {
            Err(SimulationError::OutOfBounds(crater))
        }
    }

    fn craters(&self) -> Vec<Point> {
        self.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadtree_obliterate() {
        let mut tree = QuadTree::new(0.0, 0.0, 500.0, 500.0).unwrap();
        for p in [(100.0, 100.0), (120.0, 110.0), (125.0, 125.0), (300.0, 300.0)] {
            tree.add(p.into()).unwrap();
        }

        // (125, 125) 距离约 35.36，不在半径 30 之内
        let removed = tree.obliterate(Point::new(100.0, 100.0), 30.0).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(CraterField::len(&tree), 2);
        assert!(tree.contains(125.0, 125.0));
        assert!(tree.contains(300.0, 300.0));
    }

    #[test]
    fn test_quadtree_add_out_of_bounds() {
        let mut tree = QuadTree::new(0.0, 0.0, 500.0, 500.0).unwrap();
        assert!(matches!(
            tree.add(Point::new(600.0, 10.0)),
            Err(SimulationError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_quadtree_add_duplicate() {
        let mut tree = QuadTree::new(0.0, 0.0, 500.0, 500.0).unwrap();
        tree.add(Point::new(1.0, 1.0)).unwrap();
        assert!(matches!(
            tree.add(Point::new(1.0, 1.0)),
            Err(SimulationError::Index(QuadTreeError::DuplicatePoint { .. }))
        ));
    }
}
