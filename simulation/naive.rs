use crate::quadtree::{Point, Rectangle};

use super::field::CraterField;
use super::SimulationError;

/// 线性扫描的陨石坑集合
///
/// 每次抹除都遍历全部陨石坑，用来验证基于四叉树的模拟结果
#[derive(Debug, Clone)]
pub struct NaiveCraterField {
    bounds: Rectangle,
    craters: Vec<Point>,
}

impl NaiveCraterField {
    pub fn new(bounds: Rectangle) -> Self {
        NaiveCraterField {
            bounds,
            craters: Vec::new(),
        }
    }
}

impl CraterField for NaiveCraterField {
    fn len(&self) -> usize {
        self.craters.len()
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn obliterate(&mut self, center: Point, radius: f64) -> Result<usize, SimulationError> {
        let before = self.craters.len();
        self.craters.retain(|crater| crater.distance(&center) > radius);
        Ok(before - self.craters.len())
    }

    fn add(&mut self, crater: Point) -> Result<(), SimulationError> {
        if !self.bounds.contains_point(crater.x, crater.y) {
            return Err(SimulationError::OutOfBounds(crater));
        }
        self.craters.push(crater);
        Ok(())
    }

    fn craters(&self) -> Vec<Point> {
        self.craters.clone()
    }
}
