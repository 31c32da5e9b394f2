use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::QuadTreeError;

/// 二维点（撞击点）
///
/// 相等比较是逐分量的精确比较，不带容差
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// 两点之间的欧氏距离
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        geo::Point::new(point.x, point.y)
    }
}

/// 象限编号
///
/// 采用屏幕坐标系（y 轴向"南"增长），顺序 NW, NE, SW, SE 同时也是插入、
/// 删除和成员判断时遍历子节点的顺序。点落在分割线上时，顺序靠前的象限优先。
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    NW,
    NE,
    SW,
    SE,
}

impl Quadrant {
    /// 固定的遍历顺序
    pub const ALL: [Quadrant; 4] = [Quadrant::NW, Quadrant::NE, Quadrant::SW, Quadrant::SE];

    /// 在子节点数组中的下标
    pub fn index(self) -> usize {
        match self {
            Quadrant::NW => 0,
            Quadrant::NE => 1,
            Quadrant::SW => 2,
            Quadrant::SE => 3,
        }
    }
}

/// 轴对齐矩形 - 用于表示四叉树节点的区域以及查询窗口
///
/// 四条边都是闭区间
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min: [f64; 2], // [x_min, y_min]
    pub max: [f64; 2], // [x_max, y_max]
}

impl Rectangle {
    /// 创建新的矩形
    ///
    /// 边界反转时直接 panic，适用于调用者能保证参数合法的场景；
    /// 外部输入请使用 [`Rectangle::try_new`]
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        assert!(x_min <= x_max && y_min <= y_max, "Invalid rectangle bounds");
        Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        }
    }

    /// 创建可用作节点区域的矩形
    ///
    /// 要求 min <= max，所有坐标以及宽高都是有限值，否则返回 `InvalidBounds`
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self, QuadTreeError> {
        let rect = Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        };
        if rect.is_valid_region() {
            Ok(rect)
        } else {
            Err(QuadTreeError::InvalidBounds {
                min_x: x_min,
                min_y: y_min,
                max_x: x_max,
                max_y: y_max,
            })
        }
    }

    /// 以某点为中心、半边长为 `half_extent` 的正方形窗口
    ///
    /// 不做合法性检查：负的半边长会得到一个反转的矩形，它不包含任何点
    pub fn around(center: Point, half_extent: f64) -> Self {
        Rectangle {
            min: [center.x - half_extent, center.y - half_extent],
            max: [center.x + half_extent, center.y + half_extent],
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min[0]
    }

    pub fn min_y(&self) -> f64 {
        self.min[1]
    }

    pub fn max_x(&self) -> f64 {
        self.max[0]
    }

    pub fn max_y(&self) -> f64 {
        self.max[1]
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// 计算矩形面积
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// 计算矩形中心点（各轴的中点）
    pub fn center(&self) -> Point {
        Point {
            x: self.min[0] + self.width() / 2.0,
            y: self.min[1] + self.height() / 2.0,
        }
    }

    /// 判断两个矩形是否相交（共享边界也算相交）
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.max[0] < other.min[0]
            || other.max[0] < self.min[0]
            || self.max[1] < other.min[1]
            || other.max[1] < self.min[1])
    }

    /// 判断当前矩形是否包含另一个矩形
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.min[0] <= other.min[0]
            && self.min[1] <= other.min[1]
            && self.max[0] >= other.max[0]
            && self.max[1] >= other.max[1]
    }

    /// 判断当前矩形是否包含一个点，四条边都包含在内
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min[0] <= x && x <= self.max[0] && self.min[1] <= y && y <= self.max[1]
    }

    /// 指定象限对应的子矩形，在各轴中点处分割
    pub fn quadrant(&self, quadrant: Quadrant) -> Rectangle {
        let c = self.center();
        let (min, max) = match quadrant {
            Quadrant::NW => ([self.min[0], self.min[1]], [c.x, c.y]),
            Quadrant::NE => ([c.x, self.min[1]], [self.max[0], c.y]),
            Quadrant::SW => ([self.min[0], c.y], [c.x, self.max[1]]),
            Quadrant::SE => ([c.x, c.y], [self.max[0], self.max[1]]),
        };
        Rectangle { min, max }
    }

    /// 四个象限子矩形，顺序为 NW, NE, SW, SE
    pub fn quadrants(&self) -> [Rectangle; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }

    /// 按 NW, NE, SW, SE 顺序找到第一个包含该点的象限
    pub fn quadrant_of(&self, x: f64, y: f64) -> Option<Quadrant> {
        Quadrant::ALL
            .into_iter()
            .find(|&q| self.quadrant(q).contains_point(x, y))
    }

    /// 能否用作节点区域：min <= max，宽高都是有限值
    pub fn is_valid_region(&self) -> bool {
        self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1]
            && self.width().is_finite()
            && self.height().is_finite()
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.min[0], self.min[1], self.max[0], self.max[1])
    }
}

impl From<Rectangle> for geo::Rect<f64> {
    fn from(rect: Rectangle) -> Self {
        geo::Rect::new(
            geo::coord! { x: rect.min[0], y: rect.min[1] },
            geo::coord! { x: rect.max[0], y: rect.max[1] },
        )
    }
}
