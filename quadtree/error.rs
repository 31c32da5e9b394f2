/// 四叉树操作错误类型
///
/// 坐标落在树的范围之外不是错误：insert/remove/contains 直接返回 false
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadTreeError {
    /// 构造树或节点时边界反转或不是有限值
    #[error("Invalid bounds [{min_x}, {min_y}, {max_x}, {max_y}]: min must not exceed max and all values must be finite")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    /// 插入与已有点完全相同的坐标，细分无法把两者分开
    #[error("Point ({x}, {y}) is already stored")]
    DuplicatePoint { x: f64, y: f64 },

    /// 两个不同的点在 max_depth 层之内无法被中点分割分开（数值精度不足）
    #[error("Inserting ({x}, {y}) would subdivide past the maximum depth of {max_depth}")]
    DepthLimitExceeded { max_depth: usize, x: f64, y: f64 },

    /// 内部结构被破坏，属于逻辑错误
    #[error("Quadtree invariant violated: {0}")]
    InvariantViolation(String),
}
