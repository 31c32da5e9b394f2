use super::super::error::QuadTreeError;
use super::super::node::{Node, NodeState};
use super::super::quadtree::QuadTree;
use super::super::rectangle::Quadrant;
use std::fmt;

/// 四叉树调试功能实现
impl QuadTree {
    /// 检查整棵树的结构不变量
    ///
    /// - 根节点区域合法（min <= max，宽高有限）
    /// - 子节点区域恰好是父节点的对应象限
    /// - 子节点深度等于父节点深度加一，且不超过 max_depth
    /// - 叶子节点的点在它自己的区域内
    /// - 每个点都位于按 NW, NE, SW, SE 顺序第一个包含它的象限
    /// - 内部节点的子树至少保存两个点（否则早该收缩）
    pub fn validate(&self) -> Result<(), QuadTreeError> {
        if !self.root.bounds.is_valid_region() {
            return Err(violation(&self.root, "root bounds are not a valid region"));
        }
        if self.root.depth != 0 {
            return Err(violation(&self.root, "root depth is not 0"));
        }
        validate_node(&self.root, self.max_depth).map(|_| ())
    }

    /// 生成缩进的树结构文本，用于调试日志
    pub fn outline(&self) -> String {
        Outline(&self.root).to_string()
    }
}

/// 每个节点一行，按深度缩进
struct Outline<'a>(&'a Node);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self.0, "root", f)
    }
}

fn write_node(node: &Node, label: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let indent = "  ".repeat(node.depth);
    match &node.state {
        NodeState::Empty => writeln!(f, "{}{} {} empty", indent, label, node.bounds),
        NodeState::Leaf(point) => writeln!(f, "{}{} {} leaf {}", indent, label, node.bounds, point),
        NodeState::Interior(children) => {
            writeln!(
                f,
                "{}{} {} interior ({} points)",
                indent,
                label,
                node.bounds,
                node.len()
            )?;
            for (child, quadrant) in children.iter().zip(Quadrant::ALL) {
                write_node(child, &quadrant.to_string(), f)?;
            }
            Ok(())
        }
    }
}

/// 递归检查节点，返回子树中的点数
fn validate_node(node: &Node, max_depth: usize) -> Result<usize, QuadTreeError> {
    if node.depth > max_depth {
        return Err(violation(node, "node deeper than max_depth"));
    }

    match &node.state {
        NodeState::Empty => Ok(0),
        NodeState::Leaf(point) => {
            if node.bounds.contains_point(point.x, point.y) {
                Ok(1)
            } else {
                Err(violation(node, &format!("leaf point {} outside its bounds", point)))
            }
        }
        NodeState::Interior(children) => {
            let mut total = 0;
            for (child, quadrant) in children.iter().zip(Quadrant::ALL) {
                let expected = node.bounds.quadrant(quadrant);
                if child.bounds != expected {
                    return Err(violation(child, &format!("expected quadrant bounds {}", expected)));
                }
                if child.depth != node.depth + 1 {
                    return Err(violation(child, "child depth is not parent depth + 1"));
                }
                total += validate_node(child, max_depth)?;

                // 边界上的点只能出现在第一个包含它的象限里，否则查找和插入会走错路径
                let mut points = Vec::new();
                child.collect_all(&mut points);
                if let Some(point) = points
                    .iter()
                    .find(|p| node.bounds.quadrant_of(p.x, p.y) != Some(quadrant))
                {
                    return Err(violation(
                        child,
                        &format!("point {} belongs to an earlier quadrant than {}", point, quadrant),
                    ));
                }
            }
            if total < 2 {
                return Err(violation(node, &format!("interior node holds only {} point(s)", total)));
            }
            Ok(total)
        }
    }
}

fn violation(node: &Node, reason: &str) -> QuadTreeError {
    QuadTreeError::InvariantViolation(format!(
        "node {} at depth {}: {}",
        node.bounds, node.depth, reason
    ))
}
