use std::fs;
use std::path::Path;

use super::super::quadtree::QuadTree;
use tracing::debug;

/// 持久化错误类型
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}

/// 序列化格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    /// JSON格式 - 可读性好，方便调试
    Json,
    /// 二进制格式 - 性能好，体积小
    Binary,
}

impl SerializationFormat {
    /// 根据文件扩展名自动判断格式
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("json") => SerializationFormat::Json,
            _ => SerializationFormat::Binary,
        }
    }
}

/// 四叉树持久化功能实现
impl QuadTree {
    /// 导出到文件
    ///
    /// 根据文件扩展名自动选择序列化格式：
    /// - .json -> JSON格式（调试友好）
    /// - 其他 -> 二进制格式
    pub fn dump_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let format = SerializationFormat::from_extension(&path);
        self.dump_to_file_with_format(path, format)
    }

    /// 使用指定格式导出到文件
    pub fn dump_to_file_with_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: SerializationFormat,
    ) -> Result<(), PersistenceError> {
        let path = path.as_ref();

        // 先写临时文件再重命名，避免留下半个文件
        let temp_path = path.with_extension(format!(
            "{}.tmp",
            path.extension().unwrap_or_default().to_string_lossy()
        ));

        let data = match format {
            SerializationFormat::Json => serde_json::to_vec_pretty(self)?,
            SerializationFormat::Binary => bincode::serialize(self)?,
        };

        fs::write(&temp_path, data)?;
        fs::rename(temp_path, path)?;

        debug!("dumped quadtree with {} points to {}", self.len(), path.display());
        Ok(())
    }

    /// 从文件加载四叉树
    ///
    /// 加载后会检查结构不变量，不满足时返回 `InvalidFormat`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<QuadTree, PersistenceError> {
        let format = SerializationFormat::from_extension(&path);
        Self::load_from_file_with_format(path, format)
    }

    /// 使用指定格式从文件加载四叉树
    pub fn load_from_file_with_format<P: AsRef<Path>>(
        path: P,
        format: SerializationFormat,
    ) -> Result<QuadTree, PersistenceError> {
        let data = fs::read(path)?;

        let tree: QuadTree = match format {
            SerializationFormat::Json => serde_json::from_slice(&data)?,
            SerializationFormat::Binary => bincode::deserialize(&data)?,
        };

        tree.validate()
            .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> QuadTree {
        let mut tree = QuadTree::new(0.0, 0.0, 100.0, 100.0).unwrap();
        for (x, y) in [(5.0, 3.0), (42.0, 13.37), (11.11, 99.99), (5.0, 8.0), (70.0, 30.0)] {
            tree.insert(x, y).unwrap();
        }
        tree
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SerializationFormat::from_extension("tree.json"), SerializationFormat::Json);
        assert_eq!(SerializationFormat::from_extension("tree.bin"), SerializationFormat::Binary);
        assert_eq!(SerializationFormat::from_extension("tree"), SerializationFormat::Binary);
    }

    #[test]
    fn test_json_dump_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.json");
        let tree = sample_tree();

        tree.dump_to_file(&path).unwrap();
        let loaded = QuadTree::load_from_file(&path).unwrap();

        assert_eq!(loaded, tree);
        assert!(loaded.contains(42.0, 13.37));
        assert!(!dir.path().join("tree.json.tmp").exists());
    }

    #[test]
    fn test_binary_dump_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.qtree");
        let tree = sample_tree();

        tree.dump_to_file(&path).unwrap();
        let mut loaded = QuadTree::load_from_file(&path).unwrap();

        assert_eq!(loaded.len(), 5);
        assert!(loaded.remove(70.0, 30.0));
        assert_eq!(loaded.query_range(3.0, 5.0, 50.0, 50.0).len(), 2);
    }

    #[test]
    fn test_load_rejects_broken_structure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");

        // 叶子节点的点不在自己的区域内
        let json = r#"{
            "root": {
                "bounds": { "min": [0.0, 0.0], "max": [10.0, 10.0] },
                "depth": 0,
                "state": { "Leaf": { "x": 50.0, "y": 50.0 } }
            },
            "max_depth": 64
        }"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(
            QuadTree::load_from_file(&path),
            Err(PersistenceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_rejects_inverted_root_bounds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inverted.json");

        let json = r#"{
            "root": {
                "bounds": { "min": [10.0, 10.0], "max": [0.0, 0.0] },
                "depth": 0,
                "state": "Empty"
            },
            "max_depth": 64
        }"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(
            QuadTree::load_from_file(&path),
            Err(PersistenceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_rejects_point_in_later_quadrant() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("later.json");

        // (50, 50) 应当在 NW 子树中，这里被放到了 SE
        let json = r#"{
            "root": {
                "bounds": { "min": [0.0, 0.0], "max": [100.0, 100.0] },
                "depth": 0,
                "state": { "Interior": [
                    { "bounds": { "min": [0.0, 0.0], "max": [50.0, 50.0] }, "depth": 1,
                      "state": { "Leaf": { "x": 10.0, "y": 10.0 } } },
                    { "bounds": { "min": [50.0, 0.0], "max": [100.0, 50.0] }, "depth": 1, "state": "Empty" },
                    { "bounds": { "min": [0.0, 50.0], "max": [50.0, 100.0] }, "depth": 1, "state": "Empty" },
                    { "bounds": { "min": [50.0, 50.0], "max": [100.0, 100.0] }, "depth": 1,
                      "state": { "Leaf": { "x": 50.0, "y": 50.0 } } }
                ] }
            },
            "max_depth": 64
        }"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(
            QuadTree::load_from_file(&path),
            Err(PersistenceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            QuadTree::load_from_file(dir.path().join("missing.bin")),
            Err(PersistenceError::Io(_))
        ));
    }
}
