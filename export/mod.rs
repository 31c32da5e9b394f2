//! 模拟结果导出
//!
//! 陨石坑快照导出为 GeoJSON（每个陨石坑一个带 `radius` 属性的 Point 要素），
//! 数量随时间的变化导出为 JSON 报告。

use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use tracing::debug;

use crate::quadtree::{Point, Rectangle};
use crate::simulation::SimulationReport;

/// 导出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 快照的元信息
#[derive(Debug, Clone, Copy)]
pub struct SnapshotMeta {
    pub step: usize,
    pub years: u64,
    pub bounds: Rectangle,
    pub display_radius: f64,
}

/// 把陨石坑集合转换为 GeoJSON FeatureCollection
pub fn crater_collection(craters: &[Point], meta: &SnapshotMeta) -> FeatureCollection {
    let features = craters
        .iter()
        .map(|crater| {
            let mut properties = JsonObject::new();
            properties.insert("radius".to_string(), json!(meta.display_radius));

            let point: geo::Point<f64> = (*crater).into();
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("step".to_string(), json!(meta.step));
    foreign_members.insert("years".to_string(), json!(meta.years));
    foreign_members.insert("count".to_string(), json!(craters.len()));

    FeatureCollection {
        bbox: Some(vec![
            meta.bounds.min_x(),
            meta.bounds.min_y(),
            meta.bounds.max_x(),
            meta.bounds.max_y(),
        ]),
        features,
        foreign_members: Some(foreign_members),
    }
}

/// 把快照写到 `dir/name.geojson`，返回写入的文件路径
pub fn write_snapshot(
    dir: &Path,
    name: &str,
    craters: &[Point],
    meta: &SnapshotMeta,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.geojson", name));

    let collection = crater_collection(craters, meta);
    fs::write(&path, serde_json::to_string_pretty(&collection)?)?;

    debug!("wrote {} craters to {}", craters.len(), path.display());
    Ok(path)
}

/// 把模拟报告写成 JSON
pub fn write_report(path: &Path, report: &SimulationReport) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    debug!("wrote report for {} steps to {}", report.steps, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;
    use tempfile::TempDir;

    fn meta() -> SnapshotMeta {
        SnapshotMeta {
            step: 100,
            years: 100_000,
            bounds: Rectangle::new(0.0, 0.0, 500.0, 500.0),
            display_radius: 25.0,
        }
    }

    #[test]
    fn test_crater_collection() {
        let craters = [Point::new(10.0, 20.0), Point::new(300.0, 400.0)];
        let collection = crater_collection(&craters, &meta());

        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.bbox, Some(vec![0.0, 0.0, 500.0, 500.0]));

        let first = &collection.features[0];
        assert_eq!(
            first.geometry.as_ref().map(|g| g.value.clone()),
            Some(Value::Point(vec![10.0, 20.0]))
        );
        assert_eq!(first.property("radius"), Some(&json!(25.0)));

        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members.get("step"), Some(&json!(100)));
        assert_eq!(members.get("count"), Some(&json!(2)));
    }

    #[test]
    fn test_write_snapshot_is_valid_geojson() {
        let dir = TempDir::new().unwrap();
        let craters = [Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)];

        let path = write_snapshot(&dir.path().join("snapshots"), "step100", &craters, &meta()).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("step100.geojson"));

        let text = fs::read_to_string(&path).unwrap();
        match text.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(collection) => assert_eq!(collection.features.len(), 3),
            other => panic!("unexpected GeoJSON: {:?}", other),
        }
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.json");
        let report = SimulationReport {
            steps: 3,
            years: 3000,
            final_count: 2,
            saturated: true,
            counts: vec![0, 1, 2, 2],
        };

        write_report(&path, &report).unwrap();
        let loaded: SimulationReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }
}
