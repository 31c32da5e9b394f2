use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::quadtree::{Point, Rectangle};

use super::field::CraterField;
use super::SimulationError;

/// 模拟参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 研究区域（km）
    #[serde(default = "default_min")]
    pub min_x: f64,
    #[serde(default = "default_min")]
    pub min_y: f64,
    #[serde(default = "default_max")]
    pub max_x: f64,
    #[serde(default = "default_max")]
    pub max_y: f64,

    /// 新陨石坑抹去旧陨石坑的半径（km）
    #[serde(default = "default_crater_radius")]
    pub crater_radius: f64,

    /// 导出快照时陨石坑的绘制半径（km）
    #[serde(default = "default_display_radius")]
    pub display_radius: f64,

    /// 每一步代表的年数
    #[serde(default = "default_years_per_step")]
    pub years_per_step: u64,

    /// 饱和判定比例：counts[i / 2] * ratio > counts[i] 时停止
    #[serde(default = "default_saturation_ratio")]
    pub saturation_ratio: f64,

    /// 最多模拟的步数
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// 随机数种子，不指定时使用系统熵
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// 每隔多少步输出一次进度，0 表示不输出
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,

    /// 每隔多少步导出一次快照，0 表示不导出
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: usize,
}

fn default_min() -> f64 {
    0.0
}

fn default_max() -> f64 {
    500.0
}

fn default_crater_radius() -> f64 {
    30.0
}

fn default_display_radius() -> f64 {
    25.0
}

fn default_years_per_step() -> u64 {
    1000
}

fn default_saturation_ratio() -> f64 {
    1.05
}

fn default_max_steps() -> usize {
    1_000_000
}

fn default_report_interval() -> usize {
    10
}

fn default_snapshot_interval() -> usize {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_x: default_min(),
            min_y: default_min(),
            max_x: default_max(),
            max_y: default_max(),
            crater_radius: default_crater_radius(),
            display_radius: default_display_radius(),
            years_per_step: default_years_per_step(),
            saturation_ratio: default_saturation_ratio(),
            max_steps: default_max_steps(),
            seed: None,
            report_interval: default_report_interval(),
            snapshot_interval: default_snapshot_interval(),
        }
    }
}

impl SimulationConfig {
    /// 第 `step` 步对应的年数，溢出时饱和到 `u64::MAX`
    pub fn years_at(&self, step: usize) -> u64 {
        (step as u64).saturating_mul(self.years_per_step)
    }

    /// 研究区域矩形
    pub fn bounds(&self) -> Result<Rectangle, SimulationError> {
        Ok(Rectangle::try_new(self.min_x, self.min_y, self.max_x, self.max_y)?)
    }

    /// 检查参数的合法性
    pub fn validate(&self) -> Result<(), SimulationError> {
        let bounds = self.bounds()?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "study area {} has no area",
                bounds
            )));
        }
        if !self.crater_radius.is_finite() || self.crater_radius < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "crater_radius must be a non-negative number, got {}",
                self.crater_radius
            )));
        }
        if !self.display_radius.is_finite() || self.display_radius < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "display_radius must be a non-negative number, got {}",
                self.display_radius
            )));
        }
        if !self.saturation_ratio.is_finite() || self.saturation_ratio <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "saturation_ratio must be positive, got {}",
                self.saturation_ratio
            )));
        }
        if self.max_steps == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 单步模拟的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// 步数，从 1 开始
    pub step: usize,
    /// 新陨石坑的位置
    pub crater: Point,
    /// 被抹去的旧陨石坑数量
    pub obliterated: usize,
    /// 这一步之后的陨石坑总数
    pub count: usize,
}

impl StepOutcome {
    /// 陨石坑数量的变化
    pub fn delta(&self) -> i64 {
        1 - self.obliterated as i64
    }
}

/// 整次模拟的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub steps: usize,
    pub years: u64,
    pub final_count: usize,
    /// 是否因为饱和而停止（否则是达到了 max_steps）
    pub saturated: bool,
    /// 每一步之后的陨石坑数量，counts[0] 是初始数量
    pub counts: Vec<usize>,
}

/// 陨石坑饱和模拟
///
/// 每一步在研究区域内均匀地取一个撞击点，抹去半径内的旧陨石坑，再加入新的陨石坑，
/// 直到数量增长相对于一半步数之前趋于平缓。
#[derive(Debug)]
pub struct CraterSimulation<F: CraterField> {
    config: SimulationConfig,
    bounds: Rectangle,
    field: F,
    rng: StdRng,
    counts: Vec<usize>,
}

impl<F: CraterField> CraterSimulation<F> {
    pub fn new(config: SimulationConfig, field: F) -> Result<Self, SimulationError> {
        config.validate()?;
        let bounds = config.bounds()?;
        if field.bounds() != bounds {
            return Err(SimulationError::InvalidConfig(format!(
                "field bounds {} differ from study area {}",
                field.bounds(),
                bounds
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let counts = vec![field.len()];

        Ok(CraterSimulation {
            config,
            bounds,
            field,
            rng,
            counts,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn into_field(self) -> F {
        self.field
    }

    /// 已经模拟的步数
    pub fn steps(&self) -> usize {
        self.counts.len() - 1
    }

    /// 已经经过的年数
    pub fn years(&self) -> u64 {
        self.config.years_at(self.steps())
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// 模拟一步
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        let x = self.rng.gen_range(self.bounds.min_x()..=self.bounds.max_x());
        let y = self.rng.gen_range(self.bounds.min_y()..=self.bounds.max_y());
        let crater = Point::new(x, y);

        let obliterated = self.field.obliterate(crater, self.config.crater_radius)?;
        self.field.add(crater)?;

        let count = self.field.len();
        self.counts.push(count);

        Ok(StepOutcome {
            step: self.steps(),
            crater,
            obliterated,
            count,
        })
    }

    /// 判断是否已经饱和
    pub fn is_saturated(&self) -> bool {
        let i = self.steps();
        if i == 0 {
            return false;
        }
        self.counts[i / 2] as f64 * self.config.saturation_ratio > self.counts[i] as f64
    }

    /// 一直模拟到饱和或达到 max_steps，每步之后调用 `observer`
    pub fn run<E, O>(&mut self, mut observer: O) -> Result<SimulationReport, SimulationError>
    where
        E: std::fmt::Display,
        O: FnMut(&StepOutcome, &F) -> Result<(), E>,
    {
        info!(
            "💥 Simulating craters over {} with radius {}",
            self.bounds, self.config.crater_radius
        );

        let mut saturated = false;
        while self.steps() < self.config.max_steps {
            let outcome = self.step()?;
            observer(&outcome, &self.field)
                .map_err(|e| SimulationError::Observer(e.to_string()))?;

            if self.config.report_interval > 0 && outcome.step % self.config.report_interval == 0 {
                debug!(
                    "step {}: {} craters ({:+})",
                    outcome.step,
                    outcome.count,
                    outcome.delta()
                );
            }

            if self.is_saturated() {
                saturated = true;
                break;
            }
        }

        let report = self.report(saturated);
        if saturated {
            info!(
                "✅ Saturated after {} steps ({} years) with {} craters",
                report.steps, report.years, report.final_count
            );
        } else {
            info!(
                "⚠️  Stopped at max_steps = {} with {} craters",
                report.steps, report.final_count
            );
        }
        Ok(report)
    }

    /// 不需要逐步回调时的便捷方法
    pub fn run_to_saturation(&mut self) -> Result<SimulationReport, SimulationError> {
        self.run(|_, _| Ok::<(), std::convert::Infallible>(()))
    }

    fn report(&self, saturated: bool) -> SimulationReport {
        SimulationReport {
            steps: self.steps(),
            years: self.years(),
            final_count: self.field.len(),
            saturated,
            counts: self.counts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadtree::QuadTree;
    use crate::simulation::NaiveCraterField;

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    fn tree_for(config: &SimulationConfig) -> QuadTree {
        QuadTree::new(config.min_x, config.min_y, config.max_x, config.max_y).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.bounds().unwrap(), Rectangle::new(0.0, 0.0, 500.0, 500.0));
        assert_eq!(config.crater_radius, 30.0);
        assert_eq!(config.saturation_ratio, 1.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimulationConfig::default();
        config.max_x = -1.0;
        assert!(matches!(config.validate(), Err(SimulationError::Index(_))));

        let mut config = SimulationConfig::default();
        config.max_y = 0.0;
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.crater_radius = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.saturation_ratio = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_years_saturate() {
        let config = SimulationConfig {
            years_per_step: u64::MAX,
            max_steps: 3,
            crater_radius: 0.0,
            ..seeded(5)
        };
        assert_eq!(config.years_at(0), 0);
        assert_eq!(config.years_at(1), u64::MAX);
        assert_eq!(config.years_at(2), u64::MAX);

        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.years(), u64::MAX);
    }

    #[test]
    fn test_field_bounds_must_match() {
        let config = seeded(1);
        let tree = QuadTree::new(0.0, 0.0, 100.0, 100.0).unwrap();
        assert!(CraterSimulation::new(config, tree).is_err());
    }

    #[test]
    fn test_step_records_counts() {
        let config = seeded(1);
        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();

        let first = sim.step().unwrap();
        assert_eq!(first.step, 1);
        assert_eq!(first.obliterated, 0);
        assert_eq!(first.count, 1);
        assert_eq!(first.delta(), 1);
        assert!(sim.bounds.contains_point(first.crater.x, first.crater.y));

        for _ in 0..49 {
            sim.step().unwrap();
        }
        assert_eq!(sim.steps(), 50);
        assert_eq!(sim.years(), 50_000);
        assert_eq!(sim.counts().len(), 51);
        assert_eq!(sim.counts()[0], 0);
        assert_eq!(sim.counts()[50], sim.field().len());
        assert!(sim.field().validate().is_ok());
    }

    #[test]
    fn test_counts_follow_deltas() {
        let config = seeded(9);
        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        let mut running: i64 = 0;
        for _ in 0..500 {
            let outcome = sim.step().unwrap();
            running += outcome.delta();
            assert_eq!(running, outcome.count as i64);
        }
    }

    #[test]
    fn test_run_reaches_saturation() {
        let config = seeded(2012);
        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        let report = sim.run_to_saturation().unwrap();

        assert!(report.saturated);
        assert_eq!(report.counts.len(), report.steps + 1);
        assert_eq!(report.final_count, report.counts[report.steps]);
        assert_eq!(report.years, report.steps as u64 * 1000);
        assert!(
            report.counts[report.steps / 2] as f64 * 1.05 > report.counts[report.steps] as f64
        );
        assert!(sim.field().validate().is_ok());
    }

    #[test]
    fn test_run_stops_at_max_steps() {
        let config = SimulationConfig {
            max_steps: 5,
            // 比例为 1 以下时增长中的数量永远不会触发饱和
            saturation_ratio: 0.5,
            crater_radius: 0.0,
            ..seeded(3)
        };
        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        let report = sim.run_to_saturation().unwrap();
        assert!(!report.saturated);
        assert_eq!(report.steps, 5);
        assert_eq!(report.final_count, 5);
    }

    #[test]
    fn test_observer_sees_every_step_and_can_abort() {
        let config = SimulationConfig {
            max_steps: 20,
            ..seeded(4)
        };
        let mut sim = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        let mut seen = Vec::new();
        let result = sim.run(|outcome, field| {
            assert_eq!(outcome.count, field.len());
            seen.push(outcome.step);
            if outcome.step == 3 {
                Err("stop here")
            } else {
                Ok(())
            }
        });

        assert!(matches!(result, Err(SimulationError::Observer(msg)) if msg == "stop here"));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_quadtree_matches_naive_reference() {
        let config = seeded(31337);
        let bounds = config.bounds().unwrap();

        let mut fast = CraterSimulation::new(config.clone(), tree_for(&config)).unwrap();
        let mut slow = CraterSimulation::new(config, NaiveCraterField::new(bounds)).unwrap();

        let fast_report = fast.run_to_saturation().unwrap();
        let slow_report = slow.run_to_saturation().unwrap();

        assert_eq!(fast_report, slow_report);

        let mut a = fast.field().craters();
        let mut b = slow.field().craters();
        let key = |p: &Point| (p.x.to_bits(), p.y.to_bits());
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
    }
}
