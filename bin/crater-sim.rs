use clap::Parser;
use colored::Colorize;
use crater::export::{self, ExportError, SnapshotMeta};
use crater::quadtree::QuadTree;
use crater::simulation::{CraterField, CraterSimulation, NaiveCraterField, SimulationReport};
use crater::{CraterConfig, Result};
use tracing::{debug, info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "crater.toml")]
    config: String,

    /// 生成默认配置文件并退出
    #[arg(long)]
    generate_config: bool,

    /// Random seed (overrides config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Obliteration radius in km (overrides config file)
    #[arg(long)]
    radius: Option<f64>,

    /// Maximum number of steps (overrides config file)
    #[arg(long)]
    max_steps: Option<usize>,

    /// Output directory (overrides config file)
    #[arg(long)]
    output_dir: Option<String>,

    /// Use the linear-scan crater field instead of the quadtree
    #[arg(long)]
    naive: bool,

    /// Log level (overrides config file)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 生成默认配置文件
    if args.generate_config {
        let config = CraterConfig::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        println!("📝 You can edit this file and rerun the simulation.");
        return Ok(());
    }

    // 加载配置
    let mut config = CraterConfig::from_file(&args.config)?;

    // 命令行参数覆盖配置文件
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(radius) = args.radius {
        config.simulation.crater_radius = radius;
    }
    if let Some(max_steps) = args.max_steps {
        config.simulation.max_steps = max_steps;
    }
    if let Some(output_dir) = args.output_dir {
        config.output.dir = output_dir.into();
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    // 验证配置
    config.validate()?;

    // 初始化日志系统
    init_logging(&config.logging)?;

    info!("🚀 Starting crater simulation...");
    info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    // 打印配置摘要
    config.print_summary();

    let bounds = config.simulation.bounds()?;
    let report = if args.naive {
        info!("🐢 Using linear-scan crater field");
        let (report, _) = run_simulation(&config, NaiveCraterField::new(bounds))?;
        report
    } else {
        let tree = QuadTree::from_rectangle(bounds, config.index.max_depth)?;
        let (report, tree) = run_simulation(&config, tree)?;

        let stats = tree.stats();
        info!(
            "🌳 Quadtree: {} points, {} nodes, depth {}",
            stats.points,
            stats.total_nodes(),
            stats.depth
        );
        debug!("final tree:\n{}", tree.outline());

        if let Some(tree_file) = &config.output.tree_file {
            let path = config.output.dir.join(tree_file);
            tree.dump_to_file(&path)?;
            info!("💾 Saved quadtree to {}", path.display());
        }
        report
    };

    if config.output.write_report {
        let path = config.output.dir.join("report.json");
        export::write_report(&path, &report)?;
        info!("📝 Wrote report to {}", path.display());
    }

    println!();
    println!(
        "Time: {} years\tCrater count: {}",
        report.years, report.final_count
    );

    Ok(())
}

/// 运行模拟：打印进度表，按间隔导出快照，结束时导出最终快照（快照关闭时都不导出）
fn run_simulation<F: CraterField>(
    config: &CraterConfig,
    field: F,
) -> Result<(SimulationReport, F)> {
    let sim_config = config.simulation.clone();
    let bounds = sim_config.bounds()?;
    let snapshots = config.output.dir.join("snapshots");
    let write_snapshots = config.snapshots_enabled();

    let meta = |step: usize| SnapshotMeta {
        step,
        years: sim_config.years_at(step),
        bounds,
        display_radius: sim_config.display_radius,
    };

    let mut sim = CraterSimulation::new(sim_config.clone(), field)?;

    if sim_config.report_interval > 0 {
        println!("{:>12} | {:>8}", "Time (y)".bold(), "Craters".bold());
        println!("{}", "-".repeat(23).dimmed());
    }

    let report = sim.run(|outcome, field| -> std::result::Result<(), ExportError> {
        if sim_config.report_interval > 0 && outcome.step % sim_config.report_interval == 0 {
            let years = sim_config.years_at(outcome.step);
            let count = outcome.count.to_string();
            let count = if outcome.delta() > 0 {
                count.green()
            } else {
                count.yellow()
            };
            println!("{:>12} | {:>8}", years, count);
        }

        if write_snapshots && outcome.step % sim_config.snapshot_interval == 0 {
            export::write_snapshot(
                &snapshots,
                &format!("step{:07}", outcome.step),
                &field.craters(),
                &meta(outcome.step),
            )?;
        }
        Ok(())
    })?;

    if write_snapshots {
        let path = export::write_snapshot(
            &snapshots,
            "final",
            &sim.field().craters(),
            &meta(report.steps),
        )?;
        info!("🗺️  Wrote final snapshot to {}", path.display());
    }

    Ok((report, sim.into_field()))
}

/// 初始化日志系统
fn init_logging(config: &crater::config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    match (config.output.as_str(), &config.log_file) {
        ("file", Some(log_file)) => {
            // 确保日志目录存在
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| format!("Failed to open log file '{}': {}", log_file.display(), e))?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
    }
    Ok(())
}
