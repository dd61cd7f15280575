//! 负载均衡仿真
//!
//! 读取 key=value 配置，运行一次仿真并打印汇总。

use clap::Parser;
use lbsim_rs::events::{FanOut, LogFileSink, RecordingSink, SimEvent, TracingSink};
use lbsim_rs::sim::{Config, LoadBalancer, SimulationStats};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "lb-sim", about = "Discrete-cycle load balancer / autoscaling simulation")]
struct Args {
    /// Path to the key=value settings file
    #[arg(default_value = "config.txt")]
    config: PathBuf,

    /// Override initial number of servers
    #[arg(long)]
    initial_servers: Option<u32>,

    /// Override number of simulated cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Override RNG seed (0 = non-deterministic)
    #[arg(long)]
    seed: Option<u64>,

    /// Interactively prompt for initial servers and cycle count
    #[arg(long)]
    prompt: bool,

    /// Do not write the event log file
    #[arg(long)]
    no_log_file: bool,

    /// Write every emitted event as a JSON array
    #[arg(long)]
    events_json: Option<PathBuf>,

    /// Write the effective config and final stats as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    config: &'a Config,
    stats: &'a SimulationStats,
}

/// 提示输入一个正整数；空输入保留当前值
fn prompt_for<T>(input: &mut impl BufRead, label: &str, value: &mut T)
where
    T: std::str::FromStr + PartialOrd + Default + std::fmt::Display,
{
    print!("{label} [{value}]: ");
    if let Err(err) = io::stdout().flush() {
        warn!(%err, "刷新标准输出失败");
    }

    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return;
    }
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match line.parse::<T>() {
        Ok(v) if v > T::default() => *value = v,
        _ => println!("Invalid input, keeping {value}"),
    }
}

fn print_summary(stats: &SimulationStats, log_file: Option<&str>) {
    println!();
    for line in SimEvent::summary_lines(stats, log_file) {
        println!("{line}");
    }
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = match Config::load(&args.config) {
        Ok(cfg) => {
            info!(path = %args.config.display(), "配置已加载");
            cfg
        }
        Err(err) => {
            warn!(%err, "使用默认配置");
            Config::default()
        }
    };

    if let Some(n) = args.initial_servers {
        config.initial_servers = n;
    }
    if let Some(n) = args.cycles {
        config.simulation_cycles = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.prompt {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        prompt_for(&mut input, "Enter number of initial servers", &mut config.initial_servers);
        prompt_for(&mut input, "Enter simulation time in clock cycles", &mut config.simulation_cycles);
    }
    config.normalize();

    let mut recording = RecordingSink::new();
    let mut sink = FanOut::new().with(TracingSink);

    let log_path = if args.no_log_file {
        None
    } else {
        match LogFileSink::create(&config.log_file) {
            Ok(file_sink) => {
                sink.push(file_sink);
                Some(config.log_file.clone())
            }
            Err(err) => {
                warn!(path = %config.log_file, %err, "无法创建日志文件，仅输出到控制台");
                None
            }
        }
    };
    if args.events_json.is_some() {
        sink.push(&mut recording);
    }

    let mut balancer = LoadBalancer::from_config(config.clone(), sink);
    if let Some(path) = &log_path {
        balancer = balancer.with_log_path(path.clone());
    }
    let stats = balancer.run();

    print_summary(&stats, log_path.as_deref());

    if let Some(path) = args.events_json {
        let json = serde_json::to_string_pretty(&recording.events).expect("serialize events");
        fs::write(&path, json).expect("write events json");
        eprintln!("wrote events to {}", path.display());
    }

    if let Some(path) = args.summary_json {
        let report = RunReport {
            config: &config,
            stats: &stats,
        };
        let json = serde_json::to_string_pretty(&report).expect("serialize summary");
        fs::write(&path, json).expect("write summary json");
        eprintln!("wrote summary to {}", path.display());
    }
}
