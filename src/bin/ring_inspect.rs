use std::{path::PathBuf, str::FromStr, time::SystemTime};

use bytes::Bytes;
use clap::Parser;
use ringcore::{
    cluster::{instance::Instance, operation::Operation, ring::Ring},
    config::Config,
    telemetry::initialize_subscriber,
};

#[derive(Debug, Parser)]
#[command(name = "ring-inspect")]
#[command(
    about = "evaluates the configured replication strategy against a membership snapshot",
    long_about = None
)]
struct Cli {
    #[arg(long)]
    config_path: PathBuf,
    /// json array of instances
    #[arg(long)]
    snapshot_path: PathBuf,
    /// read, write, delete or reporting
    #[arg(long, default_value = "read", value_parser = Operation::from_str)]
    op: Operation,
    /// candidate addresses in preference order. Defaults to every instance in the snapshot
    #[arg(long, value_delimiter = ',')]
    candidates: Vec<String>,
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    initialize_subscriber(args.json_logs);

    let config = Config::from_path(&args.config_path)?;
    let ring = Ring::new(config.ring_config()?)?;

    let snapshot = std::fs::read_to_string(&args.snapshot_path)?;
    let instances: Vec<Instance> = serde_json::from_str(&snapshot)?;
    for instance in instances {
        ring.add_instance(instance)?;
    }

    let now = SystemTime::now();
    let candidates: Vec<Bytes> = if args.candidates.is_empty() {
        ring.get_instances()?
            .iter()
            .map(|i| i.addr().clone())
            .collect()
    } else {
        args.candidates.into_iter().map(Bytes::from).collect()
    };

    println!(
        "instances: {} (healthy for {}: {})",
        ring.instances_count()?,
        args.op,
        ring.healthy_instances_count(args.op, now)?
    );

    match ring.replication_set_for(&candidates, args.op, now) {
        Ok(set) => {
            println!(
                "strategy {}: {} instances, max failures {}",
                ring.strategy().name(),
                set.len(),
                set.max_failures
            );
            for instance in set.instances.iter() {
                println!(
                    "  {} zone={} state={}",
                    instance.addr_string(),
                    instance.zone(),
                    instance.state()
                );
            }
        }
        Err(err) => {
            println!("strategy {}: {}", ring.strategy().name(), err);
        }
    }

    Ok(())
}
