//! Runner-RL training CLI
//!
//! Drives the training loop one tick per frame:
//! - paced by a tokio interval when `--fps` is non-zero, unpaced otherwise
//! - loads the policy from `--store` at start-up and saves it periodically
//!   and on exit
//! - Ctrl-C stops between ticks, never in the middle of one

use anyhow::Result;
use clap::{Parser, ValueEnum};
use runner_rl_core::{Action, GameManifest, RunnerConfig};
use runner_rl_train::{FileStore, FixedPolicy, Policy, QTablePolicy, RandomPolicy, TrainingLoop};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Ticks between cooperative yields when running unpaced
const UNPACED_YIELD_TICKS: u64 = 1024;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// Uniformly random jumps
    Random,
    /// Never jump
    Never,
    /// Jump on every tick
    Always,
    /// Tabular Q-learning
    Qtable,
}

#[derive(Debug, Parser)]
#[command(name = "runner-rl", version, about = "Train a policy on the runner simulation")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many episodes
    #[arg(long)]
    episodes: Option<u64>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Frames per second, 0 runs unpaced (overrides the config file)
    #[arg(long)]
    fps: Option<u32>,

    /// Policy to train
    #[arg(long, value_enum, default_value = "qtable")]
    policy: PolicyKind,

    /// Directory for saved policies
    #[arg(long)]
    store: Option<PathBuf>,

    /// Store key, defaults to the policy name
    #[arg(long)]
    key: Option<String>,

    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
}

fn build_policy(kind: PolicyKind, config: &RunnerConfig) -> Box<dyn Policy> {
    match kind {
        PolicyKind::Random => Box::new(RandomPolicy::new(config.seed)),
        PolicyKind::Never => Box::new(FixedPolicy::new(Action::Noop)),
        PolicyKind::Always => Box::new(FixedPolicy::new(Action::Jump)),
        PolicyKind::Qtable => Box::new(QTablePolicy::new(
            config.training.q_learning.clone(),
            config.seed,
        )),
    }
}

fn load_config(args: &Args) -> Result<RunnerConfig> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_json_file(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(fps) = args.fps {
        config.training.fps = fps;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_config(&args)?;

    let manifest = GameManifest::from_config(&config);
    info!(
        "{} v{}: {} observation features, {} actions, seed {}",
        manifest.name,
        manifest.version,
        manifest.observation_size,
        manifest.action_space.size(),
        manifest.seed
    );
    debug!("manifest: {}", serde_json::to_string(&manifest)?);

    let fps = config.training.fps;
    let save_every = config.training.save_every_episodes;
    let policy = build_policy(args.policy, &config);
    let key = args.key.clone().unwrap_or_else(|| policy.name().to_string());
    let mut training = TrainingLoop::new(config, policy);

    let store = args.store.clone().map(FileStore::new);
    if let Some(store) = &store {
        info!("policy store: {:?}, key {}", store.dir(), key);
        training.load_policy(store, &key).await;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current tick");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut interval = (fps > 0).then(|| {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    let start_episode = training.episode();
    let mut ticks_run: u64 = 0;
    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        if args.ticks.is_some_and(|limit| ticks_run >= limit) {
            break;
        }
        if args
            .episodes
            .is_some_and(|limit| training.episode() - start_episode >= limit)
        {
            break;
        }

        match interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None if ticks_run % UNPACED_YIELD_TICKS == 0 => tokio::task::yield_now().await,
            None => {}
        }

        let result = training.tick();
        ticks_run += 1;

        if result.done && save_every > 0 && training.episode() % save_every == 0 {
            if let Some(store) = &store {
                if let Err(e) = training.save_policy(store, &key).await {
                    warn!("periodic save failed: {}", e);
                }
            }
        }
    }

    if let Some(store) = &store {
        training.save_policy(store, &key).await?;
    }

    let history = training.history();
    info!(
        "done: {} ticks, {} episodes, best score {}, mean reward over last {} episodes {:.4}",
        ticks_run,
        training.episode() - start_episode,
        training.best_score(),
        history.len(),
        history.mean().unwrap_or(0.0)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "runner-rl",
            "--policy",
            "never",
            "--episodes",
            "3",
            "--seed",
            "9",
        ])
        .unwrap();
        assert!(matches!(args.policy, PolicyKind::Never));
        assert_eq!(args.episodes, Some(3));

        let config = load_config(&args).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(build_policy(args.policy, &config).name(), "fixed");
    }

    #[test]
    fn test_default_policy_is_qtable() {
        let args = Args::try_parse_from(["runner-rl"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(build_policy(args.policy, &config).name(), "qtable");
    }
}
