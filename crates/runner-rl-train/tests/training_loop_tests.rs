//! End-to-end scenarios for the training loop

use runner_rl_core::{Action, RunnerConfig};
use runner_rl_train::{
    FixedPolicy, MemoryStore, Policy, PolicyStore, QTablePolicy, RandomPolicy, TrainingLoop,
};

#[test]
fn never_jump_terminates_before_tick_200() {
    let mut training =
        TrainingLoop::new(RunnerConfig::default(), Box::new(FixedPolicy::new(Action::Noop)));

    let mut terminated_at = None;
    for _ in 0..1000 {
        let result = training.tick();
        if result.done {
            terminated_at = Some(result.tick);
            break;
        }
    }
    let tick = terminated_at.expect("never-jump policy must collide");
    assert!(tick < 200, "terminated at tick {tick}");
}

#[test]
fn invariants_hold_across_many_episodes() {
    let config = RunnerConfig::default();
    let ground = config.world.ground_level();
    let max_energy = config.physics.max_energy;
    let mut training = TrainingLoop::new(config, Box::new(RandomPolicy::new(11)));

    for _ in 0..5_000 {
        training.tick();
        let agent = &training.controller().state().agent;
        assert!(agent.y <= ground);
        assert!(agent.energy <= max_energy);
        assert_eq!(training.observe().len(), 5);
    }
    assert!(training.episode() > 0);
}

#[test]
fn reward_terms_are_mutually_exclusive() {
    let mut training =
        TrainingLoop::new(RunnerConfig::default(), Box::new(RandomPolicy::new(5)));
    for _ in 0..3_000 {
        let result = training.tick();
        assert_eq!(result.reward_components.len(), 1);
        let (name, value) = result.reward_components.iter().next().unwrap();
        assert_eq!(*value, result.reward);
        if result.done {
            assert_eq!(name, "terminal");
        }
    }
}

#[test]
fn always_jump_pays_waste_penalty() {
    let mut training =
        TrainingLoop::new(RunnerConfig::default(), Box::new(FixedPolicy::new(Action::Jump)));
    let mut wasted = false;
    for _ in 0..500 {
        let result = training.tick();
        if result.reward_components.contains_key("waste") {
            assert_eq!(result.reward, -10.0);
            assert_eq!(training.controller().state().agent.energy, 0);
            wasted = true;
            break;
        }
    }
    assert!(wasted, "spending the last resource must be penalised");
}

#[test]
fn same_seed_same_trajectory() {
    let run = || {
        let mut config = RunnerConfig::default();
        config.seed = 99;
        let policy = QTablePolicy::new(config.training.q_learning.clone(), 99);
        let mut training = TrainingLoop::new(config, Box::new(policy));
        training.run_ticks(2_000);
        (
            training.controller().state_hash().unwrap(),
            training.history().iter().collect::<Vec<_>>(),
        )
    };
    assert_eq!(run(), run());
}

#[tokio::test]
async fn saved_policy_restores_into_fresh_loop() {
    let config = RunnerConfig::default();
    let store = MemoryStore::new();

    let mut trained = TrainingLoop::new(
        config.clone(),
        Box::new(QTablePolicy::new(config.training.q_learning.clone(), 1)),
    );
    trained.run_episodes(5);
    trained.save_policy(&store, "qtable").await.unwrap();
    let saved = trained.policy().serialize().unwrap();

    let mut restored = TrainingLoop::new(
        config.clone(),
        Box::new(QTablePolicy::new(config.training.q_learning.clone(), 2)),
    );
    assert!(restored.load_policy(&store, "qtable").await);

    let saved: serde_json::Value = serde_json::from_slice(&saved).unwrap();
    let loaded: serde_json::Value =
        serde_json::from_slice(&restored.policy().serialize().unwrap()).unwrap();
    assert_eq!(saved["episodes"], 5);
    assert_eq!(loaded["episodes"], saved["episodes"]);

    let saved_table = saved["table"].as_object().unwrap();
    let loaded_table = loaded["table"].as_object().unwrap();
    assert!(!saved_table.is_empty());
    assert_eq!(
        saved_table.keys().collect::<Vec<_>>(),
        loaded_table.keys().collect::<Vec<_>>()
    );
    for (key, values) in saved_table {
        let expected = values.as_array().unwrap();
        let actual = loaded_table[key].as_array().unwrap();
        for (a, b) in expected.iter().zip(actual) {
            assert!((a.as_f64().unwrap() - b.as_f64().unwrap()).abs() < 1e-9);
        }
    }
}

#[tokio::test]
async fn missing_or_corrupt_policy_is_not_fatal() {
    let config = RunnerConfig::default();
    let store = MemoryStore::new();
    let mut training = TrainingLoop::new(
        config.clone(),
        Box::new(QTablePolicy::new(config.training.q_learning.clone(), 1)),
    );
    let untrained = training.policy().serialize().unwrap();

    assert!(!training.load_policy(&store, "absent").await);

    store.store("corrupt", b"\x00\x01garbage").await.unwrap();
    assert!(!training.load_policy(&store, "corrupt").await);
    assert_eq!(training.policy().serialize().unwrap(), untrained);

    // Training continues normally afterwards
    assert_eq!(training.run_episodes(1).len(), 1);
}

#[test]
fn q_learning_improves_on_never_jump() {
    let mut config = RunnerConfig::default();
    config.seed = 3;
    config.training.q_learning.epsilon = 0.3;
    config.training.q_learning.epsilon_decay = 0.97;
    let policy = QTablePolicy::new(config.training.q_learning.clone(), 3);
    let mut training = TrainingLoop::new(config, Box::new(policy));

    training.run_episodes(300);
    assert!(
        training.best_score() >= 1,
        "q-learning never cleared a single obstacle in 300 episodes"
    );
}
