// tests/runtime_fake_launcher.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use delaystart::config::{parse_tasks, TaskConfig};
use delaystart::engine::{launch, PrepareContext, RunOptions, RunSummary};
use delaystart::exec::{ProcessLauncher, TaskOutcome};
use delaystart::fs::mock::MockFileSystem;
use delaystart::types::RunMode;
use delaystart_test_utils::builders::TaskConfigBuilder;
use delaystart_test_utils::fake_launcher::FakeLauncher;
use delaystart_test_utils::{init_tracing, with_timeout};

fn ctx() -> PrepareContext {
    PrepareContext::new("/cfg/DelayStart/lsrunase.exe").with_environment(Vec::new())
}

fn no_grace() -> RunOptions {
    RunOptions {
        grace_period: Duration::ZERO,
    }
}

fn fixture() -> (MockFileSystem, FakeLauncher) {
    let fs = MockFileSystem::new();
    fs.add_file("/bin/fast", b"");
    fs.add_file("/bin/slow", b"");
    fs.add_file("/bin/broken", b"");
    let launcher = FakeLauncher::new()
        .with_program("fast", "/bin/fast")
        .with_program("slow", "/bin/slow")
        .with_program("broken", "/bin/broken");
    (fs, launcher)
}

async fn run(tasks: &[TaskConfig], fs: &MockFileSystem, launcher: &FakeLauncher, options: RunOptions) -> RunSummary {
    let shared: Arc<dyn ProcessLauncher> = Arc::new(launcher.clone());
    launch(tasks, &ctx(), shared, fs, options).await
}

#[tokio::test]
async fn credentialed_task_missing_user_is_skipped_and_run_completes() {
    init_tracing();
    let (fs, launcher) = fixture();
    let tasks = parse_tasks(r#"[{"mode":2,"user":"","command":"x","delay":0}]"#).unwrap();

    let summary = with_timeout(run(&tasks, &fs, &launcher, no_grace())).await;

    assert_eq!(summary, RunSummary { launched: 0, skipped: 1 });
    assert!(launcher.command_lines().is_empty());
}

#[tokio::test]
async fn disabled_tasks_are_never_started() {
    init_tracing();
    let (fs, launcher) = fixture();
    let tasks = vec![
        TaskConfigBuilder::direct("fast").mode(RunMode::None).build(),
        TaskConfigBuilder::direct("fast").argv("on").build(),
    ];

    let summary = with_timeout(run(&tasks, &fs, &launcher, no_grace())).await;

    assert_eq!(summary, RunSummary { launched: 1, skipped: 1 });
    assert_eq!(launcher.command_lines(), vec!["/bin/fast on".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn start_order_follows_delays_and_delays_overlap() {
    init_tracing();
    let (fs, launcher) = fixture();
    let tasks = vec![
        TaskConfigBuilder::direct("slow").argv("three").delay(3).build(),
        TaskConfigBuilder::direct("fast").argv("one").delay(1).build(),
    ];

    let began = Instant::now();
    run(&tasks, &fs, &launcher, no_grace()).await;
    let elapsed = began.elapsed();

    let records = launcher.take_records();
    let lines: Vec<_> = records.iter().map(|r| r.invocation.command_line.as_str()).collect();
    assert_eq!(lines, vec!["/bin/fast one", "/bin/slow three"]);

    let first = records[0].started_at - began;
    let second = records[1].started_at - began;
    assert!(first >= Duration::from_secs(1) && first < Duration::from_secs(2));
    assert!(second >= Duration::from_secs(3) && second < Duration::from_secs(4));

    // Bounded by the longest delay, not the sum of delays.
    assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn join_waits_for_waited_tasks_then_grace_period() {
    init_tracing();
    let (fs, launcher) = fixture();
    let launcher = launcher.with_run_time("/bin/slow", Duration::from_secs(10));
    let tasks = vec![
        TaskConfigBuilder::direct("slow").delay(1).wait(true).build(),
        TaskConfigBuilder::direct("fast").delay(2).build(),
    ];

    let began = Instant::now();
    run(
        &tasks,
        &fs,
        &launcher,
        RunOptions {
            grace_period: Duration::from_secs(5),
        },
    )
    .await;
    let elapsed = began.elapsed();

    // delay 1 + run 10 + grace 5
    assert!(elapsed >= Duration::from_secs(16), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(17), "elapsed {elapsed:?}");
    assert_eq!(launcher.finished(), vec!["/bin/slow ".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn unwaited_tasks_do_not_hold_the_join() {
    init_tracing();
    let (fs, launcher) = fixture();
    let launcher = launcher.with_run_time("/bin/slow", Duration::from_secs(60));
    let tasks = vec![TaskConfigBuilder::direct("slow").wait(false).build()];

    let began = Instant::now();
    run(&tasks, &fs, &launcher, no_grace()).await;

    assert!(began.elapsed() < Duration::from_secs(1));
    assert_eq!(launcher.command_lines().len(), 1);
    assert!(launcher.finished().is_empty());
}

#[tokio::test]
async fn start_and_wait_failures_stay_with_their_task() {
    init_tracing();
    let (fs, launcher) = fixture();
    let launcher = launcher
        .failing_start("/bin/broken")
        .with_outcome("/bin/slow", TaskOutcome::Failed(3));
    let tasks = vec![
        TaskConfigBuilder::direct("broken").wait(true).build(),
        TaskConfigBuilder::direct("slow").wait(true).build(),
        TaskConfigBuilder::direct("fast").argv("ok").wait(true).build(),
    ];

    let summary = with_timeout(run(&tasks, &fs, &launcher, no_grace())).await;

    assert_eq!(summary, RunSummary { launched: 3, skipped: 0 });
    let mut finished = launcher.finished();
    finished.sort();
    assert_eq!(finished, vec!["/bin/fast ok".to_string(), "/bin/slow ".to_string()]);
}

#[tokio::test]
async fn preparation_failures_do_not_affect_other_tasks() {
    init_tracing();
    let (fs, launcher) = fixture();
    let tasks = parse_tasks(
        r#"[
            {"mode": 1, "name": "not-installed"},
            {"mode": 9, "name": "fast"},
            {"mode": 2, "user": "admin", "password": "p", "domain": "d", "runpath": "r", "command": "c"},
            {"mode": 1, "name": "fast", "argv": "survivor", "wait": true}
        ]"#,
    )
    .unwrap();

    let summary = with_timeout(run(&tasks, &fs, &launcher, no_grace())).await;

    assert_eq!(summary, RunSummary { launched: 2, skipped: 2 });
    let lines = launcher.command_lines();
    assert!(lines.contains(&"/bin/fast survivor".to_string()));
    assert!(lines.iter().any(|l| l.starts_with("/cfg/DelayStart/lsrunase.exe /user:admin")));
}
