//! End-to-end supervision scenarios against a scripted load balancer.

use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use reload_wrapper::SupervisorEvent;

mod common;

use common::{modified, wait_for_instances, wait_for_launches, wait_for_validations, FakeProxy, TIMEOUT};

async fn exit_code(run: tokio::task::JoinHandle<i32>) -> i32 {
    tokio::time::timeout(TIMEOUT, run)
        .await
        .expect("supervisor did not exit")
        .expect("supervisor task panicked")
}

#[tokio::test]
async fn test_first_validation_failure_exits_one() {
    let proxy = FakeProxy::new();
    proxy.set_invalid(true);
    let supervisor = proxy.supervisor();
    let registry = supervisor.registry();

    let code = tokio::time::timeout(TIMEOUT, supervisor.run()).await.unwrap();

    assert_eq!(code, 1);
    assert_eq!(proxy.validations(), 1);
    assert!(proxy.launches().is_empty());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_reload_hands_over_and_predecessor_retires() {
    let proxy = FakeProxy::new();
    let supervisor = proxy.supervisor();
    let registry = supervisor.registry();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    let first = wait_for_launches(&proxy, 1).await[0].clone();
    assert_eq!(first.args, vec!["-f".to_string(), proxy.config_file().display().to_string()]);
    assert_eq!(wait_for_instances(&registry, 1).await, vec![first.pid]);

    events.send(modified(&proxy.config_file())).unwrap();

    // Both serve until the successor soft-stops its predecessor.
    let both = wait_for_instances(&registry, 2).await;
    assert!(both.contains(&first.pid));
    let second = wait_for_launches(&proxy, 2).await[1].clone();
    assert_eq!(
        second.args[2..],
        ["-x".to_string(), proxy.socket_path(), "-sf".to_string(), first.pid.to_string()]
    );

    assert_eq!(wait_for_instances(&registry, 1).await, vec![second.pid]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!run.is_finished());

    events.send(SupervisorEvent::Signal(Signal::SIGTERM)).unwrap();
    assert_eq!(exit_code(run).await, 0);
}

#[tokio::test]
async fn test_interrupt_is_forwarded_and_clean_exit_propagates() {
    let proxy = FakeProxy::new();
    let supervisor = proxy.supervisor();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    wait_for_launches(&proxy, 1).await;
    events.send(SupervisorEvent::Signal(Signal::SIGINT)).unwrap();

    assert_eq!(exit_code(run).await, 0);
}

#[tokio::test]
async fn test_abnormal_exit_after_interrupt_propagates_code() {
    let proxy = FakeProxy::new();
    proxy.set_exit_code(137);
    let supervisor = proxy.supervisor();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    wait_for_launches(&proxy, 1).await;
    events.send(SupervisorEvent::Signal(Signal::SIGINT)).unwrap();

    assert_eq!(exit_code(run).await, 137);
}

#[tokio::test]
async fn test_third_instance_takes_over_from_both_live_instances() {
    let proxy = FakeProxy::new();
    proxy.disable_handoff();
    let supervisor = proxy.supervisor();
    let registry = supervisor.registry();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    wait_for_launches(&proxy, 1).await;
    events.send(modified(&proxy.config_file())).unwrap();
    wait_for_launches(&proxy, 2).await;
    let live = wait_for_instances(&registry, 2).await;

    events.send(modified(&proxy.config_file())).unwrap();
    let third = wait_for_launches(&proxy, 3).await[2].clone();

    let mut expected = vec!["-x".to_string(), proxy.socket_path(), "-sf".to_string()];
    expected.extend(live.iter().map(u32::to_string));
    assert_eq!(third.args[2..], expected[..]);
    wait_for_instances(&registry, 3).await;

    events.send(SupervisorEvent::Signal(Signal::SIGTERM)).unwrap();
    assert_eq!(exit_code(run).await, 0);
}

#[tokio::test]
async fn test_failed_validation_keeps_running_instances() {
    let proxy = FakeProxy::new();
    let supervisor = proxy.supervisor();
    let registry = supervisor.registry();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    wait_for_launches(&proxy, 1).await;
    let before = wait_for_instances(&registry, 1).await;

    proxy.set_invalid(true);
    events.send(modified(&proxy.config_file())).unwrap();
    wait_for_validations(&proxy, 2).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(registry.pids().await, before);
    assert_eq!(proxy.launches().len(), 1);
    assert!(!run.is_finished());

    // A fixed configuration reloads again.
    proxy.set_invalid(false);
    events.send(modified(&proxy.config_file())).unwrap();
    wait_for_launches(&proxy, 2).await;

    events.send(SupervisorEvent::Signal(Signal::SIGTERM)).unwrap();
    assert_eq!(exit_code(run).await, 0);
}

#[tokio::test]
async fn test_no_reload_after_termination_signal() {
    let proxy = FakeProxy::new();
    proxy.ignore_termination();
    let supervisor = proxy.supervisor();
    let registry = supervisor.registry();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    wait_for_launches(&proxy, 1).await;
    events.send(SupervisorEvent::Signal(Signal::SIGTERM)).unwrap();
    events.send(modified(&proxy.config_file())).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(proxy.validations(), 1);
    assert_eq!(proxy.launches().len(), 1);
    assert_eq!(registry.len().await, 1);

    events.send(SupervisorEvent::Signal(Signal::SIGUSR1)).unwrap();
    assert_eq!(exit_code(run).await, 0);
}

#[tokio::test]
async fn test_unexpected_crash_of_last_instance_propagates_code() {
    let proxy = FakeProxy::new();
    let supervisor = proxy.supervisor();
    let run = tokio::spawn(supervisor.run());

    let first = wait_for_launches(&proxy, 1).await[0].clone();
    kill(Pid::from_raw(first.pid as i32), Signal::SIGKILL).unwrap();

    assert_eq!(exit_code(run).await, 137);
}

#[tokio::test]
async fn test_config_write_on_disk_triggers_reload() {
    let proxy = FakeProxy::new();
    let mut supervisor = proxy.supervisor();
    supervisor.watch(&[proxy.config_file()]).unwrap();
    let events = supervisor.sender();
    let run = tokio::spawn(supervisor.run());

    let first = wait_for_launches(&proxy, 1).await[0].clone();
    std::fs::write(proxy.config_file(), "global\n    maxconn 100\n").unwrap();

    let second = wait_for_launches(&proxy, 2).await[1].clone();
    assert!(second.args.contains(&first.pid.to_string()));

    events.send(SupervisorEvent::Signal(Signal::SIGTERM)).unwrap();
    assert_eq!(exit_code(run).await, 0);
}
