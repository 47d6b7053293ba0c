//! Shared utilities for supervisor integration tests.
//!
//! `FakeProxy` is a shell script standing in for the load balancer. It
//! honours the check flag, logs its argv, soft-stops the PIDs named after
//! `-sf` the way a real successor does, and exits on SIGINT/SIGTERM with a
//! configurable code.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::event::{DataChange, ModifyKind};
use notify::{Event, EventKind};
use reload_wrapper::config::WrapperConfig;
use reload_wrapper::process::Registry;
use reload_wrapper::{Supervisor, SupervisorEvent};
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(10);
const POLL: Duration = Duration::from_millis(10);

const SCRIPT: &str = r#"
trap 'exit $(cat "$DIR/exit_code" 2>/dev/null || echo 0)' INT TERM
trap 'exit 0' USR1
if [ -f "$DIR/ignore_signals" ]; then trap '' INT TERM; fi
for arg in "$@"; do
  if [ "$arg" = "-c" ]; then
    echo "validate $*" >> "$DIR/argv.log"
    if [ -f "$DIR/invalid" ]; then exit 1; fi
    exit 0
  fi
done
echo "run $$ $*" >> "$DIR/argv.log"
if [ ! -f "$DIR/no_handoff" ]; then
  drain=0
  for arg in "$@"; do
    if [ "$drain" = 1 ]; then
      (sleep 0.3; kill -USR1 "$arg" 2>/dev/null) &
    fi
    if [ "$arg" = "-sf" ]; then drain=1; fi
  done
fi
while true; do sleep 0.05; done
"#;

/// One started (non-validation) instance as recorded by the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub pid: u32,
    pub args: Vec<String>,
}

pub struct FakeProxy {
    dir: TempDir,
}

#[allow(dead_code)]
impl FakeProxy {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = format!("DIR='{}'\n{}", dir.path().display(), SCRIPT);
        std::fs::write(dir.path().join("fake-haproxy.sh"), script).unwrap();
        std::fs::write(dir.path().join("haproxy.cfg"), "global\n").unwrap();
        Self { dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("haproxy.cfg")
    }

    pub fn socket_path(&self) -> String {
        self.dir.path().join("haproxy.sock").display().to_string()
    }

    /// Settings that run the script through `/bin/sh`; events are injected by the test.
    pub fn config(&self) -> WrapperConfig {
        let mut config = WrapperConfig::default();
        config.args = vec![
            self.dir.path().join("fake-haproxy.sh").display().to_string(),
            "-f".to_string(),
            self.config_file().display().to_string(),
        ];
        config.socket_path = self.socket_path();
        config.watch.enabled = false;
        config
    }

    pub fn supervisor(&self) -> Supervisor {
        Supervisor::new(&self.config(), PathBuf::from("/bin/sh"))
    }

    pub fn set_invalid(&self, invalid: bool) {
        self.set_marker("invalid", invalid);
    }

    pub fn set_exit_code(&self, code: i32) {
        std::fs::write(self.dir.path().join("exit_code"), code.to_string()).unwrap();
    }

    pub fn ignore_termination(&self) {
        self.set_marker("ignore_signals", true);
    }

    pub fn disable_handoff(&self) {
        self.set_marker("no_handoff", true);
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.log_lines()
            .iter()
            .filter_map(|line| line.strip_prefix("run "))
            .map(|rest| {
                let mut words = rest.split_whitespace();
                let pid = words.next().unwrap().parse().unwrap();
                Launch { pid, args: words.map(str::to_string).collect() }
            })
            .collect()
    }

    pub fn validations(&self) -> usize {
        self.log_lines().iter().filter(|l| l.starts_with("validate ")).count()
    }

    fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("argv.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn set_marker(&self, name: &str, present: bool) {
        let path = self.dir.path().join(name);
        if present {
            std::fs::write(path, "").unwrap();
        } else {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// A content change on `path` as the watcher would report it.
#[allow(dead_code)]
pub fn modified(path: &Path) -> SupervisorEvent {
    let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.to_path_buf());
    SupervisorEvent::FileChanged(event)
}

/// Wait until exactly `count` instances are registered; returns their PIDs.
#[allow(dead_code)]
pub async fn wait_for_instances(registry: &Registry, count: usize) -> Vec<u32> {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let pids = registry.pids().await;
        if pids.len() == count {
            return pids;
        }
        assert!(Instant::now() < deadline, "expected {} instances, have {:?}", count, pids);
        tokio::time::sleep(POLL).await;
    }
}

/// Wait until at least `count` instances have started and logged their arguments.
#[allow(dead_code)]
pub async fn wait_for_launches(proxy: &FakeProxy, count: usize) -> Vec<Launch> {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let launches = proxy.launches();
        if launches.len() >= count {
            return launches;
        }
        assert!(Instant::now() < deadline, "expected {} launches, have {:?}", count, launches);
        tokio::time::sleep(POLL).await;
    }
}

/// Wait until at least `count` check-mode runs were made.
#[allow(dead_code)]
pub async fn wait_for_validations(proxy: &FakeProxy, count: usize) {
    let deadline = Instant::now() + TIMEOUT;
    while proxy.validations() < count {
        assert!(Instant::now() < deadline, "expected {} validations", count);
        tokio::time::sleep(POLL).await;
    }
}
