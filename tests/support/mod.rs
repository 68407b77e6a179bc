// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted fake process runner and a temporary server installation.

use async_trait::async_trait;
use catapult::config::LingeringPolicy;
use catapult::deploy::DeploymentPlan;
use catapult::host::{
    EntryInfo, FileSystem, HostFileSystem, ProcessError, ProcessRunner, ScriptInvocation,
    ScriptOutput, Signal,
};
use catapult::poll::PollPolicy;
use catapult::types::{ArtifactName, DeploymentArtifact, ProcessMatcher, ServerInstallation};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("catapult=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Pid the fake server gets when it starts.
#[allow(dead_code)]
pub const STARTED_PID: u32 = 4242;

/// What the stop script does to the running server.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopScript {
    /// Every process exits.
    Works,
    /// The script exits non-zero and the server keeps running.
    Ignored,
}

/// What SIGKILL does.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kill {
    Works,
    /// The process survives (e.g. stuck in uninterruptible I/O).
    Ignored,
}

/// What the start script does.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// A server process appears.
    Runs,
    /// The script runs but the server exits straight away.
    Dies,
    /// A server process appears, answers this many scans, then crashes.
    Crashes(usize),
    /// The script cannot be executed at all.
    SpawnFails,
}

/// Every call the fake saw, in order.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RunScript(PathBuf),
    Launch(PathBuf),
    Scan,
    Signal(u32, Signal),
}

#[allow(dead_code)]
#[derive(Debug)]
struct FakeState {
    pids: Vec<u32>,
    calls: Vec<Call>,
    stop_script: StopScript,
    kill: Kill,
    launch: Launch,
    explode_on_launch: Option<PathBuf>,
    scan_fails: bool,
    scans_until_crash: Option<usize>,
    last_env: Option<HashMap<String, String>>,
}

/// A `ProcessRunner` whose process table is a list of pids.
#[allow(dead_code)]
#[derive(Debug)]
pub struct FakeRunner {
    state: Mutex<FakeState>,
}

#[allow(dead_code)]
impl FakeRunner {
    /// A server with the given pids already running.
    pub fn running(pids: &[u32]) -> Self {
        Self {
            state: Mutex::new(FakeState {
                pids: pids.to_vec(),
                calls: Vec::new(),
                stop_script: StopScript::Works,
                kill: Kill::Works,
                launch: Launch::Runs,
                explode_on_launch: None,
                scan_fails: false,
                scans_until_crash: None,
                last_env: None,
            }),
        }
    }

    /// No server process.
    pub fn stopped() -> Self {
        Self::running(&[])
    }

    pub fn stop_script(self, behaviour: StopScript) -> Self {
        self.state.lock().stop_script = behaviour;
        self
    }

    pub fn kill(self, behaviour: Kill) -> Self {
        self.state.lock().kill = behaviour;
        self
    }

    pub fn launch(self, behaviour: Launch) -> Self {
        self.state.lock().launch = behaviour;
        self
    }

    /// Create `dir` when the server starts, as a servlet container extracting a war.
    pub fn explode_on_launch(self, dir: impl Into<PathBuf>) -> Self {
        self.state.lock().explode_on_launch = Some(dir.into());
        self
    }

    pub fn failing_scan(self) -> Self {
        self.state.lock().scan_fails = true;
        self
    }

    /// Make the running server disappear, as if it crashed.
    pub fn crash(&self) {
        self.state.lock().pids.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.state.lock().pids.clone()
    }

    pub fn scan_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Scan))
    }

    pub fn script_runs(&self) -> usize {
        self.count(|c| matches!(c, Call::RunScript(_)))
    }

    pub fn launches(&self) -> usize {
        self.count(|c| matches!(c, Call::Launch(_)))
    }

    pub fn kills(&self) -> Vec<u32> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Signal(pid, Signal::Kill) => Some(*pid),
                _ => None,
            })
            .collect()
    }

    /// Environment of the most recent script invocation.
    pub fn last_env(&self) -> Option<HashMap<String, String>> {
        self.state.lock().last_env.clone()
    }

    /// Calls after the last `Signal`, for checking what happened post-kill.
    pub fn calls_after_kill(&self) -> Vec<Call> {
        let calls = self.calls();
        match calls.iter().rposition(|c| matches!(c, Call::Signal(..))) {
            Some(i) => calls[i + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run_script(
        &self,
        invocation: &ScriptInvocation,
        _timeout: Duration,
    ) -> Result<ScriptOutput, ProcessError> {
        let mut state = self.state.lock();
        state.calls.push(Call::RunScript(invocation.program.clone()));
        state.last_env = Some(invocation.env.clone());
        match state.stop_script {
            StopScript::Works => {
                state.pids.clear();
                Ok(ScriptOutput {
                    exit_code: Some(0),
                    ..Default::default()
                })
            }
            StopScript::Ignored => Ok(ScriptOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "Connection refused".to_string(),
            }),
        }
    }

    async fn launch(&self, invocation: &ScriptInvocation) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Launch(invocation.program.clone()));
        state.last_env = Some(invocation.env.clone());
        match state.launch {
            Launch::Runs => {
                state.pids = vec![STARTED_PID];
                if let Some(ref dir) = state.explode_on_launch {
                    fs::create_dir_all(dir).unwrap();
                }
                Ok(())
            }
            Launch::Crashes(scans) => {
                state.pids = vec![STARTED_PID];
                state.scans_until_crash = Some(scans);
                Ok(())
            }
            Launch::Dies => Ok(()),
            Launch::SpawnFails => Err(ProcessError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }),
        }
    }

    async fn find_processes(&self, _matcher: &ProcessMatcher) -> Result<Vec<u32>, ProcessError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Scan);
        if state.scan_fails {
            return Err(ProcessError::Scan("pgrep: not found".to_string()));
        }
        match state.scans_until_crash {
            Some(0) => {
                state.pids.clear();
                state.scans_until_crash = None;
            }
            Some(n) => state.scans_until_crash = Some(n - 1),
            None => {}
        }
        Ok(state.pids.clone())
    }

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Signal(pid, signal));
        if signal == Signal::Kill && state.kill == Kill::Works {
            state.pids.retain(|p| *p != pid);
        }
        Ok(())
    }
}

/// A server installation laid out like Tomcat in a temporary directory, plus
/// a built artifact to deploy into it.
#[allow(dead_code)]
pub struct TestInstallation {
    dir: TempDir,
    pub root: PathBuf,
    pub source: PathBuf,
}

#[allow(dead_code)]
impl TestInstallation {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tomcat");
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::create_dir_all(root.join("webapps")).unwrap();
        fs::create_dir_all(root.join("logs")).unwrap();
        write_script(&root.join("bin/startup.sh"), 0o755);
        write_script(&root.join("bin/shutdown.sh"), 0o755);

        let build = dir.path().join("build");
        fs::create_dir_all(&build).unwrap();
        let source = build.join("shop.war");
        fs::write(&source, b"PK\x03\x04 new build").unwrap();

        Self { dir, root, source }
    }

    pub fn temp_path(&self) -> &Path {
        self.dir.path()
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.root.join("webapps")
    }

    pub fn deployed_war(&self) -> PathBuf {
        self.deploy_dir().join("shop.war")
    }

    pub fn exploded_dir(&self) -> PathBuf {
        self.deploy_dir().join("shop")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("logs/catalina.out")
    }

    /// Simulate an earlier deployment of the artifact.
    pub fn with_previous_deployment(self) -> Self {
        fs::write(self.deployed_war(), b"old build").unwrap();
        fs::create_dir_all(self.exploded_dir().join("WEB-INF")).unwrap();
        fs::write(self.exploded_dir().join("WEB-INF/web.xml"), b"<web-app/>").unwrap();
        self
    }

    pub fn installation(&self) -> ServerInstallation {
        ServerInstallation {
            root: self.root.clone(),
            start_script: self.root.join("bin/startup.sh"),
            stop_script: self.root.join("bin/shutdown.sh"),
            deploy_dir: self.deploy_dir(),
            log_file: self.log_file(),
            matcher: ProcessMatcher::new(&format!("catalina.base={}", self.root.display()))
                .unwrap(),
            env: HashMap::from([("CATALINA_OPTS".to_string(), "-Xmx512m".to_string())]),
        }
    }

    pub fn artifact(&self) -> DeploymentArtifact {
        DeploymentArtifact {
            name: ArtifactName::new("shop").unwrap(),
            version: Some("2.3.0".to_string()),
            source: self.source.clone(),
            extension: "war".to_string(),
        }
    }

    /// A plan with millisecond waits so scenarios run quickly.
    pub fn plan(&self) -> DeploymentPlan {
        DeploymentPlan {
            installation: self.installation(),
            artifact: self.artifact(),
            stop: fast_policy(3),
            kill_wait: Duration::from_millis(5),
            on_lingering: LingeringPolicy::Fail,
            start: fast_policy(3),
            verify: fast_policy(2),
            log_tail_lines: 5,
        }
    }
}

/// Millisecond-scale poll policy.
#[allow(dead_code)]
pub fn fast_policy(attempts: u32) -> PollPolicy {
    PollPolicy::new(Duration::from_millis(5), Duration::from_millis(2), attempts)
}

#[allow(dead_code)]
pub fn write_script(path: &Path, mode: u32) {
    fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
    write_script_mode(path, mode);
}

#[allow(dead_code)]
pub fn write_script_mode(path: &Path, mode: u32) {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

/// The host filesystem with injectable faults.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FaultyFs {
    /// `metadata` on this path fails with permission denied.
    pub unreadable: Option<PathBuf>,
    /// `set_executable` reports success without changing anything.
    pub ignores_chmod: bool,
}

#[async_trait]
impl FileSystem for FaultyFs {
    async fn metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>> {
        if self.unreadable.as_deref() == Some(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        HostFileSystem.metadata(path).await
    }
    async fn symlink_metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>> {
        HostFileSystem.symlink_metadata(path).await
    }
    async fn set_executable(&self, path: &Path) -> io::Result<()> {
        if self.ignores_chmod {
            return Ok(());
        }
        HostFileSystem.set_executable(path).await
    }
    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        HostFileSystem.remove_file(path).await
    }
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        HostFileSystem.remove_dir_all(path).await
    }
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        HostFileSystem.copy(from, to).await
    }
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        HostFileSystem.rename(from, to).await
    }
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        HostFileSystem.list_dir(path).await
    }
    async fn read_tail(&self, path: &Path, lines: usize) -> io::Result<Vec<String>> {
        HostFileSystem.read_tail(path, lines).await
    }
}
