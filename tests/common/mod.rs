// Shared helpers for integration tests.
//
// Provides an isolated home directory plus recording stand-ins for the
// executor, downloader and prompter, so the install and uninstall sequences
// run end to end without touching the network or the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use soundness_installer::config::Settings;
use soundness_installer::environment::Environment;
use soundness_installer::error::FetchError;
use soundness_installer::exec::{ExecResult, Executor};
use soundness_installer::logging::{Log, Logger};
use soundness_installer::platform::{Os, Platform};
use soundness_installer::prompt::{Confirmation, Prompter};
use soundness_installer::resources::download::Fetcher;
use soundness_installer::tasks::Context;

/// Programs the fake system reports as installed.
const INSTALLED: [&str; 5] = ["cc", "make", "pkg-config", "git", "cargo"];

/// An isolated home directory backed by a [`tempfile::TempDir`].
pub struct TestHome {
    pub dir: tempfile::TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp home"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Environment for a user of `shell` with an empty `PATH`.
    pub fn env(&self, shell: &str) -> Environment {
        let home = self.path().display().to_string();
        let shell = shell.to_string();
        Environment::from_lookup(|key| match key {
            "HOME" => Some(home.clone()),
            "SHELL" => Some(shell.clone()),
            _ => None,
        })
        .expect("HOME is set")
    }

    /// Write `content` to `rel` under home, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("create parent");
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).expect("read file")
    }
}

/// Executor that pretends to be the helper and the CLI.
///
/// `<helper> install` drops an executable CLI into `~/.cargo/bin`, and
/// `<cli> generate-key --name <n>` writes a numbered key pair into the
/// first key directory.
#[derive(Debug)]
pub struct FakeSystem {
    home: PathBuf,
    generated: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeSystem {
    pub fn new(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            generated: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.calls.lock().expect("calls lock").push(line.join(" "));
    }

    fn install_cli(&self) {
        let cli = self.home.join(".cargo/bin/soundness-cli");
        std::fs::create_dir_all(cli.parent().expect("has parent")).expect("create cargo bin");
        std::fs::write(&cli, "#!/bin/sh\n").expect("write cli");
        std::fs::set_permissions(&cli, std::fs::Permissions::from_mode(0o755)).expect("chmod cli");
    }

    fn generate_key(&self, name: &str) {
        let n = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        let dir = self.home.join(".soundness/keys");
        std::fs::create_dir_all(&dir).expect("create key dir");
        std::fs::write(dir.join(format!("{name}.pub")), format!("pub-{n}")).expect("write pub");
        std::fs::write(dir.join(format!("{name}.key")), format!("key-{n}")).expect("write key");
    }
}

fn ok() -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: String::new(),
        success: true,
        code: Some(0),
    }
}

impl Executor for FakeSystem {
    fn run_unchecked(
        &self,
        program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        self.record(program, args);
        if program.ends_with("soundnessup") && args == ["install"] {
            self.install_cli();
        }
        Ok(ok())
    }

    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        _stdin: &str,
        _env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        self.record(program, args);
        Ok(ok())
    }

    fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> anyhow::Result<i32> {
        self.record(program, args);
        if let ["generate-key", "--name", name] = args {
            self.generate_key(name);
        }
        Ok(0)
    }

    fn which_in(&self, program: &str, _path: &str) -> Option<PathBuf> {
        INSTALLED
            .contains(&program)
            .then(|| Path::new("/usr/bin").join(program))
    }
}

/// Fetcher serving the same body for every URL.
#[derive(Debug)]
pub struct StaticFetcher(pub &'static str);

impl Fetcher for StaticFetcher {
    fn fetch_text(&self, _url: &str) -> Result<String, FetchError> {
        Ok(self.0.to_string())
    }

    fn fetch_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
        out.write_all(self.0.as_bytes())
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(u64::try_from(self.0.len()).unwrap_or(u64::MAX))
    }
}

/// Prompter that always gives the same answer.
#[derive(Debug)]
pub struct FixedAnswer(pub Confirmation);

impl Prompter for FixedAnswer {
    fn confirm(&self, _question: &str, _timeout: Duration) -> Confirmation {
        self.0
    }
}

/// Settings that keep every search inside the temp home.
pub fn hermetic_settings() -> Settings {
    let mut settings = Settings::default();
    settings.search.roots = Some(Vec::new());
    settings.uninstall.grace_period_secs = 0;
    settings
}

/// Build a context around `system` for `env`, with a non-root Linux
/// platform, a fresh in-memory logger and an empty process table.
pub fn context(env: &Environment, system: Arc<FakeSystem>) -> (Context, Arc<Logger>) {
    let log = Arc::new(Logger::with_log_file(None));
    let ctx = Context::new(
        hermetic_settings(),
        env,
        Arc::new(Platform::new(Os::Linux, false, None)),
        Arc::clone(&log) as Arc<dyn Log>,
        system,
        Arc::new(StaticFetcher("#!/bin/sh\n")),
        Arc::new(FixedAnswer(Confirmation::No)),
    )
    .with_proc_root(env.home.join("proc"));
    (ctx, log)
}
