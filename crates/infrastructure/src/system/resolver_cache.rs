use hostblock_application::ports::ResolverCache;
use hostblock_domain::DomainError;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// One external program invocation used to flush a resolver cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl FlushCommand {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }

    fn display(&self) -> String {
        let mut text = self.program.to_string();
        for arg in self.args {
            text.push(' ');
            text.push_str(arg);
        }
        text
    }

    fn run(&self) -> Result<(), String> {
        let output = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| format!("{}: {}", self.display(), e))?;

        if output.status.success() {
            debug!(command = %self.display(), "Flush command succeeded");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "{}: exited with {} {}",
                self.display(),
                output.status,
                stderr.trim()
            ))
        }
    }
}

/// How the commands of a platform combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPlan {
    /// Run every command; fail if any of them fails.
    All(&'static [FlushCommand]),
    /// Run commands in order until one succeeds.
    FirstSuccess(&'static [FlushCommand]),
}

#[cfg(windows)]
const PLATFORM_PLAN: FlushPlan = FlushPlan::All(&[
    FlushCommand::new("ipconfig", &["/flushdns"]),
    FlushCommand::new("nbtstat", &["-R"]),
    FlushCommand::new("nbtstat", &["-RR"]),
    FlushCommand::new("arp", &["-d", "*"]),
]);

#[cfg(target_os = "macos")]
const PLATFORM_PLAN: FlushPlan = FlushPlan::All(&[
    FlushCommand::new("dscacheutil", &["-flushcache"]),
    FlushCommand::new("killall", &["-HUP", "mDNSResponder"]),
]);

#[cfg(not(any(windows, target_os = "macos")))]
const PLATFORM_PLAN: FlushPlan = FlushPlan::FirstSuccess(&[
    FlushCommand::new("resolvectl", &["flush-caches"]),
    FlushCommand::new("systemd-resolve", &["--flush-caches"]),
]);

/// Flushes the operating system resolver cache by running the platform's commands.
pub struct SystemResolverCache {
    plan: FlushPlan,
}

impl SystemResolverCache {
    pub fn new() -> Self {
        Self::with_plan(PLATFORM_PLAN)
    }

    pub fn with_plan(plan: FlushPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> FlushPlan {
        self.plan
    }
}

impl Default for SystemResolverCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCache for SystemResolverCache {
    fn invalidate(&self) -> Result<(), DomainError> {
        match self.plan {
            FlushPlan::All(commands) => {
                let failures: Vec<String> = commands
                    .iter()
                    .filter_map(|command| command.run().err())
                    .collect();
                if failures.is_empty() {
                    info!("Resolver cache flushed");
                    Ok(())
                } else {
                    Err(DomainError::ResolverCache(failures.join("; ")))
                }
            }
            FlushPlan::FirstSuccess(commands) => {
                let mut failures = Vec::new();
                for command in commands {
                    match command.run() {
                        Ok(()) => {
                            info!(command = command.program, "Resolver cache flushed");
                            return Ok(());
                        }
                        Err(e) => failures.push(e),
                    }
                }
                Err(DomainError::ResolverCache(failures.join("; ")))
            }
        }
    }
}

/// Resolver cache used when flushing is turned off.
pub struct NoopResolverCache;

impl ResolverCache for NoopResolverCache {
    fn invalidate(&self) -> Result<(), DomainError> {
        debug!("Resolver cache flush disabled");
        Ok(())
    }
}
