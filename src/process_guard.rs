//! Process lifecycle management for spawned shell commands
//!
//! Package managers and installer scripts must not outlive servboot. If the
//! operator interrupts a session halfway through `apt install`, the child
//! would otherwise keep running with the dpkg lock held.
//!
//! - Every command leads its own process group, so signalling the group
//!   reaches the whole `sh -c` pipeline
//! - Every command gets PDEATHSIG so it dies if servboot is killed
//! - When servboot owns the terminal, the command's group is made the
//!   foreground group for its lifetime, so certbot and debconf can prompt
//! - Running children are tracked in a global registry
//! - SIGINT, SIGTERM and SIGHUP terminate the tracked groups, then exit

use nix::libc;
use nix::sys::signal::{self, SigHandler, SigSet, SigmaskHow, Signal};
use nix::unistd::{self, Pid};
use std::collections::HashSet;
use std::io::IsTerminal;
use std::os::fd::BorrowedFd;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Registry tracking running child processes
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    cleanup_initiated: bool,
}

impl ChildRegistry {
    /// Get or create the global child registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!(pid, "registered child process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        debug!(pid, "unregistered child process");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// Send SIGTERM to every tracked process group, wait up to
    /// `grace_period` for the leaders, then SIGKILL the groups
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.cleanup_initiated {
            return;
        }
        self.cleanup_initiated = true;

        if self.pids.is_empty() {
            return;
        }

        info!("Terminating {} running command(s)...", self.pids.len());

        let pids: Vec<u32> = self.pids.iter().copied().collect();
        for &pid in &pids {
            if let Err(e) = send_signal_to_group(pid, Signal::SIGTERM) {
                warn!("Failed to send SIGTERM to process group {}: {}", pid, e);
                if let Err(e) = send_signal(pid, Signal::SIGTERM) {
                    warn!("Failed to send SIGTERM to PID {}: {}", pid, e);
                }
            }
        }

        let start = Instant::now();
        while start.elapsed() < grace_period {
            if pids.iter().all(|&pid| !is_process_alive(pid)) {
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        // Pipeline members can outlive the leader; the group kill reaches them
        for &pid in &pids {
            if is_process_alive(pid) {
                warn!("PID {} did not terminate, sending SIGKILL", pid);
            }
            match send_signal_to_group(pid, Signal::SIGKILL) {
                Ok(()) | Err(nix::Error::ESRCH) => {}
                Err(e) => {
                    warn!("Failed to send SIGKILL to process group {}: {}", pid, e);
                    let _ = send_signal(pid, Signal::SIGKILL);
                }
            }
        }

        self.pids.clear();
    }
}

fn send_signal(pid: u32, signal: Signal) -> Result<(), nix::Error> {
    signal::kill(Pid::from_raw(pid as i32), signal)
}

fn send_signal_to_group(pgid: u32, signal: Signal) -> Result<(), nix::Error> {
    signal::kill(Pid::from_raw(-(pgid as i32)), signal)
}

fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // Field 3 of /proc/<pid>/stat is the state; zombies count as dead
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        let fields: Vec<&str> = stat.split_whitespace().collect();
        if fields.len() > 2 {
            return !matches!(fields[2], "Z" | "X");
        }
    }

    true
}

/// Install handlers for SIGINT, SIGTERM and SIGHUP. Call once at startup.
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received signal {}, stopping running commands", sig);

            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.terminate_all(Duration::from_secs(3));
            }

            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Whether servboot's process group is the foreground group of the
/// terminal on stdin
pub fn owns_terminal() -> bool {
    let stdin = std::io::stdin();
    stdin.is_terminal() && unistd::tcgetpgrp(&stdin) == Ok(unistd::getpgrp())
}

/// Make servboot's process group the terminal's foreground group again
/// after a command that took it over has finished.
///
/// servboot is a background process at this point, so SIGTTOU is blocked
/// for the call.
pub fn reclaim_terminal() -> Result<(), nix::Error> {
    let mut ttou = SigSet::empty();
    ttou.add(Signal::SIGTTOU);
    let mut previous = SigSet::empty();
    signal::pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&ttou), Some(&mut previous))?;
    let result = unistd::tcsetpgrp(std::io::stdin(), unistd::getpgrp());
    signal::pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&previous), None)?;
    result
}

/// Extension trait for std::process::Command tying a child to our lifetime
pub trait CommandLifecycle {
    /// Run the child as leader of a new process group (PGID = child PID)
    /// and deliver SIGTERM to it when servboot exits
    fn in_new_process_group(&mut self) -> &mut Self;

    /// Like [`CommandLifecycle::in_new_process_group`], and make the new
    /// group the foreground group of the terminal on stdin before exec
    fn in_foreground_process_group(&mut self) -> &mut Self;
}

impl CommandLifecycle for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        lead_process_group(self, false)
    }

    fn in_foreground_process_group(&mut self) -> &mut Self {
        lead_process_group(self, true)
    }
}

fn lead_process_group(
    command: &mut std::process::Command,
    take_terminal: bool,
) -> &mut std::process::Command {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
    // SAFETY: signal, tcsetpgrp and prctl are async-signal-safe and touch no
    // shared state between fork and exec.
    unsafe {
        command.pre_exec(move || {
            if take_terminal {
                // A background group member calling tcsetpgrp gets SIGTTOU
                let previous = signal::signal(Signal::SIGTTOU, SigHandler::SigIgn)?;
                let tty = BorrowedFd::borrow_raw(libc::STDIN_FILENO);
                let handed = unistd::tcsetpgrp(tty, unistd::getpid());
                signal::signal(Signal::SIGTTOU, previous)?;
                handed?;
            }
            if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_registry_register_unregister() {
        let mut registry = ChildRegistry::default();

        registry.register(1234);
        registry.register(5678);
        assert_eq!(registry.count(), 2);

        registry.unregister(1234);
        assert_eq!(registry.count(), 1);

        registry.unregister(5678);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_terminate_all_on_empty_registry() {
        let mut registry = ChildRegistry::default();
        registry.terminate_all(Duration::from_millis(10));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_terminate_all_kills_registered_child() {
        let child = Command::new("sleep")
            .arg("30")
            .in_new_process_group()
            .spawn()
            .expect("spawn sleep");
        let pid = child.id();

        let mut registry = ChildRegistry::default();
        registry.register(pid);
        registry.terminate_all(Duration::from_secs(2));

        let mut child = child;
        let status = child.wait().expect("wait sleep");
        assert!(!status.success());
        assert_eq!(registry.count(), 0);
    }

    /// PIDs of live, non-zombie processes whose process group is `pgid`
    fn live_group_members(pgid: u32) -> Vec<u32> {
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<u32>().ok())
            .filter(|pid| {
                let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) else {
                    return false;
                };
                // Fields after the parenthesised comm: state ppid pgrp ...
                let Some((_, rest)) = stat.rsplit_once(')') else {
                    return false;
                };
                let fields: Vec<&str> = rest.split_whitespace().collect();
                fields.len() > 2
                    && !matches!(fields[0], "Z" | "X")
                    && fields[2].parse::<u32>() == Ok(pgid)
            })
            .collect()
    }

    #[test]
    fn test_child_leads_its_own_process_group() {
        let mut child = Command::new("sleep")
            .arg("30")
            .in_new_process_group()
            .spawn()
            .expect("spawn sleep");
        let pid = child.id();

        let pgid = unistd::getpgid(Some(Pid::from_raw(pid as i32))).expect("getpgid");
        assert_eq!(pgid.as_raw() as u32, pid);
        assert_ne!(pgid, unistd::getpgrp());

        let mut registry = ChildRegistry::default();
        registry.register(pid);
        registry.terminate_all(Duration::from_secs(2));
        child.wait().expect("wait sleep");
    }

    #[test]
    fn test_terminate_all_reaches_shell_pipeline() {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("sleep 30 | cat")
            .in_new_process_group()
            .spawn()
            .expect("spawn pipeline");
        let pid = child.id();

        let deadline = Instant::now() + Duration::from_secs(2);
        while live_group_members(pid).len() < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(live_group_members(pid).len() >= 2, "pipeline never started");

        let mut registry = ChildRegistry::default();
        registry.register(pid);
        registry.terminate_all(Duration::from_secs(2));
        child.wait().expect("wait pipeline");

        let deadline = Instant::now() + Duration::from_secs(2);
        while !live_group_members(pid).is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(live_group_members(pid).is_empty());
    }
}
