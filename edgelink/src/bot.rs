//! Bot process lifecycle: start, poll, stop.
//!
//! The transfer bot is an external process living at `{base}/bin/botmain`.
//! Its progress is observed only by polling — there is no callback or
//! signal-based notification — and the per-channel timeouts are enforced
//! by the process itself, not by the controller.
//!
//! # Platform
//!
//! This module is only available on Unix (Linux / macOS).

#![cfg(unix)]

use std::path::PathBuf;
use std::process::{Child, Command};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::Session;

/// Name of the bot executable inside `{base}/bin`.
const BOT_EXECUTABLE: &str = "botmain";

/// Channel enables and timeouts for one transmission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotRun {
    /// Run the low-bandwidth link this cycle.
    pub run_lb: bool,
    /// Low-bandwidth processing timeout in seconds.
    pub lb_timeout_s: u32,
    /// Run the high-bandwidth link this cycle.
    pub run_hb: bool,
    /// High-bandwidth processing timeout in seconds.
    pub hb_timeout_s: u32,
}

/// Lifecycle state of a [`BotController`].
///
/// The machine only moves forward: `Idle → Running → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BotState {
    /// No process has been started yet.
    Idle,
    /// The bot process was started and has not been observed to exit.
    Running,
    /// The bot process exited. A new cycle needs a new controller.
    Terminated,
}

/// Controls one transmission cycle of the bot process.
///
/// One controller, one cycle: once the process has been observed to
/// terminate, the controller is spent.
#[derive(Debug)]
pub struct BotController {
    /// `{base}/bin`, the executable's home and working directory.
    bin_dir: PathBuf,
    /// Single authoritative lifecycle state.
    state: BotState,
    /// Handle to the spawned process while one exists.
    child: Option<Child>,
}

impl BotController {
    /// Creates an idle controller for the session's bot executable.
    pub fn new(session: &Session) -> Self {
        Self {
            bin_dir: session.base_path().join("bin"),
            state: BotState::Idle,
            child: None,
        }
    }

    /// Current lifecycle state, as last observed.
    pub const fn state(&self) -> BotState {
        self.state
    }

    /// Starts the bot process with the given channel parameters.
    ///
    /// The enables and timeouts travel as environment variables
    /// (`RUN_LB_LINK`, `LB_PROC_TIMEOUT`, `RUN_HB_LINK`,
    /// `HB_PROC_TIMEOUT`); timeout enforcement is the process's job.
    pub fn start(&mut self, run: BotRun) -> Result<()> {
        match self.state {
            BotState::Running => return Err(Error::AlreadyRunning),
            BotState::Terminated => return Err(Error::LifecycleOver),
            BotState::Idle => {}
        }

        let child = Command::new(self.bin_dir.join(BOT_EXECUTABLE))
            .current_dir(&self.bin_dir)
            .env_clear()
            .env("RUN_LB_LINK", if run.run_lb { "1" } else { "0" })
            .env("LB_PROC_TIMEOUT", run.lb_timeout_s.to_string())
            .env("RUN_HB_LINK", if run.run_hb { "1" } else { "0" })
            .env("HB_PROC_TIMEOUT", run.hb_timeout_s.to_string())
            .spawn()
            .map_err(|e| Error::Engine(format!("cannot start bot process: {e}")))?;

        debug!(pid = child.id(), ?run, "bot process started");
        self.child = Some(child);
        self.state = BotState::Running;
        Ok(())
    }

    /// Polls whether the bot process is still running. Never blocks.
    ///
    /// This is the only place a process-driven `Running → Terminated`
    /// transition (natural completion or timeout expiry) is observed.
    pub fn check_running(&mut self) -> Result<bool> {
        if self.state != BotState::Running {
            return Ok(false);
        }
        let Some(child) = self.child.as_mut() else {
            return Ok(false);
        };
        match child.try_wait() {
            Ok(Some(exit)) => {
                debug!(%exit, "bot process terminated");
                self.state = BotState::Terminated;
                Ok(false)
            }
            Ok(None) => Ok(true),
            Err(e) => Err(Error::Engine(format!("cannot poll bot process: {e}"))),
        }
    }

    /// Requests termination: SIGINT when `force` is false (the process
    /// is expected to flush and finalize), SIGKILL when true.
    ///
    /// Idempotent — a no-op on an idle or already-terminated controller.
    /// Termination itself is still observed via [`Self::check_running`].
    pub fn stop(&mut self, force: bool) -> Result<()> {
        if !self.check_running()? {
            return Ok(());
        }
        let Some(child) = self.child.as_ref() else {
            return Ok(());
        };
        let pid = i32::try_from(child.id())
            .map_err(|_| Error::Engine("bot pid out of range".to_owned()))?;
        let sig = if force { Signal::SIGKILL } else { Signal::SIGINT };
        signal::kill(Pid::from_raw(pid), sig)
            .map_err(|e| Error::Engine(format!("cannot signal bot process: {e}")))?;
        debug!(pid, force, "bot stop requested");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use std::{fs, thread};

    use tempfile::TempDir;

    /// A bot base folder whose `bin/botmain` is the given script.
    fn base_with_bot(script: &str) -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("devinfo")).unwrap();
        fs::write(dir.path().join("devinfo/devnuid.txt"), "TESTNUID\n").unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let exe = bin.join("botmain");
        fs::write(&exe, script).unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        let session = Session::open(dir.path()).unwrap();
        (dir, session)
    }

    /// Polls until the controller observes termination, bounded.
    fn wait_terminated(bot: &mut BotController) {
        for _ in 0..100 {
            if !bot.check_running().unwrap() {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
        panic!("bot did not terminate in time");
    }

    const RUN: BotRun = BotRun {
        run_lb: true,
        lb_timeout_s: 30,
        run_hb: false,
        hb_timeout_s: 0,
    };

    #[test]
    fn full_lifecycle_with_graceful_stop() {
        let (_dir, session) = base_with_bot("#!/bin/sh\nexec /bin/sleep 30\n");
        let mut bot = BotController::new(&session);
        assert_eq!(bot.state(), BotState::Idle);

        bot.start(RUN).unwrap();
        assert!(bot.check_running().unwrap());

        // Double start is a caller error.
        assert!(matches!(bot.start(RUN), Err(Error::AlreadyRunning)));

        bot.stop(false).unwrap();
        wait_terminated(&mut bot);
        assert_eq!(bot.state(), BotState::Terminated);

        // Stop on a terminated controller is a no-op, not an error.
        bot.stop(true).unwrap();

        // No Terminated → Running transition.
        assert!(matches!(bot.start(RUN), Err(Error::LifecycleOver)));
    }

    #[test]
    fn natural_completion_is_observed_by_polling() {
        let (_dir, session) = base_with_bot("#!/bin/sh\nexit 0\n");
        let mut bot = BotController::new(&session);
        bot.start(RUN).unwrap();
        wait_terminated(&mut bot);
        assert_eq!(bot.state(), BotState::Terminated);
    }

    #[test]
    fn idle_controller_reports_not_running() {
        let (_dir, session) = base_with_bot("#!/bin/sh\nexit 0\n");
        let mut bot = BotController::new(&session);
        assert!(!bot.check_running().unwrap());
        // Stopping an idle controller is also a no-op.
        bot.stop(false).unwrap();
        assert_eq!(bot.state(), BotState::Idle);
    }

    #[test]
    fn missing_executable_is_an_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("devinfo")).unwrap();
        fs::write(dir.path().join("devinfo/devnuid.txt"), "TESTNUID\n").unwrap();
        let session = Session::open(dir.path()).unwrap();

        let mut bot = BotController::new(&session);
        assert!(matches!(bot.start(RUN), Err(Error::Engine(_))));
        assert_eq!(bot.state(), BotState::Idle);
    }

    #[test]
    fn run_parameters_reach_the_process_environment() {
        let (dir, session) = base_with_bot(
            "#!/bin/sh\necho \"$RUN_LB_LINK $LB_PROC_TIMEOUT $RUN_HB_LINK $HB_PROC_TIMEOUT\" > out.txt\n",
        );
        let mut bot = BotController::new(&session);
        bot.start(BotRun {
            run_lb: true,
            lb_timeout_s: 45,
            run_hb: false,
            hb_timeout_s: 120,
        })
        .unwrap();
        wait_terminated(&mut bot);

        // The bot runs with {base}/bin as its working directory.
        let out = fs::read_to_string(dir.path().join("bin/out.txt")).unwrap();
        assert_eq!(out.trim(), "1 45 0 120");
    }
}
