use std::process::{ExitStatus, Stdio};

use cohort_model::ExitOutcome;
use tokio::process::Command;

pub fn cmd_program(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd
}

/// Cut the child off from the supervisor's standard streams and terminal session.
pub(crate) fn detach(cmd: &mut Command) {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(false);

    #[cfg(unix)]
    unix_impl::new_session(cmd);
}

pub fn exit_outcome(status: ExitStatus) -> ExitOutcome {
    match status.code() {
        Some(code) => ExitOutcome::Code(code),
        None => ExitOutcome::Signal(terminating_signal(&status)),
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(unix)]
mod unix_impl {
    use std::io;

    use tokio::process::Command;

    /// Runs `setsid()` in the child after `fork()` and before `execve()`.
    pub fn new_session(cmd: &mut Command) {
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }
}
