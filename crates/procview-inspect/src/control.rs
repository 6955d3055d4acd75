use crate::snapshot::Pid;

/// Ask the OS to terminate `pid`.
///
/// True means the request was accepted, not that the process has exited by
/// the time this returns; callers should capture a fresh snapshot after a
/// short delay to observe the effect.
///
/// Linux sends SIGTERM (the process may catch it and shut down cleanly);
/// Windows uses `TerminateProcess`, which is always forced. That asymmetry
/// is inherent platform behavior.
pub fn terminate(pid: Pid) -> bool {
    if pid == 0 {
        // On POSIX, kill(0, sig) signals the caller's whole process group;
        // refuse without making any system call.
        tracing::debug!("refusing termination request for pid 0");
        return false;
    }

    let accepted = terminate_native(pid);
    tracing::debug!(pid, accepted, "termination request");
    accepted
}

fn terminate_native(pid: Pid) -> bool {
    #[cfg(target_os = "linux")]
    {
        crate::platform::linux::terminate(pid)
    }
    #[cfg(target_os = "windows")]
    {
        crate::platform::windows::terminate(pid)
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let _ = pid;
        false
    }
}
