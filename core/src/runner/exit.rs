use std::process::ExitStatus;

/// Maps a child's exit status to a single code.
///
/// Unix signals become `128 + signo`, matching what a shell reports.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}
