/// Whether the process can open raw sockets. Most scan techniques need an
/// elevated process; the menu checks this before invoking the runner.
#[cfg(unix)]
pub(crate) fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub(crate) fn is_root() -> bool {
    true
}
