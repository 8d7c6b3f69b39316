//! Shell change broadcasts.

/// Tells Explorer the file-association landscape changed so it drops cached
/// thumbnail bindings. Broadcast once per completed mutation, not per key.
#[cfg(windows)]
pub fn notify_association_changed() {
    use windows::Win32::UI::Shell::{SHChangeNotify, SHCNE_ASSOCCHANGED, SHCNF_IDLIST};

    log::debug!("SHChangeNotify(SHCNE_ASSOCCHANGED)");
    unsafe { SHChangeNotify(SHCNE_ASSOCCHANGED, SHCNF_IDLIST, None, None) };
}

#[cfg(not(windows))]
pub fn notify_association_changed() {}
