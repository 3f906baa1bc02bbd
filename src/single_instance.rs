//! Single instance detection
//!
//! Prevents two menu bar apps from running at once. Windows uses a named
//! mutex; elsewhere an exclusive `fs2` lock on a file in the runtime dir.
//! Both are released by the OS when the process exits, crash or not.

#[cfg(windows)]
use windows::core::PCWSTR;
#[cfg(windows)]
use windows::Win32::Foundation::{CloseHandle, HANDLE};
#[cfg(windows)]
use windows::Win32::System::Threading::{CreateMutexW, ReleaseMutex};

/// Guard that holds the single instance lock
/// When dropped, the lock is released
pub struct SingleInstanceGuard {
    #[cfg(windows)]
    handle: HANDLE,
    #[cfg(not(windows))]
    _lock_file: std::fs::File,
}

impl SingleInstanceGuard {
    #[cfg(windows)]
    const MUTEX_NAME: &'static str = "Local\\Lockdown_Menu_SingleInstance";

    #[cfg(not(windows))]
    const LOCK_FILE: &'static str = "lockdown-menu.lock";

    /// Try to acquire the single instance lock
    /// Returns Some(guard) if this is the first instance, None if another instance is running
    #[cfg(windows)]
    pub fn try_acquire() -> Option<Self> {
        use windows::Win32::Foundation::{GetLastError, ERROR_ALREADY_EXISTS};

        let wide_name: Vec<u16> = Self::MUTEX_NAME
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        unsafe {
            match CreateMutexW(None, true, PCWSTR(wide_name.as_ptr())) {
                Ok(h) => {
                    if GetLastError() == ERROR_ALREADY_EXISTS {
                        let _ = CloseHandle(h);
                        None
                    } else {
                        Some(Self { handle: h })
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to create single instance mutex: {}", e);
                    None
                }
            }
        }
    }

    #[cfg(not(windows))]
    pub fn try_acquire() -> Option<Self> {
        let dir = dirs::runtime_dir()
            .or_else(dirs::data_dir)
            .map(|p| p.join("Lockdown"))
            .unwrap_or_else(std::env::temp_dir);
        Self::try_acquire_in(&dir)
    }

    /// Lock-file variant, usable with any directory
    #[cfg(not(windows))]
    pub fn try_acquire_in(dir: &std::path::Path) -> Option<Self> {
        use fs2::FileExt;
        use std::fs::OpenOptions;
        use std::io::Write;

        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!("Failed to create lock directory {}: {}", dir.display(), e);
            return None;
        }
        let lock_path = dir.join(Self::LOCK_FILE);

        let mut file = match OpenOptions::new().read(true).write(true).create(true).open(&lock_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Failed to open lock file {}: {}", lock_path.display(), e);
                return None;
            }
        };

        // The file itself is left in place; only the lock on it matters
        if let Err(e) = file.try_lock_exclusive() {
            tracing::debug!("Lock file {} is held: {}", lock_path.display(), e);
            return None;
        }

        // PID is informational only
        if file.set_len(0).is_ok() {
            let _ = write!(file, "{}", std::process::id());
        }

        Some(Self { _lock_file: file })
    }
}

#[cfg(windows)]
impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseMutex(self.handle);
            let _ = CloseHandle(self.handle);
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let dir = tempfile::tempdir().unwrap();

        let first = SingleInstanceGuard::try_acquire_in(dir.path()).unwrap();
        assert!(SingleInstanceGuard::try_acquire_in(dir.path()).is_none());

        drop(first);
        assert!(SingleInstanceGuard::try_acquire_in(dir.path()).is_some());
    }

    #[test]
    fn test_leftover_lock_file_without_holder_is_acquired() {
        let dir = tempfile::tempdir().unwrap();
        // As left behind by an instance that crashed
        std::fs::write(dir.path().join("lockdown-menu.lock"), "1").unwrap();

        let guard = SingleInstanceGuard::try_acquire_in(dir.path());
        assert!(guard.is_some());

        let pid = std::fs::read_to_string(dir.path().join("lockdown-menu.lock")).unwrap();
        assert_eq!(pid, std::process::id().to_string());
    }
}
