//! Administrator detection, used to decide whether per-process disk metrics
//! can be trusted.

/// Whether this process runs with administrator rights.
///
/// Any failure to ask the OS counts as "not elevated".
pub fn is_current_user_admin() -> bool {
    let elevated = imp::query_elevation();
    if let Err(e) = &elevated {
        log::debug!("Could not query elevation: {}", e);
    }
    elevated.unwrap_or(false)
}

#[cfg(windows)]
mod imp {
    use std::io;
    use std::mem;
    use std::ptr;

    use winapi::ctypes::c_void;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
    use winapi::um::securitybaseapi::GetTokenInformation;
    use winapi::um::winnt::{TokenElevation, HANDLE, TOKEN_ELEVATION, TOKEN_QUERY};

    /// Access token of the current process, closed on drop
    struct ProcessToken(HANDLE);

    impl ProcessToken {
        fn open() -> io::Result<Self> {
            let mut handle: HANDLE = ptr::null_mut();
            if unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut handle) } == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self(handle))
        }

        fn elevation(&self) -> io::Result<TOKEN_ELEVATION> {
            let mut elevation = TOKEN_ELEVATION { TokenIsElevated: 0 };
            let mut written = 0u32;
            let ok = unsafe {
                GetTokenInformation(
                    self.0,
                    TokenElevation,
                    &mut elevation as *mut TOKEN_ELEVATION as *mut c_void,
                    mem::size_of::<TOKEN_ELEVATION>() as u32,
                    &mut written,
                )
            };
            if ok == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(elevation)
        }
    }

    impl Drop for ProcessToken {
        fn drop(&mut self) {
            unsafe {
                CloseHandle(self.0);
            }
        }
    }

    pub fn query_elevation() -> io::Result<bool> {
        let token = ProcessToken::open()?;
        Ok(token.elevation()?.TokenIsElevated != 0)
    }
}

#[cfg(unix)]
mod imp {
    use std::io;

    /// root stands in for an elevated token
    pub fn query_elevation() -> io::Result<bool> {
        Ok(unsafe { libc::geteuid() } == 0)
    }
}

#[cfg(not(any(windows, unix)))]
mod imp {
    use std::io;

    pub fn query_elevation() -> io::Result<bool> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no notion of elevation on this platform",
        ))
    }
}
