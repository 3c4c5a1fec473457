// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Flicker return `error::Result<T>`.  No panics
// in production paths; errors are reported once by `main` and mapped to a
// process exit code.

use thiserror::Error;

/// Every error that Flicker can produce.
#[derive(Debug, Error)]
pub enum SaverError {
    /// The mode switch on the command line was not one of `/s`, `/p`, `/c`.
    #[error("unrecognised command-line argument {0:?}")]
    InvalidArgument(String),

    /// Preview mode was requested without a usable parent window handle.
    #[error("preview mode needs a valid parent window (got {0:?})")]
    MissingParent(String),

    /// A display or window setup step failed; startup is aborted.
    #[error("{step} failed: {source}")]
    Init {
        /// The setup step that failed, for display purposes.
        step: &'static str,
        #[source]
        source: Box<SaverError>,
    },

    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// The host is not Windows.
    #[error("flicker only runs on Windows")]
    Unsupported,
}

impl SaverError {
    /// Wrap `self` as the cause of a failed setup step.
    pub fn during(self, step: &'static str) -> Self {
        Self::Init {
            step,
            source: Box::new(self),
        }
    }

    /// Process exit status reported for this error.
    ///
    /// Normal shutdown uses the `WM_QUIT` code (normally 0), so every error
    /// maps to a distinct non-zero value.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::MissingParent(_) => 3,
            Self::Init { .. } => 4,
            Self::Win32 { .. } => 5,
            Self::Unsupported => 6,
        }
    }
}

// Convert a windows-crate error (HRESULT) directly into a SaverError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for SaverError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SaverError>;

/// Check a Win32 call that returns the *previous* handle, such as
/// `SetActiveWindow` or `SetFocus`.
///
/// A null return with no last-error code means there was no previous window,
/// which the bindings surface as an error with code 0. Only a non-zero code
/// is a real failure.
pub fn previous_handle<T>(result: Result<T>) -> Result<()> {
    match result {
        Ok(_) | Err(SaverError::Win32 { code: 0, .. }) => Ok(()),
        Err(e) => Err(e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let errors = [
            SaverError::InvalidArgument("/x".to_owned()),
            SaverError::MissingParent(String::new()),
            SaverError::Unsupported.during("CreateSurface"),
            SaverError::Win32 {
                function: "RegisterClassExW",
                code: 5,
            },
            SaverError::Unsupported,
        ];
        let mut codes: Vec<i32> = errors.iter().map(SaverError::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn init_error_names_the_step_and_cause() {
        let e = SaverError::Win32 {
            function: "SetDisplayMode",
            code: 0x8876_0091,
        }
        .during("switch display mode");
        assert_eq!(
            e.to_string(),
            "switch display mode failed: SetDisplayMode failed (error 0x88760091)"
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn previous_handle_accepts_null_without_error_code() {
        let none_before: Result<isize> = Err(SaverError::Win32 {
            function: "windows",
            code: 0,
        });
        assert!(previous_handle(none_before).is_ok());
        assert!(previous_handle(Ok(0x1234_isize)).is_ok());
    }

    #[test]
    fn previous_handle_keeps_real_failures() {
        let denied: Result<isize> = Err(SaverError::Win32 {
            function: "windows",
            code: 0x8007_0005,
        });
        let err = previous_handle(denied).unwrap_err();
        assert!(matches!(err, SaverError::Win32 { code: 0x8007_0005, .. }));
    }

    #[test]
    fn invalid_argument_message() {
        let e = SaverError::InvalidArgument("/q".to_owned());
        assert_eq!(e.to_string(), "unrecognised command-line argument \"/q\"");
    }
}
