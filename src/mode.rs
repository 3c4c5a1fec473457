// ── Command-line mode selection ───────────────────────────────────────────────
//
// Windows launches a screensaver with one of:
//
//   (nothing) or /s    run fullscreen
//   /p <hwnd>          draw a preview inside the given parent window
//   /c[:<hwnd>]        show the configuration dialog
//
// The switch letter is case-insensitive and `-` is accepted in place of `/`.
// No Win32 imports; the parent handle is carried as a raw integer.

use crate::error::{Result, SaverError};

/// Which of the three entry points to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Fullscreen, exclusive display mode.
    Run,
    /// Embedded in the settings dialog's preview box.
    Preview {
        /// Raw `HWND` value of the preview box.
        parent: isize,
    },
    /// No settings exist; show a notice and exit.
    Configure,
}

impl Mode {
    /// Parse the process arguments (excluding the program name).
    ///
    /// The shell passes `/p 1234` as two arguments, so the pieces are
    /// re-joined with a single space before the switch is inspected.
    pub(crate) fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = args
            .into_iter()
            .map(|a| a.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(&joined)
    }

    /// Parse a single command-line string such as `"/p 1234"`.
    pub(crate) fn parse(cmd_line: &str) -> Result<Self> {
        let text = cmd_line.trim();
        if text.is_empty() {
            return Ok(Self::Run);
        }

        let mut chars = text.chars();
        let marker = chars.next();
        let switch = chars.next();
        if !matches!(marker, Some('/' | '-')) {
            return Err(SaverError::InvalidArgument(text.to_owned()));
        }

        match switch.map(|c| c.to_ascii_lowercase()) {
            Some('s') => Ok(Self::Run),
            Some('c') => Ok(Self::Configure),
            Some('p') => {
                let parent = parse_handle(chars.as_str())
                    .ok_or_else(|| SaverError::MissingParent(text.to_owned()))?;
                Ok(Self::Preview { parent })
            }
            _ => Err(SaverError::InvalidArgument(text.to_owned())),
        }
    }
}

/// Read the decimal window handle that follows the preview switch.
///
/// Accepts `" 1234"` and `":1234"`; digits stop at the first non-digit,
/// like `atoi`. A zero handle is never a window.
fn parse_handle(rest: &str) -> Option<isize> {
    let rest = rest.trim_start_matches([':', ' ', '\t']);
    let digits: &str = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    match digits.parse::<isize>() {
        Ok(0) | Err(_) => None,
        Ok(handle) => Some(handle),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
