// ── Screensaver window ────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the fullscreen and preview window classes.
//   • Create the window and bind a DirectDraw display to it.
//   • Run the Win32 message loop until WM_QUIT.
//   • Translate window messages for `App::handle` and carry out its actions.
//
// The `App` lives in a `RefCell` on the stack frame of `run_fullscreen` /
// `run_preview`.  Its address is passed through CreateWindowExW and kept in
// GWLP_USERDATA; the window is always destroyed before that frame returns.

#![allow(unsafe_code)]

use std::{cell::RefCell, ffi::c_void};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM},
        Graphics::Gdi::{BeginPaint, ClientToScreen, EndPaint, InvalidateRect, PAINTSTRUCT},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::{SetActiveWindow, SetFocus},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
                GetCursorPos, GetMessageW, GetParent, GetWindowLongPtrW, GetWindowRect, IsWindow,
                LoadCursorW, PostQuitMessage, RegisterClassExW, SetWindowLongPtrW, SetWindowPos,
                ShowCursor, TranslateMessage, CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW,
                GWLP_USERDATA, HMENU, HWND_TOPMOST, IDC_ARROW, MSG, SWP_NOMOVE, SWP_NOSIZE,
                WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_CREATE, WM_DESTROY, WM_KEYDOWN,
                WM_MOUSEMOVE, WM_NCCREATE, WM_PAINT, WM_SIZE, WM_SYSKEYDOWN, WNDCLASSEXW,
                WS_CHILD, WS_POPUP, WS_VISIBLE,
            },
        },
    },
};

use super::ddraw::DirectDraw;
use crate::{
    app::{self, Action, App, Message, Presentation},
    config::Settings,
    display::{Point, Rect},
    error::{previous_handle, Result, SaverError},
};

// ── Window identity ───────────────────────────────────────────────────────────

const FULLSCREEN_CLASS: PCWSTR = w!("FlickerScreenSaver");
const PREVIEW_CLASS: PCWSTR = w!("FlickerPreview");

const FULLSCREEN_TITLE: PCWSTR = w!("Flicker");
const PREVIEW_TITLE: PCWSTR = w!("Flicker Preview");

type State = RefCell<App>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Take over the screen until a key press or mouse movement.
///
/// Returns the exit code carried by the final `WM_QUIT`.
pub(crate) fn run_fullscreen(settings: Settings) -> Result<i32> {
    let hinstance = module_instance()?;
    let state: State = RefCell::new(App::new(Presentation::Fullscreen, settings));

    register_class(hinstance, FULLSCREEN_CLASS)?;
    let full = Rect {
        left: 0,
        top: 0,
        right: settings.width as i32,
        bottom: settings.height as i32,
    };
    let window = create_window(
        hinstance,
        FULLSCREEN_CLASS,
        FULLSCREEN_TITLE,
        WS_POPUP | WS_VISIBLE,
        full,
        HWND::default(),
        &state,
    )?;

    bring_to_front(window.0)?;
    let display = DirectDraw::fullscreen(window.0, &settings)
        .map_err(|e| e.during("fullscreen display setup"))?;
    state.borrow_mut().attach(Box::new(display));

    let _cursor = HiddenCursor::new();
    let code = message_loop()?;
    drop(window);
    Ok(code)
}

/// Draw inside the settings dialog's preview box until it closes us.
pub(crate) fn run_preview(parent: isize, settings: Settings) -> Result<i32> {
    let parent_hwnd = HWND(parent as *mut c_void);

    // SAFETY: IsWindow accepts any value and only reports whether it names
    // an existing window.
    if !unsafe { IsWindow(parent_hwnd) }.as_bool() {
        return Err(SaverError::MissingParent(parent.to_string()));
    }

    let mut parent_rect = RECT::default();
    // SAFETY: parent_hwnd was just validated; parent_rect is a valid
    // out-pointer.
    unsafe { GetWindowRect(parent_hwnd, &mut parent_rect) }
        .map_err(|e| SaverError::from(e).during("read preview box size"))?;
    let geometry = Rect::covering(rect_from(parent_rect));
    log::debug!("preview child {}x{}", geometry.width(), geometry.height());

    let hinstance = module_instance()?;
    let state: State = RefCell::new(App::new(Presentation::Preview, settings));

    register_class(hinstance, PREVIEW_CLASS)?;
    let window = create_window(
        hinstance,
        PREVIEW_CLASS,
        PREVIEW_TITLE,
        WS_CHILD | WS_VISIBLE,
        geometry,
        parent_hwnd,
        &state,
    )?;

    let display =
        DirectDraw::windowed(window.0).map_err(|e| e.during("preview display setup"))?;
    state.borrow_mut().attach(Box::new(display));

    let code = message_loop()?;
    drop(window);
    Ok(code)
}

// ── Window class registration ─────────────────────────────────────────────────

fn module_instance() -> Result<HINSTANCE> {
    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(SaverError::from)?;
    Ok(HINSTANCE(hmodule.0))
}

fn register_class(hinstance: HINSTANCE, class_name: PCWSTR) -> Result<()> {
    // SAFETY: LoadCursorW with IDC_ARROW loads a built-in resource that exists
    // on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(SaverError::from)?;

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hCursor: cursor,
        lpszClassName: class_name,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised with valid handles; class_name
    // is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW").during("register window class"));
    }

    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

/// Destroys the window when dropped, so it never outlives the `App` whose
/// address it holds.
struct OwnedWindow(HWND);

impl Drop for OwnedWindow {
    fn drop(&mut self) {
        // SAFETY: IsWindow tolerates stale handles; DestroyWindow is only
        // called on a window this thread created and has not destroyed yet.
        unsafe {
            if IsWindow(self.0).as_bool() {
                let _ = DestroyWindow(self.0);
            }
        }
    }
}

fn create_window(
    hinstance: HINSTANCE,
    class_name: PCWSTR,
    title: PCWSTR,
    style: WINDOW_STYLE,
    at: Rect,
    parent: HWND,
    state: &State,
) -> Result<OwnedWindow> {
    let state_ptr: *const State = state;

    // SAFETY: class_name was just registered; hinstance is the exe's module.
    // state_ptr points at a RefCell on the caller's stack that outlives the
    // returned OwnedWindow, which destroys the window on drop.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            class_name,
            title,
            style,
            at.left,
            at.top,
            at.width(),
            at.height(),
            parent,
            HMENU::default(),
            hinstance,
            Some(state_ptr as *const c_void),
        )
    }
    .map_err(|e| SaverError::from(e).during("create window"))?;

    Ok(OwnedWindow(hwnd))
}

/// Make the fullscreen window topmost, active, and focused.
fn bring_to_front(hwnd: HWND) -> Result<()> {
    // SAFETY: hwnd is a live top-level window owned by this thread.
    unsafe {
        SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
            .map_err(|e| SaverError::from(e).during("SetWindowPos"))?;
        // Both return the previously active/focused window; null is fine.
        previous_handle(SetActiveWindow(hwnd).map_err(SaverError::from))
            .map_err(|e| e.during("SetActiveWindow"))?;
        previous_handle(SetFocus(hwnd).map_err(SaverError::from))
            .map_err(|e| e.during("SetFocus"))?;
    }
    Ok(())
}

/// Hides the mouse cursor for as long as it lives.
struct HiddenCursor;

impl HiddenCursor {
    fn new() -> Self {
        // SAFETY: ShowCursor only adjusts this thread's display counter.
        unsafe {
            ShowCursor(false);
        }
        Self
    }
}

impl Drop for HiddenCursor {
    fn drop(&mut self) {
        // SAFETY: balances the decrement made in `new`.
        unsafe {
            ShowCursor(true);
        }
    }
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<i32> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved.
            0 => break,
            // SAFETY: msg was populated by a successful GetMessageW call.
            // TranslateMessage's and DispatchMessageW's results are unused.
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    let code = app::quit_status(msg.wParam.0);
    log::info!("message loop finished with code {code}");
    Ok(code)
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        // SAFETY: for WM_NCCREATE, lparam points at the CREATESTRUCTW built
        // by CreateWindowExW; lpCreateParams is the state pointer we passed.
        let create = &*(lparam.0 as *const CREATESTRUCTW);
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const State;
    if state_ptr.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    // SAFETY: the pointer was stored at WM_NCCREATE and the RefCell outlives
    // the window (see OwnedWindow).
    let state = &*state_ptr;

    let message = decode(hwnd, msg, lparam);

    // The borrow ends before any action runs, so DestroyWindow can re-enter
    // this procedure with WM_DESTROY.
    let action = match state.try_borrow_mut() {
        Ok(mut app) => app.handle(message),
        Err(_) => {
            log::trace!("message {msg:#06x} arrived while state was busy");
            Action::Default
        }
    };

    if msg == WM_PAINT && action == Action::Handled {
        end_frame(hwnd, state);
    }

    match action {
        Action::Handled => LRESULT(0),
        Action::PostQuit => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        Action::DestroyWindow => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        Action::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Turn a raw window message into the platform-free `Message`.
///
/// # Safety
/// `hwnd` must be the window the message was delivered to.
unsafe fn decode(hwnd: HWND, msg: u32, lparam: LPARAM) -> Message {
    match msg {
        WM_CREATE => Message::Create,
        WM_SIZE => Message::Size {
            width: (lparam.0 & 0xFFFF) as u16,
            height: ((lparam.0 >> 16) & 0xFFFF) as u16,
        },
        WM_PAINT => Message::Paint {
            parent: parent_client_area(hwnd),
        },
        WM_MOUSEMOVE => {
            let mut pt = POINT::default();
            let cursor = GetCursorPos(&mut pt).ok().map(|()| Point { x: pt.x, y: pt.y });
            Message::MouseMove { cursor }
        }
        WM_KEYDOWN => Message::KeyDown,
        WM_SYSKEYDOWN => Message::SysKeyDown,
        WM_CLOSE => Message::Close,
        WM_DESTROY => Message::Destroy,
        _ => Message::Other,
    }
}

/// The parent's client rectangle and the screen position of its origin.
///
/// `None` for a top-level window. A parent whose rectangle cannot be read is
/// reported as empty, which renders fullscreen.
unsafe fn parent_client_area(hwnd: HWND) -> Option<(Rect, Point)> {
    let parent = GetParent(hwnd).ok().filter(|p| !p.is_invalid())?;

    let mut client = RECT::default();
    if GetClientRect(parent, &mut client).is_err() {
        return Some((Rect::default(), Point::default()));
    }

    let mut origin = POINT {
        x: client.left,
        y: client.top,
    };
    let _ = ClientToScreen(parent, &mut origin);

    Some((rect_from(client), Point { x: origin.x, y: origin.y }))
}

/// Validate the painted region, then queue the next frame while running.
unsafe fn end_frame(hwnd: HWND, state: &State) {
    let mut ps = PAINTSTRUCT::default();
    let _ = BeginPaint(hwnd, &mut ps);
    let _ = EndPaint(hwnd, &ps);

    if state.try_borrow().map_or(false, |app| app.is_running()) {
        let _ = InvalidateRect(hwnd, None, false);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rect_from(r: RECT) -> Rect {
    Rect {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

/// Capture the current Win32 last-error code and wrap it in a `SaverError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> SaverError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    SaverError::Win32 {
        function,
        code: code.0,
    }
}
