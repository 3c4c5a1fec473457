// ── DirectDraw display ────────────────────────────────────────────────────────
//
// Owns one `IDirectDraw7` context and the primary surface created from it,
// and implements the crate's `Display` trait on top of them.  COM references
// are released when the wrappers are dropped; `release` just controls the
// order (surface before context).

#![allow(unsafe_code)]

use std::{ffi::c_void, ptr};

use windows::{
    core::Interface,
    Win32::{
        Foundation::{HWND, RECT},
        Graphics::DirectDraw::{
            DirectDrawCreateEx, IDirectDraw7, IDirectDrawSurface7, DDBLTFX, DDBLT_COLORFILL,
            DDBLT_WAIT, DDSCAPS2, DDSCAPS_PRIMARYSURFACE, DDSCL_EXCLUSIVE, DDSCL_FULLSCREEN,
            DDSCL_NORMAL, DDSD_CAPS, DDSURFACEDESC2,
        },
    },
};

use crate::{
    config::Settings,
    display::{Display, FillArea},
    error::{Result, SaverError},
};

pub(crate) struct DirectDraw {
    surface: Option<IDirectDrawSurface7>,
    context: Option<IDirectDraw7>,
}

impl DirectDraw {
    /// Take over the display: exclusive fullscreen at the configured mode.
    pub(crate) fn fullscreen(hwnd: HWND, settings: &Settings) -> Result<Self> {
        let context = create_context()?;

        // SAFETY: context is a live IDirectDraw7; hwnd is the top-level
        // window created by the caller, still alive for this call.
        unsafe {
            context.SetCooperativeLevel(hwnd, (DDSCL_FULLSCREEN | DDSCL_EXCLUSIVE) as u32)
        }
        .map_err(|e| SaverError::from(e).during("SetCooperativeLevel"))?;

        // SAFETY: exclusive cooperative level was granted just above, which
        // is what SetDisplayMode requires.
        unsafe {
            context.SetDisplayMode(
                settings.width,
                settings.height,
                settings.bits_per_pixel,
                0,
                0,
            )
        }
        .map_err(|e| SaverError::from(e).during("SetDisplayMode"))?;

        let surface = create_primary(&context)?;
        log::info!(
            "fullscreen {}x{}x{} ready",
            settings.width,
            settings.height,
            settings.bits_per_pixel
        );

        Ok(Self {
            surface: Some(surface),
            context: Some(context),
        })
    }

    /// Share the desktop: normal cooperative level, desktop display mode.
    pub(crate) fn windowed(hwnd: HWND) -> Result<Self> {
        let context = create_context()?;

        // SAFETY: context is a live IDirectDraw7; hwnd is the preview child
        // window created by the caller.
        unsafe { context.SetCooperativeLevel(hwnd, DDSCL_NORMAL as u32) }
            .map_err(|e| SaverError::from(e).during("SetCooperativeLevel"))?;

        let surface = create_primary(&context)?;
        log::info!("windowed primary surface ready");

        Ok(Self {
            surface: Some(surface),
            context: Some(context),
        })
    }
}

impl Display for DirectDraw {
    fn color_fill(&mut self, area: FillArea, color: u8) -> Result<()> {
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };

        let mut fx = DDBLTFX {
            dwSize: std::mem::size_of::<DDBLTFX>() as u32,
            ..Default::default()
        };
        fx.Anonymous5.dwFillColor = u32::from(color);

        let mut rect = match area {
            FillArea::Whole => None,
            FillArea::Region(r) => Some(RECT {
                left: r.left,
                top: r.top,
                right: r.right,
                bottom: r.bottom,
            }),
        };
        let dest: *mut RECT = rect.as_mut().map_or(ptr::null_mut(), |r| r as *mut RECT);

        // SAFETY: surface is a live primary surface; dest is either null
        // (whole surface) or points at `rect`, which outlives the call; fx is
        // fully initialised with dwSize set. No source surface for a fill.
        unsafe {
            surface.Blt(
                dest,
                None,
                ptr::null_mut(),
                (DDBLT_COLORFILL | DDBLT_WAIT) as u32,
                &mut fx,
            )
        }
        .map_err(SaverError::from)
    }

    fn release(&mut self) {
        // Dropping the COM wrappers calls Release; surface must go first.
        if self.surface.take().is_some() {
            log::debug!("primary surface released");
        }
        if self.context.take().is_some() {
            log::debug!("DirectDraw context released");
        }
    }
}

impl Drop for DirectDraw {
    fn drop(&mut self) {
        self.release();
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn create_context() -> Result<IDirectDraw7> {
    let mut raw: *mut c_void = ptr::null_mut();

    // SAFETY: raw is a valid out-pointer; the IID matches the interface the
    // pointer is wrapped in below. Null GUID selects the primary display
    // driver and no outer IUnknown is used.
    unsafe { DirectDrawCreateEx(ptr::null_mut(), &mut raw, &IDirectDraw7::IID, None) }
        .map_err(|e| SaverError::from(e).during("DirectDrawCreateEx"))?;

    if raw.is_null() {
        return Err(SaverError::Win32 {
            function: "DirectDrawCreateEx",
            code: 0,
        }
        .during("DirectDrawCreateEx"));
    }

    // SAFETY: raw is a non-null IDirectDraw7 pointer returned with one
    // reference owned by us; from_raw takes over that reference.
    Ok(unsafe { IDirectDraw7::from_raw(raw) })
}

fn create_primary(context: &IDirectDraw7) -> Result<IDirectDrawSurface7> {
    let mut desc = DDSURFACEDESC2 {
        dwSize: std::mem::size_of::<DDSURFACEDESC2>() as u32,
        dwFlags: DDSD_CAPS as u32,
        ddsCaps: DDSCAPS2 {
            dwCaps: DDSCAPS_PRIMARYSURFACE as u32,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut surface: Option<IDirectDrawSurface7> = None;

    // SAFETY: desc is fully initialised with dwSize set; surface is a valid
    // out-slot that receives an owned reference on success.
    unsafe { context.CreateSurface(&mut desc, &mut surface, None) }
        .map_err(|e| SaverError::from(e).during("CreateSurface"))?;

    surface.ok_or_else(|| {
        SaverError::Win32 {
            function: "CreateSurface",
            code: 0,
        }
        .during("CreateSurface")
    })
}
