//! Linux framebuffer display backend.
//!
//! Maps the framebuffer device (`/dev/fb0` by default) into memory and copies
//! each rendered frame into it. The display takes the device's resolution;
//! the configured window size is ignored. 16, 24 and 32 bpp devices are
//! supported.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use lvglsim_toolkit::{Frame, Rgb888, RgbColor, Toolkit};
use tracing::{debug, info, warn};

use crate::error::{BackendError, Result};
use crate::options::FbdevOptions;
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};

pub const FBDEV_NAME: &str = "FBDEV";

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbBitField {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// `struct fb_var_screeninfo`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct VarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitField,
    green: FbBitField,
    blue: FbBitField,
    transp: FbBitField,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// Byte layout of one framebuffer pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgra8888,
    Rgba8888,
    Bgr888,
    Rgb888,
    Rgb565,
}

impl PixelFormat {
    /// Derive the layout from depth and blue channel offset.
    pub fn detect(bits_per_pixel: u32, blue_offset: u32) -> Option<Self> {
        match (bits_per_pixel, blue_offset == 0) {
            (32, true) => Some(Self::Bgra8888),
            (32, false) => Some(Self::Rgba8888),
            (24, true) => Some(Self::Bgr888),
            (24, false) => Some(Self::Rgb888),
            (16, _) => Some(Self::Rgb565),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8888 | Self::Rgba8888 => 4,
            Self::Bgr888 | Self::Rgb888 => 3,
            Self::Rgb565 => 2,
        }
    }

    /// Encode one pixel into `out`, which holds `bytes_per_pixel` bytes.
    pub fn encode(self, color: Rgb888, out: &mut [u8]) {
        match self {
            Self::Bgra8888 => out.copy_from_slice(&[color.b(), color.g(), color.r(), 0xFF]),
            Self::Rgba8888 => out.copy_from_slice(&[color.r(), color.g(), color.b(), 0xFF]),
            Self::Bgr888 => out.copy_from_slice(&[color.b(), color.g(), color.r()]),
            Self::Rgb888 => out.copy_from_slice(&[color.r(), color.g(), color.b()]),
            Self::Rgb565 => {
                let pixel = ((color.r() as u16 >> 3) << 11)
                    | ((color.g() as u16 >> 2) << 5)
                    | (color.b() as u16 >> 3);
                out.copy_from_slice(&pixel.to_le_bytes());
            }
        }
    }
}

/// Memory-mapped framebuffer device.
struct Framebuffer {
    _file: File,
    mmap: *mut u8,
    mmap_len: usize,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    back_buffer: Vec<u8>,
}

impl Framebuffer {
    fn open(path: &Path) -> Result<Self> {
        let device_error = |source: io::Error| BackendError::DeviceOpen {
            device: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(device_error)?;
        let fd = file.as_raw_fd();

        let mut var_info = VarScreenInfo::default();
        // SAFETY: var_info is a repr(C) mirror of fb_var_screeninfo.
        if unsafe { libc::ioctl(fd, FBIOGET_VSCREENINFO, &mut var_info) } < 0 {
            return Err(device_error(io::Error::last_os_error()));
        }

        let mut fix_info = FixScreenInfo::default();
        // SAFETY: fix_info is a repr(C) mirror of fb_fix_screeninfo.
        if unsafe { libc::ioctl(fd, FBIOGET_FSCREENINFO, &mut fix_info) } < 0 {
            return Err(device_error(io::Error::last_os_error()));
        }

        let format = PixelFormat::detect(var_info.bits_per_pixel, var_info.blue.offset)
            .ok_or_else(|| BackendError::Unavailable {
                name: FBDEV_NAME.to_string(),
                reason: format!("unsupported depth {} bpp", var_info.bits_per_pixel),
            })?;
        let mmap_len = fix_info.smem_len as usize;

        // SAFETY: fd stays open for the lifetime of the mapping (held in _file).
        let mmap = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mmap_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if mmap == libc::MAP_FAILED {
            return Err(device_error(io::Error::last_os_error()));
        }

        info!(
            device = %path.display(),
            width = var_info.xres,
            height = var_info.yres,
            bpp = var_info.bits_per_pixel,
            stride = fix_info.line_length,
            format = ?format,
            "Framebuffer opened"
        );

        Ok(Self {
            _file: file,
            mmap: mmap as *mut u8,
            mmap_len,
            width: var_info.xres,
            height: var_info.yres,
            stride: fix_info.line_length as usize,
            format,
            back_buffer: vec![0u8; mmap_len],
        })
    }

    /// Encode a frame into the back buffer and copy it to the device.
    fn blit(&mut self, frame: &Frame<'_>) {
        let bpp = self.format.bytes_per_pixel();
        let width = self.width.min(frame.width);
        let height = self.height.min(frame.height);

        for y in 0..height {
            for x in 0..width {
                let offset = y as usize * self.stride + x as usize * bpp;
                let Some(out) = self.back_buffer.get_mut(offset..offset + bpp) else {
                    continue;
                };
                if let Some(color) = frame.pixel(x, y) {
                    self.format.encode(color, out);
                }
            }
        }

        // SAFETY: the mapping is mmap_len bytes and the copy never exceeds it.
        unsafe {
            std::ptr::copy_nonoverlapping(
                self.back_buffer.as_ptr(),
                self.mmap,
                self.back_buffer.len().min(self.mmap_len),
            );
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        // SAFETY: mmap/mmap_len come from a successful mmap call.
        unsafe {
            libc::munmap(self.mmap as *mut libc::c_void, self.mmap_len);
        }
    }
}

/// Descriptor for the framebuffer backend.
#[derive(Debug, Clone)]
pub struct FbdevBackend {
    options: FbdevOptions,
}

impl FbdevBackend {
    pub fn new(options: FbdevOptions) -> Self {
        Self { options }
    }
}

impl Backend for FbdevBackend {
    fn name(&self) -> &'static str {
        FBDEV_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    fn probe(&self) -> bool {
        self.options.device.exists()
    }

    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        let fb = Framebuffer::open(&self.options.device)?;
        if i64::from(fb.width) != i64::from(window.width)
            || i64::from(fb.height) != i64::from(window.height)
        {
            warn!(
                requested_width = window.width,
                requested_height = window.height,
                width = fb.width,
                height = fb.height,
                "Using framebuffer resolution instead of requested window size"
            );
        }
        toolkit.create_display(fb.width as i32, fb.height as i32)?;
        Ok(Box::new(FbdevDisplay { fb }))
    }
}

/// Initialized framebuffer display.
struct FbdevDisplay {
    fb: Framebuffer,
}

impl ActiveBackend for FbdevDisplay {
    fn name(&self) -> &str {
        FBDEV_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    fn pump(&mut self, _toolkit: &mut dyn Toolkit) -> Result<LoopControl> {
        Ok(LoopControl::Continue)
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.fb.blit(frame);
        debug!("Frame copied to framebuffer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_formats() {
        assert_eq!(PixelFormat::detect(32, 0), Some(PixelFormat::Bgra8888));
        assert_eq!(PixelFormat::detect(32, 16), Some(PixelFormat::Rgba8888));
        assert_eq!(PixelFormat::detect(24, 0), Some(PixelFormat::Bgr888));
        assert_eq!(PixelFormat::detect(16, 0), Some(PixelFormat::Rgb565));
        assert_eq!(PixelFormat::detect(8, 0), None);
    }

    #[test]
    fn test_encode_bgra() {
        let mut out = [0u8; 4];
        PixelFormat::Bgra8888.encode(Rgb888::new(10, 20, 30), &mut out);
        assert_eq!(out, [30, 20, 10, 0xFF]);
    }

    #[test]
    fn test_encode_rgb565() {
        let mut out = [0u8; 2];
        PixelFormat::Rgb565.encode(Rgb888::new(255, 0, 255), &mut out);
        assert_eq!(u16::from_le_bytes(out), 0xF81F);
    }

    #[test]
    fn test_missing_device() {
        let backend = FbdevBackend::new(FbdevOptions {
            device: PathBuf::from("/nonexistent/fb9"),
        });
        assert!(!backend.probe());

        let mut toolkit = lvglsim_toolkit::SoftToolkit::new();
        toolkit.init().unwrap();
        let err = backend
            .init(&mut toolkit, &DisplaySettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, BackendError::DeviceOpen { .. }));
        assert!(toolkit.frame().is_none());
    }
}
