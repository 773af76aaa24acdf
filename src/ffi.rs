//! C ABI for the polyline parser
//!
//! The exported functions follow this header:
//!
//! ```c
//! typedef struct CoordinatePair {
//!     double x;
//!     double y;
//! } CoordinatePair;
//!
//! typedef struct Polyline {
//!     CoordinatePair* ptr;
//!     size_t len;
//! } Polyline;
//!
//! uint8_t svg_str_to_polylines(char* svg, Polyline** polylines, size_t* polylines_len);
//! void free_polylines(Polyline* polylines, size_t polylines_len);
//! ```
//!
//! Every array handed out by `svg_str_to_polylines` must be released with a
//! single call to `free_polylines`. [`FfiSource`] consumes the ABI from Rust
//! and takes care of that.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::{ptr, slice};

use log::warn;

use crate::error::ParseError;
use crate::geometry::{CoordinatePair, PolylineSet};
use crate::parser::{parse_document, PolylineSource, DEFAULT_TOLERANCE};

pub const STATUS_OK: u8 = 0;
pub const STATUS_NULL_ARGUMENT: u8 = 1;
pub const STATUS_INVALID_UTF8: u8 = 2;
pub const STATUS_PARSE_ERROR: u8 = 3;

/// One polyline as seen from C
#[repr(C)]
#[derive(Debug)]
pub struct FfiPolyline {
    pub ptr: *mut CoordinatePair,
    pub len: usize,
}

/// Parse a NUL-terminated SVG string into an array of polylines.
///
/// Returns [`STATUS_OK`] and fills both out parameters on success. On failure
/// the out parameters are set to null and 0.
///
/// # Safety
///
/// `svg` must be null or point to a NUL-terminated string. `polylines` and
/// `polylines_len` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn svg_str_to_polylines(
    svg: *const c_char,
    polylines: *mut *mut FfiPolyline,
    polylines_len: *mut usize,
) -> u8 {
    if polylines.is_null() || polylines_len.is_null() {
        return STATUS_NULL_ARGUMENT;
    }
    *polylines = ptr::null_mut();
    *polylines_len = 0;
    if svg.is_null() {
        return STATUS_NULL_ARGUMENT;
    }

    let svg = match CStr::from_ptr(svg).to_str() {
        Ok(svg) => svg,
        Err(_) => return STATUS_INVALID_UTF8,
    };
    let parsed = match parse_document(svg, DEFAULT_TOLERANCE) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("svg_str_to_polylines: {}", e);
            return STATUS_PARSE_ERROR;
        }
    };

    let out: Box<[FfiPolyline]> = parsed
        .into_iter()
        .map(|line| {
            let line = line.into_boxed_slice();
            let len = line.len();
            FfiPolyline {
                ptr: Box::into_raw(line) as *mut CoordinatePair,
                len,
            }
        })
        .collect();
    *polylines_len = out.len();
    *polylines = Box::into_raw(out) as *mut FfiPolyline;
    STATUS_OK
}

/// Release an array returned by [`svg_str_to_polylines`]. Null is a no-op.
///
/// # Safety
///
/// `polylines` and `polylines_len` must come from one successful call to
/// `svg_str_to_polylines`, and must not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn free_polylines(polylines: *mut FfiPolyline, polylines_len: usize) {
    if polylines.is_null() {
        return;
    }
    let outer = Box::from_raw(ptr::slice_from_raw_parts_mut(polylines, polylines_len));
    for line in outer.iter() {
        if !line.ptr.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(line.ptr, line.len)));
        }
    }
}

/// Owns the arrays returned by one `svg_str_to_polylines` call.
///
/// The foreign memory is released when the guard is dropped, whether the call
/// succeeded or not.
struct ForeignPolylines {
    ptr: *mut FfiPolyline,
    len: usize,
}

impl ForeignPolylines {
    fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    fn as_slice(&self) -> &[FfiPolyline] {
        if self.ptr.is_null() {
            &[]
        } else {
            // SAFETY: ptr/len were written together by svg_str_to_polylines
            unsafe { slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    /// Copy the foreign data into owned polylines
    fn to_polyline_set(&self) -> PolylineSet {
        self.as_slice()
            .iter()
            .map(|line| {
                if line.ptr.is_null() {
                    Vec::new()
                } else {
                    // SAFETY: each entry points to `len` initialised pairs
                    unsafe { slice::from_raw_parts(line.ptr, line.len) }.to_vec()
                }
            })
            .collect()
    }
}

impl Drop for ForeignPolylines {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: the guard is the single owner of this allocation
            unsafe { free_polylines(self.ptr, self.len) };
            self.ptr = ptr::null_mut();
            self.len = 0;
        }
    }
}

/// [`PolylineSource`] backed by the C ABI
#[derive(Debug, Clone, Copy, Default)]
pub struct FfiSource;

impl PolylineSource for FfiSource {
    fn parse(&self, svg: &[u8]) -> Result<PolylineSet, ParseError> {
        let svg = CString::new(svg).map_err(|_| ParseError::Encoding)?;
        let mut foreign = ForeignPolylines::empty();
        // SAFETY: svg is NUL-terminated and the out pointers refer to the guard
        let status =
            unsafe { svg_str_to_polylines(svg.as_ptr(), &mut foreign.ptr, &mut foreign.len) };
        match status {
            STATUS_OK => Ok(foreign.to_polyline_set()),
            STATUS_INVALID_UTF8 => Err(ParseError::Encoding),
            other => Err(ParseError::Native(other)),
        }
    }
}
