//! FFI bindings for the fcascade index
//!
//! This module provides a C-compatible interface to the fractional cascading
//! index. All functions are panic-safe and use thread-local error reporting.
//!
//! # Safety Guarantees
//!
//! - No panic may cross the FFI boundary (enforced by `ffi_guard`)
//! - Null pointer checks on all pointer arguments
//! - Input sizes are overflow-checked before slices are formed
//! - ABI stability via `#[repr(C)]` and `extern "C"`
//!
//! # Error Handling
//!
//! Errors are reported through:
//! - Return values: NULL for build, `-1` for queries, `SIZE_MAX` for `fc_index_promoted_len`
//! - Thread-local error message: `fc_last_error_message()`
//!
//! # Thread Safety
//!
//! An index is immutable once built. Any number of threads may query the
//! same handle concurrently; only `fc_index_free` needs exclusive access.

use fcascade_core::{CascadeIndex, CascadeOptions, Element};
use libc::{c_char, c_int, size_t};
use std::cell::RefCell;
use std::ffi::CString;
use std::ptr;
use std::slice;

/// Internal state holder (not exposed to C)
struct FcIndexState {
    inner: CascadeIndex,
}

/// Opaque handle to a cascading index (C-compatible)
///
/// C code only sees pointers to this type, never the actual struct.
/// The real data is stored in `FcIndexState`.
#[repr(C)]
pub struct FcIndex {
    _private: [u8; 0],
}

thread_local! {
    /// Thread-local storage for error messages
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
///
/// Interior NULs are escaped so reporting an error can never panic.
fn set_last_error(err: impl std::fmt::Display) {
    LAST_ERROR.with(|cell| {
        let safe_msg = err.to_string().replace('\0', "\\0");
        let c_str = CString::new(safe_msg).unwrap_or_default();
        *cell.borrow_mut() = Some(c_str);
    });
}

/// Clear the last error message for the current thread
fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Panic barrier that catches all panics at the FFI boundary
///
/// Returns `None` on panic after recording the panic message, so callers can
/// fall back to their sentinel return value.
fn ffi_guard<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    // AssertUnwindSafe: the operation is abandoned on panic, never resumed.
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(e) => {
            let msg = if let Some(s) = e.downcast_ref::<&str>() {
                format!("Panic: {}", s)
            } else if let Some(s) = e.downcast_ref::<String>() {
                format!("Panic: {}", s)
            } else {
                "Unknown panic".to_string()
            };
            set_last_error(msg);
            None
        }
    }
}

/// Borrow the index behind a handle, recording an error for NULL
///
/// # Safety
///
/// `ptr` must be NULL or a live pointer from `fc_index_build()`.
unsafe fn index_ref<'a>(ptr: *const FcIndex) -> Option<&'a CascadeIndex> {
    // SAFETY: Caller guarantees ptr is NULL or valid
    let state = unsafe { (ptr as *const FcIndexState).as_ref() };
    if state.is_none() {
        set_last_error("Null index pointer");
    }
    state.map(|s| &s.inner)
}

/// Copy per-dimension positions into a caller buffer
///
/// # Safety
///
/// `out` must be valid for `out_len` writes.
unsafe fn write_positions(positions: &[usize], out: *mut size_t, out_len: size_t) -> c_int {
    if out_len < positions.len() {
        set_last_error(format!(
            "Output buffer too small: need {}, got {}",
            positions.len(),
            out_len
        ));
        return -1;
    }

    // SAFETY: Caller guarantees out has room for out_len >= positions.len() values
    let dst = unsafe { slice::from_raw_parts_mut(out, positions.len()) };
    dst.copy_from_slice(positions);
    clear_last_error();
    0
}

//
// === LIFECYCLE MANAGEMENT ===
//

/// Build a cascading index from `dimensions` sorted lists
///
/// # Arguments
///
/// - `keys`: Row-major `dimensions x list_len` keys; each row sorted ascending (must not be NULL)
/// - `auxiliaries`: Row-major auxiliary values of the same shape, or NULL for all zero
/// - `dimensions`: Number of lists (k, must be > 0)
/// - `list_len`: Elements per list (n, must be > 0)
/// - `unit_frac_den`: Promotion stride (must be > 1; 2 is the usual choice)
///
/// # Returns
///
/// - Non-NULL pointer on success
/// - NULL on failure (check `fc_last_error_message()`)
///
/// # Example (C)
///
/// ```c
/// int64_t keys[2][3] = {{1, 5, 9}, {2, 5, 7}};
/// FcIndex* index = fc_index_build(&keys[0][0], NULL, 2, 3, 2);
/// if (index == NULL) {
///     fprintf(stderr, "Error: %s\n", fc_last_error_message());
///     exit(1);
/// }
/// ```
///
/// # Safety
///
/// - `keys` must point to `dimensions * list_len` valid i64 values
/// - `auxiliaries` must be NULL or point to as many valid i64 values
/// - Caller must free the returned pointer with `fc_index_free()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_build(
    keys: *const i64,
    auxiliaries: *const i64,
    dimensions: size_t,
    list_len: size_t,
    unit_frac_den: size_t,
) -> *mut FcIndex {
    ffi_guard(|| {
        if keys.is_null() {
            set_last_error("Keys pointer cannot be NULL");
            return ptr::null_mut();
        }

        if dimensions == 0 || list_len == 0 {
            set_last_error("Dimensions and list length must be > 0");
            return ptr::null_mut();
        }

        let Some(total) = dimensions.checked_mul(list_len) else {
            set_last_error("dimensions * list_len overflows");
            return ptr::null_mut();
        };

        // SAFETY: Caller guarantees keys points to total valid i64 values
        let key_slice = unsafe { slice::from_raw_parts(keys, total) };
        let aux_slice = if auxiliaries.is_null() {
            None
        } else {
            // SAFETY: Caller guarantees auxiliaries points to total valid i64 values
            Some(unsafe { slice::from_raw_parts(auxiliaries, total) })
        };

        let lists: Vec<Vec<Element>> = key_slice
            .chunks(list_len)
            .enumerate()
            .map(|(dim, row)| {
                row.iter()
                    .enumerate()
                    .map(|(pos, &key)| {
                        let aux = aux_slice.map_or(0, |a| a[dim * list_len + pos]);
                        Element::new(key, aux)
                    })
                    .collect()
            })
            .collect();

        match CascadeIndex::build(lists, CascadeOptions { unit_frac_den }) {
            Ok(index) => {
                clear_last_error();
                let state = Box::new(FcIndexState { inner: index });
                Box::into_raw(state) as *mut FcIndex
            }
            Err(e) => {
                set_last_error(e);
                ptr::null_mut()
            }
        }
    })
    .unwrap_or(ptr::null_mut())
}

/// Free an index and release all resources
///
/// # Safety
///
/// - `ptr` must be NULL or a valid pointer from `fc_index_build()`
/// - After this call, `ptr` is invalid and must not be used
/// - Safe to call with NULL (no-op)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_free(ptr: *mut FcIndex) {
    if !ptr.is_null() {
        ffi_guard(|| {
            // SAFETY: Caller guarantees ptr is valid (from fc_index_build)
            let _ = unsafe { Box::from_raw(ptr as *mut FcIndexState) };
        });
    }
}

//
// === QUERIES ===
//

/// Locate `key` in every list
///
/// Writes the position of `key` in list `i` to `out_positions[i]`.
///
/// # Returns
///
/// - 0 on success
/// - -1 if `key` is missing from some list or arguments are invalid
///   (check `fc_last_error_message()`)
///
/// # Safety
///
/// - `ptr` must be non-NULL and valid
/// - `out_positions` must have space for `out_len` values, and
///   `out_len` must be at least `fc_index_dimensions(ptr)`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_locate(
    ptr: *const FcIndex,
    key: i64,
    out_positions: *mut size_t,
    out_len: size_t,
) -> c_int {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is valid (shared access)
        let Some(index) = (unsafe { index_ref(ptr) }) else {
            return -1;
        };

        if out_positions.is_null() {
            set_last_error("Null output buffer");
            return -1;
        }

        match index.locate(key) {
            // SAFETY: Caller guarantees out_positions has room for out_len values
            Ok(positions) => unsafe { write_positions(&positions, out_positions, out_len) },
            Err(e) => {
                set_last_error(e);
                -1
            }
        }
    })
    .unwrap_or(-1)
}

/// Insertion point of `key` in every list
///
/// Writes the index of the first element `>= key` in list `i` to
/// `out_positions[i]` (`list_len` if there is none). Absent keys are fine.
///
/// # Returns
///
/// - 0 on success
/// - -1 on invalid arguments (check `fc_last_error_message()`)
///
/// # Safety
///
/// Same requirements as `fc_index_locate()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_successors(
    ptr: *const FcIndex,
    key: i64,
    out_positions: *mut size_t,
    out_len: size_t,
) -> c_int {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is valid (shared access)
        let Some(index) = (unsafe { index_ref(ptr) }) else {
            return -1;
        };

        if out_positions.is_null() {
            set_last_error("Null output buffer");
            return -1;
        }

        let positions = index.successors(key);
        // SAFETY: Caller guarantees out_positions has room for out_len values
        unsafe { write_positions(&positions, out_positions, out_len) }
    })
    .unwrap_or(-1)
}

//
// === INTROSPECTION ===
//

/// Number of lists in the index, or 0 if `ptr` is NULL
///
/// # Safety
///
/// - `ptr` must be NULL or valid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_dimensions(ptr: *const FcIndex) -> size_t {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is NULL or valid
        unsafe { index_ref(ptr) }.map_or(0, CascadeIndex::dimensions)
    })
    .unwrap_or(0)
}

/// Elements per list, or 0 if `ptr` is NULL
///
/// # Safety
///
/// - `ptr` must be NULL or valid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_list_len(ptr: *const FcIndex) -> size_t {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is NULL or valid
        unsafe { index_ref(ptr) }.map_or(0, CascadeIndex::list_len)
    })
    .unwrap_or(0)
}

/// Length of promoted list `level`
///
/// # Returns
///
/// - The list length
/// - `SIZE_MAX` if `ptr` is NULL or `level >= dimensions - 1`
///
/// # Safety
///
/// - `ptr` must be NULL or valid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_index_promoted_len(ptr: *const FcIndex, level: size_t) -> size_t {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is NULL or valid
        let Some(index) = (unsafe { index_ref(ptr) }) else {
            return size_t::MAX;
        };

        match index.promoted_list(level) {
            Ok(list) => {
                clear_last_error();
                list.len()
            }
            Err(e) => {
                set_last_error(e);
                size_t::MAX
            }
        }
    })
    .unwrap_or(size_t::MAX)
}

//
// === ERROR HANDLING ===
//

/// Get the last error message for the current thread
///
/// # Returns
///
/// - Pointer to NULL-terminated error string
/// - NULL if no error occurred
///
/// # Lifetime
///
/// The returned pointer is valid until the next FFI call on this thread.
/// **Do NOT** free the returned pointer.
#[unsafe(no_mangle)]
pub extern "C" fn fc_last_error_message() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ref().map_or(ptr::null(), |s| s.as_ptr()))
}

//
// === VERSIONING ===
//

/// Get the library version as a NULL-terminated string
///
/// The returned pointer is valid for the lifetime of the program.
#[unsafe(no_mangle)]
pub extern "C" fn fc_version() -> *const c_char {
    // concat! appends the null terminator required by C
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

    VERSION.as_ptr() as *const c_char
}

//
// === TESTS ===
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn last_error() -> String {
        let ptr = fc_last_error_message();
        assert!(!ptr.is_null(), "expected an error message");
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    #[test]
    fn test_ffi_lifecycle() {
        let keys: [i64; 9] = [1, 5, 9, 2, 5, 7, 5, 6, 8];
        let ptr = unsafe { fc_index_build(keys.as_ptr(), ptr::null(), 3, 3, 2) };
        assert!(!ptr.is_null(), "Failed to build index");

        let mut positions = [0usize; 3];
        let rc = unsafe { fc_index_locate(ptr, 5, positions.as_mut_ptr(), positions.len()) };
        assert_eq!(rc, 0);
        assert_eq!(positions, [1, 1, 0]);

        let rc = unsafe { fc_index_successors(ptr, 6, positions.as_mut_ptr(), positions.len()) };
        assert_eq!(rc, 0);
        assert_eq!(positions, [2, 2, 1]);

        unsafe { fc_index_free(ptr) };
    }

    #[test]
    fn test_ffi_null_safety() {
        let ptr = unsafe { fc_index_build(ptr::null(), ptr::null(), 2, 2, 2) };
        assert!(ptr.is_null());

        let mut positions = [0usize; 2];
        let rc = unsafe { fc_index_locate(ptr::null(), 1, positions.as_mut_ptr(), 2) };
        assert_eq!(rc, -1);
        assert!(last_error().contains("Null index pointer"));

        assert_eq!(unsafe { fc_index_dimensions(ptr::null()) }, 0);
        assert_eq!(unsafe { fc_index_promoted_len(ptr::null(), 0) }, size_t::MAX);

        unsafe { fc_index_free(ptr::null_mut()) };
    }

    #[test]
    fn test_ffi_rejects_bad_stride() {
        let keys: [i64; 4] = [1, 2, 3, 4];
        let ptr = unsafe { fc_index_build(keys.as_ptr(), ptr::null(), 2, 2, 1) };

        assert!(ptr.is_null());
        assert!(last_error().contains("greater than 1"));
    }

    #[test]
    fn test_ffi_rejects_unsorted_row() {
        let keys: [i64; 4] = [1, 2, 4, 3];
        let ptr = unsafe { fc_index_build(keys.as_ptr(), ptr::null(), 2, 2, 2) };

        assert!(ptr.is_null());
        assert!(last_error().contains("not sorted"));
    }

    #[test]
    fn test_ffi_missing_key_and_small_buffer() {
        let keys: [i64; 6] = [1, 3, 5, 2, 3, 6];
        let ptr = unsafe { fc_index_build(keys.as_ptr(), ptr::null(), 2, 3, 2) };
        assert!(!ptr.is_null());

        let mut positions = [0usize; 2];
        let rc = unsafe { fc_index_locate(ptr, 5, positions.as_mut_ptr(), 2) };
        assert_eq!(rc, -1);
        assert!(last_error().contains("absent from dimension 1"));

        let rc = unsafe { fc_index_locate(ptr, 3, positions.as_mut_ptr(), 1) };
        assert_eq!(rc, -1);
        assert!(last_error().contains("too small"));

        let rc = unsafe { fc_index_locate(ptr, 3, positions.as_mut_ptr(), 2) };
        assert_eq!(rc, 0);
        assert_eq!(positions, [1, 1]);
        assert!(fc_last_error_message().is_null());

        unsafe { fc_index_free(ptr) };
    }

    #[test]
    fn test_ffi_introspection() {
        let keys: [i64; 12] = [1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4];
        let aux: [i64; 12] = [0; 12];
        let ptr = unsafe { fc_index_build(keys.as_ptr(), aux.as_ptr(), 3, 4, 2) };
        assert!(!ptr.is_null());

        assert_eq!(unsafe { fc_index_dimensions(ptr) }, 3);
        assert_eq!(unsafe { fc_index_list_len(ptr) }, 4);
        // 4 + ceil(4/2), then 4 + ceil(6/2)
        assert_eq!(unsafe { fc_index_promoted_len(ptr, 1) }, 6);
        assert_eq!(unsafe { fc_index_promoted_len(ptr, 0) }, 7);
        assert_eq!(unsafe { fc_index_promoted_len(ptr, 2) }, size_t::MAX);
        assert!(last_error().contains("out of range"));

        unsafe { fc_index_free(ptr) };
    }

    #[test]
    fn test_ffi_auxiliaries_are_row_major() {
        let keys: [i64; 12] = [1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4];
        let aux: Vec<i64> = (0..12).map(|i| 100 * (i / 4) + i % 4).collect();
        let ptr = unsafe { fc_index_build(keys.as_ptr(), aux.as_ptr(), 3, 4, 2) };
        assert!(!ptr.is_null());

        let index = unsafe { index_ref(ptr) }.unwrap();
        for dim in 0..3 {
            for pos in 0..4 {
                let element = index.element(dim, pos).unwrap();
                assert_eq!(element.key(), pos as i64 + 1);
                assert_eq!(element.auxiliary(), 100 * dim as i64 + pos as i64, "dim {dim} pos {pos}");
            }
        }
        unsafe { fc_index_free(ptr) };

        // NULL auxiliaries default to zero
        let ptr = unsafe { fc_index_build(keys.as_ptr(), ptr::null(), 3, 4, 2) };
        let index = unsafe { index_ref(ptr) }.unwrap();
        assert!(index.base_lists().iter().flatten().all(|e| e.auxiliary() == 0));
        unsafe { fc_index_free(ptr) };
    }

    #[test]
    fn test_ffi_version() {
        let version = unsafe { CStr::from_ptr(fc_version()) };
        assert_eq!(version.to_string_lossy(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_ffi_error_thread_local() {
        use std::thread;

        set_last_error("Main thread error");
        assert_eq!(last_error(), "Main thread error");

        let handle = thread::spawn(|| {
            assert!(fc_last_error_message().is_null(), "New thread should have no error");

            set_last_error("Spawned thread error");
            assert_eq!(last_error(), "Spawned thread error");
        });

        handle.join().unwrap();

        assert_eq!(last_error(), "Main thread error");
    }
}
