// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    FPath,
    FileSz,
};

/// File name extension of a legacy event log, compared case-insensitively.
pub const EVT_EXTENSION: &str = "evt";

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    let mut riter = path.rsplit(std::path::MAIN_SEPARATOR);

    FPath::from(riter.next().unwrap_or(""))
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &std::path::Path {
    std::path::Path::new(path)
}

/// Return the size of the file.
pub fn path_filesz(path: &std::path::Path) -> Option<FileSz> {
    defn!("({:?})", path);
    let metadata = match std::fs::metadata(path) {
        Ok(val) => val,
        Err(_err) => {
            defx!("error {}, return None", _err);
            return None;
        }
    };
    let len: FileSz = metadata.len();
    defx!("return {}", len);

    Some(len)
}

/// Does the file name end with `.evt` (any case)?
pub fn is_evt_path(path: &std::path::Path) -> bool {
    match path.extension() {
        Some(ext) => ext
            .to_string_lossy()
            .eq_ignore_ascii_case(EVT_EXTENSION),
        None => false,
    }
}
