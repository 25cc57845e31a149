// src/readers/filepreprocessor.rs

//! Functions to find `.evt` files among user-passed paths before a
//! [`ParseController`] is created for each.
//!
//! [`ParseController`]: crate::readers::parsecontroller::ParseController

use std::path::Path;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::FPath;
use crate::readers::helpers::{
    is_evt_path,
    path_to_fpath,
};

/// Initial path processing return type.
#[derive(Debug, Eq, PartialEq)]
pub enum ProcessPathResult {
    /// File can be processed.
    FileValid(FPath),
    /// File found while walking a directory that is not an `.evt` file.
    FileErrNotSupported(FPath),
    /// Path exists and is not a file or directory.
    FileErrNotAFile(FPath),
    /// Path does not exist.
    FileErrNotExist(FPath),
}

pub type ProcessPathResults = Vec<ProcessPathResult>;

/// Return the files to process for a user-passed `path`.
///
/// A path to a plain file is always returned as `FileValid`, whatever its
/// name; the user asked for it. A directory is walked recursively and
/// only files named `*.evt` are `FileValid`.
pub fn process_path(path: &FPath) -> ProcessPathResults {
    defn!("({:?})", path);

    let std_path: &Path = Path::new(path);
    if std_path.is_file() {
        defx!("({:?}) is a file", path);
        return vec![ProcessPathResult::FileValid(path.clone())];
    }
    if !std_path.exists() {
        defx!("({:?}) does not exist", path);
        return vec![ProcessPathResult::FileErrNotExist(path.clone())];
    }
    if !std_path.is_dir() {
        defx!("({:?}) not a file or directory", path);
        return vec![ProcessPathResult::FileErrNotAFile(path.clone())];
    }

    let mut paths: ProcessPathResults = ProcessPathResults::new();

    defo!("WalkDir({:?})…", path);
    for entry in walkdir::WalkDir::new(path.as_str())
        .follow_links(true)
        .sort_by_file_name()
        .same_file_system(true)
    {
        let path_entry = match entry {
            Ok(val) => val,
            Err(_err) => {
                defo!("Err({:?})", _err);
                continue;
            }
        };
        let std_path_entry: &Path = path_entry.path();
        let fpath_entry: FPath = path_to_fpath(std_path_entry);
        if path_entry.file_type().is_dir() {
            continue;
        }
        if !path_entry.file_type().is_file() {
            defo!("not a file {:?}", fpath_entry);
            paths.push(ProcessPathResult::FileErrNotAFile(fpath_entry));
            continue;
        }
        match is_evt_path(std_path_entry) {
            true => paths.push(ProcessPathResult::FileValid(fpath_entry)),
            false => paths.push(ProcessPathResult::FileErrNotSupported(fpath_entry)),
        }
    }
    defx!("return {:?}", paths);

    paths
}
