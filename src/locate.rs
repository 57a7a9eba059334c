// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Search for terminfo database file for the terminal

use std::{
    env,
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::decode::{self, Terminfo};

const TERMINFO_DIRS: &[&str] = &[
    "/etc/terminfo",
    "/lib/terminfo",
    "/usr/share/terminfo",
    "/usr/lib/terminfo",
    "/boot/system/data/terminfo", // haiku
];

/// Errors reported when looking for a terminfo database file
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The name of the terminal is empty
    #[error("Empty terminal name")]
    EmptyTermName,
    /// Terminfo file for the terminal could not be found
    #[error("File not found")]
    FileNotFound,
    /// The terminfo directory does not exist
    #[error("Database directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Errors reported when loading a terminfo entry from disk
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Locate(#[from] Error),
    #[error("Cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: decode::Error,
    },
}

/// Candidate paths for the terminal within one directory
fn candidates(term_name: &OsStr, dir: &Path) -> Result<[PathBuf; 2], Error> {
    let Some(first_byte) = term_name.as_encoded_bytes().first() else {
        return Err(Error::EmptyTermName);
    };

    // Standard layout - leaf directories use the first character of the terminal name.
    let first_char = *first_byte as char;
    let standard = dir.join(first_char.to_string()).join(term_name);

    // Layout for systems with non-case-sensitive filesystems (MacOS, Windows) - leaf
    // directories use the first byte of the terminal name in hexadecimal form.
    let first_byte_hex = format!("{:02x}", *first_byte);
    let hex = dir.join(first_byte_hex).join(term_name);

    Ok([standard, hex])
}

fn find_in_directory(term_name: &OsStr, dir: &Path) -> Result<PathBuf, Error> {
    candidates(term_name, dir)?
        .into_iter()
        .find(|filename| filename.exists())
        .ok_or(Error::FileNotFound)
}

/// Returns all directories that are searched for terminfo files
///
/// This function does not attempt to verify if the directories to be searched actually exist.
///
/// Returns a vector of directories.
pub fn search_directories() -> Vec<PathBuf> {
    let mut search_dirs = vec![];

    // Lazily evaluated iterator, consumed at most once.
    let mut default_dirs = TERMINFO_DIRS.iter().map(PathBuf::from);

    // Search the directory from the `TERMINFO` environment variable.
    if let Ok(dir) = env::var("TERMINFO") {
        search_dirs.push(PathBuf::from(&dir));
    }

    // Search `.terminfo` in the home directory.
    if let Some(home_dir) = env::home_dir() {
        let dir = home_dir.join(".terminfo");
        search_dirs.push(dir);
    }

    // Search colon separated directories from the `TERMINFO_DIRS`
    // environment variable.
    if let Ok(dirs) = env::var("TERMINFO_DIRS") {
        for dir in dirs.split(':') {
            if dir.is_empty() {
                // Empty directory means search the default locations.
                search_dirs.extend(&mut default_dirs);
            } else {
                search_dirs.push(PathBuf::from(dir));
            }
        }
    }

    // Search default terminfo locations (nothing is added if used already).
    search_dirs.extend(&mut default_dirs);

    search_dirs
}

/// Find terminfo database file for the terminal name
///
/// # Arguments
///
/// * `term_name` - terminal name.
///
/// Returns the file path if it exist, an error otherwise.
pub fn locate(term_name: impl AsRef<OsStr>) -> Result<PathBuf, Error> {
    for dir in search_directories() {
        match find_in_directory(term_name.as_ref(), &dir) {
            Ok(file) => return Ok(file),
            Err(Error::FileNotFound) => trace!(dir = %dir.display(), "not found"),
            Err(err) => return Err(err),
        }
    }

    Err(Error::FileNotFound)
}

/// Read and decode a terminfo file, attaching its path to the entry
pub fn load_file(path: impl AsRef<Path>) -> Result<Terminfo, LoadError> {
    let path = path.as_ref();
    let buffer = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let terminfo = decode::decode(&buffer).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded terminfo file");
    Ok(terminfo.with_file(path))
}

/// Load the entry for the terminal from one terminfo directory
pub fn open(dir: impl AsRef<Path>, term_name: impl AsRef<OsStr>) -> Result<Terminfo, LoadError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()).into());
    }
    load_file(find_in_directory(term_name.as_ref(), dir)?)
}

/// Load the entry for the terminal from the first directory that has it
pub fn load(term_name: impl AsRef<OsStr>) -> Result<Terminfo, LoadError> {
    load_file(locate(term_name)?)
}

/// Load the entry for the terminal named by the `TERM` environment variable
pub fn load_from_env() -> Result<Terminfo, LoadError> {
    let term_name = env::var_os("TERM").unwrap_or_default();
    load(term_name)
}
