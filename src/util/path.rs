/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2025 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    env,
    ffi::{CStr, OsStr},
    mem::MaybeUninit,
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
    ptr,
};

use crate::{Error, Result};

/// Name of the directory inside the config dir holding our files
const CONFIG_SUBDIR: &str = "nftdao";

/// Upper bound for the passwd entry buffer
const PASSWD_BUF_MAX: usize = 1 << 20;

/// The current user's home directory. `$HOME` when set and non-empty,
/// otherwise the directory of the user's passwd entry.
pub fn home_dir() -> Option<PathBuf> {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => passwd_home(),
    }
}

fn passwd_home() -> Option<PathBuf> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];

    loop {
        let mut entry = MaybeUninit::<libc::passwd>::zeroed();
        let mut result: *mut libc::passwd = ptr::null_mut();

        // SAFETY: `buf` outlives the call and its length is passed along.
        // On success `result` points into `entry`, whose strings live in `buf`.
        let ret = unsafe {
            libc::getpwuid_r(libc::getuid(), entry.as_mut_ptr(), buf.as_mut_ptr(), buf.len(), &mut result)
        };

        match ret {
            0 if result.is_null() => return None,
            0 => {
                // SAFETY: see above, `pw_dir` is NUL-terminated inside `buf`
                let dir = unsafe { CStr::from_ptr((*result).pw_dir) }.to_bytes();
                if dir.is_empty() {
                    return None
                }
                return Some(PathBuf::from(OsStr::from_bytes(dir)))
            }
            libc::ERANGE if buf.len() < PASSWD_BUF_MAX => buf.resize(buf.len() * 2, 0),
            _ => return None,
        }
    }
}

/// `$XDG_CONFIG_HOME` if it is an absolute path, else `~/.config`.
pub fn config_dir() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| home_dir().map(|h| h.join(".config")))
}

/// Expand a leading `~` of the given path to the user's home directory.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    if let Some(remains) = path.strip_prefix("~/") {
        let Some(homedir) = home_dir() else { return Err(Error::HomeDirNotFound) };
        return Ok(homedir.join(remains))
    }

    if path == "~" {
        return home_dir().ok_or(Error::HomeDirNotFound)
    }

    Ok(PathBuf::from(path))
}

/// Join a path with `config_dir()/nftdao`.
pub fn join_config_path(file: &Path) -> Result<PathBuf> {
    Ok(config_dir().unwrap_or_default().join(CONFIG_SUBDIR).join(file))
}

/// Use the given config path argument if any, otherwise the `fallback`
/// file name inside our config directory.
pub fn get_config_path(arg: Option<String>, fallback: &str) -> Result<PathBuf> {
    if let Some(a) = arg {
        expand_path(&a)
    } else {
        join_config_path(&PathBuf::from(fallback))
    }
}
