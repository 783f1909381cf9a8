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

use std::{env, fs, io::Write, path::Path};

use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use super::path::expand_path;
use crate::Result;

/// Map a `-v` occurrence count to a log level, and build the logger config.
/// `LOG_TARGETS` can hold a comma separated list of targets to allow,
/// or to ignore when prefixed with `!`.
pub fn log_config(verbosity_level: u64) -> Result<(LevelFilter, Config)> {
    let log_level = match verbosity_level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_config = match env::var("LOG_TARGETS") {
        Ok(x) => {
            let mut cfgbuilder = ConfigBuilder::new();
            for target in x.split(',').map(|t| t.trim()).filter(|t| !t.is_empty()) {
                match target.strip_prefix('!') {
                    Some(ignored) => cfgbuilder.add_filter_ignore(ignored.to_string()),
                    None => cfgbuilder.add_filter_allow(target.to_string()),
                };
            }
            cfgbuilder.build()
        }
        Err(_) => ConfigBuilder::new().build(),
    };

    Ok((log_level, log_config))
}

/// Initialize the terminal logger, plus a file logger when `log_path` is given.
pub fn init_logger(verbosity_level: u64, log_path: Option<&str>) -> Result<()> {
    let (lvl, cfg) = log_config(verbosity_level)?;

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![TermLogger::new(lvl, cfg.clone(), TerminalMode::Mixed, ColorChoice::Auto)];

    if let Some(log_path) = log_path {
        let log_path = expand_path(log_path)?;
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;
        loggers.push(WriteLogger::new(lvl, cfg, file));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Write `contents` to the config file at `path` unless it already exists.
/// Returns `true` when the file was created.
pub fn spawn_config(path: &Path, contents: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false)
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    Ok(true)
}
