// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Error types
//!
//! Only setup paths (loading scripts, parsing configuration and level
//! files) can fail. Per-tick work never returns an error: missing
//! components and script faults are skipped and logged instead.

use thiserror::Error;

/// Errors raised while configuring or loading a simulation
#[derive(Error, Debug)]
pub enum EngineError {
    /// A script file could not be read
    #[error("failed to read script '{name}': {source}")]
    ScriptLoad {
        /// Script slot or file name
        name: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A script failed to compile or lacks its update routine
    #[error("failed to compile script '{name}': {message}")]
    ScriptCompile {
        /// Script slot or file name
        name: String,
        /// Interpreter diagnostic
        message: String,
    },

    /// A script requires a host API this build does not provide
    #[error("script '{name}' requires host API {required}, host provides {host}")]
    IncompatibleScriptApi {
        /// Script slot or file name
        name: String,
        /// Version requested by the script
        required: String,
        /// Version implemented by the host
        host: String,
    },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generic I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A level or configuration document is not valid TOML for its schema
    #[error("failed to parse document: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for setup operations
pub type Result<T> = std::result::Result<T, EngineError>;
