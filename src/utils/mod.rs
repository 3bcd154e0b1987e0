// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Console helpers shared by the CLI and the executor

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
