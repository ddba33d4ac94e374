// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media, frames, labels and project files.

pub mod extract;
pub mod labels;
pub mod media;
pub mod pipeline;
pub mod serialization;
pub mod store;
