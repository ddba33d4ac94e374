// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for projects, classes and annotations.

pub mod annotation;
pub mod project;
