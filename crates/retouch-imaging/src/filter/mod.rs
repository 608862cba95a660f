// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter module: brightness, contrast, grayscale, sepia and box blur.

pub mod blur;
pub mod pipeline;

pub use pipeline::FilterPipeline;
