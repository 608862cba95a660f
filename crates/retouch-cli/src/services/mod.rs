// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer. Builds the editing engine from configuration and bridges
// it to the command handlers.

pub mod config_dir;
pub mod editor;
