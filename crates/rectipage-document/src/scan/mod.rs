// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page pipeline — straighten a photographed page from its corners, crop,
// and export.

pub mod rectify;

pub use rectify::DocumentRectifier;
