// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outcrop Pipeline — runs rounds of plan → composite → fill → normalise, each
// round reading the file the previous one wrote.

pub mod naming;
pub mod orchestrator;
pub mod round;

pub use naming::RoundNaming;
pub use orchestrator::{CancelFlag, Orchestrator};
pub use round::{RoundSettings, run_round};
