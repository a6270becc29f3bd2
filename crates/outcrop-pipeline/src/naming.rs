// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Round output filenames.
//
// Indices are zero-padded to the digit count of the round total, so a plain
// lexicographic listing of the output directory is in round order.

use std::path::{Path, PathBuf};

/// Where each round reads from and writes to.
#[derive(Debug, Clone)]
pub struct RoundNaming {
    dir: PathBuf,
    prefix: String,
    extension: String,
    width: usize,
}

impl RoundNaming {
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
        rounds: u32,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            width: digit_count(rounds),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<prefix>-<padded index>.<extension>`.
    pub fn file_name(&self, index: u32) -> String {
        format!(
            "{}-{:0width$}.{}",
            self.prefix,
            index,
            self.extension,
            width = self.width
        )
    }

    pub fn path(&self, index: u32) -> PathBuf {
        self.dir.join(self.file_name(index))
    }

    /// Round 0 reads `initial`; round `i > 0` reads what round `i - 1` wrote.
    pub fn input_for_round(&self, round: u32, initial: &Path) -> PathBuf {
        if round == 0 {
            initial.to_path_buf()
        } else {
            self.path(round)
        }
    }

    /// Round `i` writes index `i + 1`.
    pub fn output_for_round(&self, round: u32) -> PathBuf {
        self.path(round + 1)
    }
}

/// Decimal digits in `n`.
pub fn digit_count(n: u32) -> usize {
    n.to_string().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_follows_round_total() {
        assert_eq!(RoundNaming::new(".", "out", "jpg", 9).file_name(1), "out-1.jpg");
        assert_eq!(RoundNaming::new(".", "out", "jpg", 10).file_name(1), "out-01.jpg");
        assert_eq!(RoundNaming::new(".", "out", "jpg", 100).file_name(1), "out-001.jpg");
        assert_eq!(RoundNaming::new(".", "out", "jpg", 100).file_name(100), "out-100.jpg");
    }

    #[test]
    fn lexicographic_order_is_round_order() {
        for rounds in [1, 9, 10, 99, 100, 1000, 12345] {
            let naming = RoundNaming::new(".", "out", "jpg", rounds);
            let names: Vec<String> = (0..=rounds).map(|i| naming.file_name(i)).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted, "rounds = {rounds}");
        }
    }

    #[test]
    fn rounds_chain_through_files() {
        let naming = RoundNaming::new("/tmp/run", "out", "jpg", 100);
        let initial = Path::new("brussels.jpg");

        assert_eq!(naming.input_for_round(0, initial), PathBuf::from("brussels.jpg"));
        assert_eq!(naming.output_for_round(0), PathBuf::from("/tmp/run/out-001.jpg"));
        for round in 1..100 {
            assert_eq!(
                naming.input_for_round(round, initial),
                naming.output_for_round(round - 1)
            );
        }
    }

    #[test]
    fn digit_counts() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(7), 1);
        assert_eq!(digit_count(42), 2);
        assert_eq!(digit_count(u32::MAX), 10);
    }
}
