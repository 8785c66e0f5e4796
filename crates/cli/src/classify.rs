// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Positional comparison of a fresh result against its baseline.
//!
//! Sections are compared pairwise by position. Every discrepancy found,
//! whether the output grew, shrank, changed content or changed exit status,
//! currently marks the change as unacceptable.

use regrun_capture::{Section, TestResult};

/// One positional difference between a baseline and a fresh result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discrepancy {
    /// There was no baseline and the run failed.
    NoBaseline { status: i32 },
    /// The fresh output has a section past the end of the baseline.
    Extended { section: Section },
    /// The baseline has a section past the end of the fresh output.
    Lost { section: Section },
    /// Both have a section at this position but they differ.
    Differs { old: Section, new: Section },
    /// The exit status changed.
    StatusChanged { from: i32, to: i32 },
}

impl Discrepancy {
    /// Whether this discrepancy alone would be tolerated.
    ///
    /// No discrepancy is tolerated yet; growth and loss are kept as distinct
    /// variants so a tolerance policy can tell them apart later.
    pub fn is_acceptable(&self) -> bool {
        match self {
            Discrepancy::NoBaseline { .. }
            | Discrepancy::Extended { .. }
            | Discrepancy::Lost { .. }
            | Discrepancy::Differs { .. }
            | Discrepancy::StatusChanged { .. } => false,
        }
    }
}

/// Outcome of comparing one test file's fresh result to its baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub passed: bool,
    pub changed: bool,
    pub discrepancies: Vec<Discrepancy>,
}

impl Classification {
    /// True when every recorded discrepancy is acceptable.
    pub fn acceptable(&self) -> bool {
        self.discrepancies.iter().all(Discrepancy::is_acceptable)
    }
}

/// Classify `fresh` against `baseline`.
pub fn classify(fresh: &TestResult, baseline: Option<&TestResult>) -> Classification {
    let passed = fresh.succeeded();

    let Some(baseline) = baseline else {
        let discrepancies = if passed {
            Vec::new()
        } else {
            vec![Discrepancy::NoBaseline {
                status: fresh.status,
            }]
        };
        return Classification {
            passed,
            changed: !passed,
            discrepancies,
        };
    };

    if fresh == baseline {
        return Classification {
            passed,
            changed: false,
            discrepancies: Vec::new(),
        };
    }

    let len = fresh.sections.len().max(baseline.sections.len());
    let mut discrepancies: Vec<Discrepancy> = (0..len)
        .filter_map(
            |i| match (baseline.sections.get(i), fresh.sections.get(i)) {
                (Some(old), Some(new)) if old == new => None,
                (None, Some(new)) => Some(Discrepancy::Extended {
                    section: new.clone(),
                }),
                (Some(old), None) => Some(Discrepancy::Lost {
                    section: old.clone(),
                }),
                (Some(old), Some(new)) => Some(Discrepancy::Differs {
                    old: old.clone(),
                    new: new.clone(),
                }),
                (None, None) => None,
            },
        )
        .collect();

    if fresh.status != baseline.status {
        discrepancies.push(Discrepancy::StatusChanged {
            from: baseline.status,
            to: fresh.status,
        });
    }

    Classification {
        passed,
        changed: true,
        discrepancies,
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
