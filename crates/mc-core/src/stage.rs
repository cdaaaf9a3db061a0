//! Stage index resolution and the progress bar derived from it.

use crate::types::Stage;
use serde::Serialize;
use std::str::FromStr;

/// Colour of segments that have not been reached yet.
pub const PENDING_COLOR: &str = "#374151";

/// Position of a stage value in the fixed stage sequence.
///
/// `NotFound` compares unequal to every valid position, including 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum StageIndex {
    At(usize),
    NotFound,
}

impl StageIndex {
    pub fn position(self) -> Option<usize> {
        match self {
            StageIndex::At(i) => Some(i),
            StageIndex::NotFound => None,
        }
    }

    pub fn stage(self) -> Option<Stage> {
        self.position().and_then(|i| Stage::all().get(i).copied())
    }
}

/// Resolve a raw stage value to its zero-based position (exact match only).
pub fn resolve(raw: &str) -> StageIndex {
    match Stage::from_str(raw) {
        Ok(stage) => StageIndex::At(stage.index()),
        Err(_) => StageIndex::NotFound,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentState {
    Reached,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub stage: Stage,
    pub state: SegmentState,
    pub color: &'static str,
}

/// One segment per stage plus the "N/6 stages" label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub index: StageIndex,
    pub segments: Vec<Segment>,
    pub label: String,
}

impl StageProgress {
    pub fn for_stage(raw: &str) -> Self {
        let index = resolve(raw);
        let total = Stage::all().len();
        let current = index.stage();

        let segments = Stage::all()
            .iter()
            .map(|&stage| {
                let reached = index.position().is_some_and(|at| stage.index() <= at);
                Segment {
                    stage,
                    state: if reached {
                        SegmentState::Reached
                    } else {
                        SegmentState::Pending
                    },
                    color: match (reached, current) {
                        (true, Some(cur)) => cur.color(),
                        _ => PENDING_COLOR,
                    },
                }
            })
            .collect();

        let label = match index {
            StageIndex::At(at) => format!("{}/{total} stages", at + 1),
            StageIndex::NotFound => "unknown stage".to_string(),
        };

        Self {
            index,
            segments,
            label,
        }
    }

    pub fn reached(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.state == SegmentState::Reached)
            .count()
    }
}
