//! Special-item activation cascades
//!
//! Turns an [`AnalysisResult`] into concrete board changes: promotions are
//! written in place, then every activation is expanded breadth-first until
//! no unprocessed special remains inside a blast.

use std::collections::HashSet;

use serde::Serialize;

use super::analyze::{Activation, AnalysisResult, effect_cells};
use super::cells::{CellSet, Position};
use super::grid::Grid;
use super::token::SpecialKind;
use crate::consts::CELLS;

/// Wave cap; a cascade can never need more waves than there are cells
pub const MAX_CASCADE_WAVES: usize = CELLS;

/// A resolved chain reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cascade {
    /// Every special that went off, trigger first
    pub activations: Vec<Activation>,
    /// Cells to clear once the activation phase is over
    pub clear: CellSet,
    /// Breadth-first waves it took to reach the fixpoint
    pub waves: usize,
}

/// What a resolution pass decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// At least one special went off; clearing is deferred
    Activating(Cascade),
    /// Plain matches only
    Matching(CellSet),
    /// Specials were created but nothing is left to clear
    Promoted,
    Nothing,
}

impl Resolution {
    /// Whether the pass changed the board or started a phase
    pub fn acted(&self) -> bool {
        !matches!(self, Resolution::Nothing)
    }
}

/// Apply promotions and expand activations.
///
/// `trigger` is a cell the player clicked; if it holds a special that is not
/// already going off it is prepended to the activation list.
pub fn resolve(grid: &mut Grid, analysis: &AnalysisResult, trigger: Option<Position>) -> Resolution {
    let mut clear = analysis.clear;
    let mut promoted = false;

    for spawn in &analysis.create {
        if let Some(token) = grid.get_mut(spawn.pos) {
            token.shape = spawn.original.shape;
            token.special = Some(spawn.kind);
            clear.remove(spawn.pos);
            promoted = true;
        }
    }

    let mut all = analysis.activate.clone();
    if let Some(pos) = trigger {
        if let Some(token) = grid.get(pos).copied() {
            if let Some(kind) = token.special {
                if !all.iter().any(|a| a.pos == pos) {
                    all.insert(
                        0,
                        Activation {
                            pos,
                            kind,
                            effect: effect_cells(grid, pos, kind),
                            original: token,
                        },
                    );
                }
            }
        }
    }

    let mut done: HashSet<(Position, SpecialKind)> = HashSet::new();
    let mut wave = all.clone();
    let mut waves = 0;
    while !wave.is_empty() && waves < MAX_CASCADE_WAVES {
        waves += 1;
        let mut next: Vec<Activation> = Vec::new();
        for activation in &wave {
            if !done.insert((activation.pos, activation.kind)) {
                continue;
            }
            clear.insert(activation.pos);
            for pos in activation.effect.iter() {
                clear.insert(pos);
                let Some(token) = grid.get(pos).copied() else {
                    continue;
                };
                let Some(kind) = token.special else {
                    continue;
                };
                if done.contains(&(pos, kind)) || next.iter().any(|n| n.pos == pos && n.kind == kind) {
                    continue;
                }
                let chained = Activation {
                    pos,
                    kind,
                    effect: effect_cells(grid, pos, kind),
                    original: token,
                };
                next.push(chained);
                if !all.iter().any(|a| a.pos == pos && a.kind == kind) {
                    all.push(chained);
                }
            }
        }
        wave = next;
    }
    if !wave.is_empty() {
        log::warn!("cascade stopped at the wave cap with {} pending", wave.len());
    }

    if !done.is_empty() {
        let activations: Vec<Activation> = all
            .into_iter()
            .filter(|a| done.contains(&(a.pos, a.kind)))
            .collect();
        log::debug!(
            "cascade: {} activations over {} waves, {} cells",
            activations.len(),
            waves,
            clear.len()
        );
        return Resolution::Activating(Cascade {
            activations,
            clear,
            waves,
        });
    }
    if !clear.is_empty() {
        return Resolution::Matching(clear);
    }
    if promoted {
        Resolution::Promoted
    } else {
        Resolution::Nothing
    }
}
