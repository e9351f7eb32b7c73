//! Pattern definitions and the validated catalog.

use crate::constants::{CARD_DIM, FREE_CELL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A cell coordinate as `(row, col)`.
pub type CellCoord = (usize, usize);

/// The closed set of pattern names the hall can run games under.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    AnyHorizontal,
    AnyVertical,
    AnyDiagonal,
    FourCorners,
    InnerCorners,
    Cross,
    LetterX,
    Frame,
    FullHouse,
    FreeSpace,
    AnyLine,
    DoubleLine,
}

impl PatternKind {
    pub const ALL: [PatternKind; 12] = [
        Self::AnyHorizontal,
        Self::AnyVertical,
        Self::AnyDiagonal,
        Self::FourCorners,
        Self::InnerCorners,
        Self::Cross,
        Self::LetterX,
        Self::Frame,
        Self::FullHouse,
        Self::FreeSpace,
        Self::AnyLine,
        Self::DoubleLine,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::AnyHorizontal => "any_horizontal",
            Self::AnyVertical => "any_vertical",
            Self::AnyDiagonal => "any_diagonal",
            Self::FourCorners => "four_corners",
            Self::InnerCorners => "inner_corners",
            Self::Cross => "cross",
            Self::LetterX => "letter_x",
            Self::Frame => "frame",
            Self::FullHouse => "full_house",
            Self::FreeSpace => "free_space",
            Self::AnyLine => "any_line",
            Self::DoubleLine => "double_line",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PatternError::UnknownPattern(s.to_string()))
    }
}

/// Pattern-related errors.
#[derive(Debug, Error)]
pub enum PatternError {
    /// Name does not match any catalog pattern
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// Pattern selected for a game is not in the running catalog
    #[error("pattern {0} is not defined in this catalog")]
    NotInCatalog(PatternKind),

    /// A definition references a cell outside the card
    #[error("pattern {kind}: cell ({row},{col}) is outside the {dim}x{dim} card")]
    CellOutOfBounds {
        kind: PatternKind,
        row: usize,
        col: usize,
        dim: usize,
    },

    /// A definition carries no coordinate sets, or an empty set
    #[error("pattern {0} has an empty coordinate set")]
    EmptyDefinition(PatternKind),

    /// A kind is defined both as a simple pattern and a meta-pattern
    #[error("pattern {0} is defined twice")]
    DuplicateDefinition(PatternKind),

    /// Meta-pattern member is not a simple pattern in the catalog
    #[error("meta-pattern {kind}: member {member} is not a simple pattern here")]
    UnknownMember {
        kind: PatternKind,
        member: PatternKind,
    },

    /// Meta-pattern K is zero or exceeds the member count
    #[error("meta-pattern {kind}: required {required} of {members} members")]
    InvalidRequiredCount {
        kind: PatternKind,
        required: usize,
        members: usize,
    },
}

/// A simple pattern: satisfied when any one coordinate set is fully
/// marked on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub kind: PatternKind,
    pub cell_sets: Vec<Vec<CellCoord>>,
}

/// A meta-pattern: satisfied when at least `required` distinct member
/// patterns are independently satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPatternDefinition {
    pub kind: PatternKind,
    pub required: usize,
    pub members: Vec<PatternKind>,
}

/// The set of patterns a hall runs games under, validated against the
/// card shape at construction.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    simple: BTreeMap<PatternKind, PatternDefinition>,
    meta: BTreeMap<PatternKind, MetaPatternDefinition>,
}

impl PatternCatalog {
    /// Build a catalog from definitions, validating every shape.
    pub fn new(
        simple: Vec<PatternDefinition>,
        meta: Vec<MetaPatternDefinition>,
    ) -> Result<Self, PatternError> {
        let mut simple_map = BTreeMap::new();
        for def in simple {
            if def.cell_sets.is_empty() || def.cell_sets.iter().any(Vec::is_empty) {
                return Err(PatternError::EmptyDefinition(def.kind));
            }
            for set in &def.cell_sets {
                for &(row, col) in set {
                    if row >= CARD_DIM || col >= CARD_DIM {
                        return Err(PatternError::CellOutOfBounds {
                            kind: def.kind,
                            row,
                            col,
                            dim: CARD_DIM,
                        });
                    }
                }
            }
            let kind = def.kind;
            if simple_map.insert(kind, def).is_some() {
                return Err(PatternError::DuplicateDefinition(kind));
            }
        }

        let mut meta_map = BTreeMap::new();
        for def in meta {
            if simple_map.contains_key(&def.kind) {
                return Err(PatternError::DuplicateDefinition(def.kind));
            }
            if def.required == 0 || def.required > def.members.len() {
                return Err(PatternError::InvalidRequiredCount {
                    kind: def.kind,
                    required: def.required,
                    members: def.members.len(),
                });
            }
            for member in &def.members {
                if !simple_map.contains_key(member) {
                    return Err(PatternError::UnknownMember {
                        kind: def.kind,
                        member: *member,
                    });
                }
            }
            let kind = def.kind;
            if meta_map.insert(kind, def).is_some() {
                return Err(PatternError::DuplicateDefinition(kind));
            }
        }

        Ok(Self {
            simple: simple_map,
            meta: meta_map,
        })
    }

    /// The standard hall catalog: lines, corners, cross, X, frame,
    /// full house, the free-space promo shape, and the two line
    /// meta-patterns.
    pub fn builtin() -> Self {
        let rows: Vec<Vec<CellCoord>> = (0..CARD_DIM)
            .map(|r| (0..CARD_DIM).map(|c| (r, c)).collect())
            .collect();
        let cols: Vec<Vec<CellCoord>> = (0..CARD_DIM)
            .map(|c| (0..CARD_DIM).map(|r| (r, c)).collect())
            .collect();
        let main_diag: Vec<CellCoord> = (0..CARD_DIM).map(|i| (i, i)).collect();
        let anti_diag: Vec<CellCoord> = (0..CARD_DIM).map(|i| (i, CARD_DIM - 1 - i)).collect();

        let mut cross: Vec<CellCoord> = (0..CARD_DIM).map(|c| (FREE_CELL.0, c)).collect();
        cross.extend((0..CARD_DIM).filter(|&r| r != FREE_CELL.0).map(|r| (r, FREE_CELL.1)));

        let mut letter_x = main_diag.clone();
        letter_x.extend(anti_diag.iter().copied().filter(|cell| !main_diag.contains(cell)));

        let frame: Vec<CellCoord> = (0..CARD_DIM)
            .flat_map(|r| (0..CARD_DIM).map(move |c| (r, c)))
            .filter(|&(r, c)| r == 0 || c == 0 || r == CARD_DIM - 1 || c == CARD_DIM - 1)
            .collect();

        let all_cells: Vec<CellCoord> = (0..CARD_DIM)
            .flat_map(|r| (0..CARD_DIM).map(move |c| (r, c)))
            .collect();

        let simple = vec![
            PatternDefinition {
                kind: PatternKind::AnyHorizontal,
                cell_sets: rows,
            },
            PatternDefinition {
                kind: PatternKind::AnyVertical,
                cell_sets: cols,
            },
            PatternDefinition {
                kind: PatternKind::AnyDiagonal,
                cell_sets: vec![main_diag, anti_diag],
            },
            PatternDefinition {
                kind: PatternKind::FourCorners,
                cell_sets: vec![vec![
                    (0, 0),
                    (0, CARD_DIM - 1),
                    (CARD_DIM - 1, 0),
                    (CARD_DIM - 1, CARD_DIM - 1),
                ]],
            },
            PatternDefinition {
                kind: PatternKind::InnerCorners,
                cell_sets: vec![vec![
                    (1, 1),
                    (1, CARD_DIM - 2),
                    (CARD_DIM - 2, 1),
                    (CARD_DIM - 2, CARD_DIM - 2),
                ]],
            },
            PatternDefinition {
                kind: PatternKind::Cross,
                cell_sets: vec![cross],
            },
            PatternDefinition {
                kind: PatternKind::LetterX,
                cell_sets: vec![letter_x],
            },
            PatternDefinition {
                kind: PatternKind::Frame,
                cell_sets: vec![frame],
            },
            PatternDefinition {
                kind: PatternKind::FullHouse,
                cell_sets: vec![all_cells],
            },
            PatternDefinition {
                kind: PatternKind::FreeSpace,
                cell_sets: vec![vec![FREE_CELL]],
            },
        ];

        let meta = vec![
            MetaPatternDefinition {
                kind: PatternKind::AnyLine,
                required: 1,
                members: vec![
                    PatternKind::AnyHorizontal,
                    PatternKind::AnyVertical,
                    PatternKind::AnyDiagonal,
                ],
            },
            MetaPatternDefinition {
                kind: PatternKind::DoubleLine,
                required: 2,
                members: vec![
                    PatternKind::AnyHorizontal,
                    PatternKind::AnyVertical,
                    PatternKind::AnyDiagonal,
                ],
            },
        ];

        Self::new(simple, meta).expect("builtin catalog is valid")
    }

    pub fn simple(&self, kind: PatternKind) -> Option<&PatternDefinition> {
        self.simple.get(&kind)
    }

    pub fn meta(&self, kind: PatternKind) -> Option<&MetaPatternDefinition> {
        self.meta.get(&kind)
    }

    pub fn contains(&self, kind: PatternKind) -> bool {
        self.simple.contains_key(&kind) || self.meta.contains_key(&kind)
    }

    pub fn simple_definitions(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.simple.values()
    }

    pub fn meta_definitions(&self) -> impl Iterator<Item = &MetaPatternDefinition> {
        self.meta.values()
    }
}
