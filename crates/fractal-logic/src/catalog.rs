//! Chapter catalog: the fixed, ordered 27-step progression.
//!
//! Chapters are immutable content. The core only cares about `id` (which
//! defines progression order) and the gate archetype; everything else is
//! passed through to the presentation layer untouched.
//!
//! ```
//! use fractal_logic::catalog::Catalog;
//! use fractal_logic::gates::GateKind;
//!
//! let catalog = Catalog::builtin();
//! assert_eq!(catalog.len(), 27);
//! assert_eq!(catalog.lookup(1).unwrap().archetype(), GateKind::IdentityMirror);
//! assert!(catalog.lookup(28).is_none());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gates::GateKind;

/// Chapter identifier, `1..=27` in the built-in catalog.
pub type ChapterId = u32;

/// Major checkpoints shown as the golden path in navigation.
pub const GOLDEN_PATH: [ChapterId; 8] = [1, 5, 10, 15, 20, 25, 26, 27];

/// Closing chapter of each of the five books.
pub const BOOK_BOSSES: [ChapterId; 5] = [5, 10, 15, 20, 25];

pub fn is_book_boss(id: ChapterId) -> bool {
    BOOK_BOSSES.contains(&id)
}

/// Inventory badge earned by completing one of the special chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneBadge {
    pub chapter: ChapterId,
    pub name: &'static str,
    pub description: &'static str,
}

/// Milestone badges in the order they are earned.
pub const MILESTONE_BADGES: [MilestoneBadge; 4] = [
    MilestoneBadge {
        chapter: 1,
        name: "Altar Before Platform",
        description: "Mastered the square altar of leadership foundation",
    },
    MilestoneBadge {
        chapter: 25,
        name: "Commissioned Messenger",
        description: "Received divine commission through the shofar convergence",
    },
    MilestoneBadge {
        chapter: 26,
        name: "Apostolic Multiplier",
        description: "Activated the fractal network multiplication pattern",
    },
    MilestoneBadge {
        chapter: 27,
        name: "Pattern Keeper",
        description: "Sealed the eternal pattern of the New Jerusalem",
    },
];

pub fn milestone_badge(id: ChapterId) -> Option<&'static MilestoneBadge> {
    MILESTONE_BADGES.iter().find(|b| b.chapter == id)
}

/// One chapter of the progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub book: u8,
    pub book_name: String,
    pub element: String,
    pub temple_space: String,
    pub geometry_icon: String,
    pub dimension: String,
    /// Gate modifier, e.g. `Revelation` or `Hidden (North)`.
    pub fractal_gate: String,
    pub description: String,
    pub puzzle_type: String,
    /// Explicit archetype; derived from the geometry icon when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateKind>,
}

impl Chapter {
    pub fn archetype(&self) -> GateKind {
        self.gate
            .unwrap_or_else(|| GateKind::from_geometry(&self.geometry_icon))
    }

    /// Badge earned by clearing this chapter, e.g. `Glory Revelation`.
    pub fn badge_name(&self) -> String {
        let gate = self.fractal_gate.split_whitespace().next().unwrap_or("");
        format!("{} {}", self.dimension, gate).trim().to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("chapter id {0} appears more than once")]
    DuplicateId(ChapterId),
    #[error("chapter ids must run 1..={expected_last} without gaps; missing {missing}")]
    Gap {
        missing: ChapterId,
        expected_last: ChapterId,
    },
    #[error("invalid catalog json: {0}")]
    Parse(String),
}

/// Ordered, gap-free chapter table.
#[derive(Debug, Clone)]
pub struct Catalog {
    chapters: Vec<Chapter>,
}

impl Catalog {
    /// Validate and index a chapter list. Order of the input is irrelevant.
    pub fn from_chapters(mut chapters: Vec<Chapter>) -> Result<Self, CatalogError> {
        if chapters.is_empty() {
            return Err(CatalogError::Empty);
        }
        chapters.sort_by_key(|c| c.id);
        for pair in chapters.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CatalogError::DuplicateId(pair[0].id));
            }
        }
        let expected_last = chapters.len() as ChapterId;
        for (i, chapter) in chapters.iter().enumerate() {
            let expected = i as ChapterId + 1;
            if chapter.id != expected {
                return Err(CatalogError::Gap {
                    missing: expected,
                    expected_last,
                });
            }
        }
        Ok(Self { chapters })
    }

    /// Load an external content table (JSON array of chapters).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let chapters: Vec<Chapter> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_chapters(chapters)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(&self.chapters).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// The built-in 27-chapter progression.
    pub fn builtin() -> Self {
        let chapters = BUILTIN
            .iter()
            .map(
                |&(id, book, element, temple, geometry, dimension, gate, puzzle, title, desc)| {
                    Chapter {
                        id,
                        title: title.to_string(),
                        book,
                        book_name: book_name(book).to_string(),
                        element: element.to_string(),
                        temple_space: temple.to_string(),
                        geometry_icon: geometry.to_string(),
                        dimension: dimension.to_string(),
                        fractal_gate: gate.to_string(),
                        description: desc.to_string(),
                        puzzle_type: puzzle.to_string(),
                        gate: None,
                    }
                },
            )
            .collect();
        Self { chapters }
    }

    pub fn lookup(&self, id: ChapterId) -> Option<&Chapter> {
        let index = (id as usize).checked_sub(1)?;
        self.chapters.get(index)
    }

    pub fn contains(&self, id: ChapterId) -> bool {
        self.lookup(id).is_some()
    }

    /// All chapters in progression order.
    pub fn all(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Id of the terminal chapter.
    pub fn final_chapter(&self) -> ChapterId {
        self.chapters.len() as ChapterId
    }

    /// Golden-path chapters present in this catalog.
    pub fn golden_path(&self) -> impl Iterator<Item = &Chapter> {
        GOLDEN_PATH.iter().filter_map(move |id| self.lookup(*id))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn book_name(book: u8) -> &'static str {
    match book {
        1 => "Fire",
        2 => "Air",
        3 => "Water",
        4 => "Earth",
        5 => "Plasma",
        _ => "Apostolic",
    }
}

type Row = (
    ChapterId,
    u8,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

// (id, book, element, temple space, geometry, dimension, gate, puzzle type, title, description)
const BUILTIN: [Row; 27] = [
    (1, 1, "Fire", "Altar", "Square", "Glory", "Revelation", "alignment",
        "Leadership Begins at the Altar", "align four altar corners; quiz on Ch.1 basics"),
    (2, 1, "Fire", "Altar", "Equilateral Triangle", "Image", "Internalization", "mirror",
        "The Mirrored Triad", "mirror the triad; 1-line 'first things' reflection gates hint"),
    (3, 1, "Fire", "Altar", "2D Spiral", "Presence", "Embodiment", "proximity",
        "Breath of the Spiral", "breath-paced spiral tracing; quick pause practice"),
    (4, 1, "Fire", "Altar", "Isometric Cube", "Word", "Integration", "logic",
        "Glyphs on the Cube", "connect verse-glyphs on a cube net"),
    (5, 1, "Fire", "Altar", "Monad Point", "Name", "Hidden (North)", "meta",
        "The Hidden Center", "find the single hidden center; meta quiz"),
    (6, 2, "Air", "Holy Place", "Tetra + Rays", "Image", "Revelation", "mirror",
        "Radiant Symmetry", "build radiant symmetry; discover ray rule"),
    (7, 2, "Air", "Holy Place", "Hex Mandala", "Word", "Internalization", "logic",
        "Altar Before Platform", "form hex-phrases; reorder 'altar before platform' statement"),
    (8, 2, "Air", "Holy Place", "Octahedron", "Presence", "Embodiment", "proximity",
        "Orbits of Stillness", "proximity orbits; timed stillness hold"),
    (9, 2, "Air", "Holy Place", "Fibonacci Spiral", "Spirit", "Integration", "synergy",
        "Wind That Grows the Spiral", "combine wind currents to grow the spiral"),
    (10, 2, "Air", "Holy Place", "Fractal Tree", "Name", "Hidden (South)", "meta",
        "Roots of the Tree", "reveal root nodes; concealed pathway"),
    (11, 3, "Water", "Inner Light", "Icosahedron", "Glory", "Revelation", "alignment",
        "Lights in Holy Order", "light 12/20 nodes in holy order"),
    (12, 3, "Water", "Inner Light", "Hex Prism", "Voice", "Internalization", "sequence",
        "First Words Bless", "echo sequences; 1-line 'first words bless' reflection"),
    (13, 3, "Water", "Inner Light", "Golden Ratio Spiral", "Word", "Embodiment", "logic",
        "The Mission Phrase", "speak/type a mission phrase in rhythm"),
    (14, 3, "Water", "Inner Light", "Möbius Strip", "Image", "Integration", "mirror",
        "The Endless Mosaic", "complete a non-orientable mosaic"),
    (15, 3, "Water", "Inner Light", "Metatron Cube", "Name", "Hidden (East)", "meta",
        "Nested Gates", "unlock nested gates; quiet, slow reveal"),
    (16, 4, "Earth", "Holy of Holies", "3D Pentagon", "Spirit", "Revelation", "synergy",
        "Five Currents", "energize five currents; discover synergy rule"),
    (17, 4, "Earth", "Holy of Holies", "Tetrahedron", "Word", "Internalization", "logic",
        "The Law of Love", "law-of-love logic sort; short journaling gate"),
    (18, 4, "Earth", "Holy of Holies", "Isometric Grid", "Image", "Embodiment", "mirror",
        "Posture of the Grid", "posture/micro-movement alignments"),
    (19, 4, "Earth", "Holy of Holies", "Reflection Diagram", "Presence", "Integration", "proximity",
        "Mentors and Mirrors", "pair mentors/mirrors correctly"),
    (20, 4, "Earth", "Holy of Holies", "Flower of Life", "Name", "Hidden (West)", "meta",
        "The Name Rosette", "find overlapping 'Name' rosette"),
    (21, 5, "Plasma", "Ark", "Star of David", "Name", "Revelation", "meta",
        "The Covenant Star", "light covenant star; identity declaration"),
    (22, 5, "Plasma", "Ark", "Fibonacci Circle", "Image", "Internalization", "mirror",
        "The Inner Vow", "concentric symmetry; inner vow line"),
    (23, 5, "Plasma", "Ark", "Torus (3D)", "Word", "Embodiment", "logic",
        "The Walking Loop", "speak and walk loop; continuous flow task"),
    (24, 5, "Plasma", "Ark", "64 Star Tetra", "Name", "Integration", "meta",
        "Lattice of Badges", "combine prior badges into a single lattice"),
    (25, 5, "Plasma", "Ark", "Nested Fib Circles", "Name", "Hidden (Center)", "meta",
        "Center-Line Commissioning", "center-line commissioning; shofar pulse"),
    (26, 6, "Plasma", "Nations", "Fractal Network", "Name", "Revelation", "meta",
        "Flame to the Nations", "replicate nodes; send flame to nations"),
    (27, 6, "Plasma", "Commission", "Final Commission", "Name", "Synthesis", "meta",
        "The Final Commission", "meta-trial combining all six prior dimensions; final commissioning"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_badges_sit_on_special_chapters() {
        let catalog = Catalog::builtin();
        for badge in &MILESTONE_BADGES {
            let chapter = catalog.lookup(badge.chapter).unwrap();
            assert_ne!(chapter.archetype(), GateKind::Practice, "{}", badge.name);
        }
        assert_eq!(milestone_badge(25).map(|b| b.name), Some("Commissioned Messenger"));
        assert!(milestone_badge(2).is_none());
    }

    #[test]
    fn test_builtin_ids_are_contiguous() {
        let catalog = Catalog::builtin();
        let ids: Vec<ChapterId> = catalog.all().iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=27).collect::<Vec<_>>());
        for id in 1..=27 {
            assert_eq!(catalog.lookup(id).map(|c| c.id), Some(id));
        }
        assert!(catalog.lookup(0).is_none());
        assert!(catalog.lookup(28).is_none());
        assert_eq!(catalog.final_chapter(), 27);
    }

    #[test]
    fn test_builtin_passes_validation() {
        let catalog = Catalog::builtin();
        assert!(Catalog::from_chapters(catalog.all().to_vec()).is_ok());
    }

    #[test]
    fn test_archetypes_of_special_chapters() {
        let catalog = Catalog::builtin();
        let kind = |id| catalog.lookup(id).unwrap().archetype();
        assert_eq!(kind(1), GateKind::IdentityMirror);
        assert_eq!(kind(25), GateKind::ShofarConvergence);
        assert_eq!(kind(26), GateKind::NetworkMultiplication);
        assert_eq!(kind(27), GateKind::TwelveGateConvergence);
        let practice = catalog
            .all()
            .iter()
            .filter(|c| c.archetype() == GateKind::Practice)
            .count();
        assert_eq!(practice, 23);
    }

    #[test]
    fn test_badge_names() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup(1).unwrap().badge_name(), "Glory Revelation");
        assert_eq!(catalog.lookup(5).unwrap().badge_name(), "Name Hidden");
    }

    #[test]
    fn test_rejects_gap_and_duplicate() {
        let mut chapters = Catalog::builtin().all().to_vec();
        chapters.remove(4);
        assert_eq!(
            Catalog::from_chapters(chapters.clone()).unwrap_err(),
            CatalogError::Gap {
                missing: 5,
                expected_last: 26
            }
        );
        chapters.push(chapters[0].clone());
        assert_eq!(
            Catalog::from_chapters(chapters).unwrap_err(),
            CatalogError::DuplicateId(1)
        );
        assert_eq!(Catalog::from_chapters(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn test_json_roundtrip_preserves_order_and_gate_override() {
        let mut chapters = Catalog::builtin().all().to_vec();
        chapters[1].gate = Some(GateKind::IdentityMirror);
        chapters.reverse();
        let json = serde_json::to_string(&chapters).unwrap();
        let catalog = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog.lookup(2).unwrap().archetype(), GateKind::IdentityMirror);
        assert_eq!(catalog.all()[0].id, 1);
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_golden_path_and_bosses() {
        let catalog = Catalog::builtin();
        let path: Vec<ChapterId> = catalog.golden_path().map(|c| c.id).collect();
        assert_eq!(path, GOLDEN_PATH.to_vec());
        assert!(is_book_boss(25));
        assert!(!is_book_boss(26));
    }
}
