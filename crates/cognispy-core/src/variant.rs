//! Item values and the random generators that produce them.
//!
//! This module contains:
//! - The `Variant` value carried by every board item
//! - Structured descriptors (houses, shoes) and vehicle types
//! - Curated symbol pools for the weather, emotion and fruit games
//! - `VariantDomain`, which draws targets and distractors from a pool
//! - `TargetSignature`, the match predicate shared by builder and session

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Upper bound on rejection-sampling draws before switching to an exclusion list
const MAX_REJECTION_ATTEMPTS: usize = 64;

/// Door placement on a house front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Door {
    Left,
    Center,
    Right,
    /// No door at all
    #[serde(rename = "none")]
    Absent,
}

impl Door {
    pub const ALL: [Door; 4] = [Door::Left, Door::Center, Door::Right, Door::Absent];
}

/// Window arrangement on a house front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Windows {
    Single,
    Double,
    Wide,
    Split,
}

impl Windows {
    pub const ALL: [Windows; 4] = [
        Windows::Single,
        Windows::Double,
        Windows::Wide,
        Windows::Split,
    ];
}

/// A procedurally drawn little house.
///
/// Four doors, four window layouts and an optional chimney give 32 distinct
/// houses; two houses match only when every field is equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseConfig {
    pub door: Door,
    pub windows: Windows,
    pub chimney: bool,
}

impl HouseConfig {
    pub const fn new(door: Door, windows: Windows, chimney: bool) -> Self {
        Self {
            door,
            windows,
            chimney,
        }
    }

    /// Independent uniform choice of each field
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            door: Door::ALL[rng.gen_range(0..Door::ALL.len())],
            windows: Windows::ALL[rng.gen_range(0..Windows::ALL.len())],
            chimney: rng.gen_bool(0.5),
        }
    }

    /// Every house in the domain
    pub fn all() -> Vec<HouseConfig> {
        let mut houses = Vec::with_capacity(32);
        for door in Door::ALL {
            for windows in Windows::ALL {
                for chimney in [false, true] {
                    houses.push(HouseConfig::new(door, windows, chimney));
                }
            }
        }
        houses
    }
}

/// Vehicles for the transport game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Car,
    Bus,
    Plane,
    Bike,
    Train,
    Boat,
}

impl TransportType {
    pub const ALL: [TransportType; 6] = [
        TransportType::Car,
        TransportType::Bus,
        TransportType::Plane,
        TransportType::Bike,
        TransportType::Train,
        TransportType::Boat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransportType::Car => "Car",
            TransportType::Bus => "Bus",
            TransportType::Plane => "Plane",
            TransportType::Bike => "Bike",
            TransportType::Train => "Train",
            TransportType::Boat => "Boat",
        }
    }
}

/// Which foot a shoe is drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoeDirection {
    Left,
    Right,
}

/// Lace state of a shoe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Laces {
    Tied,
    Untied,
    #[serde(rename = "none")]
    Bare,
}

/// Shoe silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoeStyle {
    Sneaker,
    Boot,
    Sandal,
}

/// A shoe for the find-the-odd-shoe game (18 combinations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShoeVariant {
    pub direction: ShoeDirection,
    pub laces: Laces,
    pub style: ShoeStyle,
}

impl ShoeVariant {
    const DIRECTIONS: [ShoeDirection; 2] = [ShoeDirection::Left, ShoeDirection::Right];
    const LACES: [Laces; 3] = [Laces::Tied, Laces::Untied, Laces::Bare];
    const STYLES: [ShoeStyle; 3] = [ShoeStyle::Sneaker, ShoeStyle::Boot, ShoeStyle::Sandal];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            direction: Self::DIRECTIONS[rng.gen_range(0..Self::DIRECTIONS.len())],
            laces: Self::LACES[rng.gen_range(0..Self::LACES.len())],
            style: Self::STYLES[rng.gen_range(0..Self::STYLES.len())],
        }
    }

    pub fn all() -> Vec<ShoeVariant> {
        let mut shoes = Vec::with_capacity(18);
        for direction in Self::DIRECTIONS {
            for laces in Self::LACES {
                for style in Self::STYLES {
                    shoes.push(ShoeVariant {
                        direction,
                        laces,
                        style,
                    });
                }
            }
        }
        shoes
    }
}

/// A glyph from one of the curated symbol pools
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Cow<'static, str>);

impl Symbol {
    pub const fn from_static(glyph: &'static str) -> Self {
        Symbol(Cow::Borrowed(glyph))
    }

    pub fn glyph(&self) -> &str {
        &self.0
    }
}

const WEATHER_TARGETS: &[(&str, &str)] = &[
    ("\u{2602}\u{fe0f}", "Umbrella"),
    ("\u{26a1}", "Lightning"),
    ("\u{2601}\u{fe0f}", "Cloud"),
    ("\u{1f4a7}", "Raindrop"),
    ("\u{1f308}", "Rainbow"),
    ("\u{1f321}\u{fe0f}", "Thermometer"),
    ("\u{1f32a}\u{fe0f}", "Tornado"),
    ("\u{1f9ed}", "Compass"),
    ("\u{2600}\u{fe0f}", "Sun"),
    ("\u{2728}", "Sparkles"),
];

const WEATHER_DISTRACTORS: &[&str] = &[
    "\u{1f31f}",
    "\u{1f31e}",
    "\u{1f319}",
    "\u{2b50}",
    "\u{1f4a8}",
    "\u{2744}\u{fe0f}",
    "\u{1f32b}\u{fe0f}",
    "\u{1f327}\u{fe0f}",
    "\u{1f329}\u{fe0f}",
    "\u{1f32c}\u{fe0f}",
];

const EMOTION_TARGETS: &[(&str, &str)] = &[
    ("😊", "Happy"),
    ("😢", "Sad"),
    ("😠", "Angry"),
    ("😮", "Surprised"),
    ("😜", "Winking"),
    ("🤓", "Nerd"),
    ("😎", "Cool"),
    ("🥰", "Love"),
    ("😴", "Sleepy"),
    ("🤔", "Thinking"),
];

const EMOTION_DISTRACTORS: &[&str] = &[
    "😀", "😃", "😄", "😁", "😆", "😅", "🤣", "😂", "🙂", "🙃", "😉", "😋", "😛", "😝", "🤪",
    "🤨", "🧐", "🤩", "🥳", "😏", "😒", "😞", "😔", "😟", "😕", "🙁", "☹️", "😣", "😖", "😫",
    "😩", "🥺", "😤", "😡", "🤬", "😈", "👿", "💀", "😺", "😸",
];

const FRUIT_TARGETS: &[(&str, &str)] = &[
    ("🍎", "Apple"),
    ("🍌", "Banana"),
    ("🍇", "Grapes"),
    ("🍓", "Strawberry"),
    ("🍊", "Orange"),
    ("🍐", "Pear"),
    ("🍒", "Cherries"),
    ("🍍", "Pineapple"),
    ("🍉", "Watermelon"),
    ("🥝", "Kiwi"),
];

const FRUIT_DISTRACTORS: &[&str] = &[
    "🍅", "🥕", "🌽", "🥦", "🍆", "🥔", "🧅", "🥒", "🫑", "🍄", "🥜", "🌰",
];

/// The three symbol-matching games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSet {
    Weather,
    Emotion,
    Fruit,
}

impl SymbolSet {
    /// Target glyphs with their display names, one per stage
    pub fn targets(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            SymbolSet::Weather => WEATHER_TARGETS,
            SymbolSet::Emotion => EMOTION_TARGETS,
            SymbolSet::Fruit => FRUIT_TARGETS,
        }
    }

    /// Look-alike glyphs used only as distractors
    pub fn distractors(&self) -> &'static [&'static str] {
        match self {
            SymbolSet::Weather => WEATHER_DISTRACTORS,
            SymbolSet::Emotion => EMOTION_DISTRACTORS,
            SymbolSet::Fruit => FRUIT_DISTRACTORS,
        }
    }

    /// Target symbol for a stage (1-based, clamped to the last entry)
    pub fn target_for_stage(&self, stage: u32) -> Symbol {
        let targets = self.targets();
        let index = (stage.saturating_sub(1) as usize).min(targets.len() - 1);
        Symbol::from_static(targets[index].0)
    }

    /// Display name of a target glyph
    pub fn name_of(&self, symbol: &Symbol) -> Option<&'static str> {
        self.targets()
            .iter()
            .find(|(glyph, _)| *glyph == symbol.glyph())
            .map(|(_, name)| *name)
    }
}

/// The value shown on a board item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Variant {
    Digit(u8),
    Symbol(Symbol),
    Transport(TransportType),
    House(HouseConfig),
    Shoe(ShoeVariant),
}

/// The value (or set of values) a board's targets must match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum TargetSignature {
    /// Exactly one value is a target
    Single(Variant),
    /// Any of these values is a target (the numbers game scans for a digit set)
    AnyOf(Vec<Variant>),
}

impl TargetSignature {
    /// Exact structural match against the signature
    pub fn matches(&self, value: &Variant) -> bool {
        match self {
            TargetSignature::Single(target) => target == value,
            TargetSignature::AnyOf(targets) => targets.contains(value),
        }
    }

    /// The value assigned to the `index`-th target slot.
    ///
    /// Set signatures cycle through their members so targets are spread evenly.
    pub fn member(&self, index: usize) -> Option<&Variant> {
        match self {
            TargetSignature::Single(target) => Some(target),
            TargetSignature::AnyOf(targets) if targets.is_empty() => None,
            TargetSignature::AnyOf(targets) => Some(&targets[index % targets.len()]),
        }
    }
}

/// The value domain a game draws its items from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantDomain {
    Digits,
    Symbols(SymbolSet),
    Houses,
    Transport,
    Shoes,
}

impl VariantDomain {
    /// Uniformly random value from the whole domain
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Variant {
        match self {
            VariantDomain::Digits => Variant::Digit(rng.gen_range(0..=9)),
            VariantDomain::Symbols(set) => {
                let targets = set.targets();
                let distractors = set.distractors();
                let index = rng.gen_range(0..targets.len() + distractors.len());
                let glyph = if index < targets.len() {
                    targets[index].0
                } else {
                    distractors[index - targets.len()]
                };
                Variant::Symbol(Symbol::from_static(glyph))
            }
            VariantDomain::Houses => Variant::House(HouseConfig::random(rng)),
            VariantDomain::Transport => {
                Variant::Transport(TransportType::ALL[rng.gen_range(0..TransportType::ALL.len())])
            }
            VariantDomain::Shoes => Variant::Shoe(ShoeVariant::random(rng)),
        }
    }

    /// Draw a value that does not match `target`.
    ///
    /// Structured domains rejection-sample a bounded number of times and then
    /// fall back to an exclusion list; enumerable domains pick directly from
    /// the pool minus the target. Returns `None` only if every candidate
    /// matches the target.
    pub fn distractor_of<R: Rng>(&self, target: &TargetSignature, rng: &mut R) -> Option<Variant> {
        if matches!(self, VariantDomain::Houses | VariantDomain::Shoes) {
            for _ in 0..MAX_REJECTION_ATTEMPTS {
                let candidate = self.generate(rng);
                if !target.matches(&candidate) {
                    return Some(candidate);
                }
            }
        }

        let candidates: Vec<Variant> = self
            .distractor_pool()
            .into_iter()
            .filter(|v| !target.matches(v))
            .collect();
        candidates.choose(rng).cloned()
    }

    /// Every value distractors may be drawn from
    fn distractor_pool(&self) -> Vec<Variant> {
        match self {
            VariantDomain::Digits => (0..=9).map(Variant::Digit).collect(),
            VariantDomain::Symbols(set) => set
                .distractors()
                .iter()
                .map(|glyph| Variant::Symbol(Symbol::from_static(glyph)))
                .collect(),
            VariantDomain::Houses => HouseConfig::all().into_iter().map(Variant::House).collect(),
            VariantDomain::Transport => TransportType::ALL.into_iter().map(Variant::Transport).collect(),
            VariantDomain::Shoes => ShoeVariant::all().into_iter().map(Variant::Shoe).collect(),
        }
    }
}
