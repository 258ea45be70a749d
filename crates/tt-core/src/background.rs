//! Background text for generated characters.
//!
//! The store treats background generation as an opaque collaborator behind
//! [`BackgroundGenerator`]. [`TableBackgroundGenerator`] is the bundled
//! implementation: it stitches a paragraph together from fixed word tables.

use rand::Rng;
use rand::rngs::StdRng;

/// Generated flavor for a new character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    /// Descriptive background paragraph.
    pub description: String,
    /// Suggested archetype label.
    pub archetype: String,
}

/// Source of background text for new characters.
pub trait BackgroundGenerator {
    /// Produce a background paragraph and a suggested archetype.
    fn generate(&mut self, rng: &mut StdRng) -> Background;
}

/// Archetype labels (12 entries).
pub const ARCHETYPES: &[&str] = &[
    "Netrunner",
    "Street Samurai",
    "Fixer",
    "Techie",
    "Medtech",
    "Nomad",
    "Corporate",
    "Rockerboy",
    "Media",
    "Lawman",
    "Drifter",
    "Smuggler",
];

/// Places a character can come from (12 entries).
pub const ORIGINS: &[&str] = &[
    "the flooded lower districts",
    "a corporate arcology",
    "a nomad convoy on the salt flats",
    "the orbital docks",
    "a failed mining colony",
    "the neon market quarter",
    "a monastery turned data haven",
    "the industrial sprawl",
    "a gated suburb that no longer exists",
    "the undercity tunnels",
    "a border checkpoint town",
    "the old university ruins",
];

/// Driving motivations (12 entries).
pub const MOTIVATIONS: &[&str] = &[
    "Owes a dangerous debt to the wrong people",
    "Searches for a sibling who vanished years ago",
    "Wants to burn down the company that ruined their family",
    "Chases one last score big enough to retire on",
    "Protects a secret that could topple a city council",
    "Hunts the partner who sold them out",
    "Believes the machines can be reasoned with",
    "Is trying to buy back a stolen memory",
    "Keeps a promise made to someone long dead",
    "Collects favors the way others collect scars",
    "Wants to be remembered for something good",
    "Is running from a name they used to wear",
];

/// Small telling details (12 entries).
pub const QUIRKS: &[&str] = &[
    "Never sits with their back to a door.",
    "Hums old jazz standards when nervous.",
    "Carries a paper notebook nobody else may read.",
    "Tips too much and trusts too little.",
    "Counts exits in every room out loud.",
    "Keeps a pressed flower in an ammunition tin.",
    "Speaks to their cyberware as if it were a pet.",
    "Refuses to drink anything they did not pour.",
    "Has a laugh that does not reach the eyes.",
    "Quotes scripture, usually wrong.",
    "Wears a dead friend's jacket.",
    "Always pays in exact change.",
];

/// Background generator that draws from the fixed tables above.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableBackgroundGenerator;

impl TableBackgroundGenerator {
    /// Create a table-driven generator.
    pub fn new() -> Self {
        Self
    }
}

impl BackgroundGenerator for TableBackgroundGenerator {
    fn generate(&mut self, rng: &mut StdRng) -> Background {
        let archetype = pick(ARCHETYPES, rng);
        let origin = pick(ORIGINS, rng);
        let motivation = pick(MOTIVATIONS, rng);
        let quirk = pick(QUIRKS, rng);
        let article = if archetype.starts_with(['A', 'E', 'I', 'O', 'U']) {
            "An"
        } else {
            "A"
        };

        Background {
            description: format!(
                "{article} {} from {origin}. {motivation}. {quirk}",
                archetype.to_lowercase()
            ),
            archetype: archetype.to_string(),
        }
    }
}

fn pick<'a>(table: &[&'a str], rng: &mut StdRng) -> &'a str {
    table[rng.random_range(0..table.len())]
}
