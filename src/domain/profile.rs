use rand::seq::IndexedRandom;
use serde::Serialize;

/// Placeholder shown (and stored) when the user has not written a bio.
pub const DEFAULT_BIO: &str =
    "Writing helps me understand myself better and appreciate life's small moments.";

pub(crate) const FIRST_NAMES: [&str; 20] = [
    "Cocoa", "Caramel", "Nougat", "Pixel", "Zephyr", "Wisp", "Glimmer", "Echo", "Juno", "Orion",
    "Nebula", "Comet", "Stardust", "Elara", "Lyra", "Calypso", "Solstice", "Equinox", "Nimbus",
    "Cirrus",
];

pub(crate) const LAST_NAMES: [&str; 20] = [
    "Whiskerbloom",
    "Moonpaw",
    "Shadowclaw",
    "Stargazer",
    "Riverbend",
    "Sunpetal",
    "Dreamweaver",
    "Skyrunner",
    "Frostfang",
    "Silentstep",
    "Cinderfall",
    "Mistwalker",
    "Thornwood",
    "Silvermane",
    "Quickfoot",
    "Brightwing",
    "Stonehelm",
    "Ironheart",
    "Goldleaf",
    "Nightshade",
];

/// The singleton profile record. Exactly one logical instance exists per
/// installation; it is created implicitly on first use with a generated
/// display name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    pub profile_picture: Option<String>,
}

/// Partial update for the profile; only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl ProfilePatch {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.bio.is_some() || self.profile_picture.is_some()
    }
}

/// Picks a first-run display name from the fixed word lists.
pub fn generate_display_name() -> String {
    let mut rng = rand::rng();
    let first = FIRST_NAMES
        .choose(&mut rng)
        .expect("first name list is non-empty");
    let last = LAST_NAMES
        .choose(&mut rng)
        .expect("last name list is non-empty");
    format!("{first} {last}")
}
