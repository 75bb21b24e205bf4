use rand::Rng;

const ADJECTIVES: &[&str] = &[
  "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy", "quiet", "white", "cool",
  "spring", "winter", "twilight", "dawn", "crimson", "wispy", "weathered", "blue", "billowing", "broken", "cold",
  "falling", "frosty", "green", "long", "late", "lingering", "bold", "little", "morning", "muddy", "old", "red",
  "rough", "still", "small", "sparkling", "shy", "wandering", "withered", "wild", "black", "young", "holy", "solitary",
  "fragrant", "aged", "snowy", "proud", "floral", "restless", "divine", "polished", "ancient", "purple", "lively",
  "nameless",
];

const NOUNS: &[&str] = &[
  "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake", "sunset", "pine", "shadow",
  "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow", "sun", "glade", "bird", "brook", "butterfly", "bush",
  "dew", "dust", "field", "fire", "flower", "firefly", "feather", "grass", "haze", "mountain", "night", "pond",
  "darkness", "snowflake", "silence", "sound", "sky", "shape", "surf", "thunder", "violet", "water", "wildflower",
  "wave", "resonance", "dream", "cherry", "tree", "fog", "frost", "voice", "paper", "frog", "smoke", "star",
];

/// The configured version exactly as given, or `None` when unset or empty.
pub fn configured_version(version: Option<&str>) -> Option<&str> {
  version.filter(|v| !v.is_empty())
}

/// The configured version when present, otherwise a generated `adjective-noun-NNNN` name.
pub fn release_name(version: Option<&str>) -> String {
  match configured_version(version) {
    Some(v) => v.to_string(),
    None => haiku_name(&mut rand::rng()),
  }
}

pub fn haiku_name<R: Rng>(rng: &mut R) -> String {
  let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
  let noun = NOUNS[rng.random_range(0..NOUNS.len())];
  let token: u32 = rng.random_range(0..10_000);
  format!("{}-{}-{:04}", adjective, noun, token)
}
