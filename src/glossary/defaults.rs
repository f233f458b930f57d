/// Terms kept untranslated unless the default glossary is disabled.
///
/// Fantasy creatures and martial-arts vocabulary read better left in the
/// original language in most light novels.
pub const DEFAULT_PRESERVE_TERMS: &[&str] = &[
    // Creatures
    "dragon", "phoenix", "griffin", "unicorn", "hydra", "pegasus", "wolf", "fox", "cat", "dog",
    "lion", "tiger", "leopard", "eagle", "falcon", "hawk", "serpent", "wyvern",
    // Artefacts and concepts
    "mana", "chakra", "katana", "shuriken", "kunai", "ki", "dojo", "samurai", "ronin", "ninja",
];
