use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Named fixed layouts used by demos, tests and the env wrapper defaults.
static PRESETS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    // 4x4 navigation maze: down the left edge, then along the bottom rows.
    map.insert("demo", &["S...", ".#.#", "....", "#.#G"] as &[_]);
    // 4x4 training maze with a pit next to the short path.
    map.insert("training", &["S..G", "##.#", ".P..", "#..#"] as &[_]);
    map
});

/// Symbol rows for a named preset, if it exists. Callers parse them with
/// [`crate::Grid::parse`] so layout errors surface in one place.
pub fn preset_rows(name: &str) -> Option<&'static [&'static str]> {
    PRESETS.get(name).copied()
}

pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<_> = PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid;

    #[test]
    fn all_presets_parse() {
        for name in preset_names() {
            let rows = preset_rows(name).unwrap();
            Grid::parse(rows).unwrap_or_else(|e| panic!("preset {name} invalid: {e}"));
        }
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(preset_rows("does-not-exist").is_none());
    }
}
