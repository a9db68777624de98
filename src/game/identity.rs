//! Player identities: named colors handed out to joining players

use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

/// A (name, color) pair. Names double as player ids, so a name is only ever
/// held by one live player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    /// CSS hex color, e.g. `#e50000`
    pub color: String,
}

/// Colors used when no catalog file is configured
const BUILTIN: &[(&str, &str)] = &[
    ("red", "#e50000"),
    ("green", "#15b01a"),
    ("blue", "#0343df"),
    ("pink", "#ff81c0"),
    ("brown", "#653700"),
    ("purple", "#7e1e9c"),
    ("orange", "#f97306"),
    ("teal", "#029386"),
    ("light blue", "#95d0fc"),
    ("magenta", "#c20078"),
    ("yellow", "#ffff14"),
    ("lime green", "#89fe05"),
    ("cyan", "#00ffff"),
    ("maroon", "#650021"),
    ("olive", "#6e750e"),
    ("navy", "#01153e"),
    ("lavender", "#c79fef"),
    ("turquoise", "#06c2ac"),
    ("tan", "#d1b26f"),
    ("salmon", "#ff796c"),
    ("mustard", "#ceb301"),
    ("forest green", "#06470c"),
    ("sky blue", "#75bbfd"),
    ("indigo", "#380282"),
    ("coral", "#fc5a50"),
    ("gold", "#dbb40c"),
    ("mauve", "#ae7181"),
    ("lilac", "#cea2fd"),
    ("periwinkle", "#8e82fe"),
    ("mint", "#9ffeb0"),
    ("burgundy", "#610023"),
    ("aqua", "#13eac9"),
    ("peach", "#ffb07c"),
    ("rust", "#a83c09"),
    ("seafoam", "#80f9ad"),
    ("plum", "#580f41"),
];

/// Ordered list of identities
#[derive(Debug, Clone)]
pub struct IdentityCatalog {
    entries: Vec<Identity>,
}

impl IdentityCatalog {
    pub fn new(entries: Vec<Identity>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(name, color)| Identity {
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        )
    }

    /// Parse the xkcd `rgb.txt` layout: `name<TAB>#hex<TAB>` per line.
    /// Comment lines and malformed lines are skipped.
    pub fn parse_rgb_txt(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let name = fields.next()?.trim();
                let color = fields.next()?.trim();
                (!name.is_empty() && color.starts_with('#')).then(|| Identity {
                    name: name.to_string(),
                    color: color.to_string(),
                })
            })
            .collect();
        Self::new(entries)
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse_rgb_txt(&std::fs::read_to_string(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick uniformly among identities whose name is not `taken`.
    /// Returns `None` once every entry is in use.
    pub fn allocate<R, F>(&self, rng: &mut R, taken: F) -> Option<Identity>
    where
        R: Rng + ?Sized,
        F: Fn(&str) -> bool,
    {
        let free: Vec<&Identity> = self
            .entries
            .iter()
            .filter(|identity| !taken(&identity.name))
            .collect();
        free.choose(rng).map(|identity| (*identity).clone())
    }
}

impl Default for IdentityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn parses_xkcd_format() {
        let text = "## License: http://creativecommons.org/publicdomain/zero/1.0/\n\
                    cloudy blue\t#acc2d9\t\n\
                    dark pastel green\t#56ae57\t\n\
                    broken line\n\
                    \t#000000\t\n";
        let catalog = IdentityCatalog::parse_rgb_txt(text);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.entries[1],
            Identity {
                name: "dark pastel green".to_string(),
                color: "#56ae57".to_string()
            }
        );
    }

    #[test]
    fn allocation_skips_taken_names() {
        let catalog = IdentityCatalog::new(vec![
            Identity {
                name: "a".to_string(),
                color: "#000001".to_string(),
            },
            Identity {
                name: "b".to_string(),
                color: "#000002".to_string(),
            },
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let picked = catalog.allocate(&mut rng, |name| name == "a").unwrap();
            assert_eq!(picked.name, "b");
        }
        assert!(catalog.allocate(&mut rng, |_| true).is_none());
    }

    #[test]
    fn builtin_names_are_unique() {
        let catalog = IdentityCatalog::builtin();
        let names: HashSet<_> = catalog.entries.iter().map(|i| &i.name).collect();
        assert_eq!(names.len(), catalog.len());
    }
}
