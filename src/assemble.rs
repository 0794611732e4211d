use crate::{Bond, Element, Locant, Substituent};
use std::collections::BTreeMap;

const SIMPLE_ROOTS: [&str; 11] = ["", "meth", "eth", "prop", "but", "pent", "hex", "hept", "oct", "non", "dec"];
const UNIT_ROOTS: [&str; 10] = ["", "hen", "do", "tri", "tetra", "penta", "hexa", "hepta", "octa", "nona"];
const TEN_ROOTS: [&str; 10] = [
    "", "dec", "cos", "triacont", "tetracont", "pentacont", "hexacont", "heptacont", "octacont", "nonacont",
];
const HUNDRED_ROOTS: [&str; 10] = [
    "", "hect", "dict", "trict", "tetract", "pentact", "hexact", "heptact", "octact", "nonact",
];

/// The numerical root for a chain or ring of `n` atoms ("meth", "undec", "icos").
pub fn numeral_root(n: usize) -> String {
    if n <= 10 {
        return SIMPLE_ROOTS[n].to_string();
    }
    if n >= 1000 {
        return format!("{n}-");
    }
    let (hundreds, tens, units) = (n / 100, (n / 10) % 10, n % 10);
    let mut root = String::new();
    match (tens, units) {
        (1, 1) => root.push_str("un"),
        (_, u) => root.push_str(UNIT_ROOTS[u]),
    }
    match (tens, units) {
        (2, 0) | (2, 1) => root.push_str("icos"),
        (t, _) => root.push_str(TEN_ROOTS[t]),
    }
    if hundreds > 0 {
        if !root.is_empty() {
            root.push('a');
        }
        root.push_str(HUNDRED_ROOTS[hundreds]);
    }
    root
}

/// Multiplying prefix for simple names ("di", "tri").
pub fn multiplier(n: usize) -> String {
    match n {
        0 | 1 => String::new(),
        2 => "di".to_string(),
        3 => "tri".to_string(),
        4 => "tetra".to_string(),
        n => format!("{}a", numeral_root(n)),
    }
}

/// Multiplying prefix for compound names ("bis", "tris", "tetrakis").
pub fn compound_multiplier(n: usize) -> String {
    match n {
        0 | 1 => String::new(),
        2 => "bis".to_string(),
        3 => "tris".to_string(),
        n => format!("{}kis", multiplier(n)),
    }
}

/// Alphanumerical ordering key: letters only, lowercased.
pub fn alpha_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Wraps a compound name, nesting ( [ { as needed.
pub fn enclose(name: &str) -> String {
    if name.contains('[') {
        format!("{{{name}}}")
    } else if name.contains('(') {
        format!("[{name}]")
    } else {
        format!("({name})")
    }
}

fn starts_with_locant(text: &str) -> bool {
    text.chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

/// Concatenates name pieces, hyphenating before a piece that opens with a locant.
pub fn join_pieces<S: AsRef<str>>(pieces: &[S]) -> String {
    let mut out = String::new();
    for piece in pieces {
        let piece = piece.as_ref();
        if piece.is_empty() {
            continue;
        }
        if !out.is_empty() && starts_with_locant(piece) {
            out.push('-');
        }
        out.push_str(piece);
    }
    out
}

/// Groups substituents by name, multiplies them and orders them alphabetically.
pub fn render_prefixes(substituents: &[Substituent], show_locants: bool) -> String {
    let mut groups: BTreeMap<(String, String), (bool, Vec<(Locant, String)>)> = BTreeMap::new();
    for substituent in substituents {
        groups
            .entry((alpha_key(&substituent.name), substituent.name.clone()))
            .or_insert((substituent.compound, Vec::new()))
            .1
            .push((substituent.locant, substituent.label.clone()));
    }

    let mut pieces = Vec::new();
    for ((_, name), (compound, mut locants)) in groups {
        locants.sort();
        let count = locants.len();
        let body = if compound {
            format!("{}{}", compound_multiplier(count), enclose(&name))
        } else {
            format!("{}{}", multiplier(count), name)
        };
        let positional = locants.iter().all(|(l, _)| matches!(l, Locant::Position(_)));
        if show_locants || !positional {
            let labels: Vec<&str> = locants.iter().map(|(_, label)| label.as_str()).collect();
            pieces.push(format!("{}-{}", labels.join(","), body));
        } else {
            pieces.push(body);
        }
    }
    join_pieces(&pieces)
}

/// Replacement prefixes ("2-oxa", "1,4-dioxa") in seniority order.
pub fn render_hetero(hetero: &[(String, Element)], show_locants: bool) -> String {
    let mut groups: BTreeMap<(u8, &'static str), Vec<&str>> = BTreeMap::new();
    for (label, element) in hetero {
        let Some(prefix) = element.replacement_prefix() else { continue };
        groups
            .entry((element.hetero_seniority(), prefix))
            .or_default()
            .push(label.as_str());
    }
    let pieces: Vec<String> = groups
        .into_iter()
        .map(|((_, prefix), labels)| {
            let body = format!("{}{}", multiplier(labels.len()), prefix);
            if show_locants {
                format!("{}-{}", labels.join(","), body)
            } else {
                body
            }
        })
        .collect();
    join_pieces(&pieces)
}

/// Root plus "ane", or plus the ene/yne infixes ("buta-1,3-diene", "but-1-en-3-yne").
pub fn unsaturated_stem(root: &str, unsaturation: &[(String, Bond)], show_locants: bool) -> String {
    let enes: Vec<&str> = unsaturation
        .iter()
        .filter(|(_, b)| *b == Bond::Double)
        .map(|(l, _)| l.as_str())
        .collect();
    let ynes: Vec<&str> = unsaturation
        .iter()
        .filter(|(_, b)| *b == Bond::Triple)
        .map(|(l, _)| l.as_str())
        .collect();
    if enes.is_empty() && ynes.is_empty() {
        return format!("{root}ane");
    }

    let part = |labels: &[&str], ending: &str| -> String {
        let text = format!("{}{}", multiplier(labels.len()), ending);
        if show_locants {
            format!("-{}-{}", labels.join(","), text)
        } else {
            text
        }
    };

    let mut stem = root.to_string();
    let first = if enes.is_empty() { ynes.len() } else { enes.len() };
    if first > 1 {
        stem.push('a');
    }
    if !enes.is_empty() {
        let mut ene = part(&enes, "ene");
        if !ynes.is_empty() {
            ene.pop();
        }
        stem.push_str(&ene);
    }
    if !ynes.is_empty() {
        stem.push_str(&part(&ynes, "yne"));
    }
    stem
}

/// A suffix ending: multiplied text plus the locants it is cited with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixText {
    pub stem: String,
    pub count: usize,
    pub labels: Vec<String>,
    pub show_locants: bool,
}

/// Adds a suffix, eliding a final "a" or "e" before a vowel or "y".
pub fn attach_suffix(mut body: String, suffix: &SuffixText) -> String {
    let text = format!("{}{}", multiplier(suffix.count), suffix.stem);
    if body.ends_with(['a', 'e']) && text.starts_with(|c: char| "aeiouy".contains(c)) {
        body.pop();
    }
    if suffix.show_locants && !suffix.labels.is_empty() {
        format!("{body}-{}-{text}", suffix.labels.join(","))
    } else {
        format!("{body}{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stem {
    /// A bare root that takes its ending directly ("meth" + "yl").
    Root(String),
    /// A root followed by "ane" or by its ene/yne infixes.
    Systematic {
        root: String,
        unsaturation: Vec<(String, Bond)>,
        show_locants: bool,
    },
    /// A complete name used as is ("pyridine", "phenol").
    Retained(String),
}

/// Everything the assembler needs, with locant omission already decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub leading_words: Vec<String>,
    pub prefixes: Vec<Substituent>,
    pub show_prefix_locants: bool,
    pub hetero: Vec<(String, Element)>,
    pub show_hetero_locants: bool,
    pub stem: Stem,
    pub suffix: Option<SuffixText>,
    pub trailing_word: Option<String>,
}

pub fn assemble_name(parts: &NameParts) -> String {
    let prefixes = render_prefixes(&parts.prefixes, parts.show_prefix_locants);
    let hetero = render_hetero(&parts.hetero, parts.show_hetero_locants);
    let stem = match &parts.stem {
        Stem::Root(root) => root.clone(),
        Stem::Retained(name) => name.clone(),
        Stem::Systematic {
            root,
            unsaturation,
            show_locants,
        } => unsaturated_stem(root, unsaturation, *show_locants),
    };
    let mut name = join_pieces(&[prefixes, hetero, stem]);
    if let Some(suffix) = &parts.suffix {
        name = attach_suffix(name, suffix);
    }
    if let Some(word) = &parts.trailing_word {
        name = format!("{name} {word}");
    }
    if !parts.leading_words.is_empty() {
        name = format!("{} {name}", parts.leading_words.join(" "));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubstituentCategory;

    fn prefix(name: &str, locant: usize) -> Substituent {
        Substituent {
            locant: Locant::Position(locant),
            label: locant.to_string(),
            attachment: 0,
            atom: 0,
            category: SubstituentCategory::Alkyl,
            size: 1,
            name: name.to_string(),
            compound: name.contains(|c: char| c.is_ascii_digit()),
        }
    }

    #[test]
    fn test_numeral_roots() {
        let expected = [
            "meth", "eth", "prop", "but", "pent", "hex", "hept", "oct", "non", "dec", "undec", "dodec", "tridec",
            "tetradec", "pentadec", "hexadec", "heptadec", "octadec", "nonadec", "icos",
        ];
        for (i, root) in expected.iter().enumerate() {
            assert_eq!(numeral_root(i + 1), *root);
        }
        assert_eq!(numeral_root(21), "henicos");
        assert_eq!(numeral_root(22), "docos");
        assert_eq!(numeral_root(30), "triacont");
        assert_eq!(numeral_root(32), "dotriacont");
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(multiplier(1), "");
        assert_eq!(multiplier(2), "di");
        assert_eq!(multiplier(5), "penta");
        assert_eq!(multiplier(11), "undeca");
        assert_eq!(compound_multiplier(2), "bis");
        assert_eq!(compound_multiplier(4), "tetrakis");
    }

    #[test]
    fn test_prefixes_are_alphabetical() {
        let subs = vec![prefix("methyl", 2), prefix("ethyl", 4), prefix("methyl", 5)];
        assert_eq!(render_prefixes(&subs, true), "4-ethyl-2,5-dimethyl");
        let subs = vec![prefix("propan-2-yl", 3), prefix("chloro", 1)];
        assert_eq!(render_prefixes(&subs, true), "1-chloro-3-(propan-2-yl)");
    }

    #[test]
    fn test_unsaturation() {
        let ene = |l: &str| (l.to_string(), Bond::Double);
        let yne = |l: &str| (l.to_string(), Bond::Triple);
        assert_eq!(unsaturated_stem("but", &[], true), "butane");
        assert_eq!(unsaturated_stem("but", &[ene("1"), ene("3")], true), "buta-1,3-diene");
        assert_eq!(unsaturated_stem("but", &[ene("1"), yne("3")], true), "but-1-en-3-yne");
        assert_eq!(unsaturated_stem("eth", &[ene("1")], false), "ethene");
    }

    #[test]
    fn test_suffix_elision() {
        let suffix = |stem: &str, labels: &[&str]| SuffixText {
            stem: stem.to_string(),
            count: labels.len().max(1),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            show_locants: true,
        };
        assert_eq!(attach_suffix("propane".into(), &suffix("ol", &["2"])), "propan-2-ol");
        assert_eq!(attach_suffix("ethane".into(), &suffix("ol", &["1", "2"])), "ethane-1,2-diol");
        assert_eq!(attach_suffix("ethane".into(), &suffix("nitrile", &[])), "ethanenitrile");
        assert_eq!(attach_suffix("pyridine".into(), &suffix("yl", &["3"])), "pyridin-3-yl");
        assert_eq!(attach_suffix("penta".into(), &suffix("one", &["2"])), "pent-2-one");
        assert_eq!(attach_suffix("penta".into(), &suffix("thiol", &["1"])), "penta-1-thiol");
    }

    #[test]
    fn test_replacement_prefixes_on_chains() {
        let parts = |hetero: Vec<(&str, Element)>, root: &str| NameParts {
            leading_words: Vec::new(),
            prefixes: Vec::new(),
            show_prefix_locants: true,
            hetero: hetero.into_iter().map(|(l, e)| (l.to_string(), e)).collect(),
            show_hetero_locants: true,
            stem: Stem::Systematic {
                root: root.to_string(),
                unsaturation: Vec::new(),
                show_locants: true,
            },
            suffix: None,
            trailing_word: None,
        };
        assert_eq!(assemble_name(&parts(vec![("3", Element::O)], "pent")), "3-oxapentane");
        assert_eq!(
            assemble_name(&parts(vec![("2", Element::S), ("5", Element::S)], "hex")),
            "2,5-dithiahexane"
        );
        assert_eq!(
            assemble_name(&parts(vec![("5", Element::S), ("2", Element::O)], "hex")),
            "2-oxa-5-thiahexane"
        );
    }

    #[test]
    fn test_enclosures_nest() {
        assert_eq!(enclose("methylamino"), "(methylamino)");
        assert_eq!(enclose("2-(methylamino)ethyl"), "[2-(methylamino)ethyl]");
        assert_eq!(enclose("a[b(c)]"), "{a[b(c)]}");
    }
}
