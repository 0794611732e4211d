use crate::{Chirality, Element};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// The contents of a `[...]` atom in SMILES.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketAtom {
    pub isotope: Option<u16>,
    pub element: Element,
    pub aromatic: bool,
    pub chirality: Option<Chirality>,
    pub hydrogens: u8,
    pub charge: i8,
}

fn isotope(input: &str) -> IResult<&str, Option<u16>> {
    opt(map_res(
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u16>(),
    ))(input)
}

fn aromatic_symbol(input: &str) -> IResult<&str, (Element, bool)> {
    alt((
        map(tag("se"), |_| (Element::Se, true)),
        map_opt(one_of("bcnops"), |c| {
            let element = match c {
                'b' => Element::B,
                'c' => Element::C,
                'n' => Element::N,
                'o' => Element::O,
                'p' => Element::P,
                's' => Element::S,
                _ => return None,
            };
            Some((element, true))
        }),
    ))(input)
}

fn element_symbol(input: &str) -> IResult<&str, (Element, bool)> {
    let two_letters = map_opt(
        recognize(pair(
            satisfy(|c| c.is_ascii_uppercase()),
            satisfy(|c| c.is_ascii_lowercase()),
        )),
        Element::from_symbol,
    );
    let one_letter = map_opt(
        recognize(satisfy(|c| c.is_ascii_uppercase())),
        Element::from_symbol,
    );
    map(alt((two_letters, one_letter)), |element| (element, false))(input)
}

fn chirality(input: &str) -> IResult<&str, Chirality> {
    alt((
        map(tag("@@"), |_| Chirality::Clockwise),
        map(tag("@"), |_| Chirality::Anticlockwise),
    ))(input)
}

fn hydrogen_count(input: &str) -> IResult<&str, u8> {
    map(
        opt(preceded(
            char('H'),
            opt(map_res(
                take_while_m_n(1, 1, |c: char| c.is_ascii_digit()),
                |s: &str| s.parse::<u8>(),
            )),
        )),
        |count| count.map(|n| n.unwrap_or(1)).unwrap_or(0),
    )(input)
}

fn charge(input: &str) -> IResult<&str, i8> {
    map(
        many0(map(
            pair(
                one_of("+-"),
                opt(map_res(
                    take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
                    |s: &str| s.parse::<i8>(),
                )),
            ),
            |(sign, count)| {
                let count = count.unwrap_or(1);
                if sign == '+' {
                    count
                } else {
                    -count
                }
            },
        )),
        |charges| charges.into_iter().fold(0i8, |acc, c| acc.saturating_add(c)),
    )(input)
}

fn atom_class(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), digit1)(input)
}

/// Parses the text between `[` and `]`, which must be consumed completely.
pub fn parse_bracket_atom(content: &str) -> Option<BracketAtom> {
    let parsed = all_consuming(tuple((
        isotope,
        alt((aromatic_symbol, element_symbol)),
        opt(chirality),
        hydrogen_count,
        charge,
        opt(atom_class),
    )))(content);
    match parsed {
        Ok((_, (isotope, (element, aromatic), chirality, hydrogens, charge, _))) => {
            Some(BracketAtom {
                isotope,
                element,
                aromatic,
                chirality,
                hydrogens,
                charge,
            })
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_atoms() {
        let nh = parse_bracket_atom("nH").unwrap();
        assert_eq!(nh.element, Element::N);
        assert!(nh.aromatic);
        assert_eq!(nh.hydrogens, 1);

        let sodium = parse_bracket_atom("Na+").unwrap();
        assert_eq!((sodium.element, sodium.charge, sodium.hydrogens), (Element::Na, 1, 0));
        let zinc = parse_bracket_atom("Zn+2").unwrap();
        assert_eq!((zinc.element, zinc.charge), (Element::Zn, 2));

        let ammonium = parse_bracket_atom("NH4+").unwrap();
        assert_eq!(ammonium.hydrogens, 4);
        assert_eq!(ammonium.charge, 1);

        let carbon13 = parse_bracket_atom("13C@@H").unwrap();
        assert_eq!(carbon13.isotope, Some(13));
        assert_eq!(carbon13.chirality, Some(Chirality::Clockwise));
        assert_eq!(carbon13.hydrogens, 1);

        let oxide = parse_bracket_atom("O--").unwrap();
        assert_eq!(oxide.charge, -2);

        let chloride = parse_bracket_atom("Cl-").unwrap();
        assert_eq!(chloride.element, Element::Cl);
        assert_eq!(chloride.charge, -1);

        assert_eq!(parse_bracket_atom("se").map(|a| a.element), Some(Element::Se));
        assert_eq!(parse_bracket_atom("CH3:1").map(|a| a.hydrogens), Some(3));
    }

    #[test]
    fn test_bad_bracket_atoms() {
        assert!(parse_bracket_atom("").is_none());
        assert!(parse_bracket_atom("Xx").is_none());
        assert!(parse_bracket_atom("C+x").is_none());
    }
}
