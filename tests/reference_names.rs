use csv::ReaderBuilder;
use iupac_namer::*;

#[test]
fn test_reference_names() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/reference-names.csv");
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path).unwrap();
    let mut memo = RingMemo::new();
    let options = NamingOptions::default();
    let mut checked = 0;
    for record in rdr.records() {
        let record = record.unwrap();
        let (smiles, expected) = (&record[0], &record[1]);
        let name = iupac_name_with(smiles, &options, &mut memo).unwrap();
        assert_eq!(name, expected, "{smiles}");
        checked += 1;
    }
    assert!(checked > 20);
}

#[test]
fn test_unparseable_smiles_is_an_error() {
    assert!(iupac_name("C1CC").is_err());
    assert!(iupac_name("").is_err());
}

#[test]
fn test_string_entry_point_matches_options() {
    let mut memo = RingMemo::new();
    let keep = NamingOptions::default().with_omit_unambiguous_locants(false);
    assert_eq!(iupac_name("CCO").unwrap(), "ethanol");
    assert_eq!(iupac_name_with("CCO", &keep, &mut memo).unwrap(), "ethan-1-ol");
}
