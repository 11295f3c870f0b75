use std::collections::BTreeMap;

use proptest::prelude::*;

use hamaward_lib::{
    adif::{parse_adif, AdifRecord},
    awards::{enhance_record, AwardCatalog, AwardChecker},
    reference::{CallsignResolver, PrefixTable},
};

const CTY: &str = "\
China:  24:  44:  AS:  36.00:  -102.00:  -8.0:  BY:
    3H,3H0,BA-BL,BR-BT,BY,BZ;
Taiwan:  24:  44:  AS:  23.72:  -120.88:  -8.0:  BV:
    BM,BN,BO,BP,BQ,BU,BV,BW,BX;
Japan:  25:  45:  AS:  36.40:  -138.38:  -9.0:  JA:
    7J,7K,7L,7M,7N,8J,JA,JE,JF,JG,JH,JI,JJ,JK,JL,JM,JN,JO,JP,JQ,JR,JS;
United States:  05:  08:  NA:  37.53:  91.67:  5.0:  K:
    AA,K,N,W;
";

fn resolver() -> CallsignResolver {
    CallsignResolver::new(PrefixTable::parse(CTY))
}

type Fields = BTreeMap<String, String>;

fn record_strategy() -> impl Strategy<Value = Fields> {
    prop::collection::btree_map("x_[a-z]{1,6}", "[A-Z0-9]{1,10}", 1..6)
}

fn to_adif(records: &[Fields]) -> String {
    let mut text = String::from("Generated for tests\n<ADIF_VER:5>3.1.4<EOH>\n");
    for fields in records {
        for (k, v) in fields {
            text.push_str(&format!("<{}:{}>{} ", k.to_uppercase(), v.len(), v));
        }
        text.push_str("<EOR>\n");
    }
    text
}

fn record_from(pairs: &[(&str, String)]) -> AdifRecord {
    let mut r = AdifRecord::new();
    for (k, v) in pairs {
        r.add(k, v.clone());
    }
    r
}

proptest! {
    #[test]
    fn parsing_is_deterministic_and_keeps_every_record(records in prop::collection::vec(record_strategy(), 0..20)) {
        let text = to_adif(&records);
        let first = parse_adif(&text);
        let second = parse_adif(&text);
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(first.header.get("adif_ver"), Some("3.1.4"));
        prop_assert_eq!(first.records.len(), records.len());
        for (parsed, expected) in first.records.iter().zip(&records) {
            for (k, v) in expected {
                prop_assert_eq!(parsed.get(k), Some(v.as_str()));
            }
        }
    }

    #[test]
    fn enhancement_is_idempotent_and_never_overwrites(
        call in "(BA|BD|BV|BY|JA|K|W|VR2|3H0|ZZ)[0-9][A-Z]{1,3}",
        country in prop::option::of("[A-Z][a-z]{2,8}"),
        state in prop::option::of("[A-Z]{2}"),
        dxcc in prop::option::of("[0-9]{1,3}"),
    ) {
        let r = resolver();
        let mut pairs = vec![("call", call)];
        if let Some(c) = &country { pairs.push(("country", c.clone())); }
        if let Some(s) = &state { pairs.push(("state", s.clone())); }
        if let Some(d) = &dxcc { pairs.push(("dxcc", d.clone())); }
        let input = record_from(&pairs);

        let once = enhance_record(&r, &input);
        prop_assert_eq!(&enhance_record(&r, &once), &once);

        if let Some(c) = &country { prop_assert_eq!(once.country(), Some(c.as_str())); }
        if let Some(s) = &state { prop_assert_eq!(once.state(), Some(s.as_str())); }
        if let Some(d) = &dxcc { prop_assert_eq!(once.dxcc(), Some(d.as_str())); }
    }
}

#[test]
fn cty_layout_resolves_through_primary_prefix_and_continuations() {
    let r = resolver();
    let china = r.resolve("BY1AA");
    assert_eq!(china.country.as_deref(), Some("China"));
    assert_eq!(china.dxcc.as_deref(), Some("318"));
    assert_eq!(r.resolve("3H0A").country.as_deref(), Some("China"));
    assert_eq!(r.resolve("7K1ABC").country.as_deref(), Some("Japan"));
    assert_eq!(r.resolve("AA1A").continent.as_deref(), Some("NA"));
}

#[test]
fn full_log_evaluation() {
    let log = "\
<PROGRAMID:4>LoTW <EOH>
<CALL:5>BA1AB <QSO_DATE:8>20240101 <TIME_ON:4>1230 <EOR>
<CALL:5>BA1AB <QSO_DATE:8>20240101 <TIME_ON:4>1231 <EOR>
<CALL:5>BG2CD <QSO_DATE:8>20240102 <TIME_ON:6>013000 <EOR>
<CALL:5>BV2AB <QSO_DATE:8>20240103 <TIME_ON:4>0800 <EOR>
<CALL:6>JA1XYZ <QSO_DATE:8>20240104 <TIME_ON:4>0900 <EOR>
<CALL:4>W1AW <QSO_DATE:8>20240105 <TIME_ON:4>1000 <EOR>
<APP_LOTW_EOF:0>
";
    let catalog = AwardCatalog::builtin();
    let resolver = resolver();
    let checker = AwardChecker::new(&catalog, &resolver);
    let report = hamaward_lib::analyze_log(log, &checker);

    assert_eq!(report.variant, "LoTW");
    assert_eq!(report.records.len(), 6);
    assert_eq!(report.records[0].qso_datetime(), Some("2024-01-01T12:30:00"));

    let dxcc = &report.results["DXCC"];
    assert_eq!(dxcc.conditions[0].current, 4);
    assert!(!dxcc.eligible);
    assert_eq!(dxcc.unique_contacts, 5);
    assert_eq!(dxcc.enhanced_records_count, 4);
    assert_eq!(dxcc.basic_records_count, 2);

    let wacz = &report.results["WACZ"];
    assert_eq!(wacz.conditions[0].current, 2);
    assert_eq!(wacz.enhanced_records_count, 3);

    let wapc = &report.results["WAPC"];
    // BJ, HL and TW
    assert_eq!(wapc.conditions[0].current, 3);
    assert_eq!(wapc.enhanced_records_count, 4);
}
