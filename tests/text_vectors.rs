//! Text codec vectors: loopback through parse/unparse and failure cases.

use ace_ari::text::{parse, unparse};
use ace_ari::{Ari, ErrorKind, IdSeg, IntType, Label, Lit, Table};

/// `(input, canonical)` pairs: parsing the input and unparsing the result
/// must yield the canonical text, which must itself reparse to the same AST.
const LOOPBACK: &[(&str, &str)] = &[
    ("ari:true", "ari:/true"),
    ("ari:/true", "ari:/true"),
    ("ari:/FALSE", "ari:/false"),
    ("ari:/null", "ari:/null"),
    ("ari:/undefined", "ari:/undefined"),
    ("ari:/10", "ari:/10"),
    ("ari:/-10", "ari:/-10"),
    ("ari:/0x10", "ari:/16"),
    ("ari:/0b101", "ari:/5"),
    ("ari:/INT.10", "ari:/INT.10"),
    ("ari:/int.10", "ari:/INT.10"),
    ("ari:/UINT.2", "ari:/UINT.2"),
    ("ari:/BYTE.255", "ari:/BYTE.255"),
    ("ari:/UVAST.18446744073709551615", "ari:/UVAST.18446744073709551615"),
    ("ari:/VAST.-5", "ari:/-5"),
    ("ari:/1.5", "ari:/1.5"),
    ("ari:/2e3", "ari:/2000.0"),
    ("ari:/REAL32.0.25", "ari:/REAL32.0.25"),
    ("ari:/REAL64.Infinity", "ari:/Infinity"),
    ("ari:/\"hello\"", "ari:/\"hello\""),
    ("ari:/\"hi there\"", "ari:/\"hi%20there\""),
    ("ari:/h'6869'", "ari:/h'6869'"),
    ("ari:/b64'aGk'", "ari:/h'6869'"),
    ("ari:/TP.1685728970", "ari:/TP.1685728970"),
    ("ari:/TP.2023-06-02T19:22:50Z", "ari:/TP.1685728970"),
    ("ari:/TD.12.5", "ari:/TD.12.5"),
    ("ari:/TD.PT1H30M", "ari:/TD.5400"),
    ("ari:/TD.-PT0.5S", "ari:/TD.-0.5"),
    ("ari:/LABEL.here", "ari:/LABEL.here"),
    ("ari:/LABEL.3", "ari:/LABEL.3"),
    ("ari:/CBOR.h'a164746573740a'", "ari:/CBOR.h'a164746573740a'"),
    ("ari:/AC()", "ari:/AC()"),
    ("ari:/AC(1,UINT.2,\"x\")", "ari:/AC(1,UINT.2,\"x\")"),
    ("ari:/AC(AC(null))", "ari:/AC(AC(null))"),
    ("ari:/AM()", "ari:/AM()"),
    ("ari:/AM(1=true,2=false)", "ari:/AM(1=true,2=false)"),
    ("ari:/TBL(c=2;1,2;3,4)", "ari:/TBL(c=2;1,2;3,4)"),
    ("ari:/TBL(c=3)", "ari:/TBL(c=3)"),
    ("ari:/EXECSET(n=null)", "ari:/EXECSET(n=null)"),
    (
        "ari:/EXECSET(n=1234;ari://CTRL.clear)",
        "ari:/EXECSET(n=1234;ari://CTRL.clear)",
    ),
    ("ari:/VAR.hello", "ari://VAR.hello"),
    ("ari://VAR.hello", "ari://VAR.hello"),
    ("ari:/namespace/VAR.hello", "ari:/namespace/VAR.hello"),
    ("ari:/namespace/VAR.hello()", "ari:/namespace/VAR.hello()"),
    (
        "ari:/namespace/VAR.hello(INT.10)",
        "ari:/namespace/VAR.hello(INT.10)",
    ),
    (
        "ari:/IANA:DTN.bp_agent/CTRL.reset_all_counts()",
        "ari:/IANA:DTN.bp_agent/CTRL.reset_all_counts()",
    ),
    ("ari:/!18/EDD.3", "ari:/!18/EDD.3"),
    (
        "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UVAST.1685729269,UINT.2,UINT.2,UVAST.25000,UVAST.1)",
        "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UVAST.1685729269,UINT.2,UINT.2,UVAST.25000,UVAST.1)",
    ),
    (
        "ari:/IANA:amp_agent/CTRL.gen_rpts(AC(ari:/IANA:bpsec/RPTT.source_report(\"ipn:1.1\")),AC())",
        "ari:/IANA:amp_agent/CTRL.gen_rpts(AC(ari:/IANA:bpsec/RPTT.source_report(\"ipn:1.1\")),AC())",
    ),
];

#[test]
fn text_loopback_vectors() {
    for (input, canonical) in LOOPBACK {
        let ari = parse(input).unwrap_or_else(|err| panic!("parse {input}: {err}"));
        let out = unparse(&ari);
        assert_eq!(&out, canonical, "canonical form of {input}");
        let again = parse(&out).unwrap_or_else(|err| panic!("reparse {out}: {err}"));
        assert_eq!(again, ari, "reparse of {out}");
    }
}

const INVALID: &[&str] = &[
    "",
    "ari:hello",
    "ari:/namespace/hello((",
    "ari:/FLOAT.10",
    "ari:/INT.\"x\"",
    "ari:/INT.2147483648",
    "ari:/INT16.32768",
    "ari:/BYTE.256",
    "ari:/UINT.-1",
    "ari:/TBL(c=2;1,2;3)",
    "ari:/AM(1=true,1=false)",
    "ari:/AC(1,",
    "ari:/TP.xyz",
    "ari:/\"unterminated",
    "ari:/h'012'",
    "ari:/UINT.2 extra",
];

#[test]
fn invalid_text_fails() {
    for input in INVALID {
        assert!(parse(input).is_err(), "expected failure for {input:?}");
    }
}

#[test]
fn int16_boundary_follows_width() {
    assert!(parse("ari:/INT16.32767").is_ok());
    let err = parse("ari:/INT16.32768").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    // The same numeral is fine at 32 bits.
    assert!(parse("ari:/INT.32768").is_ok());
}

#[test]
fn numeric_equality_does_not_cross_widths() {
    let uint = parse("ari:/UINT.1").unwrap();
    let int = parse("ari:/INT.1").unwrap();
    let vast = parse("ari:/1").unwrap();
    assert_ne!(uint, int);
    assert_ne!(uint, vast);
    assert_ne!(int, vast);
}

#[test]
fn complex_reference_shape() {
    let text = "ari:/IANA:amp_agent/CTRL.gen_rpts(AC(ari:/IANA:bpsec/RPTT.source_report(\"ipn:1.1\")),AC())";
    let ari = parse(text).unwrap();
    let Ari::Ref(r) = &ari else { panic!("not a reference") };
    assert_eq!(r.ns, Some(IdSeg::Name("IANA:amp_agent".into())));
    assert_eq!(r.obj, IdSeg::Name("gen_rpts".into()));
    let params = r.params.as_ref().unwrap();
    assert_eq!(params.len(), 2);
    let Ari::Lit(Lit::Ac(first)) = &params[0] else {
        panic!("first parameter is not an AC")
    };
    let Ari::Ref(inner) = &first[0] else {
        panic!("AC element is not a reference")
    };
    assert_eq!(inner.obj, IdSeg::Name("source_report".into()));
    let Ari::Lit(Lit::Ac(second)) = &params[1] else {
        panic!("second parameter is not an AC")
    };
    assert!(second.is_empty());
}

#[test]
fn label_and_table_shapes() {
    let ari = parse("ari:/LABEL.here").unwrap();
    assert_eq!(ari, Ari::Lit(Lit::Label(Label::Text("here".into()))));

    let ari = parse("ari:/TBL(c=2;1,2;3,4)").unwrap();
    let expected = Ari::Lit(Lit::Tbl(
        Table::new(2, vec![Ari::vast(1), Ari::vast(2), Ari::vast(3), Ari::vast(4)]).unwrap(),
    ));
    assert_eq!(ari, expected);
}

#[test]
fn typed_int_values_accept_radix_prefixes() {
    let hex = parse("ari:/UINT.0x10").unwrap();
    assert_eq!(hex, Ari::uint(16));
    let Ari::Lit(Lit::Int(il)) = parse("ari:/BYTE.0b1111").unwrap() else {
        panic!("not an integer literal")
    };
    assert_eq!(il.ty(), IntType::Byte);
    assert_eq!(il.value(), 15);
}

#[test]
fn percent_encoding_roundtrips_awkward_strings() {
    let ari = Ari::text("a,b(c)\"d\" e;f=g%h");
    let out = unparse(&ari);
    assert_eq!(parse(&out).unwrap(), ari);
}
