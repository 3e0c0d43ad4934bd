// Property-based tests for ARI text and CBOR roundtrips.
//
// Strategies stay conservative in size and depth to keep CI fast. NaN is
// excluded (it breaks structural equality, not the codecs).
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use ace_ari::cbor::{decode, encode};
use ace_ari::text::{parse, unparse};
use ace_ari::{Ari, DtnTime, ExecSet, IdSeg, IntLit, IntType, Label, Lit, RefAri, Table};

fn arb_int_type() -> impl Strategy<Value = IntType> {
    prop_oneof![
        Just(IntType::Byte),
        Just(IntType::Int8),
        Just(IntType::Int16),
        Just(IntType::Uint16),
        Just(IntType::Int),
        Just(IntType::Uint),
        Just(IntType::Vast),
        Just(IntType::Uvast),
    ]
}

fn arb_int() -> impl Strategy<Value = IntLit> {
    arb_int_type().prop_flat_map(|ty| {
        // Bias toward the width boundaries.
        prop_oneof![
            4 => (ty.min()..=ty.max()).prop_map(move |v| IntLit::new(ty, v).unwrap()),
            1 => Just(IntLit::new(ty, ty.min()).unwrap()),
            1 => Just(IntLit::new(ty, ty.max()).unwrap()),
        ]
    })
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_filter("grammar keywords are not names", |s| {
        !matches!(
            s.as_str(),
            "true" | "false" | "null" | "undefined" | "nan" | "infinity"
        )
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    // Includes characters the unparser must percent-escape.
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('a', 'z'),
            proptest::char::range('\u{00a1}', '\u{00ff}'),
            Just(' '),
            Just('"'),
            Just('%'),
            Just(','),
            Just('('),
        ],
        0..=24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_time() -> impl Strategy<Value = DtnTime> {
    (
        -1_000_000_000i64..=4_000_000_000i64,
        prop_oneof![4 => Just(0u32), 1 => 0u32..1_000_000_000u32],
    )
        .prop_map(|(secs, nanos)| {
            let nanos = if secs < 0 { 0 } else { nanos };
            DtnTime::new(secs, nanos as i32).unwrap()
        })
}

fn arb_leaf() -> impl Strategy<Value = Ari> {
    prop_oneof![
        Just(Ari::Undefined),
        Just(Ari::Lit(Lit::Null)),
        any::<bool>().prop_map(|b| Ari::Lit(Lit::Bool(b))),
        arb_int().prop_map(|il| Ari::Lit(Lit::Int(il))),
        any::<f32>()
            .prop_filter("NaN breaks equality", |v| !v.is_nan())
            .prop_map(|v| Ari::Lit(Lit::Real32(v))),
        any::<f64>()
            .prop_filter("NaN breaks equality", |v| !v.is_nan())
            .prop_map(|v| Ari::Lit(Lit::Real64(v))),
        arb_text().prop_map(|s| Ari::Lit(Lit::TextStr(s))),
        proptest::collection::vec(any::<u8>(), 0..=24).prop_map(|b| Ari::Lit(Lit::ByteStr(b))),
        arb_time().prop_map(|t| Ari::Lit(Lit::Tp(t))),
        arb_time().prop_map(|t| Ari::Lit(Lit::Td(t))),
        arb_name().prop_map(|n| Ari::Lit(Lit::Label(Label::Text(n)))),
        any::<i32>().prop_map(|v| Ari::Lit(Lit::Label(Label::Int(i64::from(v))))),
    ]
}

fn arb_ref(inner: impl Strategy<Value = Ari> + Clone + 'static) -> impl Strategy<Value = Ari> {
    let seg = prop_oneof![
        arb_name().prop_map(IdSeg::Name),
        (0i64..=100_000).prop_map(IdSeg::Num),
    ];
    let ns = prop_oneof![
        2 => seg.clone().prop_map(Some),
        1 => Just(None),
    ];
    let obj_type = prop_oneof![
        Just(ace_ari::ObjType::Const),
        Just(ace_ari::ObjType::Ctrl),
        Just(ace_ari::ObjType::Edd),
        Just(ace_ari::ObjType::Var),
        Just(ace_ari::ObjType::Oper),
    ];
    let params = prop_oneof![
        1 => Just(None),
        2 => proptest::collection::vec(inner, 0..=3).prop_map(Some),
    ];
    (ns, obj_type, seg, params).prop_map(|(ns, obj_type, obj, params)| {
        Ari::Ref(Box::new(RefAri {
            ns,
            obj_type,
            obj,
            params,
        }))
    })
}

fn arb_ari() -> impl Strategy<Value = Ari> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..=4).prop_map(|v| Ari::Lit(Lit::Ac(v))),
            (1u64..=3, proptest::collection::vec(inner.clone(), 0..=2)).prop_map(
                |(cols, rows)| {
                    // Pad the flat items out to a whole number of rows.
                    let mut items = rows;
                    while items.len() as u64 % cols != 0 {
                        items.push(Ari::Lit(Lit::Null));
                    }
                    Ari::Lit(Lit::Tbl(Table::new(cols, items).unwrap()))
                }
            ),
            (inner.clone(), proptest::collection::vec(inner.clone(), 0..=3)).prop_map(
                |(nonce, targets)| Ari::Lit(Lit::ExecSet(ExecSet { nonce: Box::new(nonce), targets }))
            ),
            arb_am(inner.clone()),
            arb_ref(inner),
        ]
    })
}

fn arb_am(inner: impl Strategy<Value = Ari> + Clone + 'static) -> impl Strategy<Value = Ari> {
    // Integer keys keep duplicate detection trivial.
    proptest::collection::btree_map(0u32..=1000, inner, 0..=3).prop_map(|m| {
        let entries = m.into_iter().map(|(k, v)| (Ari::uint(k), v)).collect();
        Ari::Lit(Lit::Am(entries))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// `parse(unparse(x)) = x`.
    #[test]
    fn text_roundtrip(ari in arb_ari()) {
        let text = unparse(&ari);
        let back = parse(&text).unwrap();
        prop_assert_eq!(back, ari, "text was {}", text);
    }

    /// `decode(encode(x)) = x`.
    #[test]
    fn cbor_roundtrip(ari in arb_ari()) {
        let bytes = encode(&ari).unwrap();
        let back = decode(&bytes).unwrap();
        prop_assert_eq!(back, ari, "bytes were {}", hex::encode(&bytes));
    }

    /// `encode(x)` is byte-deterministic, including through a decode cycle.
    #[test]
    fn cbor_deterministic(ari in arb_ari()) {
        let a = encode(&ari).unwrap();
        let b = encode(&ari).unwrap();
        prop_assert_eq!(&a, &b);
        let again = encode(&decode(&a).unwrap()).unwrap();
        prop_assert_eq!(a, again);
    }

    /// Text -> binary -> text is stable on the canonical form.
    #[test]
    fn cross_roundtrip(ari in arb_ari()) {
        let canonical = unparse(&ari);
        let bytes = encode(&parse(&canonical).unwrap()).unwrap();
        let text = unparse(&decode(&bytes).unwrap());
        prop_assert_eq!(text, canonical);
    }
}
