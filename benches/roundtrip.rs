#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use ace_ari::cbor::{decode, encode};
use ace_ari::text::{parse, unparse};
use ace_ari::{Ari, Lit};

const SMALL: &str = "ari:/UINT.2";

fn sample_medium() -> String {
    // A control reference with a mixed parameter list.
    let mut items = Vec::new();
    for i in 0..64u32 {
        items.push(Ari::uint(i));
    }
    let ac = Ari::Lit(Lit::Ac(items));
    format!(
        "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,{},\"sample\")",
        unparse(&ac)
    )
}

fn bench_roundtrip(c: &mut Criterion) {
    c.bench_function("parse_text_small", |b| {
        b.iter(|| {
            let ari = parse(black_box(SMALL)).unwrap();
            black_box(ari);
        })
    });

    let medium = sample_medium();
    c.bench_function("parse_text_medium", |b| {
        b.iter(|| {
            let ari = parse(black_box(&medium)).unwrap();
            black_box(ari);
        })
    });

    let ast = parse(&medium).unwrap();
    c.bench_function("unparse_text_medium", |b| {
        b.iter(|| {
            let text = unparse(black_box(&ast));
            black_box(text);
        })
    });

    let bytes = encode(&ast).unwrap();
    c.bench_function("encode_cbor_medium", |b| {
        b.iter(|| {
            let out = encode(black_box(&ast)).unwrap();
            black_box(out);
        })
    });

    c.bench_function("decode_cbor_medium", |b| {
        b.iter(|| {
            let ari = decode(black_box(&bytes)).unwrap();
            black_box(ari);
        })
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
