use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lowex::{ConvertOptions, parse, transpile, transpile_with};

fn bench_plain_groups(c: &mut Criterion) {
    let pattern = r"(\w+)@(\w+)\.(com|org)\k<-2>";

    c.bench_function("plain_groups", |b| {
        b.iter(|| black_box(transpile(black_box(pattern))))
    });
}

fn bench_atomic_emulation(c: &mut Criterion) {
    let pattern = r"(?>aa|a)(?>aa|a)(X)\1\d++[a-f]*+";

    c.bench_function("atomic_emulation", |b| {
        b.iter(|| black_box(transpile(black_box(pattern))))
    });
}

fn bench_named_references(c: &mut Criterion) {
    let pattern = r"(?<year>\d{4})-(?<month>\d{2})-(?<day>\d{2}) \k<day>/\k<month>/\k<year>";

    c.bench_function("named_references", |b| {
        b.iter(|| black_box(transpile(black_box(pattern))))
    });
}

fn bench_subexp_inlining(c: &mut Criterion) {
    let pattern = r"(?<oct>25[0-5]|2[0-4]\d|1?\d?\d)\.\g<oct>\.\g<oct>\.\g<oct>";

    c.bench_function("subexp_inlining", |b| {
        b.iter(|| black_box(transpile(black_box(pattern))))
    });
}

fn bench_mutual_recursion(c: &mut Criterion) {
    let pattern = r"(a\g<2>?)(b\g<3>?)(c\g<1>?)\g<1>\g<2>\g<3>";
    let options = ConvertOptions::default().with_max_inline_depth(8);

    c.bench_function("mutual_recursion", |b| {
        b.iter(|| black_box(transpile_with(black_box(pattern), &options)))
    });
}

fn bench_parse_only(c: &mut Criterion) {
    let pattern = r"(?<word>[a-zA-Z_][a-zA-Z0-9_]*)\s*=\s*(?>\d+|\k<word>)";

    c.bench_function("parse_only", |b| {
        b.iter(|| black_box(parse(black_box(pattern))))
    });
}

criterion_group!(
    benches,
    bench_plain_groups,
    bench_atomic_emulation,
    bench_named_references,
    bench_subexp_inlining,
    bench_mutual_recursion,
    bench_parse_only
);
criterion_main!(benches);
