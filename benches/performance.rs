use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hygiene_hooks::analysis::boundary::scan_function_spans;
use hygiene_hooks::analysis::duplicate_detector::find_duplicate_blocks;
use hygiene_hooks::analysis::split_lines;
use hygiene_hooks::{scan_text, ScanOptions, Thresholds};

// A TS-like module: functions of varying length with a recurring helper body.
fn synthetic_source(functions: usize) -> String {
    let mut out = String::new();
    for f in 0..functions {
        out.push_str(&format!("export function handler{f}(req) {{\n"));
        for i in 0..(10 + f % 40) {
            out.push_str(&format!("  const v{i} = req.field{i} ?? {f};\n"));
        }
        if f % 5 == 0 {
            out.push_str("  const user = await loadUser(req.id);\n");
            out.push_str("  const perms = resolvePermissions(user);\n");
            out.push_str("  if (!perms.ok) throw new Forbidden();\n");
            out.push_str("  await audit.record(user);\n");
            out.push_str("  metrics.increment('calls');\n");
            out.push_str("  return respond(user);\n");
        }
        out.push_str("}\n\n");
    }
    out
}

fn benchmark_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    let thresholds = Thresholds::default();
    let options = ScanOptions { count_exports: true };

    for functions in [10usize, 100, 500] {
        let source = synthetic_source(functions);
        group.bench_with_input(BenchmarkId::new("functions", functions), &source, |b, s| {
            b.iter(|| scan_text(black_box(s), &thresholds, options))
        });
    }

    group.finish();
}

fn benchmark_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("detectors");
    let source = synthetic_source(300);
    let lines = split_lines(&source);

    group.bench_function("boundary_scan", |b| {
        b.iter(|| scan_function_spans(black_box(&lines)))
    });
    group.bench_function("duplicate_blocks", |b| {
        b.iter(|| find_duplicate_blocks(black_box(&lines), 6))
    });

    group.finish();
}

criterion_group!(benches, benchmark_full_scan, benchmark_detectors);
criterion_main!(benches);
