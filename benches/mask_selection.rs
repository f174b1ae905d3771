use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qrcodeine::encoder::function_mask::{FunctionMask, draw_function_patterns};
use qrcodeine::encoder::mask::{penalty_score, select_mask};
use qrcodeine::encoder::placement::place_codewords;
use qrcodeine::encoder::tables::{remainder_bits, total_codewords};
use qrcodeine::{BitMatrix, ECLevel, Version};

/// Unmasked grid with pseudo-random codewords placed
fn placed_grid(number: u8) -> Option<(BitMatrix, FunctionMask)> {
    let version = Version::new(number)?;
    let (mut modules, func) = draw_function_patterns(version);
    let codewords: Vec<u8> = (0..total_codewords(version))
        .map(|i| (i as u32).wrapping_mul(2_654_435_761).rotate_left(7) as u8)
        .collect();
    place_codewords(&mut modules, &func, &codewords, remainder_bits(version)).ok()?;
    Some((modules, func))
}

fn bench_select_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_mask");
    for number in [1u8, 10, 25, 40] {
        let Some((modules, func)) = placed_grid(number) else {
            continue;
        };
        let version = func.version();
        group.bench_with_input(BenchmarkId::from_parameter(number), &number, |b, _| {
            b.iter(|| select_mask(black_box(&modules), &func, version, ECLevel::M))
        });
    }
    group.finish();
}

fn bench_penalty_score(c: &mut Criterion) {
    let Some((modules, _)) = placed_grid(40) else {
        return;
    };
    c.bench_function("penalty_score_v40", |b| {
        b.iter(|| penalty_score(black_box(&modules)))
    });
}

criterion_group!(benches, bench_select_mask, bench_penalty_score);
criterion_main!(benches);
