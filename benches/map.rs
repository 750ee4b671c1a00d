use case_insensitive_map::CaseInsensitiveMap;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hashbrown::HashMap;

const HEADERS: [&str; 8] = [
    "Content-Type",
    "Content-Length",
    "X-Frame-Options",
    "Cache-Control",
    "Accept-Encoding",
    "User-Agent",
    "Set-Cookie",
    "Strict-Transport-Security",
];

fn bench_map(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("HashMap vs CaseInsensitiveMap (Insert 8)");
        group.bench_function("hashbrown::HashMap (lowercased keys)", |b| {
            b.iter(|| {
                let mut m = HashMap::with_capacity(HEADERS.len());
                for (i, h) in HEADERS.iter().enumerate() {
                    m.insert(black_box(h).to_ascii_lowercase(), black_box(i));
                }
                m
            })
        });

        group.bench_function("CaseInsensitiveMap", |b| {
            b.iter(|| {
                let mut m = CaseInsensitiveMap::with_capacity(HEADERS.len());
                for (i, h) in HEADERS.iter().enumerate() {
                    m.insert(*black_box(h), black_box(i));
                }
                m
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("HashMap vs CaseInsensitiveMap (Get 8, mixed case)");
        let m_std: HashMap<String, usize> = HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();
        let m_ci: CaseInsensitiveMap<usize> = HEADERS.iter().enumerate().map(|(i, h)| (*h, i)).collect();
        let probes: Vec<String> = HEADERS.iter().map(|h| h.to_ascii_uppercase()).collect();

        group.bench_function("hashbrown::HashMap (lowercase per lookup)", |b| {
            b.iter(|| {
                for p in &probes {
                    black_box(m_std.get(&black_box(p).to_ascii_lowercase()));
                }
            })
        });

        group.bench_function("CaseInsensitiveMap", |b| {
            b.iter(|| {
                for p in &probes {
                    black_box(m_ci.get(black_box(p)));
                }
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("CaseInsensitiveMap (Push / Remove 1000)");
        group.bench_function("push then remove every other", |b| {
            b.iter(|| {
                let mut m = CaseInsensitiveMap::new();
                for i in 0..1000u32 {
                    let _ = m.push(black_box(i));
                }
                for i in (0..1000i64).step_by(2) {
                    m.remove(black_box(i));
                }
                m
            })
        });
        group.finish();
    }
}

criterion_group!(benches, bench_map);
criterion_main!(benches);
