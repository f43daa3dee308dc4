use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dxassist::ml::logreg::LogRegModel;
use dxassist::ml::scaler::FeatureScaler;

const DIM: usize = 1024;
const CLASSES: usize = 12;

fn random_model(rng: &mut StdRng) -> LogRegModel {
    LogRegModel {
        embedding_dim: DIM,
        weights: (0..CLASSES * DIM)
            .map(|_| (rng.random::<f32>() - 0.5) * 0.1)
            .collect(),
        bias: vec![0.0; CLASSES],
    }
}

fn random_rows(rng: &mut StdRng, count: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|_| (0..DIM).map(|_| rng.random::<f32>()).collect())
        .collect()
}

fn bench_predict(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let model = random_model(&mut rng);
    let input = random_rows(&mut rng, 1).remove(0);

    c.bench_function("logreg_predict_proba", |b| {
        b.iter(|| model.predict_proba(black_box(&input)))
    });
}

fn bench_scale(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = random_rows(&mut rng, 256);
    let mut scaler = FeatureScaler::default();
    scaler.fit(&rows).expect("fit");
    let input = random_rows(&mut rng, 1).remove(0);

    c.bench_function("scaler_transform_one", |b| {
        b.iter(|| scaler.transform_one(black_box(&input)))
    });
}

criterion_group!(benches, bench_predict, bench_scale);
criterion_main!(benches);
