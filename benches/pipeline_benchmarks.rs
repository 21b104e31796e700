// benches/pipeline_benchmarks.rs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neuro_core::acquisition::SampleRingBuffer;
use neuro_core::hal::simulator::RecordingActuator;
use neuro_core::hal::types::EegSample;
use neuro_core::haptic::{HapticEngine, PatternTable};
use neuro_core::hal::CognitiveState;
use neuro_core::pipeline::SharedLatest;
use neuro_core::utils::{MockTimeProvider, TimeProvider};
use std::sync::Arc;

const BUFFER_SIZES: &[usize] = &[256, 512, 1024, 2048];

fn benchmark_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");

    for &size in BUFFER_SIZES {
        group.throughput(Throughput::Elements(1000));

        group.bench_with_input(BenchmarkId::new("push", size), &size, |b, &size| {
            let mut buffer = SampleRingBuffer::new(size);
            let sample = EegSample {
                left: 12_345,
                right: -12_345,
                timestamp_us: 42,
            };
            b.iter(|| {
                for _ in 0..1000 {
                    buffer.push(black_box(sample));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("push_pop", size), &size, |b, &size| {
            let mut buffer = SampleRingBuffer::new(size);
            let sample = EegSample {
                left: 12_345,
                right: -12_345,
                timestamp_us: 42,
            };
            b.iter(|| {
                for _ in 0..1000 {
                    buffer.push(black_box(sample));
                    black_box(buffer.pop());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_haptic_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("haptic");

    for state in [CognitiveState::Stress, CognitiveState::Anxiety] {
        group.bench_with_input(
            BenchmarkId::new("tick", state.name()),
            &state,
            |b, &state| {
                let latest = Arc::new(SharedLatest::default());
                let time: Arc<dyn TimeProvider> = Arc::new(MockTimeProvider::new(0));
                let mut engine = HapticEngine::new(
                    Box::new(RecordingActuator::new()),
                    PatternTable::builtin(),
                    latest,
                    time,
                    50,
                );
                engine.init().unwrap();
                engine.trigger(state).unwrap();

                b.iter(|| {
                    black_box(engine.tick());
                    if !engine.is_active() {
                        engine.trigger(state).unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_ring_buffer, benchmark_haptic_tick);
criterion_main!(benches);
