//! weft benchmark suite: common graph shapes plus registration overhead.

use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, Criterion};
use weft::{use_task, Context, TaskResult, Weft};

async fn seed(_ctx: Context) -> TaskResult<i32> {
    Ok(1)
}

async fn add_one(_ctx: Context, n: i32) -> TaskResult<i32> {
    Ok(n + 1)
}

async fn double(_ctx: Context, n: i32) -> TaskResult<i32> {
    Ok(n * 2)
}

async fn triple(_ctx: Context, n: i32) -> TaskResult<i32> {
    Ok(n * 3)
}

async fn sum(_ctx: Context, a: i32, b: i32) -> TaskResult<i32> {
    Ok(a + b)
}

fn bench_linear_chain(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("linear_chain_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let flow = Weft::new();
                flow.add_task("t0", seed, []);
                for i in 1..10 {
                    flow.add_task(&format!("t{i}"), add_one, [use_task(format!("t{}", i - 1))]);
                }
                flow.run(Context::new(), HashMap::new()).await.unwrap();
            })
        });
    });
}

fn bench_diamond(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("diamond", |b| {
        b.iter(|| {
            rt.block_on(async {
                let flow = Weft::new();
                flow.add_task("root", seed, [])
                    .add_task("left", double, [use_task("root")])
                    .add_task("right", triple, [use_task("root")])
                    .add_task("join", sum, [use_task("left"), use_task("right")]);
                flow.run(Context::new(), HashMap::new()).await.unwrap();
            })
        });
    });
}

fn bench_wide_fanout(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("fanout_20", |b| {
        b.iter(|| {
            rt.block_on(async {
                let flow = Weft::new();
                flow.add_task("root", seed, []);
                for i in 0..20 {
                    flow.add_task(&format!("child-{i}"), double, [use_task("root")]);
                }
                flow.run(Context::new(), HashMap::new()).await.unwrap();
            })
        });
    });
}

fn bench_registration(c: &mut Criterion) {
    c.bench_function("register_100", |b| {
        b.iter(|| {
            let flow = Weft::new();
            flow.add_task("t0", seed, []);
            for i in 1..100 {
                flow.add_task(&format!("t{i}"), add_one, [use_task(format!("t{}", i - 1))]);
            }
            flow
        });
    });
}

criterion_group!(
    benches,
    bench_linear_chain,
    bench_diamond,
    bench_wide_fanout,
    bench_registration
);
criterion_main!(benches);
