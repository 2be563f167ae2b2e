//! Dispatch throughput benchmark.
//!
//! Measures parameter validation, full dispatch of a trivial tool, and frame
//! encoding using Criterion.

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tool_gateway::dispatch::{Dispatcher, Envelope};
use tool_gateway::http::codec::encode_frame;
use tool_gateway::tools::{
    validate, HandlerError, ParamSpec, ToolDefinition, ToolHandler, ToolRegistry, ToolRequest,
};
use tool_gateway::types::DispatchConfig;

struct Echo;

#[async_trait]
impl ToolHandler for Echo {
    async fn handle(
        &self,
        request: ToolRequest,
        _cancel: CancellationToken,
    ) -> Result<Value, HandlerError> {
        Ok(Value::Object(request.input))
    }
}

fn wide_tool(params: usize) -> (ToolDefinition, Map<String, Value>) {
    let mut definition = ToolDefinition::new("Wide", "");
    let mut input = Map::new();
    for i in 0..params {
        let name = format!("p{:03}", i);
        definition = definition.param(name.clone(), ParamSpec::integer().required());
        input.insert(name, json!(i));
    }
    (definition, input)
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for &params in &[1usize, 8, 64, 256] {
        let (definition, input) = wide_tool(params);
        group.bench_with_input(BenchmarkId::from_parameter(params), &input, |b, input| {
            b.iter(|| validate(black_box(input), &definition.parameters).unwrap());
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = rt.block_on(async {
        let registry = Arc::new(ToolRegistry::new());
        let (definition, _) = wide_tool(8);
        registry.register(definition, Arc::new(Echo)).await.unwrap();
        Dispatcher::new(registry, DispatchConfig::default())
    });
    let (_, input) = wide_tool(8);
    let request = ToolRequest::new("Wide").with_input(Value::Object(input));

    c.bench_function("dispatch_final", |b| {
        b.iter(|| {
            rt.block_on(async {
                let envelope = dispatcher.run_to_envelope(black_box(request.clone())).await;
                assert!(matches!(envelope, Envelope::Final { .. }));
            })
        });
    });
}

fn bench_encode_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    for &items in &[1usize, 64, 1024] {
        let content = Value::Array((0..items).map(|i| json!({"id": i, "title": "x"})).collect());
        let frame = Envelope::partial(content, false);
        group.bench_with_input(BenchmarkId::from_parameter(items), &frame, |b, f| {
            b.iter(|| encode_frame(black_box(f)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_validate, bench_dispatch, bench_encode_frame);
criterion_main!(benches);
