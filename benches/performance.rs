use criterion::{criterion_group, criterion_main, Criterion};
use cohortql_core::config::CompileConfig;
use cohortql_core::types::CriterionType;
use cohortql_exec::Compiler;
use cohortql_io::MemoryConnection;
use cohortql_operators::{QueryNode, Registry, Value};

fn make_tree(reg: &Registry, width: usize) -> QueryNode {
    let kids = (0..width)
        .map(|i| {
            let ty = CriterionType::ALL[i % CriterionType::ALL.len()];
            let leaf = reg.create(ty.as_str(), vec![]).unwrap();
            if i % 4 == 0 {
                // Every fourth branch is staged, with names repeating so the
                // dedup path gets exercised too.
                let name = format!("stage_{}", i % 16);
                Value::Node(
                    reg.create("materialize", vec![leaf.into(), name.as_str().into()])
                        .unwrap(),
                )
            } else {
                Value::Node(leaf)
            }
        })
        .collect();
    reg.create("union", kids).unwrap()
}

fn bench_compile_wide_union(c: &mut Criterion) {
    let compiler = Compiler::new(CompileConfig {
        person_ids: Some((1..=500).collect()),
        ..Default::default()
    })
    .unwrap();
    let tree = make_tree(compiler.registry(), 256);
    c.bench_function("compile_wide_union", |b| {
        b.iter(|| {
            let mut conn = MemoryConnection::default();
            let _ = compiler.compile(&tree, &mut conn).unwrap();
        })
    });
}

criterion_group!(compile, bench_compile_wide_union);
criterion_main!(compile);
