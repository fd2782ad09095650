use std::{fs, hint::black_box, path::Path, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pyflat::{
    Bundler,
    config::{Config, PrunerKind},
};
use tempfile::TempDir;

/// Write a project whose entry imports `modules` helper modules, each
/// importing the next one and a handful of external modules
fn generate_project(root: &Path, modules: usize) {
    let mut entry = String::from("import os\nimport sys\n");
    for i in 0..modules {
        entry.push_str(&format!("from module_{i} import function_{i}\n"));
    }
    entry.push_str("\nCOUNT = 0\n\n\ndef main():\n    \"\"\"Run every helper.\"\"\"\n");
    for i in 0..modules {
        entry.push_str(&format!("    function_{i}(COUNT)\n"));
    }
    entry.push_str("\n\nif __name__ == \"__main__\":\n    main()\n");
    fs::write(root.join("main.py"), entry).expect("Failed to write entry");

    for i in 0..modules {
        let next = (i + 1) % modules;
        let module = format!(
            r#"import json
from typing import Any, Optional
from module_{next} import function_{next}

LIMIT = {i}


def function_{i}(value: Optional[Any] = None):
    """Helper number {i}."""
    if value is None:
        return json.dumps({{"limit": LIMIT}})
    return function_{next}
"#
        );
        fs::write(root.join(format!("module_{i}.py")), module).expect("Failed to write module");
    }
}

fn benchmark_bundling(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundling");
    group.measurement_time(Duration::from_secs(10));

    for modules in [10, 100] {
        let project = TempDir::new().expect("Failed to create temp dir");
        generate_project(project.path(), modules);
        let output = project.path().join("bundle.py");
        let bundler = Bundler::new(Config {
            project_root: Some(project.path().to_path_buf()),
            pruner: PrunerKind::None,
            ..Config::default()
        });
        let entry = project.path().join("main.py");

        group.bench_with_input(BenchmarkId::from_parameter(modules), &modules, |b, _| {
            b.iter(|| {
                bundler
                    .bundle(black_box(&entry), black_box(&output))
                    .expect("Bundling failed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_bundling);
criterion_main!(benches);
