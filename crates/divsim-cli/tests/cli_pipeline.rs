use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn divsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_divsim"))
}

fn smoke_plan() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../plans/smoke.yaml")
}

fn run(command: &mut Command) {
    let output = command.output().expect("divsim runs");
    assert!(
        output.status.success(),
        "divsim failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("{}: {err}", path.display()))
}

#[test]
fn sweep_then_reduce_reproduces_the_index_tables() {
    let dir = tempfile::tempdir().unwrap();
    let sweep_out = dir.path().join("sweep");
    let reduce_out = dir.path().join("reduced");

    run(divsim()
        .arg("sweep")
        .arg("--plan")
        .arg(smoke_plan())
        .arg("--out")
        .arg(&sweep_out)
        .arg("--threads")
        .arg("2"));
    for name in ["indices.csv", "global.csv", "maps.csv", "sweep_report.json", "plan.yaml"] {
        assert!(sweep_out.join(name).exists(), "missing {name}");
    }

    run(divsim()
        .arg("reduce")
        .arg("--maps")
        .arg(sweep_out.join("maps.csv"))
        .arg("--batch-size")
        .arg("32")
        .arg("--out")
        .arg(&reduce_out));
    assert_eq!(
        read(&reduce_out.join("indices.csv")),
        read(&sweep_out.join("indices.csv"))
    );
    assert_eq!(
        read(&reduce_out.join("global.csv")),
        read(&sweep_out.join("global.csv"))
    );
}

#[test]
fn misaligned_batch_size_fails() {
    let dir = tempfile::tempdir().unwrap();
    let maps = dir.path().join("maps.csv");
    fs::write(
        &maps,
        "tau,prop_mix,rep_id,neighborhood,ticks,g0,g1\n\
         0.1,0.5_0.5,0,n0,2,1,3\n\
         0.1,0.5_0.5,0,n1,2,2,2\n\
         0.1,0.5_0.5,1,n0,5,4,0\n\
         0.1,0.5_0.5,1,n1,5,0,4\n",
    )
    .unwrap();
    let output = divsim()
        .arg("reduce")
        .arg("--maps")
        .arg(&maps)
        .arg("--batch-size")
        .arg("3")
        .arg("--out")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("batch-mixed-replications"));
}

#[test]
fn reduce_jobs_writes_meta_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("jobs.csv");
    fs::write(
        &input,
        "job,city,vacr,tau,prop_mix,rep_id,neighborhood,ticks,g0,g1\n\
         j1,lyon,0.2,0.3,0.5_0.5,0,n0,8,3,1\n\
         j1,lyon,0.2,0.3,0.5_0.5,0,n1,8,1,3\n",
    )
    .unwrap();
    let out = dir.path().join("out");
    run(divsim()
        .arg("reduce-jobs")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(&out));
    let global = read(&out.join("global.csv"));
    assert!(global.starts_with("tau,prop_mix,rep_id,vacr,city,job,ticks,"));
    assert!(global.contains("0.3,0.5_0.5,0,0.2,lyon,j1,8,"));
}
