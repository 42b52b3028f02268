use ntsim::aggregate::{estimate, ProcessPool, Strategy};
use ntsim::experiment::{Coprime, DivisionCount, SquareFree};
use num::BigUint;
use std::io::Write;
use std::process::{Command, Stdio};

const NTSIM: &str = env!("CARGO_BIN_EXE_ntsim");

fn pool(workers: usize, batch_size: u64) -> Strategy {
    Strategy::Processes(ProcessPool::with_program(workers, NTSIM).batch_size(batch_size))
}

#[test]
fn process_pool_matches_sequential_and_threads() {
    let n = BigUint::from(10_u32).pow(60);
    let trials = 1_234;

    let seq = estimate(
        &DivisionCount,
        &n,
        trials,
        &Strategy::Sequential { batch_size: 100 },
        Some(17),
    )
    .unwrap();
    let threads = estimate(
        &DivisionCount,
        &n,
        trials,
        &Strategy::Threads {
            workers: 3,
            batch_size: 100,
        },
        Some(17),
    )
    .unwrap();
    let procs = estimate(&DivisionCount, &n, trials, &pool(3, 100), Some(17)).unwrap();

    assert_eq!(seq.total, threads.total);
    assert_eq!(seq.total, procs.total);
}

#[test]
fn process_pool_runs_square_free() {
    let n = BigUint::from(10_u64.pow(12));
    let seq = estimate(
        &SquareFree::uncached(),
        &n,
        300,
        &Strategy::Sequential { batch_size: 40 },
        Some(3),
    )
    .unwrap();
    let procs = estimate(&SquareFree::uncached(), &n, 300, &pool(2, 40), Some(3)).unwrap();
    assert_eq!(seq.total, procs.total);
}

#[test]
fn process_pool_with_single_trial_batches() {
    let n = BigUint::from(10_u32).pow(25);
    let seq = estimate(&Coprime, &n, 301, &Strategy::Sequential { batch_size: 1 }, Some(9)).unwrap();
    let procs = estimate(&Coprime, &n, 301, &pool(3, 1), Some(9)).unwrap();
    assert_eq!(seq.total, procs.total);
}

#[test]
fn more_workers_than_batches() {
    let n = BigUint::from(1_000_u32);
    let est = estimate(&Coprime, &n, 10, &pool(8, 100), Some(0)).unwrap();
    assert_eq!(est.trials, 10);
    assert!(est.total <= 10);
}

#[test]
fn worker_subcommand_speaks_json_lines() {
    let mut child = Command::new(NTSIM)
        .args(["worker", "--experiment", "coprime", "--n", "1", "--seed", "5"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(b"{\"index\":0,\"len\":4}\n{\"index\":3,\"len\":2}\n")
            .unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    // every pair drawn from [1, 1] is (1, 1), which is coprime
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"index\":0,\"total\":4}\n{\"index\":3,\"total\":2}\n"
    );
}

#[test]
fn worker_failure_fails_the_estimate() {
    // exits immediately without answering
    let pool = Strategy::Processes(ProcessPool::with_program(2, "false"));
    let err = estimate(&Coprime, &BigUint::from(10_u32), 100, &pool, Some(1)).unwrap_err();
    assert_eq!(err.kind(), ntsim::result::ErrorKind::WorkerFailed);
}

#[test]
fn cli_prints_one_block_per_n() {
    let output = Command::new(NTSIM)
        .args([
            "remainder", "--base", "10^30", "--count", "3", "--step", "5", "--trials", "200",
            "--seed", "1",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("empirical:").count(), 3);
    assert!(stdout.contains("N = 1000000000000000000000000000005:"));
    assert!(stdout.contains("theoretical: 0.613706"));
    assert!(stdout.contains("remainder: 3 values of N"));
}

#[test]
fn cli_reports_errors_with_status_one() {
    let output = Command::new(NTSIM)
        .args(["coprime", "--trials", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no trials"), "{stderr}");
}
