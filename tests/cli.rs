use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn write_temp(name: &str, text: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fasm-run-{}-{name}", std::process::id()));
    std::fs::write(&path, text).unwrap();
    path
}

fn fasm_run(args: &[&OsStr], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fasm-run"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn run_source(name: &str, src: &str, input: &str) -> Output {
    let path = write_temp(name, src);
    let out = fasm_run(&[path.as_os_str()], input);
    std::fs::remove_file(&path).unwrap();
    out
}

#[test]
fn runs_a_program_and_exits_zero() {
    let out = run_source(
        "sum.fasm",
        "start: lc r0, 5\n lc r1, 3\n add r0, r1, 0\n syscall r0, 102\n halt r0, 0\n end start\n",
        "",
    );
    assert_eq!(String::from_utf8_lossy(&out.stdout), "8");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn halt_code_is_the_process_status() {
    let out = run_source("halt.fasm", "main: halt r0, 3\n end main\n", "");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn reads_stdin() {
    let out = run_source(
        "echo.fasm",
        "main: syscall r0, 100\n muli r0, 2\n syscall r0, 102\n halt r0, 0\n end main\n",
        "21\n",
    );
    assert_eq!(String::from_utf8_lossy(&out.stdout), "42");
}

#[test]
fn assembly_error_prints_the_line() {
    let out = run_source("bad.fasm", "main: lc r0, 1\n frob r0\n end main\n", "");
    assert_eq!(String::from_utf8_lossy(&out.stdout), "error in line 2\n");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn fault_exits_one() {
    let out = run_source("div.fasm", "main: divi r0, 0\n end main\n", "");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn config_file_sizes_memory() {
    let src = write_temp("stack.fasm", "main: push r14, 0\n pop r0, 0\n syscall r0, 102\n halt r0, 0\n end main\n");

    let cfg = write_temp("small.json", r#"{"memory_words": 64}"#);
    let out = fasm_run(&[OsStr::new("--config"), cfg.as_os_str(), src.as_os_str()], "");
    assert_eq!(String::from_utf8_lossy(&out.stdout), "62");
    assert_eq!(out.status.code(), Some(0));

    let bad = write_temp("outside.json", r#"{"memory_words": 64, "stack_top": 1000}"#);
    let out = fasm_run(&[OsStr::new("--config"), bad.as_os_str(), src.as_os_str()], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());

    for path in [src, cfg, bad] {
        std::fs::remove_file(path).unwrap();
    }
}

#[test]
fn missing_source_file_fails() {
    let path = std::env::temp_dir().join("fasm-run-does-not-exist.fasm");
    let out = fasm_run(&[path.as_os_str()], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("reading"));
}
