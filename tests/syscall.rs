use std::io::{Cursor, ErrorKind};

use fasm_rs::{assemble, Console, Outcome, Trap, Vm, VmConfig};

type TestVm = Vm<Console<Cursor<Vec<u8>>, Vec<u8>>>;

fn run_with_input(src: &str, input: &str) -> (TestVm, Outcome) {
    let program = assemble(src).unwrap();
    let host = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let cfg = VmConfig { memory_words: 1024, stack_top: None };
    let mut vm = Vm::new(&program, cfg, host).unwrap();
    let outcome = vm.run();
    (vm, outcome)
}

fn stdout(vm: TestVm) -> String {
    String::from_utf8(vm.into_host().into_output()).unwrap()
}

#[test]
fn read_and_write_int() {
    let src = "
main: syscall r0, 100
      addi r0, 1
      syscall r0, 102
      syscall r1, 100
      syscall r1, 102
      halt r0, 0
      end main
";
    let (vm, _) = run_with_input(src, "41\n  -7");
    assert_eq!(stdout(vm), "42-7");
}

#[test]
fn echo_until_end_of_input() {
    let src = "
main: syscall r0, 104
      cmpi r0, -1
      jeq done
      syscall r0, 105
      jmp main
done: halt r0, 0
      end main
";
    let (vm, outcome) = run_with_input(src, "hi\n");
    assert_eq!(outcome.status(), 0);
    assert_eq!(stdout(vm), "hi\n");
}

#[test]
fn write_char_uses_the_low_byte() {
    let src = "
main: lc r0, 0x141
      syscall r0, 105
      halt r0, 0
      end main
";
    let (vm, _) = run_with_input(src, "");
    assert_eq!(stdout(vm), "A");
}

#[test]
fn exit_syscall_stops_immediately() {
    let src = "
main: lc r0, 1
      syscall r0, 102
      syscall r0, 0
      syscall r0, 102
      halt r0, 5
      end main
";
    let (vm, outcome) = run_with_input(src, "");
    assert!(matches!(outcome, Outcome::Exited));
    assert_eq!(outcome.status(), 0);
    assert_eq!(stdout(vm), "1");
}

#[test]
fn unknown_syscall_is_ignored() {
    let src = "
main: lc r0, 3
      syscall r0, 7
      syscall r0, 102
      halt r0, 0
      end main
";
    let (vm, outcome) = run_with_input(src, "");
    assert_eq!(outcome.status(), 0);
    assert_eq!(stdout(vm), "3");
}

#[test]
fn reading_past_end_of_input_faults() {
    let src = "
main: syscall r0, 100
      halt r0, 0
      end main
";
    let (_, outcome) = run_with_input(src, "   ");
    match outcome {
        Outcome::Faulted(Trap::Io { source }) => assert_eq!(source.kind(), ErrorKind::UnexpectedEof),
        other => panic!("unexpected outcome {other:?}"),
    }

    let (_, outcome) = run_with_input(src, "abc");
    match outcome {
        Outcome::Faulted(Trap::Io { source }) => assert_eq!(source.kind(), ErrorKind::InvalidData),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn output_before_a_fault_is_kept() {
    let src = "
main: lc r0, 12
      syscall r0, 102
      divi r0, 0
      end main
";
    let (vm, outcome) = run_with_input(src, "");
    assert_eq!(outcome.status(), 1);
    assert_eq!(stdout(vm), "12");
}
