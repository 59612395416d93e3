use std::io::Cursor;

use fasm_rs::{assemble, Console, Outcome, Vm, VmConfig};

type TestVm = Vm<Console<Cursor<Vec<u8>>, Vec<u8>>>;

fn run(src: &str) -> (TestVm, Outcome) {
    let program = assemble(src).unwrap();
    let host = Console::new(Cursor::new(Vec::new()), Vec::new());
    let cfg = VmConfig { memory_words: 1024, stack_top: None };
    let mut vm = Vm::new(&program, cfg, host).unwrap();
    let outcome = vm.run();
    (vm, outcome)
}

fn branch_taken(jcc: &str, a: i32, b: i32) -> bool {
    let src = format!(
        "main: lc r0, {a}
               lc r1, {b}
               cmp r0, r1, 0
               {jcc} yes
               lc r2, 1
               halt r0, 0
         yes:  lc r2, 2
               halt r0, 0
               end main"
    );
    let (vm, _) = run(&src);
    vm.cpu.gpr[2] == 2
}

#[test]
fn conditional_jumps_follow_flags() {
    let cases = [
        ("jeq", 3, 3, true),
        ("jeq", 3, 4, false),
        ("jne", 3, 4, true),
        ("jne", 3, 3, false),
        ("jl", 2, 5, true),
        ("jl", 5, 5, false),
        ("jl", 5, 2, false),
        ("jle", 5, 5, true),
        ("jle", 2, 5, true),
        ("jle", 5, 2, false),
        ("jg", 5, 2, true),
        ("jg", 5, 5, false),
        ("jg", 2, 5, false),
        ("jge", 5, 5, true),
        ("jge", 5, 2, true),
        ("jge", 2, 5, false),
        ("jmp", 2, 5, true),
    ];
    for (jcc, a, b, want) in cases {
        assert_eq!(branch_taken(jcc, a, b), want, "{jcc} after cmp {a}, {b}");
    }
}

#[test]
fn cmp_stores_the_raw_difference() {
    let (vm, _) = run("main: lc r0, 10\n lc r1, 3\n cmp r0, r1, 0\n halt r0, 0\n end main");
    assert_eq!(vm.cpu.flags, 7);
    let (vm, _) = run("main: lc r0, 10\n cmpi r0, 25\n halt r0, 0\n end main");
    assert_eq!(vm.cpu.flags, -15);
}

#[test]
fn counting_loop() {
    let src = "
main:  lc r0, 0        ; sum
       lc r1, 1        ; i
loop:  cmpi r1, 10
       jg done
       add r0, r1, 0
       addi r1, 1
       jmp loop
done:  syscall r0, 102
       halt r0, 0
       end main
";
    let (vm, outcome) = run(src);
    assert_eq!(vm.host().output().as_slice(), b"55");
    assert_eq!(outcome.status(), 0);
}

#[test]
fn forward_and_backward_references_agree() {
    let program = assemble("jmp target\ntarget: halt r0, 0\njmp target\nend target\n").unwrap();
    assert_eq!(program.words[0] & 0xF_FFFF, 1);
    assert_eq!(program.words[2] & 0xF_FFFF, 1);
    assert_eq!(program.entry, 1);
}

#[test]
fn halt_code_becomes_exit_status() {
    let (_, outcome) = run("main: halt r0, 3\n end main");
    assert!(matches!(outcome, Outcome::Halted { code: 3 }));
    assert_eq!(outcome.status(), 3);
}
