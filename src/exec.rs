use num_traits::ToPrimitive;
use tracing::{debug, trace};

use crate::cpu::{Cpu, Trap};
use crate::decoder::Decoded;
use crate::host::Host;
use crate::instructions::Op;
use crate::memory::Bus;

pub const SYS_EXIT: i32 = 0;
pub const SYS_READ_INT: i32 = 100;
pub const SYS_READ_DOUBLE: i32 = 101;
pub const SYS_WRITE_INT: i32 = 102;
pub const SYS_WRITE_DOUBLE: i32 = 103;
pub const SYS_READ_CHAR: i32 = 104;
pub const SYS_WRITE_CHAR: i32 = 105;

pub trait Executor {
    fn exec<B: Bus, H: Host>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        host: &mut H,
        d: Decoded,
    ) -> Result<(), Trap>;
}

fn load<B: Bus>(bus: &mut B, addr: u32) -> Result<u32, Trap> {
    bus.read_word(addr).map_err(|source| Trap::Bus { addr, source })
}

fn store<B: Bus>(bus: &mut B, addr: u32, val: u32) -> Result<(), Trap> {
    bus.write_word(addr, val)
        .map_err(|source| Trap::Bus { addr, source })
}

fn load_pair<B: Bus>(bus: &mut B, addr: u32) -> Result<u64, Trap> {
    let (lo, hi) = bus
        .read_pair(addr)
        .map_err(|source| Trap::Bus { addr, source })?;
    Ok((lo as u64) | ((hi as u64) << 32))
}

fn store_pair<B: Bus>(bus: &mut B, addr: u32, v: u64) -> Result<(), Trap> {
    bus.write_pair(addr, v as u32, (v >> 32) as u32)
        .map_err(|source| Trap::Bus { addr, source })
}

fn push<B: Bus>(cpu: &mut Cpu, bus: &mut B, val: u32) -> Result<(), Trap> {
    let sp = cpu.sp().wrapping_sub(1);
    cpu.set_sp(sp);
    store(bus, sp, val)
}

fn io(source: std::io::Error) -> Trap {
    Trap::Io { source }
}

/// Right shift with the ISA's rule that amounts of 32 or more clear the
/// register. The amount is unsigned, so a negative one clears it too.
/// Smaller amounts shift arithmetically.
fn shr(val: u32, amount: u32) -> u32 {
    if amount >= 32 {
        0
    } else {
        ((val as i32) >> amount) as u32
    }
}

/// Signed 64-bit dividend over a 32-bit divisor: quotient low word in the
/// low half, remainder low word in the high half.
fn divide(cpu: &Cpu, dividend: u64, divisor: i32) -> Result<u64, Trap> {
    if divisor == 0 {
        // pc already points past the DIV
        return Err(Trap::DivideByZero { pc: cpu.pc().wrapping_sub(1) });
    }
    let n = dividend as i64;
    let q = n.wrapping_div(divisor as i64) as u32;
    let r = n.wrapping_rem(divisor as i64) as u32;
    Ok((q as u64) | ((r as u64) << 32))
}

fn signed_product(a: u32, b: i32) -> u64 {
    ((a as i32 as i64) * (b as i64)) as u64
}

pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus, H: Host>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        host: &mut H,
        d: Decoded,
    ) -> Result<(), Trap> {
        trace!(pc = cpu.pc().wrapping_sub(1), ?d, "exec");
        let r1 = d.r1 as usize;
        let r2 = d.r2 as usize;
        let imm = d.imm as u32;
        // RR operand: second register plus the immediate
        let rhs = cpu.gpr[r2].wrapping_add(imm);

        match d.op {
            Op::Halt => return Err(Trap::Halt { code: d.imm }),
            Op::Syscall => match d.imm {
                SYS_EXIT => return Err(Trap::Exit),
                SYS_READ_INT => cpu.gpr[r1] = host.read_int().map_err(io)? as u32,
                SYS_READ_DOUBLE => {
                    let v = host.read_double().map_err(io)?;
                    cpu.set_double(d.r1, v)?;
                }
                SYS_WRITE_INT => host.write_int(cpu.gpr[r1] as i32).map_err(io)?,
                SYS_WRITE_DOUBLE => {
                    let v = cpu.double(d.r1)?;
                    host.write_double(v).map_err(io)?;
                }
                SYS_READ_CHAR => cpu.gpr[r1] = host.read_char().map_err(io)? as u32,
                SYS_WRITE_CHAR => host.write_char(cpu.gpr[r1] as i32).map_err(io)?,
                other => debug!(code = other, "ignoring unknown syscall"),
            },

            Op::Add => cpu.gpr[r1] = cpu.gpr[r1].wrapping_add(rhs),
            Op::AddI => cpu.gpr[r1] = cpu.gpr[r1].wrapping_add(imm),
            Op::Sub => cpu.gpr[r1] = cpu.gpr[r1].wrapping_sub(rhs),
            Op::SubI => cpu.gpr[r1] = cpu.gpr[r1].wrapping_sub(imm),
            Op::And => cpu.gpr[r1] &= rhs,
            Op::AndI => cpu.gpr[r1] &= imm,
            Op::Or => cpu.gpr[r1] |= rhs,
            Op::OrI => cpu.gpr[r1] |= imm,
            Op::Xor => cpu.gpr[r1] ^= rhs,
            Op::XorI => cpu.gpr[r1] ^= imm,
            Op::Not => cpu.gpr[r1] = !cpu.gpr[r1],
            Op::Mov => cpu.gpr[r1] = rhs,
            Op::Lc => cpu.gpr[r1] = imm,
            Op::Shl => cpu.gpr[r1] = cpu.gpr[r1].wrapping_shl(cpu.gpr[r2]),
            Op::ShlI => cpu.gpr[r1] = cpu.gpr[r1].wrapping_shl(imm),
            Op::Shr => cpu.gpr[r1] = shr(cpu.gpr[r1], cpu.gpr[r2]),
            Op::ShrI => cpu.gpr[r1] = shr(cpu.gpr[r1], imm),

            Op::Mul => {
                let v = signed_product(cpu.gpr[r1], cpu.gpr[r2] as i32);
                cpu.set_pair(d.r1, v)?;
            }
            Op::MulI => {
                let v = signed_product(cpu.gpr[r1], d.imm);
                cpu.set_pair(d.r1, v)?;
            }
            Op::Div => {
                let v = divide(cpu, cpu.pair(d.r1)?, rhs as i32)?;
                cpu.set_pair(d.r1, v)?;
            }
            Op::DivI => {
                let v = divide(cpu, cpu.pair(d.r1)?, d.imm)?;
                cpu.set_pair(d.r1, v)?;
            }

            Op::AddD | Op::SubD | Op::MulD | Op::DivD => {
                let a = cpu.double(d.r1)?;
                let b = cpu.double(d.r2)?;
                let v = match d.op {
                    Op::AddD => a + b,
                    Op::SubD => a - b,
                    Op::MulD => a * b,
                    _ => a / b,
                };
                cpu.set_double(d.r1, v)?;
            }
            Op::IToD => {
                let v = cpu.gpr[r2] as i32 as f64;
                cpu.set_double(d.r1, v)?;
            }
            Op::DToI => {
                let value = cpu.double(d.r2)?;
                // to_i32 truncates toward zero and rejects NaN and out-of-range values
                let v = value.to_i32().ok_or(Trap::ConversionOverflow {
                    pc: cpu.pc().wrapping_sub(1),
                    value,
                })?;
                cpu.gpr[r1] = v as u32;
            }

            Op::Cmp => cpu.flags = (cpu.gpr[r1] as i32).wrapping_sub(cpu.gpr[r2] as i32),
            Op::CmpI => cpu.flags = (cpu.gpr[r1] as i32).wrapping_sub(d.imm),
            Op::CmpD => {
                let diff = cpu.double(d.r1)? - cpu.double(d.r2)?;
                cpu.flags = if diff > 0.0 {
                    1
                } else if diff < 0.0 {
                    -1
                } else {
                    0
                };
            }

            Op::Jmp => cpu.set_pc(d.addr),
            Op::Jne | Op::Jeq | Op::Jle | Op::Jl | Op::Jge | Op::Jg => {
                let f = cpu.flags;
                let taken = match d.op {
                    Op::Jne => f != 0,
                    Op::Jeq => f == 0,
                    Op::Jle => f <= 0,
                    Op::Jl => f < 0,
                    Op::Jge => f >= 0,
                    _ => f > 0,
                };
                if taken {
                    cpu.set_pc(d.addr);
                }
            }

            Op::Call => {
                let ret = cpu.pc();
                push(cpu, bus, ret)?;
                let target = cpu.gpr[r2].wrapping_add(imm);
                cpu.set_pc(target);
                cpu.gpr[r1] = target;
            }
            Op::CallI => {
                let ret = cpu.pc();
                push(cpu, bus, ret)?;
                cpu.set_pc(d.addr);
            }
            Op::Ret => {
                let sp = cpu.sp();
                let ret = load(bus, sp)?;
                cpu.set_pc(ret);
                // callee drops `addr` argument words along with the return address
                cpu.set_sp(sp.wrapping_add(d.addr).wrapping_add(1));
            }
            Op::Push => {
                // SP drops before the source is read, so `PUSH r14` stores the new SP
                let sp = cpu.sp().wrapping_sub(1);
                cpu.set_sp(sp);
                store(bus, sp, cpu.gpr[r1].wrapping_add(imm))?;
            }
            Op::Pop => {
                let sp = cpu.sp();
                cpu.gpr[r1] = load(bus, sp)?.wrapping_add(imm);
                cpu.set_sp(cpu.sp().wrapping_add(1));
            }

            Op::Load => cpu.gpr[r1] = load(bus, d.addr)?,
            Op::Store => store(bus, d.addr, cpu.gpr[r1])?,
            Op::Load2 => {
                let v = load_pair(bus, d.addr)?;
                cpu.set_pair(d.r1, v)?;
            }
            Op::Store2 => {
                let v = cpu.pair(d.r1)?;
                store_pair(bus, d.addr, v)?;
            }
            Op::LoadR => cpu.gpr[r1] = load(bus, rhs)?,
            Op::StoreR => store(bus, rhs, cpu.gpr[r1])?,
            Op::LoadR2 => {
                let v = load_pair(bus, rhs)?;
                cpu.set_pair(d.r1, v)?;
            }
            Op::StoreR2 => {
                let v = cpu.pair(d.r1)?;
                store_pair(bus, rhs, v)?;
            }
        }
        Ok(())
    }
}
