use std::{
    env,
    error::Error,
    fs::File,
    hint::black_box,
    path::{Path, PathBuf},
    process,
};

use sh4::cpu::registers::BANKED_GPR_COUNT;
use sh4::host::{self, encode, read_host_control};
use sh4::{GuestRounding, Sh4Context, StatusRegister};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "usage: sh4sync [probe] [--log-file <path>]";

const MD: u32 = 1 << 30;
const RB: u32 = 1 << 29;
const DN: u32 = 1 << 18;

/// 1 + 2 ulp and 1 + 1 ulp, the two neighbours of the tie in [`tie_sum`].
const NEAREST: f32 = f32::from_bits(0x3F80_0002);
const TRUNCATED: f32 = f32::from_bits(0x3F80_0001);

fn describe_tie(sum: f32) -> &'static str {
    if sum.to_bits() == TRUNCATED.to_bits() {
        "truncated"
    } else if sum.to_bits() == NEAREST.to_bits() {
        "nearest"
    } else {
        "unexpected"
    }
}

struct Args {
    log_file: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut log_file = None;
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "probe" => {}
            "--log-file" => {
                let path = args.next().ok_or("--log-file needs a path")?;
                log_file = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => return Err(format!("unknown argument `{other}`")),
        }
    }

    Ok(Args { log_file })
}

fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = log_file {
        let (writer, guard) = tracing_appender::non_blocking(File::create(path)?);
        registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .init();
        Ok(Some(guard))
    } else {
        registry.with(fmt::layer().without_time()).init();
        Ok(None)
    }
}

fn tie_sum() -> f32 {
    black_box(black_box(1.0_f32 + f32::EPSILON) + black_box(f32::EPSILON / 2.0))
}

fn subnormal_quotient() -> f32 {
    black_box(black_box(f32::MIN_POSITIVE) / black_box(3.0_f32))
}

fn probe_rounding(ctx: &mut Sh4Context) {
    println!("host: {}", env::consts::ARCH);
    println!(" RM DN  encoded     readback    tie        subnormal");

    for round_mode in [0, 1] {
        for dn in [false, true] {
            let rounding = GuestRounding::new(round_mode, dn);
            let expected = encode(rounding, read_host_control());

            ctx.write_fpscr(round_mode | if dn { DN } else { 0 });
            let readback = read_host_control();
            let tie = describe_tie(tie_sum());
            let subnormal = if subnormal_quotient().to_bits() == 0 {
                "flushed"
            } else {
                "kept"
            };

            println!(
                " {round_mode}  {}   {expected:#010x}  {readback:#010x}  {tie:<9}  {subnormal}",
                u8::from(dn)
            );
        }
    }

    let inside = ctx.run_with_default_rounding(tie_sum);
    println!(
        "default rounding bracket: {} inside, {} after",
        describe_tie(inside),
        describe_tie(tie_sum()),
    );
}

fn probe_banks(ctx: &mut Sh4Context) {
    let mut no_interrupts = |_: StatusRegister| false;

    for (i, n) in (0..BANKED_GPR_COUNT).zip(0_u32..) {
        ctx.registers.set_bank_register_at(i, 0xB000 + n);
        ctx.registers.set_register_at(i, 0xA000 + n);
    }

    for (label, sr) in [
        ("privileged, RB=1", MD | RB),
        ("privileged, RB=0", MD),
        ("user, RB=1", RB),
        ("privileged, RB=1", MD | RB),
        ("user, RB=0", 0),
    ] {
        ctx.write_sr(sr, &mut no_interrupts);
        println!(
            "SR={sr:#010x} ({label:<16}) R0={:#06x} R0_BANK={:#06x}",
            ctx.registers.register_at(0),
            ctx.registers.bank_register_at(0)
        );
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let _guard = init_tracing(args.log_file.as_deref())?;
    info!("sh4sync v{}", env!("CARGO_PKG_VERSION"));

    let mut ctx = Sh4Context::default();
    ctx.reset();
    info!(sr = u32::from(ctx.sr), fpscr = u32::from(ctx.fpscr), "context reset");

    probe_banks(&mut ctx);
    probe_rounding(&mut ctx);

    info!(writes = host::host_write_count(), "host control register writes");

    // back to round-to-nearest for the rest of the process
    host::apply_host_rounding(GuestRounding::DEFAULT);
    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tie_neighbours() {
        assert_eq!(NEAREST.to_bits(), (1.0_f32 + 2.0 * f32::EPSILON).to_bits());
        assert_eq!(TRUNCATED.to_bits(), (1.0_f32 + f32::EPSILON).to_bits());
    }

    #[test]
    fn describe_tie_compares_bits() {
        assert_eq!(describe_tie(NEAREST), "nearest");
        assert_eq!(describe_tie(TRUNCATED), "truncated");
        assert_eq!(describe_tie(1.0), "unexpected");
    }
}
