//! Walks through the basic operations of either table engine on `u32` keys and values.
//!
//! Run with `BYTETAB_LOG=debug` to see the tables grow.
use bytetab::{ByteTable, DerefTable, RobinHoodTable};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    RobinHood,
    TinyPointer,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(short = 'e', long, value_enum, default_value = "robin-hood")]
    engine: Engine,
    /// Number of additional keys inserted to trigger growth
    #[clap(short = 'n', long, default_value = "0")]
    fill: u32,
}

fn show(table: &impl ByteTable, key: u32) {
    match table.lookup(&key.to_le_bytes()) {
        Some(value) => {
            let mut bytes = [0; 4];
            bytes.copy_from_slice(value);
            log::info!("lookup {key}: {}", u32::from_le_bytes(bytes));
        }
        None => log::info!("lookup {key}: not found"),
    }
}

fn walkthrough(mut table: impl ByteTable, fill: u32) -> color_eyre::Result<()> {
    for (key, value) in [(42u32, 123u32), (100, 456), (2021, 789)] {
        let outcome = table.insert(&key.to_le_bytes(), &value.to_le_bytes())?;
        log::info!("insert {key} -> {value}: {outcome:?}");
    }
    for key in [42, 100, 2021] {
        show(&table, key);
    }

    log::info!("delete 100: {}", table.delete(&100u32.to_le_bytes()));
    show(&table, 100);

    for key in 0..fill {
        table.insert(&(key + 10_000).to_le_bytes(), &key.to_le_bytes())?;
    }
    log::info!("{}", table.stats());

    table.reset();
    log::info!("reset: {}", table.stats());
    show(&table, 42);
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    bytetab_logger::setup();

    match args.engine {
        Engine::RobinHood => walkthrough(RobinHoodTable::create(4, 4)?, args.fill),
        Engine::TinyPointer => walkthrough(DerefTable::create(4, 4)?, args.fill),
    }
}
