use std::io;
use std::process;

use envdump::config::Config;
use envdump::environ::EnvBlock;
use envdump::error::{Error, Result};
use envdump::getauxval::NativeGetauxval;
use envdump::logger;
use envdump::report::Report;
use envdump::startup::Startup;

fn main() {
    if let Err(e) = run() {
        eprintln!("envdump: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // grab argv/envp before anything can touch the environment
    let startup = Startup::capture().ok_or(Error::StartupNotFound)?;

    let config = Config::from_env()?;
    logger::init(config.log_level)?;
    log::debug!("{:?}, startup from {:?}", config, startup.source());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Report::new(&startup, EnvBlock::current(), NativeGetauxval {})
        .auxv(config.auxv, config.auxv_source)
        .render(&mut out)
}
