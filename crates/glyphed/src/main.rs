mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use clap::Parser;
use glyphed_core::error::Error;
use glyphed_core::*;
use glyphed_ui::{Context, Resources, UiFont, builtin};

use crate::cli::{CliArgs, PALETTE_ENV};

const PROGRAM: &str = "glyphed";

fn load_palette(args: &CliArgs) -> Palette {
    let mut palette = Palette::default();
    let env = std::env::var_os(PALETTE_ENV);
    if let Some((path, explicit)) = args.palette_path(env, dirs::config_dir()) {
        match palette.load(&path) {
            Ok(_) => {}
            Err(e) if explicit => log::warn!("palette {}: {e}", path.display()),
            Err(e) => log::debug!("no palette at {}: {e}", path.display()),
        }
    }
    palette
}

fn read_script(path: &Path) -> anyhow::Result<Vec<Event>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let events: Vec<Event> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("bad event script {}", path.display()))?;
    log::info!("{} events to replay", events.len());
    Ok(events)
}

#[cfg(all(unix, feature = "desktop"))]
mod signals {
    use glyphed_platform::Interrupter;
    use nix::sys::signal::{SigSet, Signal};

    pub struct Blocked(Option<SigSet>);

    /// Blocks SIGINT and SIGTERM in this thread and every thread spawned
    /// from it afterwards, so only the waiter sees them. Must run before
    /// the event loop starts its own threads.
    pub fn block() -> Blocked {
        let mut set = SigSet::empty();
        set.add(Signal::SIGINT);
        set.add(Signal::SIGTERM);
        match set.thread_block() {
            Ok(()) => Blocked(Some(set)),
            Err(e) => {
                log::warn!("signals stay unhandled: {e}");
                Blocked(None)
            }
        }
    }

    /// Wakes the event loop with an interrupt when a signal arrives.
    pub fn watch(blocked: Blocked, interrupter: Interrupter) {
        let Some(set) = blocked.0 else {
            return;
        };
        let spawned = std::thread::Builder::new()
            .name("signals".into())
            .spawn(move || match set.wait() {
                Ok(sig) => {
                    log::info!("received {sig:?}");
                    interrupter.interrupt();
                }
                Err(e) => log::error!("waiting for signals failed: {e}"),
            });
        if let Err(e) = spawned {
            log::error!("cannot start the signal thread: {e}");
        }
    }
}

#[cfg(all(not(unix), feature = "desktop"))]
mod signals {
    pub struct Blocked;

    pub fn block() -> Blocked {
        Blocked
    }

    pub fn watch(_: Blocked, _: glyphed_platform::Interrupter) {}
}

#[cfg(feature = "desktop")]
fn desktop_driver() -> anyhow::Result<Box<dyn Driver>> {
    let blocked = signals::block();
    let driver = glyphed_platform::DesktopDriver::new().map_err(Error::from)?;
    signals::watch(blocked, driver.interrupter());
    Ok(Box::new(driver))
}

#[cfg(not(feature = "desktop"))]
fn desktop_driver() -> anyhow::Result<Box<dyn Driver>> {
    Err(Error::from(DriverError::Display("built without a desktop backend".into())).into())
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let palette = load_palette(args);
    let mut replay = None;
    let driver: Box<dyn Driver> = match &args.headless {
        Some(script) => {
            let d = HeadlessDriver::with_script(read_script(script)?);
            replay = Some(d.clone());
            Box::new(d)
        }
        None => desktop_driver()?,
    };
    let font = UiFont::from_system()
        .inspect_err(|e| log::warn!("no UI font, text will not be drawn: {e}"))
        .ok();
    let res = Resources::new(driver, &palette).with_font(font);
    let mut ctx = Context::new(res, Box::new(JsonStore), palette, builtin());

    let outcome = ctx
        .startup(args.file.as_deref())
        .and_then(|()| glyphed_ui::run(&mut ctx));
    ctx.shutdown();
    if let Some(d) = replay {
        log::info!("replay done: {} driver calls", d.calls().len());
    }
    outcome?;
    Ok(())
}

/// Exit status for a failed run; the report goes to stderr.
fn report(e: anyhow::Error) -> i32 {
    let fatal = match e.downcast::<Error>() {
        Ok(Error::Driver(DriverError::Interrupted)) => {
            log::info!("interrupted");
            return 1;
        }
        Ok(e) => e.into_fatal("main"),
        Err(other) => FatalError::new("main", ErrorCode::Io).with_detail(format!("{other:#}")),
    };
    eprintln!("{}", fatal.report(PROGRAM));
    fatal.exit_code()
}

fn main() {
    let args = CliArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();
    let code = match run(&args) {
        Ok(()) => 0,
        Err(e) => report(e),
    };
    std::process::exit(code);
}
