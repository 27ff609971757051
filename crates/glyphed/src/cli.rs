//! Command line interface.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Environment variable naming a palette file.
pub const PALETTE_ENV: &str = "GLYPHED_PALETTE";

/// glyphed arguments
///
/// Examples:
///   glyphed                          # Start on the About page
///   glyphed font.json                # Edit a font
///   glyphed -p solarized.gpl font.json
///   glyphed --headless script.json   # Replay events without a display
#[derive(Parser, Debug, Clone)]
#[command(name = "glyphed", version, about = "A multi-window glyph editor")]
pub struct CliArgs {
    /// Font document to open
    pub file: Option<PathBuf>,

    /// Palette file of "r g b" lines, one per theme role
    #[arg(short, long, value_name = "PATH")]
    pub palette: Option<PathBuf>,

    /// Replay a JSON list of events instead of opening a display
    #[arg(long, value_name = "PATH")]
    pub headless: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Default log filter for the verbosity; `RUST_LOG` still wins.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// The palette to load and whether the user asked for it explicitly.
    pub fn palette_path(
        &self,
        env: Option<OsString>,
        config_dir: Option<PathBuf>,
    ) -> Option<(PathBuf, bool)> {
        if let Some(p) = &self.palette {
            return Some((p.clone(), true));
        }
        if let Some(p) = env.filter(|p| !p.is_empty()) {
            return Some((PathBuf::from(p), true));
        }
        config_dir.map(|d| (d.join("glyphed").join("palette.gpl"), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("glyphed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_and_file() {
        let a = parse(&["-vv", "-p", "x.gpl", "font.json"]);
        assert_eq!(a.file, Some(PathBuf::from("font.json")));
        assert_eq!(a.palette, Some(PathBuf::from("x.gpl")));
        assert_eq!(a.log_level(), "debug");
        assert!(a.headless.is_none());
        assert_eq!(parse(&[]).log_level(), "warn");
    }

    #[test]
    fn palette_resolution_order() {
        let cfg = Some(PathBuf::from("/cfg"));
        let env = Some(OsString::from("/env.gpl"));

        let a = parse(&["--palette", "/cli.gpl"]);
        assert_eq!(a.palette_path(env.clone(), cfg.clone()), Some(("/cli.gpl".into(), true)));

        let a = parse(&[]);
        assert_eq!(a.palette_path(env, cfg.clone()), Some(("/env.gpl".into(), true)));
        assert_eq!(
            a.palette_path(Some(OsString::new()), cfg.clone()),
            Some(("/cfg/glyphed/palette.gpl".into(), false))
        );
        assert_eq!(a.palette_path(None, None), None);
    }
}
