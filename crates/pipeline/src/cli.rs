//! Command-line flags.
//!
//! The flag names predate this binary and were used with Go-style single
//! dashes (`-max 5`, `-host db`). [`normalize_go_style_args`] rewrites those
//! into clap's `--long` form before parsing, so both spellings work.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use imgharvest_core::naming::DEFAULT_OUTPUT_DIR;

/// Flags that take a value, with their single-letter aliases.
const VALUE_FLAGS: &[(&str, Option<&str>)] = &[
    ("query", Some("q")),
    ("max", None),
    ("host", None),
    ("port", Some("p")),
    ("name", None),
    ("user", Some("u")),
    ("pass", None),
    ("out-dir", None),
    ("env-file", None),
];

/// Flags that take no value.
const SWITCH_FLAGS: &[&str] = &["help", "version"];

#[derive(Debug, Clone, Parser)]
#[command(
    name = "imgharvest",
    version,
    about = "Search for images, resize them to 800x600, and store them in Postgres"
)]
pub struct Cli {
    /// Search query for images
    #[arg(short = 'q', long = "query", default_value = "")]
    pub query: String,

    /// Max number of images to download
    #[arg(long = "max", default_value_t = 10)]
    pub max: usize,

    /// DB host [default: localhost]
    #[arg(long = "host")]
    pub host: Option<String>,

    /// DB port [default: 5432]
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Database name [default: images]
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Database user [default: postgres]
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Database password
    #[arg(long = "pass")]
    pub pass: Option<String>,

    /// Directory downloaded images are written to
    #[arg(long = "out-dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub out_dir: PathBuf,

    /// Environment file holding the search API secrets
    #[arg(long = "env-file", default_value = ".env")]
    pub env_file: PathBuf,
}

impl Cli {
    /// Parse the process arguments, accepting Go-style single-dash flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_go_style_args(std::env::args_os()))
    }

    /// `true` when any database flag was given on the command line.
    pub fn has_db_flags(&self) -> bool {
        self.host.is_some()
            || self.port.is_some()
            || self.name.is_some()
            || self.user.is_some()
            || self.pass.is_some()
    }
}

/// Rewrite `-max 5`, `-host=db`, and friends into `--max=5`, `--host=db`.
///
/// A flag that takes a value swallows the next argument whole, the way Go's
/// `flag` package does, so `-q -name` searches for `-name`. Everything after
/// `--` passes through unchanged.
pub fn normalize_go_style_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut out: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        if arg == "--" {
            out.push(arg);
            out.extend(args.by_ref());
            break;
        }
        match arg.to_str().and_then(rewrite_flag) {
            Some(Flag::Complete(rewritten)) => out.push(OsString::from(rewritten)),
            Some(Flag::NeedsValue(long)) => match args.next() {
                Some(value) => {
                    let mut joined = OsString::from(format!("--{long}="));
                    joined.push(value);
                    out.push(joined);
                }
                None => out.push(OsString::from(format!("--{long}"))),
            },
            None => out.push(arg),
        }
    }

    out
}

#[derive(Debug, PartialEq, Eq)]
enum Flag {
    /// A switch, or a value flag written as `name=value`.
    Complete(String),
    /// A value flag whose value is the next argument.
    NeedsValue(&'static str),
}

fn rewrite_flag(arg: &str) -> Option<Flag> {
    let body = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    if body.is_empty() || body.starts_with('-') {
        return None;
    }
    let (name, inline) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    if let Some(&(long, _)) = VALUE_FLAGS
        .iter()
        .find(|(long, short)| *long == name || *short == Some(name))
    {
        return Some(match inline {
            Some(value) => Flag::Complete(format!("--{long}={value}")),
            None => Flag::NeedsValue(long),
        });
    }

    (inline.is_none() && SWITCH_FLAGS.contains(&name)).then(|| Flag::Complete(format!("--{name}")))
}
