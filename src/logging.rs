use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::io::Write;

/// Line-oriented log on stdout: `>>>>> <timestamp> -- <message>`.
///
/// `RUST_LOG` may add per-module filters; `debug` raises the default level.
pub fn init(debug: bool) {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.target(Target::Stdout);
    builder.format(|buf, record| {
        let prefix = if record.level() == Level::Error { "ERROR: " } else { "" };
        writeln!(buf, ">>>>> {} -- {}{}", buf.timestamp_millis(), prefix, record.args())
    });

    // A second init, as from tests, keeps the first logger.
    let _ = builder.try_init();
}
