//! Default logging setup for the bytetab demos and tools
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

/// Environment variable holding the log filter, e.g. `debug` or `bytetab_tiny_ptr=trace`.
pub const LOG_ENV: &str = "BYTETAB_LOG";
/// Environment variable selecting whether log output is styled (`auto`, `always` or `never`).
pub const LOG_STYLE_ENV: &str = "BYTETAB_LOG_STYLE";

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

fn builder() -> env_logger::Builder {
    let start_time = std::time::Instant::now();

    let last_target = std::sync::Mutex::new(String::new());

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(LOG_ENV, "info")
            .write_style(LOG_STYLE_ENV),
    );
    builder.format(move |buf, record| {
        use std::io::Write;

        let timestamp = start_time.elapsed();
        let level = record.level();
        let target = record.target();

        let mut last_target = last_target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);

            writeln!(
                buf,
                "{} {}",
                format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
                format_args!("{style}{target}{style:#}", style = TARGET_STYLE)
            )?;
        }
        writeln!(
            buf,
            "{} {} {}",
            format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
            format_args!(
                "{style}{level}{style:#}",
                style = buf.default_level_style(level),
            ),
            record.args(),
        )
    });
    builder
}

/// Perform the default logging setup used by the bytetab demos
///
/// Panics if a global logger was already installed.
pub fn setup() {
    builder().init();
}

/// Like [`setup`], but does nothing if a global logger was already installed.
///
/// Useful in tests, where several test functions may try to set up logging.
pub fn try_setup() {
    let _ = builder().try_init();
}
