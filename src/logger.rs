//! Installs the global `tracing` subscriber. In the browser every event is
//! forwarded to the devtools console at the matching severity; on the host
//! it goes to stderr.

pub use tracing::level_filters::LevelFilter;

use crate::error::{MotionError, Result};

/// Installs the subscriber. Fails if one is already installed.
pub fn init(level: LevelFilter) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(true);

    // The wasm32 target has no system clock, so timestamps are left to the
    // browser console.
    #[cfg(target_arch = "wasm32")]
    let result = builder.without_time().with_writer(console::BrowserConsole).try_init();
    #[cfg(not(target_arch = "wasm32"))]
    let result = builder.with_writer(std::io::stderr).try_init();

    result.map_err(|err| MotionError::Logger(err.to_string()))
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;

    pub(super) struct BrowserConsole;

    /// Buffers one formatted event and emits it when dropped.
    pub(super) struct ConsoleLine {
        level: Level,
        buf: Vec<u8>,
    }

    impl<'a> MakeWriter<'a> for BrowserConsole {
        type Writer = ConsoleLine;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleLine { level: Level::INFO, buf: Vec::new() }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleLine { level: *meta.level(), buf: Vec::new() }
        }
    }

    impl io::Write for ConsoleLine {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleLine {
        fn drop(&mut self) {
            if self.buf.is_empty() {
                return;
            }
            let text = String::from_utf8_lossy(&self.buf);
            let line = wasm_bindgen::JsValue::from_str(text.trim_end());
            match self.level {
                Level::ERROR => web_sys::console::error_1(&line),
                Level::WARN => web_sys::console::warn_1(&line),
                Level::INFO => web_sys::console::info_1(&line),
                _ => web_sys::console::debug_1(&line),
            }
        }
    }
}
