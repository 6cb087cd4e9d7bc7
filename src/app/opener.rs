use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::Result;

/// Opens external links on behalf of the panels.
pub trait LinkOpener {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Opens links in the system's default browser.
#[cfg(feature = "browser")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

#[cfg(feature = "browser")]
impl LinkOpener for SystemBrowser {
    fn open(&mut self, url: &str) -> Result<()> {
        webbrowser::open(url)?;
        Ok(())
    }
}

/// Collects opened links instead of launching anything. Clones share the
/// same list, so a test can keep one and hand the other to the stage.
#[derive(Debug, Default, Clone)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        self.opened.lock().push(url.to_string());
        log::info!("Link opened: {url}");
        Ok(())
    }
}
