use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Append-only, human-readable log of a request cycle.
///
/// Clones share the same lines. Every appended line is also passed to the
/// optional listener and to the `log` facade at debug level.
#[derive(Clone, Default)]
pub struct StatusLog {
    lines: Arc<Mutex<Vec<String>>>,
    listener: Option<Listener>,
}

impl StatusLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log that passes every line to `listener`.
    #[must_use]
    pub fn with_listener(listener: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            lines: Arc::default(),
            listener: Some(Arc::new(listener)),
        }
    }

    /// Append one line.
    pub fn append(&self, line: impl Into<String>) {
        let line = line.into();
        log::debug!("{line}");
        if let Some(listener) = &self.listener {
            listener(&line);
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// A copy of every line appended so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of lines appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for StatusLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLog")
            .field("lines", &self.len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
