use std::fmt;
use std::sync::{Arc, RwLock};

type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle to the user-visible notification callback.
///
/// The hosting shell registers the callback once at startup; every clone of
/// the handle sees the same registration. Registering again replaces the
/// previous sink.
#[derive(Clone, Default)]
pub struct Notifier {
    sink: Arc<RwLock<Option<Sink>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle with the callback already registered
    pub fn with_sink<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let notifier = Self::new();
        notifier.set_notifier(callback);
        notifier
    }

    pub fn set_notifier<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        match self.sink.write() {
            Ok(mut guard) => *guard = Some(Arc::new(callback)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::new(callback)),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.current().is_some()
    }

    /// Surface a message to the user. Without a registered sink this only logs.
    pub fn notify(&self, message: &str) {
        match self.current() {
            Some(sink) => sink(message),
            None => tracing::warn!("Notification dropped, no sink registered: {}", message),
        }
    }

    fn current(&self) -> Option<Sink> {
        // The lock is released before the callback runs so a sink may re-register
        match self.sink.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("registered", &self.is_registered())
            .finish()
    }
}
