//! Loader observability
//!
//! The loader never writes output on its own. Anything worth reporting is
//! emitted as a [`LoaderEvent`] to an optional observer injected at
//! construction; [`LogObserver`] forwards events to the crate logger.

use std::fmt;

/// Something the loader did that a host may want to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    /// A module export held no recognised plugin kind
    ModuleSkipped,
    /// Contributions of a kind were appended to its bucket
    ContributionsLoaded { export_name: String, count: usize },
    /// A module exported a kind this loader was told to ignore
    KindIgnored { export_name: String },
    /// A kind was finalized into the settings
    KindFinalized {
        option_name: String,
        contributions: usize,
    },
    /// A pass-through kind had contributions that were not surfaced
    KindHidden {
        export_name: String,
        contributions: usize,
    },
}

impl fmt::Display for LoaderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleSkipped => write!(f, "module exports no known plugin"),
            Self::ContributionsLoaded { export_name, count } => {
                write!(f, "loaded {count} contribution(s) from {export_name}")
            }
            Self::KindIgnored { export_name } => write!(f, "ignoring {export_name}"),
            Self::KindFinalized {
                option_name,
                contributions,
            } => write!(f, "finalized {option_name} from {contributions} contribution(s)"),
            Self::KindHidden {
                export_name,
                contributions,
            } => write!(
                f,
                "{export_name} has {contributions} contribution(s) but no finalizer; not surfaced"
            ),
        }
    }
}

/// Receives loader events
pub trait LoaderObserver: Send + Sync {
    fn on_event(&self, event: &LoaderEvent);
}

impl<F> LoaderObserver for F
where
    F: Fn(&LoaderEvent) + Send + Sync,
{
    fn on_event(&self, event: &LoaderEvent) {
        self(event)
    }
}

/// Observer that writes every event to the debug log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl LoaderObserver for LogObserver {
    fn on_event(&self, event: &LoaderEvent) {
        crate::log_debug!("[plugins] {}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer_receives_events() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &LoaderEvent| seen.lock().unwrap().push(event.clone());

        observer.on_event(&LoaderEvent::ModuleSkipped);
        observer.on_event(&LoaderEvent::KindIgnored {
            export_name: "mochaGlobalSetup".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], LoaderEvent::ModuleSkipped);
    }

    #[test]
    fn test_event_display() {
        let event = LoaderEvent::ContributionsLoaded {
            export_name: "mochaHooks".to_string(),
            count: 2,
        };
        assert_eq!(event.to_string(), "loaded 2 contribution(s) from mochaHooks");
    }
}
