//! Live reload of theme configuration from a watched file.
//!
//! A [ThemeConfigWatcher] keeps an OS file watcher on a theme config
//! file and applies changes to a theme in place. The watcher's
//! notifications arrive on a background thread and are bridged over a
//! channel; the owning thread calls [ThemeConfigWatcher::poll]
//! whenever convenient (typically once per event loop turn) to pick
//! them up. Applying the file reuses [ThemingConfig::apply_to], so a
//! change reaches nodes as a content reload, never as an identity
//! switch.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::ThemingConfig;
use crate::error::{ThemingError, ThemingResult};
use crate::theme::Theme;

/// Watches a theme config file and applies changes to a theme.
pub struct ThemeConfigWatcher {
    path: PathBuf,
    theme: Rc<Theme>,
    events: Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl ThemeConfigWatcher {
    /// Starts watching `path` and ties changes to `theme`.
    ///
    /// The file must exist when watching starts. Use
    /// [Theme::default_theme] as the theme to drive the usual
    /// process-wide configuration.
    pub fn watch(path: impl Into<PathBuf>, theme: Rc<Theme>) -> ThemingResult<Self> {
        let path = path.into();
        let (sender, events) = channel();
        let mut watcher = notify::recommended_watcher(sender).map_err(ThemingError::watch_error)?;
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(ThemingError::watch_error)?;
        log::debug!("watching theme config {:?}", path);
        Ok(Self {
            path,
            theme,
            events,
            _watcher: watcher,
        })
    }

    /// Drains pending file notifications and reapplies the config if
    /// the file changed.
    ///
    /// Returns `Ok(true)` when a change was applied. Multiple pending
    /// notifications collapse into one application.
    pub fn poll(&self) -> ThemingResult<bool> {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        changed = true;
                    }
                }
                Ok(Err(error)) => {
                    log::warn!("theme config watcher error: {error}");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if !changed {
            return Ok(false);
        }
        apply_file(&self.path, &self.theme)?;
        Ok(true)
    }

    /// Returns the watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the theme changes are applied to.
    pub fn theme(&self) -> &Rc<Theme> {
        &self.theme
    }
}

/// Reads the config file at `path` and applies it to `theme`.
pub fn apply_file(path: &Path, theme: &Rc<Theme>) -> ThemingResult<()> {
    let config = ThemingConfig::from_file(path)?;
    config.apply_to(theme);
    log::debug!("applied theme config {:?} -> {:?}", path, theme);
    Ok(())
}
