//! Load-once holder of the current track.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::error::{Result, SatvarError};
use crate::track::Track;

#[derive(Debug, Clone)]
struct LoadedTrack {
    source: PathBuf,
    track: Arc<Track>,
}

/// Holds the single loaded [`Track`].
///
/// Loading is idempotent: asking for the source that is already loaded is a
/// no-op. Loads are serialized, so concurrent callers can never build two
/// tracks for the same source or observe a half-built one. Readers receive
/// an `Arc<Track>` and never hold a lock while using it.
#[derive(Debug)]
pub struct TrackStore {
    current: RwLock<Option<LoadedTrack>>,
    load_guard: Mutex<()>,
    chunk_size: usize,
}

impl TrackStore {
    /// Create an empty store. `chunk_size` is the elevation smoothing window
    /// used for every track it loads.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            current: RwLock::new(None),
            load_guard: Mutex::new(()),
            chunk_size,
        }
    }

    /// Load `source` unless it is already the current track.
    ///
    /// Returns the loaded track. Loading a different source replaces the
    /// current track; readers holding the old `Arc` keep it alive.
    pub fn load<P: AsRef<Path>>(&self, source: P) -> Result<Arc<Track>> {
        let source = source.as_ref();

        if let Some(track) = self.get_if_loaded(source) {
            return Ok(track);
        }

        let _guard = self.load_guard.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the same load while we waited
        if let Some(track) = self.get_if_loaded(source) {
            return Ok(track);
        }

        let start = Instant::now();
        let track = Arc::new(Track::from_file(source, self.chunk_size)?);
        tracing::info!(
            source = %source.display(),
            points = track.len(),
            distance_km = track.distance_km(),
            elevation_gain_m = track.elevation_gain_m(),
            elevation_loss_m = track.elevation_loss_m(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Track loaded"
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(LoadedTrack {
            source: source.to_path_buf(),
            track: Arc::clone(&track),
        });

        Ok(track)
    }

    /// Check whether `source` is the current track.
    pub fn is_loaded<P: AsRef<Path>>(&self, source: P) -> bool {
        self.get_if_loaded(source.as_ref()).is_some()
    }

    /// The current track, if any.
    pub fn track(&self) -> Option<Arc<Track>> {
        self.read().as_ref().map(|loaded| Arc::clone(&loaded.track))
    }

    /// The current track, or [`SatvarError::TrackNotLoaded`].
    pub fn require(&self) -> Result<Arc<Track>> {
        self.track().ok_or(SatvarError::TrackNotLoaded)
    }

    /// Source of the current track, if any.
    pub fn source(&self) -> Option<PathBuf> {
        self.read().as_ref().map(|loaded| loaded.source.clone())
    }

    fn get_if_loaded(&self, source: &Path) -> Option<Arc<Track>> {
        self.read()
            .as_ref()
            .filter(|loaded| loaded.source.as_path() == source)
            .map(|loaded| Arc::clone(&loaded.track))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<LoadedTrack>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}
