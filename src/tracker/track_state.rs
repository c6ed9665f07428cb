/// Lifecycle state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackState {
    /// Seen recently but not matched often enough to be trusted
    #[default]
    Tentative,
    /// Matched for enough consecutive frames, exposed in the output
    Confirmed,
    /// Confirmed track without a recent match, kept for re-matching
    Lost,
    /// Terminal, evicted at the end of the frame
    Removed,
}
