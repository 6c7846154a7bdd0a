//! Admission and conflict policy: step 2-4 of `play()`, evaluated
//! atomically (the orchestrator holds `&mut OrchestratorState` for the
//! duration, so there is no interleaving to race against).

use std::collections::HashSet;

use hlx_core::{ConflictStrategy, EngineConfig, PlaybackId, PlaybackRequest, RequestError};

use crate::state::OrchestratorState;

/// What the caller must do to honor an admitted request: stop some
/// existing playbacks, and/or ghost the new one against tracks it must not
/// actually emit OSC for.
pub struct AdmissionDecision {
    pub to_stop: Vec<PlaybackId>,
    pub ghosted_tracks: Vec<hlx_core::TrackId>,
}

pub fn admit(
    state: &OrchestratorState,
    config: &EngineConfig,
    request: &PlaybackRequest,
) -> Result<AdmissionDecision, RequestError> {
    request.validate()?;

    if state.playbacks.len() >= config.max_concurrent_playbacks {
        return Err(RequestError::MaxConcurrentExceeded(config.max_concurrent_playbacks));
    }

    let mut conflicting_owners: Vec<PlaybackId> = Vec::new();
    let mut seen = HashSet::new();
    for t in &request.track_ids {
        if let Some(&owner) = state.track_owner.get(t) {
            if seen.insert(owner) {
                conflicting_owners.push(owner);
            }
        }
    }

    if conflicting_owners.is_empty() {
        return Ok(AdmissionDecision { to_stop: vec![], ghosted_tracks: vec![] });
    }

    match config.default_conflict_strategy {
        ConflictStrategy::StopExisting => Ok(AdmissionDecision { to_stop: conflicting_owners, ghosted_tracks: vec![] }),
        ConflictStrategy::RejectNew => Err(RequestError::RejectedByPolicy),
        ConflictStrategy::AllowConcurrent => {
            let ghosted_tracks = request
                .track_ids
                .iter()
                .filter(|t| state.track_owner.contains_key(t))
                .copied()
                .collect();
            Ok(AdmissionDecision { to_stop: vec![], ghosted_tracks })
        }
        ConflictStrategy::PriorityBased => {
            let mut to_stop = Vec::new();
            for owner in conflicting_owners {
                let owner_priority = state.playbacks.get(&owner).map(|p| p.request.priority);
                match owner_priority {
                    Some(p) if request.priority > p => to_stop.push(owner),
                    _ => return Err(RequestError::RejectedByPolicy),
                }
            }
            Ok(AdmissionDecision { to_stop, ghosted_tracks: vec![] })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_core::{Animation, ModelKind, MultiTrackMode, Position, Priority, RequestSource, TrackId};
    use hlx_runtime::Playback;
    use std::time::Instant;

    fn req(track_ids: Vec<TrackId>, priority: Priority) -> PlaybackRequest {
        let animation = Animation {
            id: "a".into(),
            name: "a".into(),
            duration_s: 1.0,
            r#loop: false,
            ping_pong: false,
            model: ModelKind::Linear,
            parameters: hlx_model::default_parameters(ModelKind::Linear, Position::ORIGIN),
            fade_in: None,
            fade_out: None,
        };
        PlaybackRequest {
            animation,
            track_ids,
            mode: MultiTrackMode::Relative,
            priority,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Ui,
            delay_s: 0.0,
            phase_offset_s: 0.0,
        }
    }

    fn with_owner(t: TrackId, priority: Priority) -> OrchestratorState {
        let mut state = OrchestratorState::new();
        let owner_id = PlaybackId(1);
        let owner_req = req(vec![t], priority);
        let pb = Playback::new(owner_id, owner_req, Instant::now(), &state.current_positions());
        state.playbacks.insert(owner_id, pb);
        state.track_owner.insert(t, owner_id);
        state
    }

    #[test]
    fn no_conflict_admits_freely() {
        let state = OrchestratorState::new();
        let config = EngineConfig::default();
        let decision = admit(&state, &config, &req(vec![TrackId(1)], Priority::Normal)).unwrap();
        assert!(decision.to_stop.is_empty());
    }

    #[test]
    fn reject_new_policy_rejects_on_conflict() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = ConflictStrategy::RejectNew;
        let state = with_owner(TrackId(1), Priority::Normal);
        let err = admit(&state, &config, &req(vec![TrackId(1)], Priority::Emergency)).unwrap_err();
        assert_eq!(err, RequestError::RejectedByPolicy);
    }

    #[test]
    fn priority_based_preempts_lower_priority_owner() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = ConflictStrategy::PriorityBased;
        let state = with_owner(TrackId(1), Priority::Normal);
        let decision = admit(&state, &config, &req(vec![TrackId(1)], Priority::Emergency)).unwrap();
        assert_eq!(decision.to_stop, vec![PlaybackId(1)]);
    }

    #[test]
    fn priority_based_rejects_ties() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = ConflictStrategy::PriorityBased;
        let state = with_owner(TrackId(1), Priority::Normal);
        let err = admit(&state, &config, &req(vec![TrackId(1)], Priority::Normal)).unwrap_err();
        assert_eq!(err, RequestError::RejectedByPolicy);
    }

    #[test]
    fn allow_concurrent_ghosts_owned_tracks() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = ConflictStrategy::AllowConcurrent;
        let state = with_owner(TrackId(1), Priority::Normal);
        let decision = admit(&state, &config, &req(vec![TrackId(1)], Priority::Normal)).unwrap();
        assert_eq!(decision.ghosted_tracks, vec![TrackId(1)]);
        assert!(decision.to_stop.is_empty());
    }

    #[test]
    fn max_concurrent_exceeded() {
        let mut config = EngineConfig::default();
        config.max_concurrent_playbacks = 0;
        let state = OrchestratorState::new();
        let err = admit(&state, &config, &req(vec![TrackId(1)], Priority::Normal)).unwrap_err();
        assert_eq!(err, RequestError::MaxConcurrentExceeded(0));
    }
}
