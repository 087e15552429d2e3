use std::cmp;

use chrono::Duration;

use crate::cancel::CancelToken;
use crate::ephemeris::Ephemeris;
use crate::geodesy::circular_difference;
use crate::search::types::{CoarseHit, RefinedMatch, SearchParams, SearchResult, TargetGeometry};

const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement
const MIN_SEPARATION_SECONDS: i64 = 10; // collapse refined duplicates closer than this

/// Find all instants where the body lines up with the observer→POI sight
/// line within the given tolerances.
///
/// Two phases: a coarse scan at `params.coarse_step` collects candidate
/// neighborhoods, then each candidate is refined independently at 1-second
/// resolution. Nearby refined duplicates are collapsed afterwards, so the
/// result is time-ascending with at least 10 seconds between matches.
pub fn find_alignments(
    oracle: &dyn Ephemeris,
    params: &SearchParams,
    cancel: &CancelToken,
) -> SearchResult {
    let target = TargetGeometry::between(&params.observer, &params.poi);
    let window_start = params.start;
    let window_end = window_start + Duration::days(params.search_days);

    if params.search_days <= 0 {
        return SearchResult {
            target,
            matches: Vec::new(),
            window_start,
            window_end,
        };
    }

    log::debug!(
        "scanning {} from {} to {} (step {}s, az tol {}°, el tol {}°)",
        params.body,
        window_start,
        window_end,
        params.coarse_step.num_seconds(),
        params.az_tolerance_deg,
        params.el_tolerance_deg,
    );

    let mut coarse_hits = Vec::new();
    let mut cursor = window_start;
    while cursor <= window_end {
        if cancel.is_cancelled() {
            log::info!("search cancelled at {}, winding down", cursor);
            break;
        }

        if let Some(state) = oracle.position_at(params.body, &params.observer, cursor) {
            let in_tolerance = state.altitude_deg > -90.0
                && circular_difference(state.azimuth_deg, target.bearing_deg)
                    <= params.az_tolerance_deg
                && (state.altitude_deg - target.elevation_angle_deg).abs()
                    <= params.el_tolerance_deg;
            if in_tolerance {
                coarse_hits.push(CoarseHit {
                    instant: cursor,
                    azimuth_deg: state.azimuth_deg,
                    altitude_deg: state.altitude_deg,
                });
            }
        }

        cursor += params.coarse_step;
    }

    log::debug!("coarse scan found {} candidate(s)", coarse_hits.len());

    let refined: Vec<RefinedMatch> = coarse_hits
        .iter()
        .filter_map(|hit| refine_hit(oracle, params, &target, hit))
        .collect();

    let matches = dedup_matches(refined);
    log::debug!("{} alignment(s) after refinement and dedup", matches.len());

    SearchResult {
        target,
        matches,
        window_start,
        window_end,
    }
}

/// Scan ±coarse_step around one coarse hit at 1-second resolution and keep
/// the instant minimizing the closeness metric (azimuth circular error plus
/// absolute elevation error). The first minimum wins ties. A window where
/// the oracle never produces a reading yields no match.
fn refine_hit(
    oracle: &dyn Ephemeris,
    params: &SearchParams,
    target: &TargetGeometry,
    hit: &CoarseHit,
) -> Option<RefinedMatch> {
    let window_start = params.start;
    let window_end = window_start + Duration::days(params.search_days);
    let fine_start = cmp::max(window_start, hit.instant - params.coarse_step);
    let fine_end = cmp::min(window_end, hit.instant + params.coarse_step);

    let mut best: Option<RefinedMatch> = None;
    let mut best_metric = f64::INFINITY;

    let mut cursor = fine_start;
    while cursor <= fine_end {
        if let Some(state) = oracle.position_at(params.body, &params.observer, cursor) {
            let az_error = circular_difference(state.azimuth_deg, target.bearing_deg);
            let el_error = (state.altitude_deg - target.elevation_angle_deg).abs();
            let metric = az_error + el_error;
            if metric < best_metric {
                best_metric = metric;
                best = Some(RefinedMatch {
                    instant: cursor,
                    azimuth_deg: state.azimuth_deg,
                    altitude_deg: state.altitude_deg,
                    az_error_deg: az_error,
                    el_error_deg: el_error,
                    illumination_pct: state.illumination_pct,
                });
            }
        }
        cursor += Duration::seconds(FINE_STEP_SECONDS);
    }

    best
}

/// Sort matches by instant and keep one representative per cluster: a match
/// survives only if at least `MIN_SEPARATION_SECONDS` have elapsed since
/// the previously kept one.
fn dedup_matches(mut matches: Vec<RefinedMatch>) -> Vec<RefinedMatch> {
    matches.sort_by_key(|m| m.instant);

    let min_separation = Duration::seconds(MIN_SEPARATION_SECONDS);
    let mut kept: Vec<RefinedMatch> = Vec::new();
    for candidate in matches {
        match kept.last() {
            Some(previous) if candidate.instant - previous.instant < min_separation => {}
            _ => kept.push(candidate),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::ephemeris::{Body, BodyState, Ephemeris};
    use crate::geodesy::GeoPoint;

    // Oracle scripted by a closure, counting every query it answers.
    struct ScriptedOracle<F: Fn(DateTime<Utc>) -> Option<BodyState>> {
        script: F,
        calls: Cell<usize>,
    }

    impl<F: Fn(DateTime<Utc>) -> Option<BodyState>> ScriptedOracle<F> {
        fn new(script: F) -> Self {
            Self {
                script,
                calls: Cell::new(0),
            }
        }
    }

    impl<F: Fn(DateTime<Utc>) -> Option<BodyState>> Ephemeris for ScriptedOracle<F> {
        fn position_at(
            &self,
            _body: Body,
            _observer: &GeoPoint,
            instant: DateTime<Utc>,
        ) -> Option<BodyState> {
            self.calls.set(self.calls.get() + 1);
            (self.script)(instant)
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
    }

    fn params(search_days: i64) -> SearchParams {
        SearchParams {
            observer: GeoPoint::new(41.035, -111.938, 1300.0).unwrap(),
            poi: GeoPoint::new(41.0328, -111.8386, 2866.0).unwrap(),
            body: Body::Moon,
            start: start(),
            search_days,
            az_tolerance_deg: 0.5,
            el_tolerance_deg: 0.5,
            coarse_step: Duration::minutes(5),
        }
    }

    fn target() -> TargetGeometry {
        let p = params(1);
        TargetGeometry::between(&p.observer, &p.poi)
    }

    // Azimuth sweeps linearly through the target bearing at `peak`; the
    // altitude tracks the target elevation exactly. Closed-form minimum of
    // the metric is `peak` itself.
    fn sweeping_oracle(
        peak: DateTime<Utc>,
        rate_deg_per_sec: f64,
    ) -> impl Fn(DateTime<Utc>) -> Option<BodyState> {
        let t = target();
        move |instant: DateTime<Utc>| {
            let offset_s = (instant - peak).num_seconds() as f64;
            Some(BodyState {
                azimuth_deg: (t.bearing_deg + rate_deg_per_sec * offset_s).rem_euclid(360.0),
                altitude_deg: t.elevation_angle_deg,
                illumination_pct: Some(42.0),
            })
        }
    }

    #[test]
    fn zero_or_negative_window_makes_no_oracle_calls() {
        for days in [0, -3] {
            let oracle = ScriptedOracle::new(|_| None);
            let result = find_alignments(&oracle, &params(days), &CancelToken::new());
            assert!(result.matches.is_empty());
            assert_eq!(oracle.calls.get(), 0);
        }
    }

    #[test]
    fn out_of_tolerance_oracle_yields_no_matches() {
        let t = target();
        let oracle = ScriptedOracle::new(move |_| {
            Some(BodyState {
                azimuth_deg: (t.bearing_deg + 90.0).rem_euclid(360.0),
                altitude_deg: t.elevation_angle_deg,
                illumination_pct: None,
            })
        });
        let result = find_alignments(&oracle, &params(1), &CancelToken::new());
        assert!(result.matches.is_empty());
        assert!(oracle.calls.get() > 0);
    }

    #[test]
    fn unavailable_readings_are_skipped_not_matched() {
        let oracle = ScriptedOracle::new(|_| None);
        let result = find_alignments(&oracle, &params(1), &CancelToken::new());
        assert!(result.matches.is_empty());
        // one query per coarse sample, none for refinement
        assert_eq!(oracle.calls.get(), (24 * 60 / 5) + 1);
    }

    #[test]
    fn refinement_recovers_the_analytic_minimum() {
        // Peak 17 s past a coarse sample: only refinement can land on it.
        let peak = start() + Duration::seconds(3617);
        let oracle = ScriptedOracle::new(sweeping_oracle(peak, 0.5 / 300.0));

        let result = find_alignments(&oracle, &params(1), &CancelToken::new());
        assert_eq!(result.matches.len(), 1);

        let found = &result.matches[0];
        let offset = (found.instant - peak).num_seconds().abs();
        assert!(offset <= 1, "refined instant {}s away from peak", offset);
        assert!(found.az_error_deg <= 0.5);
        assert!(found.el_error_deg <= 0.5);
        assert_eq!(found.illumination_pct, Some(42.0));
    }

    #[test]
    fn adjacent_coarse_hits_collapse_to_one_match() {
        let peak = start() + Duration::seconds(3617);
        // Slow sweep: several consecutive coarse samples fall inside the
        // tolerance band around the peak.
        let oracle = ScriptedOracle::new(sweeping_oracle(peak, 0.5 / 900.0));

        let result = find_alignments(&oracle, &params(1), &CancelToken::new());
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn matches_are_ascending_and_separated() {
        let t = target();
        let first = start() + Duration::seconds(3600);
        let second = start() + Duration::seconds(3600 * 8);
        let oracle = ScriptedOracle::new(move |instant: DateTime<Utc>| {
            let near = |peak: DateTime<Utc>| (instant - peak).num_seconds().abs() as f64;
            let offset = near(first).min(near(second));
            Some(BodyState {
                azimuth_deg: (t.bearing_deg + offset * (0.5 / 300.0)).rem_euclid(360.0),
                altitude_deg: t.elevation_angle_deg,
                illumination_pct: None,
            })
        });

        let result = find_alignments(&oracle, &params(1), &CancelToken::new());
        assert_eq!(result.matches.len(), 2);
        for pair in result.matches.windows(2) {
            let gap = pair[1].instant - pair[0].instant;
            assert!(gap >= Duration::seconds(MIN_SEPARATION_SECONDS));
        }
    }

    #[test]
    fn negative_altitude_remains_a_candidate() {
        // POI below the observer: the target look angle is negative, so only
        // below-horizon body positions can line up.
        let mut p = params(1);
        std::mem::swap(&mut p.observer, &mut p.poi);
        let t = TargetGeometry::between(&p.observer, &p.poi);
        assert!(t.elevation_angle_deg < 0.0);

        let peak = start() + Duration::seconds(3600);
        let oracle = ScriptedOracle::new(move |instant: DateTime<Utc>| {
            let offset_s = (instant - peak).num_seconds() as f64;
            Some(BodyState {
                azimuth_deg: (t.bearing_deg + offset_s * (0.5 / 300.0)).rem_euclid(360.0),
                altitude_deg: t.elevation_angle_deg,
                illumination_pct: None,
            })
        });

        let result = find_alignments(&oracle, &p, &CancelToken::new());
        assert_eq!(result.matches.len(), 1);
        assert!(result.matches[0].altitude_deg < 0.0);
    }

    #[test]
    fn cancelled_token_stops_the_scan_before_any_query() {
        let oracle = ScriptedOracle::new(sweeping_oracle(start(), 0.5 / 300.0));
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = find_alignments(&oracle, &params(365), &cancel);
        assert!(result.matches.is_empty());
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn dedup_is_idempotent() {
        let make = |offset_s: i64| RefinedMatch {
            instant: start() + Duration::seconds(offset_s),
            azimuth_deg: 91.0,
            altitude_deg: 10.0,
            az_error_deg: 0.1,
            el_error_deg: 0.1,
            illumination_pct: None,
        };
        let raw = vec![make(0), make(3), make(12), make(13), make(40)];

        let once = dedup_matches(raw);
        let kept: Vec<_> = once.iter().map(|m| m.instant).collect();
        assert_eq!(kept.len(), 3);

        let twice = dedup_matches(once.clone());
        let again: Vec<_> = twice.iter().map(|m| m.instant).collect();
        assert_eq!(kept, again);
    }
}
