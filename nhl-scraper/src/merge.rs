//! Reconciles API play-by-play with the `PL` report into one timeline.
//!
//! The feeds share no event id, so a report play is paired with the closest
//! unmatched API event of the same period and type within a tolerance.

use std::collections::HashMap;

use nhl_common::clock::{SHOOTOUT_ELAPSED_SECONDS, game_seconds, seconds_to_clock};
use nhl_reports::{PlayReport, ReportPlay};

use crate::extract::skater_state;
use crate::model::{EventSource, GameInfo, GameRosterSpot, PlayEvent};

/// Game roster keyed by team abbreviation and sweater number.
type SweaterIndex<'a> = HashMap<(&'a str, u32), &'a GameRosterSpot>;

const PLAYOFF_GAME_TYPE: u8 = 3;

/// API type key for a report event code; `None` for rows that are dropped.
pub fn report_event_type(code: &str) -> Option<String> {
    let mapped = match code {
        "ANTHEM" | "PGSTR" | "PGEND" => return None,
        "BLOCK" => "blocked-shot",
        "DELPEN" => "delayed-penalty",
        "FAC" => "faceoff",
        "GIVE" => "giveaway",
        "GOAL" => "goal",
        "HIT" => "hit",
        "MISS" => "missed-shot",
        "PENL" => "penalty",
        "SHOT" => "shot-on-goal",
        "STOP" => "stoppage",
        "TAKE" => "takeaway",
        "GEND" => "game-end",
        "PEND" => "period-end",
        "PSTR" => "period-start",
        "SOC" => "shootout-complete",
        other => return Some(other.to_ascii_lowercase()),
    };
    Some(mapped.to_string())
}

fn is_shootout(game: &GameInfo, period: u8) -> bool {
    period == 5 && game.game_type != PLAYOFF_GAME_TYPE
}

fn period_type(game: &GameInfo, period: u8) -> &'static str {
    match period {
        1..=3 => "REG",
        _ if is_shootout(game, period) => "SO",
        _ => "OT",
    }
}

/// Merge API events with report plays. The result is sorted and carries
/// running score and shot totals. `rosters` resolves the sweater numbers in
/// report-only descriptions to players.
pub fn merge_events(
    api: Vec<PlayEvent>,
    report: &PlayReport,
    game: &GameInfo,
    rosters: &[GameRosterSpot],
    tolerance_secs: u32,
) -> Vec<PlayEvent> {
    let sweaters: SweaterIndex<'_> = rosters
        .iter()
        .filter_map(|r| Some(((r.team_abbrev.as_str(), r.sweater_number?), r)))
        .collect();
    let api_count = api.len();
    let mut events = api;
    let mut matched = vec![false; api_count];
    let mut report_only = Vec::new();
    let mut dropped = 0usize;

    for play in &report.plays {
        let Some(kind) = report_event_type(&play.event_code) else {
            dropped += 1;
            continue;
        };
        let best = events[..api_count]
            .iter()
            .enumerate()
            .filter(|(i, e)| !matched[*i] && e.period == play.period && e.event_type == kind)
            .map(|(i, e)| (i, e.period_seconds.abs_diff(play.elapsed_secs)))
            .filter(|(_, delta)| *delta <= tolerance_secs)
            .min_by_key(|(_, delta)| *delta);

        match best {
            Some((i, _)) => {
                matched[i] = true;
                enrich(&mut events[i], play);
            }
            None => report_only.push(from_report(play, kind, game, &sweaters)),
        }
    }

    let matched_count = matched.iter().filter(|m| **m).count();
    let report_count = report_only.len();
    events.extend(report_only);
    sort_events(&mut events);
    fill_running_totals(&mut events);

    tracing::info!(
        game_id = game.game_id,
        api = api_count,
        report = report.plays.len(),
        dropped,
        matched = matched_count,
        report_only = report_count,
        total = events.len(),
        "merge.summary"
    );
    events
}

fn enrich(event: &mut PlayEvent, play: &ReportPlay) {
    event.source = EventSource::Both;
    event.report_number = Some(play.number);
    event.report_code = Some(play.event_code.clone());
    event.description = Some(play.description.clone());
    event.strength = play.strength.clone();
    event.home_on_ice = play.home_on_ice.clone();
    event.away_on_ice = play.away_on_ice.clone();
    if event.event_team.is_none() {
        event.event_team = play.event_team.clone();
    }
    if event.home_skaters.is_none() && has_on_ice(play) {
        let (home, away) = on_ice_counts(play);
        event.home_skaters = Some(home);
        event.away_skaters = Some(away);
        event.skater_state = Some(skater_state(home, away, event.event_team_type));
    }
}

fn has_on_ice(play: &ReportPlay) -> bool {
    !play.home_on_ice.is_empty() && !play.away_on_ice.is_empty()
}

fn on_ice_counts(play: &ReportPlay) -> (u8, u8) {
    let clamp = |n: usize| u8::try_from(n).unwrap_or(u8::MAX);
    (clamp(play.home_skaters()), clamp(play.away_skaters()))
}

/// Sweater numbers written as `#NN` in a report description, in order.
fn sweater_numbers(text: &str) -> Vec<u32> {
    text.split('#')
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

fn opponent<'a>(game: &'a GameInfo, team: &str) -> Option<&'a str> {
    match game.side_of(team)? {
        "home" => Some(game.away_team.abbrev.as_str()),
        _ => Some(game.home_team.abbrev.as_str()),
    }
}

/// Team and sweater of up to three players named in a report row.
///
/// Faceoffs list the away player first. Blocks, hits and penalties name the
/// other team's player second, and a penalty's second player is whoever drew
/// it. A player serving a penalty is not a participant.
fn described_players<'a>(
    play: &ReportPlay,
    game: &'a GameInfo,
) -> [Option<(&'a str, u32)>; 3] {
    let text = play.description.as_str();
    let numbers = sweater_numbers(text);
    let mut slots = [0, 1, 2].map(|i| numbers.get(i).copied());
    if let Some((_, drawn)) = text.split_once("Drawn By") {
        slots[1] = sweater_numbers(drawn).first().copied();
    }
    if text.contains("Served By") {
        slots[2] = None;
    }

    let event_team = play
        .event_team
        .as_deref()
        .and_then(|t| match game.side_of(t)? {
            "home" => Some(game.home_team.abbrev.as_str()),
            _ => Some(game.away_team.abbrev.as_str()),
        });
    let teams = match play.event_code.as_str() {
        "FAC" => [
            Some(game.away_team.abbrev.as_str()),
            Some(game.home_team.abbrev.as_str()),
            event_team,
        ],
        "BLOCK" | "HIT" | "PENL" => [
            event_team,
            event_team.and_then(|t| opponent(game, t)),
            event_team,
        ],
        _ => [event_team; 3],
    };

    std::array::from_fn(|i| teams[i].zip(slots[i]))
}

fn from_report(
    play: &ReportPlay,
    kind: String,
    game: &GameInfo,
    sweaters: &SweaterIndex<'_>,
) -> PlayEvent {
    let [p1, p2, p3] = described_players(play, game).map(|slot| {
        slot.and_then(|key| sweaters.get(&key))
            .map(|r| (r.player_id, r.full_name.clone()))
    });
    let id = |p: &Option<(u64, String)>| p.as_ref().map(|(id, _)| *id);
    let name = |p: Option<(u64, String)>| p.map(|(_, name)| name);
    let event_team_type = play.event_team.as_deref().and_then(|t| game.side_of(t));
    let counts = has_on_ice(play).then(|| on_ice_counts(play));
    let elapsed_seconds = if is_shootout(game, play.period) {
        SHOOTOUT_ELAPSED_SECONDS
    } else {
        game_seconds(play.period, play.elapsed_secs)
    };

    PlayEvent {
        game_id: game.game_id,
        event_id: None,
        report_number: Some(play.number),
        sort_order: None,
        period: play.period,
        period_type: Some(period_type(game, play.period).to_string()),
        period_seconds: play.elapsed_secs,
        elapsed_seconds,
        time_in_period: seconds_to_clock(play.elapsed_secs, false),
        time_remaining: play.remaining_secs.map(|s| seconds_to_clock(s, false)),
        event_type: kind,
        type_code: None,
        report_code: Some(play.event_code.clone()),
        description: Some(play.description.clone()),
        strength: play.strength.clone(),
        event_team: play.event_team.clone(),
        event_team_type,
        player_id_1: id(&p1),
        player_name_1: name(p1),
        player_id_2: id(&p2),
        player_name_2: name(p2),
        player_id_3: id(&p3),
        player_name_3: name(p3),
        goalie_in_net_id: None,
        x_coord: None,
        y_coord: None,
        x_fixed: None,
        y_fixed: None,
        zone_code: None,
        shot_type: None,
        reason: None,
        situation_code: None,
        skater_state: counts.map(|(h, a)| skater_state(h, a, event_team_type)),
        home_skaters: counts.map(|(h, _)| h),
        away_skaters: counts.map(|(_, a)| a),
        home_on_ice: play.home_on_ice.clone(),
        away_on_ice: play.away_on_ice.clone(),
        home_team: game.home_team.abbrev.clone(),
        away_team: game.away_team.abbrev.clone(),
        home_score: None,
        away_score: None,
        home_sog: None,
        away_sog: None,
        source: EventSource::Report,
    }
}

/// Stable sort by period, then seconds into the period.
pub fn sort_events(events: &mut [PlayEvent]) {
    events.sort_by_key(|e| (e.period, e.period_seconds));
}

/// Forward-fill score and shots on goal, starting from zero.
pub fn fill_running_totals(events: &mut [PlayEvent]) {
    let mut last = [0u32; 4];
    for event in events {
        let slots = [
            &mut event.home_score,
            &mut event.away_score,
            &mut event.home_sog,
            &mut event.away_sog,
        ];
        for (slot, prev) in slots.into_iter().zip(last.iter_mut()) {
            match *slot {
                Some(v) => *prev = v,
                None => *slot = Some(*prev),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamSide;
    use nhl_reports::OnIcePlayer;

    fn game() -> GameInfo {
        let side = |id, abbrev: &str| TeamSide {
            id,
            abbrev: abbrev.to_string(),
            name: None,
            score: None,
        };
        GameInfo {
            game_id: 2023020204,
            season: 20232024,
            game_type: 2,
            game_date: "2023-11-11".into(),
            start_time_utc: None,
            venue: None,
            game_state: None,
            home_team: side(8, "MTL"),
            away_team: side(10, "TOR"),
        }
    }

    fn api(event_id: u64, period: u8, secs: u32, kind: &str) -> PlayEvent {
        let mut e = from_report(
            &report_play(0, period, secs, "X"),
            kind.to_string(),
            &game(),
            &HashMap::new(),
        );
        e.event_id = Some(event_id);
        e.report_number = None;
        e.report_code = None;
        e.description = None;
        e.source = EventSource::Api;
        e
    }

    fn report_play(number: u32, period: u8, secs: u32, code: &str) -> ReportPlay {
        ReportPlay {
            number,
            period,
            strength: Some("EV".into()),
            elapsed_secs: secs,
            remaining_secs: Some(1200 - secs),
            event_code: code.to_string(),
            description: format!("{code} row {number}"),
            event_team: None,
            away_on_ice: Vec::new(),
            home_on_ice: Vec::new(),
        }
    }

    fn skater(n: u32, goalie: bool) -> OnIcePlayer {
        OnIcePlayer {
            sweater_number: n,
            position: if goalie { "Goalie" } else { "Center" }.into(),
            name: format!("PLAYER {n}"),
            is_goalie: goalie,
        }
    }

    fn spot(team: &str, sweater: u32, player_id: u64, name: &str) -> GameRosterSpot {
        let (first, last) = name.split_once(' ').unwrap();
        GameRosterSpot {
            game_id: 2023020204,
            season: 20232024,
            game_type: 2,
            game_date: "2023-11-11".into(),
            team_id: if team == "MTL" { 8 } else { 10 },
            team_abbrev: team.into(),
            is_home: team == "MTL",
            player_id,
            first_name: first.into(),
            last_name: last.into(),
            full_name: name.into(),
            sweater_number: Some(sweater),
            position_code: "C".into(),
            position: "F".into(),
            headshot: None,
        }
    }

    fn rosters() -> Vec<GameRosterSpot> {
        vec![
            spot("MTL", 8, 8476875, "Mike Matheson"),
            spot("MTL", 14, 8480018, "Nick Suzuki"),
            spot("MTL", 22, 8481540, "Cole Caufield"),
            spot("TOR", 34, 8479318, "Auston Matthews"),
            spot("TOR", 44, 8476853, "Morgan Rielly"),
            spot("TOR", 91, 8475166, "John Tavares"),
        ]
    }

    fn described(code: &str, team: &str, description: &str) -> ReportPlay {
        let mut play = report_play(40, 2, 300, code);
        play.event_team = Some(team.into());
        play.description = description.into();
        play
    }

    fn report(plays: Vec<ReportPlay>) -> PlayReport {
        PlayReport {
            away_abbrev: Some("TOR".into()),
            home_abbrev: Some("MTL".into()),
            plays,
        }
    }

    #[test]
    fn codes_map_to_api_types() {
        assert_eq!(report_event_type("FAC").as_deref(), Some("faceoff"));
        assert_eq!(report_event_type("SOC").as_deref(), Some("shootout-complete"));
        assert_eq!(report_event_type("EISTR").as_deref(), Some("eistr"));
        assert_eq!(report_event_type("ANTHEM"), None);
        assert_eq!(report_event_type("PGEND"), None);
    }

    #[test]
    fn closest_event_within_tolerance_wins() {
        let api_events = vec![api(1, 1, 70, "hit"), api(2, 1, 75, "hit"), api(3, 1, 90, "hit")];
        let plays = report(vec![report_play(10, 1, 74, "HIT"), report_play(11, 1, 80, "HIT")]);
        let merged = merge_events(api_events, &plays, &game(), &[], 2);

        let by_id = |id| merged.iter().find(|e| e.event_id == Some(id)).unwrap();
        assert_eq!(by_id(2).source, EventSource::Both);
        assert_eq!(by_id(2).report_number, Some(10));
        assert_eq!(by_id(1).source, EventSource::Api);
        assert_eq!(by_id(3).source, EventSource::Api);

        let report_only: Vec<_> = merged
            .iter()
            .filter(|e| e.source == EventSource::Report)
            .collect();
        assert_eq!(report_only.len(), 1);
        assert_eq!(report_only[0].report_number, Some(11));
        assert_eq!(report_only[0].time_in_period, "01:20");
        assert_eq!(report_only[0].elapsed_seconds, 80);
    }

    #[test]
    fn type_and_period_must_agree() {
        let api_events = vec![api(1, 1, 30, "giveaway"), api(2, 2, 30, "takeaway")];
        let plays = report(vec![report_play(5, 1, 30, "TAKE")]);
        let merged = merge_events(api_events, &plays, &game(), &[], 5);
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|e| e.source != EventSource::Both));
    }

    #[test]
    fn ties_go_to_the_earliest_event() {
        let api_events = vec![api(1, 1, 58, "faceoff"), api(2, 1, 62, "faceoff")];
        let plays = report(vec![report_play(3, 1, 60, "FAC")]);
        let merged = merge_events(api_events, &plays, &game(), &[], 2);
        let both: Vec<_> = merged.iter().filter(|e| e.source == EventSource::Both).collect();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].event_id, Some(1));
    }

    #[test]
    fn enrichment_keeps_api_fields() {
        let mut event = api(7, 2, 245, "goal");
        event.event_team = Some("MTL".into());
        event.event_team_type = Some("home");
        event.home_skaters = Some(5);
        event.away_skaters = Some(4);

        let mut play = report_play(57, 2, 245, "GOAL");
        play.event_team = Some("TOR".into());
        play.home_on_ice = vec![skater(14, false), skater(35, true)];
        play.away_on_ice = vec![skater(34, false), skater(60, true)];

        let merged = merge_events(vec![event], &report(vec![play]), &game(), &[], 2);
        let e = &merged[0];
        assert_eq!(e.source, EventSource::Both);
        assert_eq!(e.event_team.as_deref(), Some("MTL"));
        assert_eq!(e.home_skaters, Some(5));
        assert_eq!(e.home_on_ice.len(), 2);
        assert_eq!(e.strength.as_deref(), Some("EV"));
        assert_eq!(e.report_code.as_deref(), Some("GOAL"));
    }

    #[test]
    fn report_only_events_count_skaters_and_side() {
        let mut play = report_play(9, 1, 330, "HIT");
        play.event_team = Some("TOR".into());
        play.home_on_ice = vec![skater(14, false), skater(8, false), skater(35, true)];
        play.away_on_ice = vec![skater(34, false), skater(60, true)];

        let merged = merge_events(Vec::new(), &report(vec![play]), &game(), &[], 2);
        let e = &merged[0];
        assert_eq!(e.event_team_type, Some("away"));
        assert_eq!((e.home_skaters, e.away_skaters), (Some(2), Some(1)));
        assert_eq!(e.skater_state.as_deref(), Some("1v2"));
        assert_eq!(e.period_type.as_deref(), Some("REG"));
    }

    #[test]
    fn report_only_hit_names_the_player_hit_on_the_other_team() {
        let play = described("HIT", "MTL", "MTL #8 MATHESON HIT TOR #34 MATTHEWS, Def. Zone");
        let merged = merge_events(Vec::new(), &report(vec![play]), &game(), &rosters(), 2);
        let e = &merged[0];
        assert_eq!(e.source, EventSource::Report);
        assert_eq!(e.player_id_1, Some(8476875));
        assert_eq!(e.player_name_1.as_deref(), Some("Mike Matheson"));
        assert_eq!(e.player_id_2, Some(8479318));
        assert_eq!(e.player_name_2.as_deref(), Some("Auston Matthews"));
        assert_eq!(e.player_id_3, None);
    }

    #[test]
    fn report_only_penalty_uses_drawn_by_and_skips_served_by() {
        let drawn = described(
            "PENL",
            "TOR",
            "TOR #44 RIELLY Hooking(2 min), Def. Zone Drawn By: MTL #22 CAUFIELD",
        );
        let served = described(
            "PENL",
            "TOR",
            "TOR #34 MATTHEWS Misconduct(10 min) Served By: #91 TAVARES, Neu. Zone Drawn By: MTL #14 SUZUKI",
        );
        let merged = merge_events(
            Vec::new(),
            &report(vec![drawn, served]),
            &game(),
            &rosters(),
            2,
        );

        assert_eq!(merged[0].player_name_1.as_deref(), Some("Morgan Rielly"));
        assert_eq!(merged[0].player_name_2.as_deref(), Some("Cole Caufield"));
        assert_eq!(merged[0].player_name_3, None);

        assert_eq!(merged[1].player_name_1.as_deref(), Some("Auston Matthews"));
        assert_eq!(merged[1].player_id_2, Some(8480018));
        assert_eq!(merged[1].player_id_3, None);
    }

    #[test]
    fn report_only_faceoff_lists_away_then_home() {
        let play = described("FAC", "MTL", "MTL won Neu. Zone - TOR #34 MATTHEWS vs MTL #14 SUZUKI");
        let merged = merge_events(Vec::new(), &report(vec![play]), &game(), &rosters(), 2);
        assert_eq!(merged[0].player_id_1, Some(8479318));
        assert_eq!(merged[0].player_id_2, Some(8480018));
    }

    #[test]
    fn unknown_sweaters_leave_players_empty() {
        let play = described("GIVE", "MTL", "MTL GIVEAWAY - #99 NOBODY, Def. Zone");
        let merged = merge_events(Vec::new(), &report(vec![play]), &game(), &rosters(), 2);
        assert_eq!(merged[0].player_id_1, None);
        assert_eq!(merged[0].player_name_1, None);

        let assists = described(
            "GOAL",
            "TOR",
            "TOR #44 RIELLY(1), Wrist, Off. Zone, 12 ft. Assists: #34 MATTHEWS(3); #91 TAVARES(2)",
        );
        assert_eq!(
            described_players(&assists, &game()),
            [Some(("TOR", 44)), Some(("TOR", 34)), Some(("TOR", 91))]
        );
    }

    #[test]
    fn shootout_report_rows_sit_at_fixed_elapsed() {
        let plays = report(vec![report_play(1, 5, 0, "SHOT")]);
        let merged = merge_events(Vec::new(), &plays, &game(), &[], 2);
        assert_eq!(merged[0].elapsed_seconds, SHOOTOUT_ELAPSED_SECONDS);
        assert_eq!(merged[0].period_type.as_deref(), Some("SO"));
    }

    #[test]
    fn merged_timeline_is_ordered_and_never_shrinks() {
        let api_events = vec![
            api(4, 2, 10, "shot-on-goal"),
            api(1, 1, 0, "period-start"),
            api(3, 1, 400, "giveaway"),
            api(2, 1, 0, "faceoff"),
        ];
        let plays = report(vec![
            report_play(1, 1, 0, "ANTHEM"),
            report_play(2, 1, 0, "PSTR"),
            report_play(3, 1, 0, "FAC"),
            report_play(4, 1, 200, "HIT"),
            report_play(5, 2, 11, "SHOT"),
            report_play(6, 3, 1200, "PEND"),
        ]);
        let api_len = api_events.len();
        let merged = merge_events(api_events, &plays, &game(), &[], 2);

        assert!(merged.len() >= api_len.max(plays.plays.len() - 1));
        assert_eq!(merged.len(), 6);
        assert!(
            merged
                .windows(2)
                .all(|w| (w[0].period, w[0].period_seconds) <= (w[1].period, w[1].period_seconds))
        );
        // equal clocks keep their input order
        assert_eq!(merged[0].event_id, Some(1));
        assert_eq!(merged[1].event_id, Some(2));
    }

    #[test]
    fn totals_forward_fill_from_zero() {
        let mut events = vec![api(1, 1, 0, "faceoff"), api(2, 1, 30, "shot-on-goal"), api(3, 1, 60, "hit")];
        events[1].home_sog = Some(1);
        events[1].away_sog = Some(0);
        fill_running_totals(&mut events);
        assert_eq!(events[0].home_score, Some(0));
        assert_eq!(events[0].home_sog, Some(0));
        assert_eq!(events[2].home_sog, Some(1));
        assert_eq!(events[2].away_score, Some(0));
    }
}
