//! Mapping from upstream payloads to output records.
//!
//! Functions here are pure: they take decoded wire types (or parsed reports)
//! and return records, so they are tested without a server.

use std::collections::HashMap;

use nhl_common::clock::{SHOOTOUT_ELAPSED_SECONDS, clock_to_seconds, game_seconds};
use nhl_common::{DataSource, NhlError, RankingCategory, SessionType};
use nhl_reports::ToiReport;
use serde_json::Value;

use crate::model::*;
use crate::table::{Row, flatten};
use crate::wire::*;

pub fn franchises(rows: Vec<WireFranchise>) -> Vec<Franchise> {
    rows.into_iter()
        .map(|f| Franchise {
            franchise_id: f.id,
            full_name: f.full_name,
            common_name: f.team_common_name,
            place_name: f.team_place_name,
            first_season_id: f.first_season.map(|s| s.id),
            last_season_id: f.last_season.map(|s| s.id),
        })
        .collect()
}

pub fn active_teams(rows: Vec<WireActiveTeam>) -> Vec<ActiveTeam> {
    rows.into_iter()
        .map(|t| ActiveTeam {
            team_id: t.id,
            abbrev: t.abbrev,
            name: t.name.default,
            common_name: localized(&t.common_name),
            place_name_with_preposition: localized(&t.place_name_with_preposition),
            logo: t.logo,
            dark_logo: t.dark_logo,
        })
        .collect()
}

fn team_side(team: &WireGameTeam) -> TeamSide {
    let name = match (localized(&team.place_name), localized(&team.common_name)) {
        (Some(place), Some(common)) => Some(full_name(&place, &common)),
        (place, common) => common.or(place),
    };
    TeamSide {
        id: team.id,
        abbrev: team.abbrev.clone(),
        name,
        score: team.score,
    }
}

pub fn schedule_games(games: Vec<WireScheduleGame>, team: &str) -> Vec<ScheduleGame> {
    games
        .into_iter()
        .map(|g| ScheduleGame {
            game_id: g.id,
            season: g.season,
            game_type: g.game_type,
            game_date: g.game_date,
            start_time_utc: g.start_time_utc,
            venue: localized(&g.venue),
            game_state: g.game_state,
            home_team: team_side(&g.home_team),
            away_team: team_side(&g.away_team),
            team_abbrev: team.to_string(),
        })
        .collect()
}

pub fn roster_players(
    groups: RosterGroups,
    team: &str,
    season: Option<String>,
) -> Vec<RosterPlayer> {
    groups
        .into_players()
        .map(|p| {
            let first = p.first_name.default;
            let last = p.last_name.default;
            RosterPlayer {
                player_id: p.id,
                full_name: full_name(&first, &last),
                first_name: first,
                last_name: last,
                sweater_number: p.sweater_number,
                position: position_group(&p.position_code).to_string(),
                position_d: position_d(&p.position_code, p.shoots_catches.as_deref()),
                position_code: p.position_code,
                shoots_catches: p.shoots_catches,
                height_in_inches: p.height_in_inches,
                weight_in_pounds: p.weight_in_pounds,
                height_in_centimeters: p.height_in_centimeters,
                weight_in_kilograms: p.weight_in_kilograms,
                birth_date: p.birth_date,
                birth_city: localized(&p.birth_city),
                birth_state_province: localized(&p.birth_state_province),
                birth_country: p.birth_country,
                headshot: p.headshot,
                team: team.to_string(),
                season: season.clone(),
            }
        })
        .collect()
}

pub fn skater_lines(
    rows: Vec<WireSkaterStats>,
    team: &str,
    season: &str,
    session: SessionType,
) -> Vec<SkaterStatLine> {
    rows.into_iter()
        .map(|s| SkaterStatLine {
            player_id: s.player_id,
            full_name: full_name(&s.first_name.default, &s.last_name.default),
            position: position_group(&s.position_code).to_string(),
            position_code: s.position_code,
            games_played: s.games_played,
            goals: s.goals,
            assists: s.assists,
            points: s.points,
            plus_minus: s.plus_minus,
            penalty_minutes: s.penalty_minutes,
            power_play_goals: s.power_play_goals,
            shorthanded_goals: s.shorthanded_goals,
            game_winning_goals: s.game_winning_goals,
            overtime_goals: s.overtime_goals,
            shots: s.shots,
            shooting_pctg: s.shooting_pctg,
            avg_time_on_ice_per_game: s.avg_time_on_ice_per_game,
            avg_shifts_per_game: s.avg_shifts_per_game,
            faceoff_win_pctg: s.faceoff_win_pctg,
            team: team.to_string(),
            season: season.to_string(),
            session: session.label(),
            session_code: session.code(),
        })
        .collect()
}

pub fn goalie_lines(
    rows: Vec<WireGoalieStats>,
    team: &str,
    season: &str,
    session: SessionType,
) -> Vec<GoalieStatLine> {
    rows.into_iter()
        .map(|g| GoalieStatLine {
            player_id: g.player_id,
            full_name: full_name(&g.first_name.default, &g.last_name.default),
            games_played: g.games_played,
            games_started: g.games_started,
            wins: g.wins,
            losses: g.losses,
            overtime_losses: g.overtime_losses,
            goals_against_average: g.goals_against_average,
            save_percentage: g.save_percentage,
            shots_against: g.shots_against,
            saves: g.saves,
            goals_against: g.goals_against,
            shutouts: g.shutouts,
            time_on_ice: g.time_on_ice,
            team: team.to_string(),
            season: season.to_string(),
            session: session.label(),
            session_code: session.code(),
        })
        .collect()
}

pub fn draft_picks(year: u16, rows: Vec<WireDraftPick>) -> Vec<DraftPick> {
    rows.into_iter()
        .map(|p| {
            let first = p.first_name.default;
            let last = p.last_name.default;
            DraftPick {
                year,
                round: p.round,
                pick_in_round: p.pick_in_round,
                overall_pick: p.overall_pick,
                team_id: p.team_id,
                team_abbrev: p.team_abbrev,
                team_name: localized(&p.team_name),
                full_name: full_name(&first, &last),
                first_name: first,
                last_name: last,
                position_code: p.position_code,
                amateur_club_name: p.amateur_club_name,
                amateur_league: p.amateur_league,
                country_code: p.country_code,
                height: p.height,
                weight: p.weight,
            }
        })
        .collect()
}

pub fn legacy_draft_picks(rows: Vec<WireRecordsDraftPick>) -> Vec<LegacyDraftPick> {
    rows.into_iter()
        .map(|p| {
            let name = match (&p.first_name, &p.last_name) {
                (Some(first), Some(last)) => full_name(first, last),
                _ => p.player_name.clone().unwrap_or_default(),
            };
            let (team_id, team_full_name, team_tri_code) = match p.team {
                Some(t) => (Some(t.id), t.full_name, t.tri_code.or(p.tri_code)),
                None => (None, None, p.tri_code),
            };
            LegacyDraftPick {
                year: p.draft_year,
                round: p.round_number,
                pick_in_round: p.pick_in_round,
                overall_pick: p.overall_pick_number,
                player_id: p.player_id,
                prospect_id: p.draft_prospect.map(|d| d.id),
                full_name: name,
                position: p.position,
                team_id,
                team_tri_code,
                team_full_name,
                amateur_club_name: p.amateur_club_name,
                amateur_league: p.amateur_league,
                country_code: p.country_code,
                height: p.height,
                weight: p.weight,
            }
        })
        .collect()
}

/// One row per team, with seasons spanning all of its stints.
pub fn team_details(rows: Vec<WireRecordsFranchise>) -> Vec<TeamDetail> {
    rows.into_iter()
        .flat_map(|f| {
            let franchise_id = f.id;
            f.teams.into_iter().map(move |t| {
                let first_season_id = t
                    .franchise_team
                    .iter()
                    .filter_map(|s| s.first_season.as_ref().map(|id| id.id))
                    .min();
                let open = t.franchise_team.iter().any(|s| s.last_season.is_none());
                let last_season_id = if open {
                    None
                } else {
                    t.franchise_team
                        .iter()
                        .filter_map(|s| s.last_season.as_ref().map(|id| id.id))
                        .max()
                };
                TeamDetail {
                    franchise_id,
                    team_id: t.id,
                    active: t.active,
                    tri_code: t.tri_code,
                    place_name: t.place_name,
                    common_name: t.common_name,
                    full_name: t.full_name,
                    conference: t.conference.and_then(|c| c.name),
                    division: t.division.and_then(|d| d.name),
                    first_season_id,
                    last_season_id,
                }
            })
        })
        .collect()
}

pub fn team_affiliates(rows: Vec<WireTeamAffiliate>) -> Vec<TeamAffiliate> {
    rows.into_iter()
        .map(|a| TeamAffiliate {
            franchise_id: a.franchise_id,
            team_id: a.team_id,
            affiliate_id: a.team_affiliate_id,
            affiliate_name: a.team_affiliate.full_name,
            affiliate_site_url: a.team_affiliate.official_site_url,
            league: a.team_affiliate.league.and_then(|l| l.abbreviation),
        })
        .collect()
}

fn roster_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("y") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("n") => Some(false),
        _ => None,
    }
}

pub fn legacy_roster(team_id: u32, rows: Vec<WireRecordsRosterPlayer>) -> Vec<LegacyRosterPlayer> {
    rows.into_iter()
        .map(|p| LegacyRosterPlayer {
            team_id,
            player_id: p.id,
            full_name: full_name(&p.first_name, &p.last_name),
            first_name: p.first_name,
            last_name: p.last_name,
            sweater_number: p.sweater_number,
            position: p.position,
            height: p.height,
            weight: p.weight,
            birth_date: p.birth_date,
            birth_city: p.birth_city,
            birth_state_province: p.birth_state_province,
            birth_country: p.birth_country,
            on_roster: p.on_roster.as_ref().and_then(roster_flag),
        })
        .collect()
}

pub fn rankings(year: u16, category: RankingCategory, rows: Vec<WireRanking>) -> Vec<DraftRanking> {
    rows.into_iter()
        .map(|r| DraftRanking {
            year,
            category: category.code(),
            category_name: category.name(),
            midterm_rank: r.midterm_rank,
            final_rank: r.final_rank,
            full_name: full_name(&r.first_name, &r.last_name),
            first_name: r.first_name,
            last_name: r.last_name,
            position_code: r.position_code,
            shoots_catches: r.shoots_catches,
            height_in_inches: r.height_in_inches,
            weight_in_pounds: r.weight_in_pounds,
            birth_date: r.birth_date,
            birth_city: r.birth_city,
            birth_state_province: r.birth_state_province,
            birth_country: r.birth_country,
            last_amateur_club: r.last_amateur_club,
            last_amateur_league: r.last_amateur_league,
        })
        .collect()
}

pub fn player_profile(player_id: u64, landing: &PlayerLanding) -> PlayerProfile {
    let first = landing.first_name.default.clone();
    let last = landing.last_name.default.clone();
    PlayerProfile {
        player_id: landing.player_id.unwrap_or(player_id),
        full_name: full_name(&first, &last),
        first_name: first,
        last_name: last,
        sweater_number: landing.sweater_number,
        position: landing
            .position
            .as_deref()
            .map(|p| position_group(p).to_string()),
        position_code: landing.position.clone(),
        shoots_catches: landing.shoots_catches.clone(),
        birth_date: landing.birth_date.clone(),
        birth_city: localized(&landing.birth_city),
        birth_state_province: localized(&landing.birth_state_province),
        birth_country: landing.birth_country.clone(),
        height_in_inches: landing.height_in_inches,
        height_in_centimeters: landing.height_in_centimeters,
        weight_in_pounds: landing.weight_in_pounds,
        weight_in_kilograms: landing.weight_in_kilograms,
        current_team_id: landing.current_team_id,
        current_team_abbrev: landing.current_team_abbrev.clone(),
        headshot: landing.headshot.clone(),
        draft_details: landing.draft_details.as_ref().map(|d| DraftDetails {
            year: d.year,
            team_abbrev: d.team_abbrev.clone(),
            round: d.round,
            pick_in_round: d.pick_in_round,
            overall_pick: d.overall_pick,
        }),
    }
}

/// Flatten one stat block of the landing page, tagging every row with the
/// player's identity. `season` only narrows `seasonTotals`.
pub fn player_stat_rows(
    profile: &PlayerProfile,
    landing: &PlayerLanding,
    kind: PlayerStatKind,
    season: Option<u32>,
) -> Result<Vec<Row>, NhlError> {
    let block = match kind {
        PlayerStatKind::FeaturedStats => &landing.featured_stats,
        PlayerStatKind::CareerTotals => &landing.career_totals,
        PlayerStatKind::Last5Games => &landing.last_5_games,
        PlayerStatKind::SeasonTotals => &landing.season_totals,
    };
    let block = block
        .as_ref()
        .ok_or_else(|| NhlError::NoData(format!("player {} has no {}", profile.player_id, kind.key())))?;

    let items: Vec<&Value> = match block {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        if let (PlayerStatKind::SeasonTotals, Some(want)) = (kind, season) {
            if item.get("season").and_then(Value::as_u64) != Some(u64::from(want)) {
                continue;
            }
        }
        let mut row = flatten(item);
        row.insert("player_id".into(), profile.player_id.into());
        row.insert("full_name".into(), profile.full_name.clone().into());
        row.insert("position_code".into(), profile.position_code.clone().into());
        row.insert("position".into(), profile.position.clone().into());
        row.insert(
            "current_team_abbrev".into(),
            profile.current_team_abbrev.clone().into(),
        );
        rows.push(row);
    }
    Ok(rows)
}

pub fn game_log(profile: &PlayerProfile, rows: Vec<WireGameLogEntry>) -> Vec<PlayerGameLogEntry> {
    rows.into_iter()
        .map(|g| PlayerGameLogEntry {
            player_id: profile.player_id,
            player_name: profile.full_name.clone(),
            position: profile.position.clone(),
            game_id: g.game_id,
            game_date: g.game_date,
            team_abbrev: g.team_abbrev,
            opponent_abbrev: g.opponent_abbrev,
            home_road_flag: g.home_road_flag,
            goals: g.goals,
            assists: g.assists,
            points: g.points,
            plus_minus: g.plus_minus,
            power_play_goals: g.power_play_goals,
            power_play_points: g.power_play_points,
            shorthanded_goals: g.shorthanded_goals,
            shorthanded_points: g.shorthanded_points,
            game_winning_goals: g.game_winning_goals,
            ot_goals: g.ot_goals,
            shots: g.shots,
            shifts: g.shifts,
            pim: g.pim,
            toi: g.toi,
            games_started: g.games_started,
            decision: g.decision,
            shots_against: g.shots_against,
            goals_against: g.goals_against,
            save_pctg: g.save_pctg,
            shutouts: g.shutouts,
        })
        .collect()
}

/// Standings ordered by conference, division, then points and regulation
/// wins descending.
pub fn standings(date: &str, rows: Vec<WireStanding>) -> Vec<StandingsEntry> {
    let mut out: Vec<StandingsEntry> = rows
        .into_iter()
        .map(|s| StandingsEntry {
            standings_date: date.to_string(),
            conference_abbrev: s.conference_abbrev,
            conference_name: s.conference_name,
            division_abbrev: s.division_abbrev,
            division_name: s.division_name,
            team_abbrev: s.team_abbrev.default,
            team_name: s.team_name.default,
            place_name: localized(&s.place_name),
            team_common_name: localized(&s.team_common_name),
            games_played: s.games_played,
            points: s.points,
            wins: s.wins,
            losses: s.losses,
            ot_losses: s.ot_losses,
            goals_for: s.goal_for,
            goals_against: s.goal_against,
            goal_differential: s.goal_differential,
            point_pctg: s.point_pctg,
            regulation_wins: s.regulation_wins,
            regulation_plus_ot_wins: s.regulation_plus_ot_wins,
            streak_code: s.streak_code,
            streak_count: s.streak_count,
        })
        .collect();
    out.sort_by(|a, b| {
        a.conference_abbrev
            .cmp(&b.conference_abbrev)
            .then_with(|| a.division_abbrev.cmp(&b.division_abbrev))
            .then_with(|| b.points.cmp(&a.points))
            .then_with(|| b.regulation_wins.cmp(&a.regulation_wins))
    });
    out
}

// ---------- games ----------

pub fn game_info(pbp: &WirePlayByPlay) -> GameInfo {
    GameInfo {
        game_id: pbp.id,
        season: pbp.season,
        game_type: pbp.game_type,
        game_date: pbp.game_date.clone(),
        start_time_utc: pbp.start_time_utc.clone(),
        venue: localized(&pbp.venue),
        game_state: pbp.game_state.clone(),
        home_team: team_side(&pbp.home_team),
        away_team: team_side(&pbp.away_team),
    }
}

/// Dressed players of both teams, sorted by team, position code and number.
pub fn game_rosters(pbp: &WirePlayByPlay) -> Vec<GameRosterSpot> {
    let mut out: Vec<GameRosterSpot> = pbp
        .roster_spots
        .iter()
        .map(|r| {
            let is_home = r.team_id == pbp.home_team.id;
            let team_abbrev = if is_home {
                &pbp.home_team.abbrev
            } else {
                &pbp.away_team.abbrev
            };
            GameRosterSpot {
                game_id: pbp.id,
                season: pbp.season,
                game_type: pbp.game_type,
                game_date: pbp.game_date.clone(),
                team_id: r.team_id,
                team_abbrev: team_abbrev.clone(),
                is_home,
                player_id: r.player_id,
                first_name: r.first_name.default.clone(),
                last_name: r.last_name.default.clone(),
                full_name: full_name(&r.first_name.default, &r.last_name.default),
                sweater_number: r.sweater_number,
                position_code: r.position_code.clone(),
                position: position_group(&r.position_code).to_string(),
                headshot: r.headshot.clone(),
            }
        })
        .collect();
    out.sort_by(|a, b| {
        a.team_abbrev
            .cmp(&b.team_abbrev)
            .then_with(|| a.position_code.cmp(&b.position_code))
            .then_with(|| a.sweater_number.cmp(&b.sweater_number))
    });
    out
}

/// `"1451"` is away goalie, away skaters, home skaters, home goalie.
pub(crate) fn situation_counts(code: &str) -> Option<(u8, u8)> {
    let digits: Vec<u8> = code
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()?;
    match digits.as_slice() {
        [_, away, home, _] => Some((*home, *away)),
        _ => None,
    }
}

/// `5v4` style state from the acting team's side; home's side when unowned.
pub(crate) fn skater_state(home: u8, away: u8, team_type: Option<&str>) -> String {
    match team_type {
        Some("away") => format!("{away}v{home}"),
        _ => format!("{home}v{away}"),
    }
}

fn event_players(
    kind: &str,
    d: &WirePlayDetails,
) -> (Option<u64>, Option<u64>, Option<u64>) {
    match kind {
        "faceoff" => (d.winning_player_id, d.losing_player_id, None),
        "hit" => (d.hitting_player_id, d.hittee_player_id, None),
        "blocked-shot" => (d.shooting_player_id, d.blocking_player_id, None),
        "shot-on-goal" | "missed-shot" | "failed-shot-attempt" => {
            (d.shooting_player_id, None, None)
        }
        "goal" => (d.scoring_player_id, d.assist1_player_id, d.assist2_player_id),
        "giveaway" | "takeaway" => (d.player_id, None, None),
        "penalty" => (
            d.committed_by_player_id,
            d.drawn_by_player_id,
            d.served_by_player_id,
        ),
        _ => (None, None, None),
    }
}

/// API plays as events: players resolved through the game roster, team
/// attribution, fixed coordinates and skater state.
pub fn play_events(pbp: &WirePlayByPlay) -> Result<Vec<PlayEvent>, NhlError> {
    let names: HashMap<u64, String> = pbp
        .roster_spots
        .iter()
        .map(|r| {
            (
                r.player_id,
                full_name(&r.first_name.default, &r.last_name.default),
            )
        })
        .collect();
    let name_of = |id: Option<u64>| id.and_then(|id| names.get(&id).cloned());
    let empty = WirePlayDetails::default();

    let mut events = Vec::with_capacity(pbp.plays.len());
    for play in &pbp.plays {
        let d = play.details.as_ref().unwrap_or(&empty);
        let period = play.period_descriptor.number;
        let period_type = play.period_descriptor.period_type.clone();
        let period_seconds = clock_to_seconds(&play.time_in_period)?;
        let elapsed_seconds = if period_type.as_deref() == Some("SO") {
            SHOOTOUT_ELAPSED_SECONDS
        } else {
            game_seconds(period, period_seconds)
        };

        let (event_team, event_team_type) = match d.event_owner_team_id {
            Some(id) if id == pbp.home_team.id => (Some(pbp.home_team.abbrev.clone()), Some("home")),
            Some(id) if id == pbp.away_team.id => (Some(pbp.away_team.abbrev.clone()), Some("away")),
            _ => (None, None),
        };

        let counts = play.situation_code.as_deref().and_then(situation_counts);
        let flip = play.home_team_defending_side.as_deref() == Some("right");
        let fix = |c: Option<i32>| c.map(|v| if flip { -v } else { v });
        let (p1, p2, p3) = event_players(&play.type_desc_key, d);

        events.push(PlayEvent {
            game_id: pbp.id,
            event_id: Some(play.event_id),
            report_number: None,
            sort_order: play.sort_order,
            period,
            period_type,
            period_seconds,
            elapsed_seconds,
            time_in_period: play.time_in_period.clone(),
            time_remaining: play.time_remaining.clone(),
            event_type: play.type_desc_key.clone(),
            type_code: play.type_code,
            report_code: None,
            description: None,
            strength: None,
            event_team,
            event_team_type,
            player_id_1: p1,
            player_name_1: name_of(p1),
            player_id_2: p2,
            player_name_2: name_of(p2),
            player_id_3: p3,
            player_name_3: name_of(p3),
            goalie_in_net_id: d.goalie_in_net_id,
            x_coord: d.x_coord,
            y_coord: d.y_coord,
            x_fixed: fix(d.x_coord),
            y_fixed: fix(d.y_coord),
            zone_code: d.zone_code.clone(),
            shot_type: d.shot_type.clone(),
            reason: d.reason.clone(),
            situation_code: play.situation_code.clone(),
            skater_state: counts.map(|(h, a)| skater_state(h, a, event_team_type)),
            home_skaters: counts.map(|(h, _)| h),
            away_skaters: counts.map(|(_, a)| a),
            home_on_ice: Vec::new(),
            away_on_ice: Vec::new(),
            home_team: pbp.home_team.abbrev.clone(),
            away_team: pbp.away_team.abbrev.clone(),
            home_score: d.home_score,
            away_score: d.away_score,
            home_sog: d.home_sog,
            away_sog: d.away_sog,
            source: EventSource::Api,
        });
    }
    Ok(events)
}

/// Shift-chart rows (type 517) joined to the game roster and sorted by team,
/// period, start and player.
pub fn api_shifts(
    game: &GameInfo,
    rows: Vec<WireShift>,
    rosters: &[GameRosterSpot],
) -> Result<Vec<Shift>, NhlError> {
    let spots: HashMap<u64, &GameRosterSpot> = rosters.iter().map(|r| (r.player_id, r)).collect();
    let season = game.season.to_string();

    let mut out = Vec::new();
    for row in rows {
        if row.type_code.is_some_and(|c| c != 517) {
            continue;
        }
        let start = clock_to_seconds(row.start_time.as_deref().unwrap_or(""))?;
        let end = clock_to_seconds(row.end_time.as_deref().unwrap_or(""))?;
        let duration = match row.duration.as_deref() {
            Some(d) => clock_to_seconds(d)?,
            None => end.saturating_sub(start),
        };
        let spot = spots.get(&row.player_id);
        let first = row.first_name.unwrap_or_default();
        let last = row.last_name.unwrap_or_default();
        out.push(Shift {
            game_id: row.game_id,
            season: season.clone(),
            player_id: Some(row.player_id),
            full_name: full_name(&first, &last),
            first_name: first,
            last_name: last,
            sweater_number: spot.and_then(|s| s.sweater_number),
            position_code: spot.map(|s| s.position_code.clone()),
            position: spot.map(|s| s.position.clone()),
            team_id: Some(row.team_id),
            is_home: Some(row.team_id == game.home_team.id),
            team_abbrev: Some(row.team_abbrev),
            period: row.period,
            shift_number: row.shift_number,
            start_seconds: start,
            end_seconds: end,
            duration_seconds: duration,
            game_start_seconds: game_seconds(row.period, start),
            game_end_seconds: game_seconds(row.period, end),
            start_remaining_seconds: None,
            end_remaining_seconds: None,
            event: row.event_description,
            source: DataSource::NhlApi,
        });
    }
    if out.is_empty() {
        return Err(NhlError::NoData(format!("no shift data for game {}", game.game_id)));
    }
    out.sort_by(|a, b| {
        a.team_abbrev
            .cmp(&b.team_abbrev)
            .then_with(|| a.period.cmp(&b.period))
            .then_with(|| a.start_seconds.cmp(&b.start_seconds))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    Ok(out)
}

/// Context shared by every record built from one time-on-ice report.
pub struct ReportSide<'a> {
    pub game_id: u64,
    pub season: &'a str,
    pub is_home: bool,
    pub team_abbrev: Option<&'a str>,
}

pub fn report_shifts(side: &ReportSide<'_>, report: &ToiReport) -> Vec<Shift> {
    report
        .players
        .iter()
        .flat_map(|p| {
            p.shifts.iter().map(move |s| Shift {
                game_id: side.game_id,
                season: side.season.to_string(),
                player_id: None,
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                full_name: p.full_name(),
                sweater_number: p.sweater_number,
                position_code: None,
                position: None,
                team_id: None,
                team_abbrev: side.team_abbrev.map(str::to_string),
                is_home: Some(side.is_home),
                period: s.period,
                shift_number: s.shift_number,
                start_seconds: s.start_elapsed_secs,
                end_seconds: s.end_elapsed_secs,
                duration_seconds: s.duration_secs,
                game_start_seconds: game_seconds(s.period, s.start_elapsed_secs),
                game_end_seconds: game_seconds(s.period, s.end_elapsed_secs),
                start_remaining_seconds: Some(s.start_remaining_secs),
                end_remaining_seconds: Some(s.end_remaining_secs),
                event: s.event.clone(),
                source: DataSource::NhlHtmlReports,
            })
        })
        .collect()
}

/// Report shifts of both teams ordered by period, game start and sweater.
pub fn sort_report_shifts(shifts: &mut [Shift]) {
    shifts.sort_by(|a, b| {
        a.period
            .cmp(&b.period)
            .then_with(|| a.game_start_seconds.cmp(&b.game_start_seconds))
            .then_with(|| a.sweater_number.cmp(&b.sweater_number))
    });
}

pub fn toi_summaries(side: &ReportSide<'_>, report: &ToiReport) -> Vec<ToiSummary> {
    report
        .players
        .iter()
        .flat_map(|p| {
            p.summary.iter().map(move |l| ToiSummary {
                game_id: side.game_id,
                team_name: report.team_name.clone(),
                is_home: side.is_home,
                sweater_number: p.sweater_number,
                full_name: p.full_name(),
                period: l.period,
                shifts: l.shifts,
                average_seconds: l.average_secs,
                toi_seconds: l.toi_secs,
                even_strength_seconds: l.even_strength_secs,
                power_play_seconds: l.power_play_secs,
                short_handed_seconds: l.short_handed_secs,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn team_details_fold_franchise_spans() {
        let rows: Vec<WireRecordsFranchise> = serde_json::from_value(json!([
            { "id": 27, "teams": [
                { "id": 21, "active": true, "triCode": "COL", "fullName": "Colorado Avalanche",
                  "division": { "name": "Central" },
                  "franchiseTeam": [{ "firstSeason": { "id": 19951996 }, "lastSeason": null }] },
                { "id": 32, "active": false, "triCode": "QUE", "fullName": "Quebec Nordiques",
                  "franchiseTeam": [
                    { "firstSeason": { "id": 19791980 }, "lastSeason": { "id": 19941995 } }
                  ] }
            ] }
        ]))
        .unwrap();
        let teams = team_details(rows);
        assert_eq!(teams.len(), 2);
        assert!(teams.iter().all(|t| t.franchise_id == 27));
        assert_eq!(teams[0].division.as_deref(), Some("Central"));
        assert_eq!(teams[0].first_season_id, Some(19951996));
        assert_eq!(teams[0].last_season_id, None);
        assert_eq!(teams[1].last_season_id, Some(19941995));
        assert!(!teams[1].active);
    }

    #[test]
    fn roster_flag_accepts_letters_and_bools() {
        let rows: Vec<WireRecordsRosterPlayer> = serde_json::from_value(json!([
            { "id": 1, "firstName": "Guy", "lastName": "Lafleur", "onRoster": "N" },
            { "id": 2, "firstName": "Nick", "lastName": "Suzuki", "onRoster": true },
            { "id": 3, "firstName": "Cole", "lastName": "Caufield" }
        ]))
        .unwrap();
        let players = legacy_roster(8, rows);
        let flags: Vec<_> = players.iter().map(|p| p.on_roster).collect();
        assert_eq!(flags, vec![Some(false), Some(true), None]);
        assert_eq!(players[0].full_name, "Guy Lafleur");
        assert!(players.iter().all(|p| p.team_id == 8));
    }

    fn pbp() -> WirePlayByPlay {
        serde_json::from_value(json!({
            "id": 2023020204,
            "season": 20232024,
            "gameType": 2,
            "gameDate": "2023-11-11",
            "awayTeam": { "id": 10, "abbrev": "TOR" },
            "homeTeam": { "id": 8, "abbrev": "MTL", "commonName": { "default": "Canadiens" },
                          "placeName": { "default": "Montréal" } },
            "plays": [
                { "eventId": 201, "periodDescriptor": { "number": 2, "periodType": "REG" },
                  "timeInPeriod": "04:05", "situationCode": "1451",
                  "homeTeamDefendingSide": "right", "typeDescKey": "goal",
                  "details": { "eventOwnerTeamId": 8, "xCoord": -80, "yCoord": 10,
                               "scoringPlayerId": 8480018, "assist1PlayerId": 8481540,
                               "homeScore": 1, "awayScore": 0 } },
                { "eventId": 900, "periodDescriptor": { "number": 5, "periodType": "SO" },
                  "timeInPeriod": "00:00", "typeDescKey": "shot-on-goal",
                  "details": { "eventOwnerTeamId": 10, "shootingPlayerId": 8479318 } }
            ],
            "rosterSpots": [
                { "teamId": 8, "playerId": 8480018, "firstName": { "default": "Nick" },
                  "lastName": { "default": "Suzuki" }, "sweaterNumber": 14, "positionCode": "C" },
                { "teamId": 8, "playerId": 8481540, "firstName": { "default": "Cole" },
                  "lastName": { "default": "Caufield" }, "sweaterNumber": 22, "positionCode": "R" },
                { "teamId": 10, "playerId": 8479318, "firstName": { "default": "Auston" },
                  "lastName": { "default": "Matthews" }, "sweaterNumber": 34, "positionCode": "C" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn goal_players_coordinates_and_state() {
        let events = play_events(&pbp()).unwrap();
        let goal = &events[0];
        assert_eq!(goal.event_team.as_deref(), Some("MTL"));
        assert_eq!(goal.event_team_type, Some("home"));
        assert_eq!(goal.player_name_1.as_deref(), Some("Nick Suzuki"));
        assert_eq!(goal.player_name_2.as_deref(), Some("Cole Caufield"));
        assert_eq!(goal.player_id_3, None);
        assert_eq!((goal.x_fixed, goal.y_fixed), (Some(80), Some(-10)));
        assert_eq!(goal.skater_state.as_deref(), Some("5v4"));
        assert_eq!(goal.elapsed_seconds, 1200 + 245);
    }

    #[test]
    fn shootout_events_sit_at_fixed_elapsed() {
        let events = play_events(&pbp()).unwrap();
        assert_eq!(events[1].elapsed_seconds, SHOOTOUT_ELAPSED_SECONDS);
        assert_eq!(events[1].event_team_type, Some("away"));
        assert_eq!(events[1].skater_state, None);
    }

    #[test]
    fn situation_codes_read_from_owner_side() {
        assert_eq!(situation_counts("1451"), Some((5, 4)));
        assert_eq!(situation_counts("0651"), Some((5, 6)));
        assert_eq!(situation_counts("15x1"), None);
        assert_eq!(skater_state(5, 4, Some("away")), "4v5");
        assert_eq!(skater_state(5, 4, None), "5v4");
    }

    #[test]
    fn rosters_sort_and_flag_home() {
        let spots = game_rosters(&pbp());
        let order: Vec<(&str, Option<u32>)> = spots
            .iter()
            .map(|s| (s.team_abbrev.as_str(), s.sweater_number))
            .collect();
        assert_eq!(order, vec![("MTL", Some(14)), ("MTL", Some(22)), ("TOR", Some(34))]);
        assert!(spots[0].is_home);
        assert_eq!(spots[1].position, "F");
        assert_eq!(game_info(&pbp()).home_team.name.as_deref(), Some("Montréal Canadiens"));
    }

    #[test]
    fn standings_rename_and_sort() {
        let rows: Vec<WireStanding> = serde_json::from_value(json!([
            { "conferenceAbbrev": "E", "divisionAbbrev": "A", "points": 20, "regulationWins": 8,
              "teamAbbrev": { "default": "BOS" }, "teamName": { "default": "Boston Bruins" },
              "goalFor": 40, "goalAgainst": 30 },
            { "conferenceAbbrev": "E", "divisionAbbrev": "A", "points": 22, "regulationWins": 6,
              "teamAbbrev": { "default": "TOR" }, "teamName": { "default": "Toronto Maple Leafs" } },
            { "conferenceAbbrev": "E", "divisionAbbrev": "A", "points": 20, "regulationWins": 9,
              "teamAbbrev": { "default": "MTL" }, "teamName": { "default": "Montréal Canadiens" } },
            { "conferenceAbbrev": "W", "divisionAbbrev": "C", "points": 30,
              "teamAbbrev": { "default": "DAL" }, "teamName": { "default": "Dallas Stars" } }
        ]))
        .unwrap();
        let table = standings("2024-01-15", rows);
        let order: Vec<&str> = table.iter().map(|s| s.team_abbrev.as_str()).collect();
        assert_eq!(order, vec!["TOR", "MTL", "BOS", "DAL"]);
        assert_eq!(table[2].goals_for, 40);
        assert_eq!(table[2].goals_against, 30);
        assert_eq!(table[0].standings_date, "2024-01-15");
    }

    #[test]
    fn api_shifts_keep_shift_rows_only() {
        let game = game_info(&pbp());
        let rosters = game_rosters(&pbp());
        let rows: Vec<WireShift> = serde_json::from_value(json!([
            { "id": 2, "gameId": 2023020204, "playerId": 8480018, "firstName": "Nick",
              "lastName": "Suzuki", "teamId": 8, "teamAbbrev": "MTL", "period": 1,
              "shiftNumber": 2, "startTime": "02:10", "endTime": "02:55", "duration": "00:45",
              "typeCode": 517 },
            { "id": 3, "gameId": 2023020204, "playerId": 8480018, "teamId": 8,
              "teamAbbrev": "MTL", "period": 2, "shiftNumber": 0, "startTime": "04:05",
              "endTime": "04:05", "typeCode": 505, "eventDescription": "EVG" },
            { "id": 1, "gameId": 2023020204, "playerId": 8480018, "firstName": "Nick",
              "lastName": "Suzuki", "teamId": 8, "teamAbbrev": "MTL", "period": 1,
              "shiftNumber": 1, "startTime": "00:00", "endTime": "00:46", "duration": "00:46",
              "typeCode": 517 }
        ]))
        .unwrap();
        let shifts = api_shifts(&game, rows, &rosters).unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].shift_number, 1);
        assert_eq!(shifts[1].game_end_seconds, 175);
        assert_eq!(shifts[0].sweater_number, Some(14));
        assert_eq!(shifts[0].is_home, Some(true));

        assert!(matches!(
            api_shifts(&game, Vec::new(), &rosters),
            Err(NhlError::NoData(_))
        ));
    }
}
