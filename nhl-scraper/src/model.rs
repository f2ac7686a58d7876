//! Flat output records, one struct per entity the scraper emits.
//!
//! Field names are the column names produced by [`crate::table::Table`].

use nhl_common::DataSource;
use nhl_reports::OnIcePlayer;
use serde::Serialize;

use crate::table::Dataset;

pub fn full_name(first: &str, last: &str) -> String {
    match (first.trim(), last.trim()) {
        ("", last) => last.to_string(),
        (first, "") => first.to_string(),
        (first, last) => format!("{first} {last}"),
    }
}

/// Collapse a position code to `G`, `D` or `F`.
pub fn position_group(code: &str) -> &'static str {
    match code {
        "G" => "G",
        "D" => "D",
        _ => "F",
    }
}

/// `LD`/`RD` for defensemen, the position group otherwise.
pub fn position_d(code: &str, shoots_catches: Option<&str>) -> String {
    let group = position_group(code);
    match (group, shoots_catches) {
        ("D", Some(hand)) if !hand.is_empty() => format!("{hand}D"),
        _ => group.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Franchise {
    pub franchise_id: u32,
    pub full_name: String,
    pub common_name: Option<String>,
    pub place_name: Option<String>,
    pub first_season_id: Option<u32>,
    pub last_season_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveTeam {
    pub team_id: u32,
    pub abbrev: String,
    pub name: String,
    pub common_name: Option<String>,
    pub place_name_with_preposition: Option<String>,
    pub logo: Option<String>,
    pub dark_logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSide {
    pub id: u32,
    pub abbrev: String,
    pub name: Option<String>,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleGame {
    pub game_id: u64,
    pub season: u32,
    pub game_type: u8,
    pub game_date: String,
    pub start_time_utc: Option<String>,
    pub venue: Option<String>,
    pub game_state: Option<String>,
    pub home_team: TeamSide,
    pub away_team: TeamSide,
    /// Team whose schedule was requested.
    pub team_abbrev: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameInfo {
    pub game_id: u64,
    pub season: u32,
    pub game_type: u8,
    pub game_date: String,
    pub start_time_utc: Option<String>,
    pub venue: Option<String>,
    pub game_state: Option<String>,
    pub home_team: TeamSide,
    pub away_team: TeamSide,
}

impl GameInfo {
    /// `home` or `away` for one of the two abbreviations.
    pub fn side_of(&self, abbrev: &str) -> Option<&'static str> {
        if abbrev == self.home_team.abbrev {
            Some("home")
        } else if abbrev == self.away_team.abbrev {
            Some("away")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterPlayer {
    pub player_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position_code: String,
    pub position: String,
    pub position_d: String,
    pub shoots_catches: Option<String>,
    pub height_in_inches: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub height_in_centimeters: Option<u32>,
    pub weight_in_kilograms: Option<u32>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    pub birth_country: Option<String>,
    pub headshot: Option<String>,
    pub team: String,
    /// `None` for prospects, which are not season scoped.
    pub season: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkaterStatLine {
    pub player_id: u64,
    pub full_name: String,
    pub position_code: String,
    pub position: String,
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub plus_minus: i32,
    pub penalty_minutes: u32,
    pub power_play_goals: u32,
    pub shorthanded_goals: u32,
    pub game_winning_goals: u32,
    pub overtime_goals: u32,
    pub shots: u32,
    pub shooting_pctg: Option<f64>,
    pub avg_time_on_ice_per_game: Option<f64>,
    pub avg_shifts_per_game: Option<f64>,
    pub faceoff_win_pctg: Option<f64>,
    pub team: String,
    pub season: String,
    pub session: &'static str,
    pub session_code: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalieStatLine {
    pub player_id: u64,
    pub full_name: String,
    pub games_played: u32,
    pub games_started: u32,
    pub wins: u32,
    pub losses: u32,
    pub overtime_losses: u32,
    pub goals_against_average: Option<f64>,
    pub save_percentage: Option<f64>,
    pub shots_against: u32,
    pub saves: u32,
    pub goals_against: u32,
    pub shutouts: u32,
    pub time_on_ice: u32,
    pub team: String,
    pub season: String,
    pub session: &'static str,
    pub session_code: u8,
}

/// Skater and goalie lines of one `club-stats` response.
#[derive(Debug, Clone, Serialize)]
pub struct TeamStats {
    pub skaters: Dataset<SkaterStatLine>,
    pub goalies: Dataset<GoalieStatLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftPick {
    pub year: u16,
    pub round: u8,
    pub pick_in_round: u32,
    pub overall_pick: u32,
    pub team_id: Option<u32>,
    pub team_abbrev: Option<String>,
    pub team_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position_code: Option<String>,
    pub amateur_club_name: Option<String>,
    pub amateur_league: Option<String>,
    pub country_code: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyDraftPick {
    pub year: u16,
    pub round: u8,
    pub pick_in_round: u32,
    pub overall_pick: u32,
    pub player_id: Option<u64>,
    pub prospect_id: Option<u64>,
    pub full_name: String,
    pub position: Option<String>,
    pub team_id: Option<u32>,
    pub team_tri_code: Option<String>,
    pub team_full_name: Option<String>,
    pub amateur_club_name: Option<String>,
    pub amateur_league: Option<String>,
    pub country_code: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
}

/// One team a franchise has fielded, from the Records API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDetail {
    pub franchise_id: u32,
    pub team_id: u32,
    pub active: bool,
    pub tri_code: Option<String>,
    pub place_name: Option<String>,
    pub common_name: Option<String>,
    pub full_name: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub first_season_id: Option<u32>,
    /// `None` while the team is still playing.
    pub last_season_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAffiliate {
    pub franchise_id: Option<u32>,
    pub team_id: u32,
    pub affiliate_id: u32,
    pub affiliate_name: String,
    pub affiliate_site_url: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRosterPlayer {
    pub team_id: u32,
    pub player_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    pub birth_country: Option<String>,
    pub on_roster: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftRanking {
    pub year: u16,
    pub category: u8,
    pub category_name: &'static str,
    pub midterm_rank: Option<u32>,
    pub final_rank: Option<u32>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position_code: Option<String>,
    pub shoots_catches: Option<String>,
    pub height_in_inches: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    pub birth_country: Option<String>,
    pub last_amateur_club: Option<String>,
    pub last_amateur_league: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftDetails {
    pub year: Option<u16>,
    pub team_abbrev: Option<String>,
    pub round: Option<u8>,
    pub pick_in_round: Option<u32>,
    pub overall_pick: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub player_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position_code: Option<String>,
    pub position: Option<String>,
    pub shoots_catches: Option<String>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    pub birth_country: Option<String>,
    pub height_in_inches: Option<u32>,
    pub height_in_centimeters: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub weight_in_kilograms: Option<u32>,
    pub current_team_id: Option<u32>,
    pub current_team_abbrev: Option<String>,
    pub headshot: Option<String>,
    pub draft_details: Option<DraftDetails>,
}

/// Stat blocks of the player landing page accepted by `scrape_player_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatKind {
    #[default]
    FeaturedStats,
    CareerTotals,
    Last5Games,
    SeasonTotals,
}

impl PlayerStatKind {
    pub fn key(self) -> &'static str {
        match self {
            Self::FeaturedStats => "featuredStats",
            Self::CareerTotals => "careerTotals",
            Self::Last5Games => "last5Games",
            Self::SeasonTotals => "seasonTotals",
        }
    }
}

impl std::str::FromStr for PlayerStatKind {
    type Err = nhl_common::NhlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::FeaturedStats,
            Self::CareerTotals,
            Self::Last5Games,
            Self::SeasonTotals,
        ]
        .into_iter()
        .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| {
            nhl_common::NhlError::invalid(
                "stats type",
                s,
                "expected featuredStats, careerTotals, last5Games or seasonTotals",
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameLogEntry {
    pub player_id: u64,
    pub player_name: String,
    pub position: Option<String>,
    pub game_id: u64,
    pub game_date: Option<String>,
    pub team_abbrev: Option<String>,
    pub opponent_abbrev: Option<String>,
    pub home_road_flag: Option<String>,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub plus_minus: i32,
    pub power_play_goals: u32,
    pub power_play_points: u32,
    pub shorthanded_goals: u32,
    pub shorthanded_points: u32,
    pub game_winning_goals: u32,
    pub ot_goals: u32,
    pub shots: u32,
    pub shifts: u32,
    pub pim: u32,
    pub toi: Option<String>,
    pub games_started: Option<u32>,
    pub decision: Option<String>,
    pub shots_against: Option<u32>,
    pub goals_against: Option<u32>,
    pub save_pctg: Option<f64>,
    pub shutouts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsEntry {
    pub standings_date: String,
    pub conference_abbrev: String,
    pub conference_name: Option<String>,
    pub division_abbrev: String,
    pub division_name: Option<String>,
    pub team_abbrev: String,
    pub team_name: String,
    pub place_name: Option<String>,
    pub team_common_name: Option<String>,
    pub games_played: u32,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub ot_losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_differential: i32,
    pub point_pctg: Option<f64>,
    pub regulation_wins: u32,
    pub regulation_plus_ot_wins: u32,
    pub streak_code: Option<String>,
    pub streak_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRosterSpot {
    pub game_id: u64,
    pub season: u32,
    pub game_type: u8,
    pub game_date: String,
    pub team_id: u32,
    pub team_abbrev: String,
    pub is_home: bool,
    pub player_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position_code: String,
    pub position: String,
    pub headshot: Option<String>,
}

/// Which feed(s) an event was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Api,
    Report,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayEvent {
    pub game_id: u64,
    pub event_id: Option<u64>,
    pub report_number: Option<u32>,
    pub sort_order: Option<u32>,
    pub period: u8,
    pub period_type: Option<String>,
    /// Seconds elapsed in the period.
    pub period_seconds: u32,
    /// Seconds elapsed in the game; shootout events sit at 3900.
    pub elapsed_seconds: u32,
    pub time_in_period: String,
    pub time_remaining: Option<String>,
    /// API type key, e.g. `shot-on-goal`; report codes are mapped onto it.
    pub event_type: String,
    pub type_code: Option<u32>,
    pub report_code: Option<String>,
    pub description: Option<String>,
    pub strength: Option<String>,
    pub event_team: Option<String>,
    pub event_team_type: Option<&'static str>,
    pub player_id_1: Option<u64>,
    pub player_name_1: Option<String>,
    pub player_id_2: Option<u64>,
    pub player_name_2: Option<String>,
    pub player_id_3: Option<u64>,
    pub player_name_3: Option<String>,
    pub goalie_in_net_id: Option<u64>,
    pub x_coord: Option<i32>,
    pub y_coord: Option<i32>,
    pub x_fixed: Option<i32>,
    pub y_fixed: Option<i32>,
    pub zone_code: Option<String>,
    pub shot_type: Option<String>,
    pub reason: Option<String>,
    pub situation_code: Option<String>,
    pub skater_state: Option<String>,
    pub home_skaters: Option<u8>,
    pub away_skaters: Option<u8>,
    pub home_on_ice: Vec<OnIcePlayer>,
    pub away_on_ice: Vec<OnIcePlayer>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_sog: Option<u32>,
    pub away_sog: Option<u32>,
    pub source: EventSource,
}

/// Game header plus its processed events.
#[derive(Debug, Clone, Serialize)]
pub struct PlayByPlay {
    pub game: GameInfo,
    pub events: Dataset<PlayEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shift {
    pub game_id: u64,
    pub season: String,
    pub player_id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position_code: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<u32>,
    pub team_abbrev: Option<String>,
    pub is_home: Option<bool>,
    pub period: u8,
    pub shift_number: u32,
    pub start_seconds: u32,
    pub end_seconds: u32,
    pub duration_seconds: u32,
    pub game_start_seconds: u32,
    pub game_end_seconds: u32,
    pub start_remaining_seconds: Option<u32>,
    pub end_remaining_seconds: Option<u32>,
    /// `G`/`P` flag from the report, or the API's event description.
    pub event: Option<String>,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToiSummary {
    pub game_id: u64,
    pub team_name: Option<String>,
    pub is_home: bool,
    pub sweater_number: Option<u32>,
    pub full_name: String,
    /// `None` on the `TOT` line.
    pub period: Option<u8>,
    pub shifts: u32,
    pub average_seconds: u32,
    pub toi_seconds: u32,
    pub even_strength_seconds: u32,
    pub power_play_seconds: u32,
    pub short_handed_seconds: u32,
}

/// Shifts and period summaries of both time-on-ice reports.
#[derive(Debug, Clone, Serialize)]
pub struct TimeOnIce {
    pub shifts: Dataset<Shift>,
    pub summaries: Dataset<ToiSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameComplete {
    pub play_by_play: PlayByPlay,
    pub rosters: Dataset<GameRosterSpot>,
    pub shifts: Dataset<Shift>,
}
