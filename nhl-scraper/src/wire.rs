//! Response shapes of the upstream JSON endpoints.
//!
//! Only the fields the records need are modelled; everything else is ignored.
//! Optional upstream fields are `Option` or `#[serde(default)]` so a sparse
//! payload still decodes.

use serde::Deserialize;
use serde_json::Value;

/// `{"default": "Montréal", "fr": "..."}`; only the default is kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub default: String,
}

pub(crate) fn localized(name: &Option<LocalizedName>) -> Option<String> {
    name.as_ref()
        .map(|n| n.default.clone())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdRef<T> {
    pub id: T,
}

// ---------- teams ----------

#[derive(Debug, Clone, Deserialize)]
pub struct FranchiseResponse {
    #[serde(default)]
    pub data: Vec<WireFranchise>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFranchise {
    pub id: u32,
    #[serde(default)]
    pub full_name: String,
    pub team_common_name: Option<String>,
    pub team_place_name: Option<String>,
    pub first_season: Option<IdRef<u32>>,
    pub last_season: Option<IdRef<u32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCalendar {
    pub teams: Option<Vec<WireActiveTeam>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActiveTeam {
    pub id: u32,
    pub abbrev: String,
    #[serde(default)]
    pub name: LocalizedName,
    pub common_name: Option<LocalizedName>,
    pub place_name_with_preposition: Option<LocalizedName>,
    pub logo: Option<String>,
    pub dark_logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubSchedule {
    pub games: Option<Vec<WireScheduleGame>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScheduleGame {
    pub id: u64,
    pub season: u32,
    pub game_type: u8,
    pub game_date: String,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: Option<String>,
    pub venue: Option<LocalizedName>,
    pub game_state: Option<String>,
    pub away_team: WireGameTeam,
    pub home_team: WireGameTeam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGameTeam {
    pub id: u32,
    pub abbrev: String,
    pub common_name: Option<LocalizedName>,
    pub place_name: Option<LocalizedName>,
    pub score: Option<u32>,
    pub sog: Option<u32>,
}

/// Used by both `roster/{team}/{season}` and `prospects/{team}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterGroups {
    #[serde(default)]
    pub forwards: Vec<WireRosterPlayer>,
    #[serde(default)]
    pub defensemen: Vec<WireRosterPlayer>,
    #[serde(default)]
    pub goalies: Vec<WireRosterPlayer>,
}

impl RosterGroups {
    pub fn into_players(self) -> impl Iterator<Item = WireRosterPlayer> {
        self.forwards
            .into_iter()
            .chain(self.defensemen)
            .chain(self.goalies)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRosterPlayer {
    pub id: u64,
    pub headshot: Option<String>,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    pub sweater_number: Option<u32>,
    #[serde(default)]
    pub position_code: String,
    pub shoots_catches: Option<String>,
    pub height_in_inches: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub height_in_centimeters: Option<u32>,
    pub weight_in_kilograms: Option<u32>,
    pub birth_date: Option<String>,
    pub birth_city: Option<LocalizedName>,
    pub birth_state_province: Option<LocalizedName>,
    pub birth_country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubStats {
    #[serde(default)]
    pub skaters: Vec<WireSkaterStats>,
    #[serde(default)]
    pub goalies: Vec<WireGoalieStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSkaterStats {
    pub player_id: u64,
    pub headshot: Option<String>,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    #[serde(default)]
    pub position_code: String,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub plus_minus: i32,
    #[serde(default)]
    pub penalty_minutes: u32,
    #[serde(default)]
    pub power_play_goals: u32,
    #[serde(default)]
    pub shorthanded_goals: u32,
    #[serde(default)]
    pub game_winning_goals: u32,
    #[serde(default)]
    pub overtime_goals: u32,
    #[serde(default)]
    pub shots: u32,
    pub shooting_pctg: Option<f64>,
    pub avg_time_on_ice_per_game: Option<f64>,
    pub avg_shifts_per_game: Option<f64>,
    pub faceoff_win_pctg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGoalieStats {
    pub player_id: u64,
    pub headshot: Option<String>,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub games_started: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub overtime_losses: u32,
    pub goals_against_average: Option<f64>,
    pub save_percentage: Option<f64>,
    #[serde(default)]
    pub shots_against: u32,
    #[serde(default)]
    pub saves: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub shutouts: u32,
    #[serde(default)]
    pub time_on_ice: u32,
}

// ---------- draft ----------

#[derive(Debug, Clone, Deserialize)]
pub struct DraftPicks {
    pub picks: Option<Vec<WireDraftPick>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDraftPick {
    pub round: u8,
    pub pick_in_round: u32,
    pub overall_pick: u32,
    pub team_id: Option<u32>,
    pub team_abbrev: Option<String>,
    pub team_name: Option<LocalizedName>,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    pub position_code: Option<String>,
    pub country_code: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub amateur_league: Option<String>,
    pub amateur_club_name: Option<String>,
}

/// Records API envelope; `data` is absent on malformed queries.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsPage<T> {
    pub data: Option<Vec<T>>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecordsDraftPick {
    pub draft_year: u16,
    pub round_number: u8,
    pub pick_in_round: u32,
    pub overall_pick_number: u32,
    pub player_id: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub player_name: Option<String>,
    pub position: Option<String>,
    pub amateur_club_name: Option<String>,
    pub amateur_league: Option<String>,
    pub country_code: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub tri_code: Option<String>,
    pub draft_prospect: Option<IdRef<u64>>,
    pub team: Option<WireRecordsTeam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecordsTeam {
    pub id: u32,
    pub full_name: Option<String>,
    pub tri_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRecordsFranchise {
    pub id: u32,
    #[serde(default)]
    pub teams: Vec<WireFranchiseTeam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFranchiseTeam {
    pub id: u32,
    #[serde(default)]
    pub active: bool,
    pub tri_code: Option<String>,
    pub place_name: Option<String>,
    pub common_name: Option<String>,
    pub full_name: Option<String>,
    pub conference: Option<WireNamed>,
    pub division: Option<WireNamed>,
    /// One span per stint; relocated or revived teams have several.
    #[serde(default)]
    pub franchise_team: Vec<WireFranchiseSpan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFranchiseSpan {
    pub first_season: Option<IdRef<u32>>,
    pub last_season: Option<IdRef<u32>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTeamAffiliate {
    pub franchise_id: Option<u32>,
    pub team_id: u32,
    pub team_affiliate_id: u32,
    pub team_affiliate: WireAffiliateTeam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAffiliateTeam {
    pub full_name: String,
    pub official_site_url: Option<String>,
    pub league: Option<WireLeague>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLeague {
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecordsRosterPlayer {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub sweater_number: Option<u32>,
    pub position: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub birth_date: Option<String>,
    pub birth_country: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    /// `"Y"`/`"N"` on most rows, occasionally a bool.
    pub on_roster: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftRankings {
    pub rankings: Option<Vec<WireRanking>>,
}

/// Rankings carry plain string names, unlike the rest of `api-web`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRanking {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub position_code: Option<String>,
    pub shoots_catches: Option<String>,
    pub height_in_inches: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub last_amateur_club: Option<String>,
    pub last_amateur_league: Option<String>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state_province: Option<String>,
    pub birth_country: Option<String>,
    pub midterm_rank: Option<u32>,
    pub final_rank: Option<u32>,
}

// ---------- players ----------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLanding {
    pub player_id: Option<u64>,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    pub sweater_number: Option<u32>,
    pub position: Option<String>,
    pub shoots_catches: Option<String>,
    pub birth_date: Option<String>,
    pub birth_city: Option<LocalizedName>,
    pub birth_state_province: Option<LocalizedName>,
    pub birth_country: Option<String>,
    pub height_in_inches: Option<u32>,
    pub height_in_centimeters: Option<u32>,
    pub weight_in_pounds: Option<u32>,
    pub weight_in_kilograms: Option<u32>,
    pub current_team_id: Option<u32>,
    pub current_team_abbrev: Option<String>,
    pub headshot: Option<String>,
    pub draft_details: Option<WireDraftDetails>,
    pub featured_stats: Option<Value>,
    pub career_totals: Option<Value>,
    #[serde(rename = "last5Games")]
    pub last_5_games: Option<Value>,
    pub season_totals: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDraftDetails {
    pub year: Option<u16>,
    pub team_abbrev: Option<String>,
    pub round: Option<u8>,
    pub pick_in_round: Option<u32>,
    pub overall_pick: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLog {
    pub game_log: Option<Vec<WireGameLogEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGameLogEntry {
    pub game_id: u64,
    pub game_date: Option<String>,
    pub team_abbrev: Option<String>,
    pub opponent_abbrev: Option<String>,
    pub home_road_flag: Option<String>,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub plus_minus: i32,
    #[serde(default)]
    pub power_play_goals: u32,
    #[serde(default)]
    pub power_play_points: u32,
    #[serde(default)]
    pub game_winning_goals: u32,
    #[serde(default)]
    pub ot_goals: u32,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub shifts: u32,
    #[serde(default)]
    pub shorthanded_goals: u32,
    #[serde(default)]
    pub shorthanded_points: u32,
    #[serde(default)]
    pub pim: u32,
    pub toi: Option<String>,
    pub games_started: Option<u32>,
    pub decision: Option<String>,
    pub shots_against: Option<u32>,
    pub goals_against: Option<u32>,
    pub save_pctg: Option<f64>,
    pub shutouts: Option<u32>,
}

// ---------- league ----------

#[derive(Debug, Clone, Deserialize)]
pub struct Standings {
    pub standings: Option<Vec<WireStanding>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStanding {
    #[serde(default)]
    pub conference_abbrev: String,
    pub conference_name: Option<String>,
    #[serde(default)]
    pub division_abbrev: String,
    pub division_name: Option<String>,
    #[serde(default)]
    pub team_name: LocalizedName,
    #[serde(default)]
    pub team_abbrev: LocalizedName,
    pub place_name: Option<LocalizedName>,
    pub team_common_name: Option<LocalizedName>,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ot_losses: u32,
    #[serde(default)]
    pub goal_for: u32,
    #[serde(default)]
    pub goal_against: u32,
    #[serde(default)]
    pub goal_differential: i32,
    pub point_pctg: Option<f64>,
    #[serde(default)]
    pub regulation_wins: u32,
    #[serde(default)]
    pub regulation_plus_ot_wins: u32,
    pub streak_code: Option<String>,
    pub streak_count: Option<u32>,
}

// ---------- games ----------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlayByPlay {
    pub id: u64,
    pub season: u32,
    pub game_type: u8,
    #[serde(default)]
    pub game_date: String,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: Option<String>,
    pub venue: Option<LocalizedName>,
    pub game_state: Option<String>,
    pub away_team: WireGameTeam,
    pub home_team: WireGameTeam,
    #[serde(default)]
    pub plays: Vec<WirePlay>,
    #[serde(default)]
    pub roster_spots: Vec<WireRosterSpot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlay {
    pub event_id: u64,
    pub period_descriptor: PeriodDescriptor,
    #[serde(default)]
    pub time_in_period: String,
    pub time_remaining: Option<String>,
    pub situation_code: Option<String>,
    pub home_team_defending_side: Option<String>,
    pub type_code: Option<u32>,
    #[serde(default)]
    pub type_desc_key: String,
    pub sort_order: Option<u32>,
    pub details: Option<WirePlayDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDescriptor {
    pub number: u8,
    pub period_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePlayDetails {
    pub event_owner_team_id: Option<u32>,
    pub x_coord: Option<i32>,
    pub y_coord: Option<i32>,
    pub zone_code: Option<String>,
    pub shot_type: Option<String>,
    pub reason: Option<String>,
    pub desc_key: Option<String>,
    pub duration: Option<u32>,
    pub winning_player_id: Option<u64>,
    pub losing_player_id: Option<u64>,
    pub hitting_player_id: Option<u64>,
    pub hittee_player_id: Option<u64>,
    pub shooting_player_id: Option<u64>,
    pub blocking_player_id: Option<u64>,
    pub scoring_player_id: Option<u64>,
    pub assist1_player_id: Option<u64>,
    pub assist2_player_id: Option<u64>,
    pub goalie_in_net_id: Option<u64>,
    pub player_id: Option<u64>,
    pub committed_by_player_id: Option<u64>,
    pub drawn_by_player_id: Option<u64>,
    pub served_by_player_id: Option<u64>,
    #[serde(rename = "awaySOG")]
    pub away_sog: Option<u32>,
    #[serde(rename = "homeSOG")]
    pub home_sog: Option<u32>,
    pub away_score: Option<u32>,
    pub home_score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRosterSpot {
    pub team_id: u32,
    pub player_id: u64,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    pub sweater_number: Option<u32>,
    #[serde(default)]
    pub position_code: String,
    pub headshot: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftCharts {
    #[serde(default)]
    pub data: Vec<WireShift>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShift {
    pub id: u64,
    pub game_id: u64,
    pub player_id: u64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub team_id: u32,
    #[serde(default)]
    pub team_abbrev: String,
    pub period: u8,
    #[serde(default)]
    pub shift_number: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub type_code: Option<u32>,
    pub event_description: Option<String>,
    pub detail_code: Option<u32>,
}
