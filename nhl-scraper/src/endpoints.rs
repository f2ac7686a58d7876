//! Catalogue of the upstream resources, relative to each family's base URL.

use std::borrow::Cow;

use nhl_common::{
    DataSource, DraftRound, DraftYear, GameId, PlayerId, RankingCategory, Season, SessionType,
    StandingsDate, TeamAbbrev,
};
use nhl_http::RequestOpts;

/// Upstream host family; each has its own base URL and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    ApiWeb,
    Stats,
    Records,
    Reports,
}

impl Family {
    pub fn source(self) -> DataSource {
        match self {
            Self::ApiWeb => DataSource::NhlApi,
            Self::Stats => DataSource::NhlStatsApi,
            Self::Records => DataSource::NhlRecordsApi,
            Self::Reports => DataSource::NhlHtmlReports,
        }
    }
}

/// Legacy per-game HTML report, named `<prefix><short id>.HTM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    PlayByPlay,
    HomeTimeOnIce,
    AwayTimeOnIce,
}

impl ReportKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::PlayByPlay => "PL",
            Self::HomeTimeOnIce => "TH",
            Self::AwayTimeOnIce => "TV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub family: Family,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    fn new(family: Family, path: impl Into<String>) -> Self {
        Self {
            family,
            path: path.into(),
            query: Vec::new(),
        }
    }

    fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn includes(self, fields: &[&str]) -> Self {
        fields
            .iter()
            .fold(self, |ep, field| ep.param("include", *field))
    }

    pub fn opts(&self) -> RequestOpts<'_> {
        if self.query.is_empty() {
            return RequestOpts::default();
        }
        RequestOpts::with_query(
            self.query
                .iter()
                .map(|(k, v)| (*k, Cow::Borrowed(v.as_str())))
                .collect(),
        )
    }
}

const RECORDS_DRAFT_INCLUDES: &[&str] = &[
    "draftProspect.id",
    "player.birthStateProvince",
    "player.birthCountry",
    "player.position",
    "player.onRoster",
    "player.yearsPro",
    "player.firstName",
    "player.lastName",
    "player.id",
    "team.id",
    "team.placeName",
    "team.commonName",
    "team.fullName",
    "team.triCode",
    "team.logos",
];

pub fn franchises() -> Endpoint {
    Endpoint::new(Family::Stats, "franchise")
        .param("sort", "fullName")
        .includes(&["lastSeason.id", "firstSeason.id"])
}

pub fn schedule_calendar() -> Endpoint {
    Endpoint::new(Family::ApiWeb, "schedule-calendar/now")
}

pub fn club_schedule(team: &TeamAbbrev, season: Season) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("club-schedule-season/{team}/{season}"))
}

pub fn roster(team: &TeamAbbrev, season: Season) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("roster/{team}/{season}"))
}

pub fn club_stats(team: &TeamAbbrev, season: Season, session: SessionType) -> Endpoint {
    Endpoint::new(
        Family::ApiWeb,
        format!("club-stats/{team}/{season}/{}", session.code()),
    )
}

pub fn prospects(team: &TeamAbbrev) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("prospects/{team}"))
}

pub fn franchise_draft_history(franchise_id: u32) -> Endpoint {
    Endpoint::new(Family::Records, "draft")
        .includes(RECORDS_DRAFT_INCLUDES)
        .includes(&["franchiseTeam"])
        .param(
            "cayenneExp",
            format!("franchiseTeam.franchiseId=\"{franchise_id}\""),
        )
}

/// Every franchise with the teams it has fielded.
pub fn franchise_teams() -> Endpoint {
    Endpoint::new(Family::Records, "franchise").includes(&[
        "teams.id",
        "teams.active",
        "teams.triCode",
        "teams.placeName",
        "teams.commonName",
        "teams.fullName",
        "teams.conference.name",
        "teams.division.name",
        "teams.franchiseTeam.firstSeason.id",
        "teams.franchiseTeam.lastSeason.id",
    ])
}

pub fn team_affiliates() -> Endpoint {
    Endpoint::new(Family::Records, "team-affiliate")
        .param("cayenneExp", "active=true")
        .includes(&[
            "franchiseId",
            "teamId",
            "teamAffiliateId",
            "teamAffiliate.fullName",
            "teamAffiliate.officialSiteUrl",
            "teamAffiliate.league.abbreviation",
        ])
}

pub fn records_roster(team_id: u32) -> Endpoint {
    Endpoint::new(Family::Records, format!("roster/byTeam/{team_id}")).includes(&[
        "id",
        "firstName",
        "lastName",
        "sweaterNumber",
        "position",
        "height",
        "weight",
        "birthDate",
        "birthCountry",
        "birthCity",
        "birthStateProvince",
        "onRoster",
    ])
}

pub fn draft_picks(year: DraftYear, round: DraftRound) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("draft/picks/{year}/{round}"))
}

pub fn records_draft(year: DraftYear) -> Endpoint {
    Endpoint::new(Family::Records, "draft")
        .includes(RECORDS_DRAFT_INCLUDES)
        .includes(&[
            "franchiseTeam.franchise.mostRecentTeamId",
            "franchiseTeam.franchise.teamCommonName",
            "franchiseTeam.franchise.teamPlaceName",
        ])
        .param("cayenneExp", format!("draftYear={year}"))
        .param("start", "0")
        .param("limit", "500")
}

pub fn draft_rankings(year: DraftYear, category: RankingCategory) -> Endpoint {
    Endpoint::new(
        Family::ApiWeb,
        format!("draft/rankings/{year}/{}", category.code()),
    )
}

pub fn player_landing(player: PlayerId) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("player/{player}/landing"))
}

pub fn player_game_log(player: PlayerId, season: Season, session: SessionType) -> Endpoint {
    Endpoint::new(
        Family::ApiWeb,
        format!("player/{player}/game-log/{season}/{}", session.code()),
    )
}

pub fn standings(date: StandingsDate) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("standings/{date}"))
}

pub fn play_by_play(game: GameId) -> Endpoint {
    Endpoint::new(Family::ApiWeb, format!("gamecenter/{game}/play-by-play"))
}

pub fn shift_charts(game: GameId) -> Endpoint {
    Endpoint::new(Family::Stats, "shiftcharts").param("cayenneExp", format!("gameId={game}"))
}

/// `<season>/<prefix><short id>.HTM`, e.g. `20232024/PL020204.HTM`.
pub fn report(game: GameId, kind: ReportKind) -> Endpoint {
    Endpoint::new(
        Family::Reports,
        format!(
            "{}/{}{}.HTM",
            game.report_season(),
            kind.prefix(),
            game.short_id()
        ),
    )
}
