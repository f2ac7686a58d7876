//! The [`NhlScraper`] façade: one method per dataset.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use nhl_common::{
    DataSource, DraftRound, DraftYear, GameId, PlayerId, RankingCategory, Season,
    SessionType, StandingsDate, TeamAbbrev,
};
use nhl_config::{NhlConfig, NhlConfigLoader};
use nhl_http::{ClientOptions, HttpClient, RateLimiter};
use nhl_reports::{ToiReport, parse_play_by_play, parse_time_on_ice};
use serde::de::DeserializeOwned;

use crate::batch::{BatchOutcome, run_batch};
use crate::endpoints::{self, Endpoint, Family, ReportKind};
use crate::error::{Result, ScrapeError};
use crate::extract::{self, ReportSide};
use crate::merge::{fill_running_totals, merge_events, sort_events};
use crate::model::*;
use crate::table::{Dataset, Row};
use crate::wire::*;

/// Entry point for every scrape. Cheap to share by reference across tasks.
///
/// ```no_run
/// use nhl_common::{Season, TeamAbbrev};
/// use nhl_scraper::NhlScraper;
///
/// # async fn demo() -> nhl_scraper::Result<()> {
/// let scraper = NhlScraper::with_defaults()?;
/// let roster = scraper
///     .scrape_team_roster(&TeamAbbrev::parse("MTL")?, Season::parse("20232024")?)
///     .await?;
/// println!("{}", roster.to_table()?.to_delimited(','));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NhlScraper {
    api: HttpClient,
    stats: HttpClient,
    records: HttpClient,
    reports: HttpClient,
    concurrency: usize,
    tolerance_secs: u32,
}

impl NhlScraper {
    /// One client per host family, all gated by a single rate limiter.
    pub fn new(config: &NhlConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit.qps, config.rate_limit.burst);
        let options = ClientOptions {
            connect_timeout: Duration::from_secs(config.http.connect_timeout_secs),
            user_agent: config.http.user_agent.clone(),
        };
        let client = |base: &str| -> Result<HttpClient> {
            Ok(HttpClient::with_options(base, options.clone())?
                .with_timeout(Duration::from_secs(config.http.timeout_secs))
                .with_retries(config.http.max_retries)
                .with_rate_limiter(limiter.clone()))
        };
        Ok(Self {
            api: client(&config.endpoints.api_web)?,
            stats: client(&config.endpoints.stats)?,
            records: client(&config.endpoints.records)?,
            reports: client(&config.endpoints.reports)?,
            concurrency: config.concurrency.max(1),
            tolerance_secs: config.merge.tolerance_secs,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(&NhlConfig::default())
    }

    /// Build from the default config file (if any) plus the `NHL_` environment.
    pub fn from_default_config() -> Result<Self> {
        let config = NhlConfigLoader::new().with_default_file().load()?;
        Self::new(&config)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn client(&self, family: Family) -> &HttpClient {
        match family {
            Family::ApiWeb => &self.api,
            Family::Stats => &self.stats,
            Family::Records => &self.records,
            Family::Reports => &self.reports,
        }
    }

    async fn json<T: DeserializeOwned>(&self, ep: &Endpoint) -> Result<T> {
        Ok(self.client(ep.family).get_json(&ep.path, ep.opts()).await?)
    }

    async fn text(&self, ep: &Endpoint) -> Result<String> {
        Ok(self.client(ep.family).get_text(&ep.path, ep.opts()).await?)
    }

    // ---------- teams ----------

    pub async fn scrape_teams(&self) -> Result<Dataset<Franchise>> {
        started("teams", "all");
        let ep = endpoints::franchises();
        let resp: FranchiseResponse = self.json(&ep).await?;
        Ok(done("teams", "all", ep.family.source(), extract::franchises(resp.data)))
    }

    pub async fn scrape_active_teams(&self) -> Result<Dataset<ActiveTeam>> {
        started("active_teams", "now");
        let ep = endpoints::schedule_calendar();
        let resp: ScheduleCalendar = self.json(&ep).await?;
        let teams = resp.teams.ok_or_else(|| ScrapeError::missing(&ep.path, "teams"))?;
        Ok(done("active_teams", "now", ep.family.source(), extract::active_teams(teams)))
    }

    pub async fn scrape_schedule(
        &self,
        team: &TeamAbbrev,
        season: Season,
    ) -> Result<Dataset<ScheduleGame>> {
        started("schedule", team);
        let ep = endpoints::club_schedule(team, season);
        let resp: ClubSchedule = self.json(&ep).await?;
        let games = extract::schedule_games(resp.games.unwrap_or_default(), team.as_str());
        Ok(done("schedule", team, ep.family.source(), games))
    }

    pub async fn scrape_team_roster(
        &self,
        team: &TeamAbbrev,
        season: Season,
    ) -> Result<Dataset<RosterPlayer>> {
        started("team_roster", team);
        let ep = endpoints::roster(team, season);
        let groups: RosterGroups = self.json(&ep).await?;
        let players = extract::roster_players(groups, team.as_str(), Some(season.to_string()));
        Ok(done("team_roster", team, ep.family.source(), players))
    }

    pub async fn scrape_team_rosters(
        &self,
        teams: Vec<TeamAbbrev>,
        season: Season,
    ) -> BatchOutcome<TeamAbbrev, Dataset<RosterPlayer>> {
        self.batch(teams, |team| async move { self.scrape_team_roster(&team, season).await })
            .await
    }

    pub async fn scrape_team_stats(
        &self,
        team: &TeamAbbrev,
        season: Season,
        session: SessionType,
    ) -> Result<TeamStats> {
        started("team_stats", team);
        let ep = endpoints::club_stats(team, season, session);
        let stats: ClubStats = self.json(&ep).await?;
        let season = season.to_string();
        let source = ep.family.source();
        let skaters = extract::skater_lines(stats.skaters, team.as_str(), &season, session);
        let goalies = extract::goalie_lines(stats.goalies, team.as_str(), &season, session);
        tracing::info!(
            op = "team_stats",
            key = %team,
            skaters = skaters.len(),
            goalies = goalies.len(),
            "scrape.done"
        );
        Ok(TeamStats {
            skaters: Dataset::new(source, skaters),
            goalies: Dataset::new(source, goalies),
        })
    }

    pub async fn scrape_team_prospects(&self, team: &TeamAbbrev) -> Result<Dataset<RosterPlayer>> {
        started("team_prospects", team);
        let ep = endpoints::prospects(team);
        let groups: RosterGroups = self.json(&ep).await?;
        let players = extract::roster_players(groups, team.as_str(), None);
        Ok(done("team_prospects", team, ep.family.source(), players))
    }

    /// Every pick a franchise has made, from the Records API.
    pub async fn scrape_team_draft_history(
        &self,
        franchise_id: u32,
    ) -> Result<Dataset<LegacyDraftPick>> {
        started("team_draft_history", franchise_id);
        let ep = endpoints::franchise_draft_history(franchise_id);
        let page: RecordsPage<WireRecordsDraftPick> = self.json(&ep).await?;
        let rows = page.data.ok_or_else(|| ScrapeError::missing(&ep.path, "data"))?;
        let picks = extract::legacy_draft_picks(rows);
        Ok(done("team_draft_history", franchise_id, ep.family.source(), picks))
    }

    /// Every team each franchise has fielded, with conference and seasons.
    pub async fn scrape_team_details(&self) -> Result<Dataset<TeamDetail>> {
        started("team_details", "all");
        let ep = endpoints::franchise_teams();
        let page: RecordsPage<WireRecordsFranchise> = self.json(&ep).await?;
        let rows = page.data.ok_or_else(|| ScrapeError::missing(&ep.path, "data"))?;
        Ok(done("team_details", "all", ep.family.source(), extract::team_details(rows)))
    }

    /// Active AHL and ECHL affiliations of every NHL team.
    pub async fn scrape_team_affiliates(&self) -> Result<Dataset<TeamAffiliate>> {
        started("team_affiliates", "active");
        let ep = endpoints::team_affiliates();
        let page: RecordsPage<WireTeamAffiliate> = self.json(&ep).await?;
        let rows = page.data.ok_or_else(|| ScrapeError::missing(&ep.path, "data"))?;
        let affiliates = extract::team_affiliates(rows);
        Ok(done("team_affiliates", "active", ep.family.source(), affiliates))
    }

    /// Everyone who has dressed for a team, keyed by its Records API id.
    pub async fn scrape_team_roster_legacy(
        &self,
        team_id: u32,
    ) -> Result<Dataset<LegacyRosterPlayer>> {
        started("team_roster_legacy", team_id);
        let ep = endpoints::records_roster(team_id);
        let page: RecordsPage<WireRecordsRosterPlayer> = self.json(&ep).await?;
        let rows = page.data.ok_or_else(|| ScrapeError::missing(&ep.path, "data"))?;
        let players = extract::legacy_roster(team_id, rows);
        Ok(done("team_roster_legacy", team_id, ep.family.source(), players))
    }

    // ---------- draft ----------

    pub async fn scrape_draft(
        &self,
        year: DraftYear,
        round: DraftRound,
    ) -> Result<Dataset<DraftPick>> {
        started("draft", year);
        let ep = endpoints::draft_picks(year, round);
        let resp: DraftPicks = self.json(&ep).await?;
        let picks = resp.picks.ok_or_else(|| ScrapeError::missing(&ep.path, "picks"))?;
        Ok(done("draft", year, ep.family.source(), extract::draft_picks(year.get(), picks)))
    }

    pub async fn scrape_draft_legacy(&self, year: DraftYear) -> Result<Dataset<LegacyDraftPick>> {
        started("draft_legacy", year);
        let ep = endpoints::records_draft(year);
        let page: RecordsPage<WireRecordsDraftPick> = self.json(&ep).await?;
        let rows = page.data.ok_or_else(|| ScrapeError::missing(&ep.path, "data"))?;
        if let Some(total) = page.total {
            if total as usize > rows.len() {
                tracing::warn!(year = %year, total, returned = rows.len(), "scrape.draft_legacy.truncated");
            }
        }
        let picks = extract::legacy_draft_picks(rows);
        Ok(done("draft_legacy", year, ep.family.source(), picks))
    }

    pub async fn scrape_rankings(
        &self,
        year: DraftYear,
        category: RankingCategory,
    ) -> Result<Dataset<DraftRanking>> {
        started("rankings", year);
        let ep = endpoints::draft_rankings(year, category);
        let resp: DraftRankings = self.json(&ep).await?;
        let rows = resp.rankings.ok_or_else(|| ScrapeError::missing(&ep.path, "rankings"))?;
        let rankings = extract::rankings(year.get(), category, rows);
        Ok(done("rankings", year, ep.family.source(), rankings))
    }

    // ---------- players ----------

    async fn landing(&self, player: PlayerId) -> Result<(PlayerLanding, PlayerProfile)> {
        let landing: PlayerLanding = self.json(&endpoints::player_landing(player)).await?;
        let profile = extract::player_profile(player.get(), &landing);
        Ok((landing, profile))
    }

    pub async fn scrape_player_profile(&self, player: PlayerId) -> Result<Dataset<PlayerProfile>> {
        started("player_profile", player);
        let (_, profile) = self.landing(player).await?;
        Ok(done("player_profile", player, DataSource::NhlApi, vec![profile]))
    }

    /// One stat block of the landing page as flattened rows. `season` narrows
    /// [`PlayerStatKind::SeasonTotals`] and is ignored otherwise.
    pub async fn scrape_player_stats(
        &self,
        player: PlayerId,
        kind: PlayerStatKind,
        season: Option<Season>,
    ) -> Result<Dataset<Row>> {
        started("player_stats", player);
        let (landing, profile) = self.landing(player).await?;
        let rows = extract::player_stat_rows(&profile, &landing, kind, season.map(season_number))?;
        Ok(done("player_stats", player, DataSource::NhlApi, rows))
    }

    pub async fn scrape_player_game_log(
        &self,
        player: PlayerId,
        season: Season,
        session: SessionType,
    ) -> Result<Dataset<PlayerGameLogEntry>> {
        started("player_game_log", player);
        let ep = endpoints::player_game_log(player, season, session);
        let ((_, profile), log) =
            tokio::try_join!(self.landing(player), self.json::<GameLog>(&ep))?;
        let rows = log.game_log.ok_or_else(|| ScrapeError::missing(&ep.path, "gameLog"))?;
        let entries = extract::game_log(&profile, rows);
        Ok(done("player_game_log", player, ep.family.source(), entries))
    }

    // ---------- league ----------

    pub async fn scrape_league_standings(
        &self,
        date: StandingsDate,
    ) -> Result<Dataset<StandingsEntry>> {
        started("league_standings", date);
        let ep = endpoints::standings(date);
        let resp: Standings = self.json(&ep).await?;
        let rows = resp.standings.ok_or_else(|| ScrapeError::missing(&ep.path, "standings"))?;
        let label = match date {
            StandingsDate::Now => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            StandingsDate::On(_) => date.to_string(),
        };
        let table = extract::standings(&label, rows);
        Ok(done("league_standings", date, ep.family.source(), table))
    }

    // ---------- games ----------

    async fn wire_play_by_play(&self, game: GameId) -> Result<WirePlayByPlay> {
        self.json(&endpoints::play_by_play(game)).await
    }

    async fn wire_shifts(&self, game: GameId) -> Result<ShiftCharts> {
        self.json(&endpoints::shift_charts(game)).await
    }

    async fn report(&self, game: GameId, kind: ReportKind) -> Result<String> {
        self.text(&endpoints::report(game, kind)).await
    }

    /// API play-by-play only: processed events plus the game header.
    pub async fn scrape_game_play_by_play(&self, game: GameId) -> Result<PlayByPlay> {
        started("game_play_by_play", game);
        let wire = self.wire_play_by_play(game).await?;
        let info = extract::game_info(&wire);
        let mut events = extract::play_events(&wire)?;
        sort_events(&mut events);
        fill_running_totals(&mut events);
        tracing::info!(op = "game_play_by_play", key = %game, records = events.len(), "scrape.done");
        Ok(PlayByPlay {
            game: info,
            events: Dataset::new(DataSource::NhlApi, events),
        })
    }

    /// API events merged with the `PL` report. Falls back to API-only events
    /// when the report cannot be fetched or parsed.
    pub async fn scrape_pbp(&self, game: GameId) -> Result<PlayByPlay> {
        started("pbp", game);
        let (wire, report) = tokio::join!(
            self.wire_play_by_play(game),
            self.report(game, ReportKind::PlayByPlay)
        );
        let pbp = self.merged_play_by_play(game, &wire?, report)?;
        tracing::info!(op = "pbp", key = %game, records = pbp.events.len(), "scrape.done");
        Ok(pbp)
    }

    fn merged_play_by_play(
        &self,
        game: GameId,
        wire: &WirePlayByPlay,
        report: Result<String>,
    ) -> Result<PlayByPlay> {
        let info = extract::game_info(wire);
        let api = extract::play_events(wire)?;
        let parsed = report.and_then(|html| Ok(parse_play_by_play(&html)?));
        let events = match parsed {
            Ok(report) => {
                let rosters = extract::game_rosters(wire);
                merge_events(api, &report, &info, &rosters, self.tolerance_secs)
            }
            Err(err) => {
                tracing::warn!(game = %game, error = %err, "scrape.pbp.report_unavailable");
                let mut api = api;
                sort_events(&mut api);
                fill_running_totals(&mut api);
                api
            }
        };
        Ok(PlayByPlay {
            game: info,
            events: Dataset::new(DataSource::NhlApi, events),
        })
    }

    /// Both time-on-ice reports: shifts plus per-period summaries.
    pub async fn scrape_toi(&self, game: GameId) -> Result<TimeOnIce> {
        started("toi", game);
        let (home, away) = tokio::try_join!(
            self.report(game, ReportKind::HomeTimeOnIce),
            self.report(game, ReportKind::AwayTimeOnIce)
        )?;
        let home = parse_time_on_ice(&home)?;
        let away = parse_time_on_ice(&away)?;
        let toi = time_on_ice(game, &home, &away, None);
        tracing::info!(
            op = "toi",
            key = %game,
            shifts = toi.shifts.len(),
            summaries = toi.summaries.len(),
            "scrape.done"
        );
        Ok(toi)
    }

    /// Shift-chart shifts joined to the game roster.
    pub async fn scrape_game_shifts(&self, game: GameId) -> Result<Dataset<Shift>> {
        started("game_shifts", game);
        let (wire, charts) = tokio::try_join!(self.wire_play_by_play(game), self.wire_shifts(game))?;
        let info = extract::game_info(&wire);
        let rosters = extract::game_rosters(&wire);
        let shifts = extract::api_shifts(&info, charts.data, &rosters)?;
        Ok(done("game_shifts", game, DataSource::NhlStatsApi, shifts))
    }

    /// Shifts read from the `TH`/`TV` reports.
    pub async fn scrape_game_shifts_legacy(&self, game: GameId) -> Result<Dataset<Shift>> {
        Ok(self.scrape_toi(game).await?.shifts)
    }

    pub async fn scrape_game_rosters(&self, game: GameId) -> Result<Dataset<GameRosterSpot>> {
        started("game_rosters", game);
        let wire = self.wire_play_by_play(game).await?;
        Ok(done(
            "game_rosters",
            game,
            DataSource::NhlApi,
            extract::game_rosters(&wire),
        ))
    }

    /// Merged play-by-play, rosters and shifts. Shifts come from the shift
    /// charts and fall back to the time-on-ice reports when those are empty
    /// or unavailable.
    pub async fn scrape_game_complete(&self, game: GameId) -> Result<GameComplete> {
        started("game_complete", game);
        let (wire, report, charts) = tokio::join!(
            self.wire_play_by_play(game),
            self.report(game, ReportKind::PlayByPlay),
            self.wire_shifts(game)
        );
        let wire = wire?;
        let play_by_play = self.merged_play_by_play(game, &wire, report)?;
        let rosters = extract::game_rosters(&wire);

        let api_shifts = charts.and_then(|c| {
            Ok(extract::api_shifts(&play_by_play.game, c.data, &rosters)?)
        });
        let shifts = match api_shifts {
            Ok(shifts) => Dataset::new(DataSource::NhlStatsApi, shifts),
            Err(err) => {
                tracing::warn!(game = %game, error = %err, "scrape.game_complete.legacy_shifts");
                let (home, away) = tokio::try_join!(
                    self.report(game, ReportKind::HomeTimeOnIce),
                    self.report(game, ReportKind::AwayTimeOnIce)
                )?;
                let home = parse_time_on_ice(&home)?;
                let away = parse_time_on_ice(&away)?;
                time_on_ice(game, &home, &away, Some(&play_by_play.game)).shifts
            }
        };

        tracing::info!(
            op = "game_complete",
            key = %game,
            events = play_by_play.events.len(),
            rosters = rosters.len(),
            shifts = shifts.len(),
            "scrape.done"
        );
        Ok(GameComplete {
            play_by_play,
            rosters: Dataset::new(DataSource::NhlApi, rosters),
            shifts,
        })
    }

    // ---------- batches ----------

    /// Run `f` for each id with at most `concurrency` in flight.
    pub async fn batch<K, T, F, Fut>(&self, ids: Vec<K>, f: F) -> BatchOutcome<K, T>
    where
        K: Clone + Display,
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        run_batch(ids, self.concurrency, f).await
    }

    pub async fn scrape_games_pbp(&self, games: Vec<GameId>) -> BatchOutcome<GameId, PlayByPlay> {
        self.batch(games, |game| self.scrape_pbp(game)).await
    }

    pub async fn scrape_schedules(
        &self,
        teams: Vec<TeamAbbrev>,
        season: Season,
    ) -> BatchOutcome<TeamAbbrev, Dataset<ScheduleGame>> {
        self.batch(teams, |team| async move { self.scrape_schedule(&team, season).await })
            .await
    }
}

fn season_number(season: Season) -> u32 {
    u32::from(season.start_year()) * 10_000 + u32::from(season.end_year())
}

/// Shifts and summaries of both reports. With a game header the shifts also
/// carry team abbreviations.
fn time_on_ice(
    game: GameId,
    home: &ToiReport,
    away: &ToiReport,
    info: Option<&GameInfo>,
) -> TimeOnIce {
    let season = game.report_season().to_string();
    let home_side = ReportSide {
        game_id: game.as_u64(),
        season: &season,
        is_home: true,
        team_abbrev: info.map(|g| g.home_team.abbrev.as_str()),
    };
    let away_side = ReportSide {
        game_id: game.as_u64(),
        season: &season,
        is_home: false,
        team_abbrev: info.map(|g| g.away_team.abbrev.as_str()),
    };

    let mut shifts = extract::report_shifts(&home_side, home);
    shifts.extend(extract::report_shifts(&away_side, away));
    extract::sort_report_shifts(&mut shifts);

    let mut summaries = extract::toi_summaries(&home_side, home);
    summaries.extend(extract::toi_summaries(&away_side, away));

    TimeOnIce {
        shifts: Dataset::new(DataSource::NhlHtmlReports, shifts),
        summaries: Dataset::new(DataSource::NhlHtmlReports, summaries),
    }
}

fn started(op: &'static str, key: impl Display) {
    tracing::info!(op, key = %key, "scrape.start");
}

fn done<T>(op: &'static str, key: impl Display, source: DataSource, records: Vec<T>) -> Dataset<T> {
    tracing::info!(op, key = %key, records = records.len(), "scrape.done");
    Dataset::new(source, records)
}
