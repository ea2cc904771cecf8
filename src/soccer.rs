//! The SportMonks soccer API v2.0 endpoint catalog: one thin method per API
//! path, all funneled through the fetch engine in `crate::fetch`.
//!
//! Identifier lookups for the small, stable tables (continents, countries,
//! leagues, bookmakers, markets) go through the client's identifier cache;
//! volatile resources (fixtures, teams, players, ...) are fetched directly.

use chrono::NaiveDate;
use log::info;
use serde_json::Value;

use crate::client::SoccerClient;
use crate::error::{Result, SportmonksError};
use crate::query::{csv, ForeignKeyFilter, Includes, Query};
use crate::Record;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Attach the league filter parameter plus the client-side post-filter that
/// compensates for the API dropping the filter beyond page 1.
fn league_filtered(query: Query, league_ids: Option<&[i64]>) -> Query {
    match league_ids {
        Some(ids) if !ids.is_empty() => query
            .param("leagues", csv(ids))
            .post_filter(ForeignKeyFilter::new("league_id", ids.iter().copied())),
        _ => query,
    }
}

fn market_params(query: Query, market_ids: Option<&[i64]>, bookmaker_ids: Option<&[i64]>) -> Query {
    let query = match market_ids {
        Some(ids) if !ids.is_empty() => query.param("markets", csv(ids)),
        _ => query,
    };
    match bookmaker_ids {
        Some(ids) if !ids.is_empty() => query.param("bookmakers", csv(ids)),
        _ => query,
    }
}

impl SoccerClient {
    /// Return all continents. `api/v2.0/continents`
    pub async fn all_continents(&self, includes: impl Into<Includes>) -> Result<Vec<Record>> {
        let continents = self
            .get_records(Query::new("continents").includes(includes))
            .await?;
        info!("fetched {} continents", continents.len());
        Ok(continents)
    }

    /// Return a continent. `api/v2.0/continents/{id}`
    ///
    /// Served from the identifier cache after the first call with the same
    /// include set.
    pub async fn continent_by_id(
        &self,
        continent_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.lookup("continents", continent_id, includes.into()).await
    }

    /// Return all countries. `api/v2.0/countries`
    pub async fn all_countries(&self, includes: impl Into<Includes>) -> Result<Vec<Record>> {
        let countries = self
            .get_records(Query::new("countries").includes(includes))
            .await?;
        info!("fetched {} countries", countries.len());
        Ok(countries)
    }

    /// Return a country. `api/v2.0/countries/{id}`
    pub async fn country_by_id(
        &self,
        country_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.lookup("countries", country_id, includes.into()).await
    }

    /// Return all leagues. `api/v2.0/leagues`
    ///
    /// The `season` include returns the current season of the league; the
    /// `seasons` include returns all of them.
    pub async fn all_leagues(&self, includes: impl Into<Includes>) -> Result<Vec<Record>> {
        let leagues = self
            .get_records(Query::new("leagues").includes(includes))
            .await?;
        info!("fetched {} leagues", leagues.len());
        Ok(leagues)
    }

    /// Return a league. `api/v2.0/leagues/{id}`
    pub async fn league_by_id(
        &self,
        league_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.lookup("leagues", league_id, includes.into()).await
    }

    /// Return all seasons. `api/v2.0/seasons`
    pub async fn all_seasons(&self, includes: impl Into<Includes>) -> Result<Vec<Record>> {
        let seasons = self
            .get_records(Query::new("seasons").includes(includes))
            .await?;
        info!("fetched {} seasons", seasons.len());
        Ok(seasons)
    }

    /// Return a season. `api/v2.0/seasons/{id}`
    pub async fn season_by_id(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.get_record(Query::new(format!("seasons/{season_id}")).includes(includes))
            .await
    }

    /// Return completed fixtures of a season, via the season's `results`
    /// include. Nested includes are requested with `results.`-prefixed names.
    pub async fn season_results(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        let includes: Includes = includes.into();
        let nested: Includes = std::iter::once("results".to_string())
            .chain(includes.names().iter().map(|name| format!("results.{name}")))
            .collect();

        let mut season = self.season_by_id(season_id, nested).await?;
        match season.remove("results") {
            Some(Value::Array(results)) => results
                .into_iter()
                .map(|r| match r {
                    Value::Object(record) => Ok(record),
                    other => Err(SportmonksError::malformed(format!(
                        "season result is not an object: {other}"
                    ))),
                })
                .collect(),
            Some(other) => Err(SportmonksError::malformed(format!(
                "`results` include is not a list: {other}"
            ))),
            None => Ok(Vec::new()),
        }
    }

    /// Return a fixture. `api/v2.0/fixtures/{id}`
    pub async fn fixture_by_id(
        &self,
        fixture_id: u64,
        includes: impl Into<Includes>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Record> {
        let query = market_params(
            Query::new(format!("fixtures/{fixture_id}")),
            market_ids,
            bookmaker_ids,
        );
        self.get_record(query.includes(includes)).await
    }

    /// Return fixtures played at `date`. `api/v2.0/fixtures/date/{date}`
    ///
    /// `market_ids` and `bookmaker_ids` restrict the embedded odds, defaulting
    /// to all markets and all bookmakers.
    pub async fn fixtures_at(
        &self,
        date: NaiveDate,
        includes: impl Into<Includes>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = market_params(
            Query::new(format!("fixtures/date/{}", date.format(DATE_FORMAT))),
            market_ids,
            bookmaker_ids,
        );
        let fixtures = self.get_records(query.includes(includes)).await?;
        info!("fetched {} fixtures at {date}", fixtures.len());
        Ok(fixtures)
    }

    /// Return fixtures between two inclusive dates.
    /// `api/v2.0/fixtures/between/{from}/{to}`
    ///
    /// `league_ids` restricts the leagues; the restriction is also enforced
    /// client-side because the API over-returns on pages after the first.
    pub async fn fixtures_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(
            Query::new(format!(
                "fixtures/between/{}/{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )),
            league_ids,
        );
        let query = market_params(query, market_ids, bookmaker_ids);
        let fixtures = self.get_records(query.includes(includes)).await?;
        info!("fetched {} fixtures between {start} and {end}", fixtures.len());
        Ok(fixtures)
    }

    /// Return fixtures between two inclusive dates for one team.
    /// `api/v2.0/fixtures/between/{from}/{to}/{team}`
    pub async fn fixtures_between_by_team_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team_id: u64,
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(
            Query::new(format!(
                "fixtures/between/{}/{}/{team_id}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )),
            league_ids,
        );
        let query = market_params(query, market_ids, bookmaker_ids);
        self.get_records(query.includes(includes)).await
    }

    /// Return fixtures between two inclusive dates for one season.
    /// `api/v2.0/fixtures/season/{id}/between/{from}/{to}`
    pub async fn fixtures_between_by_season_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        season_id: u64,
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(
            Query::new(format!(
                "fixtures/season/{season_id}/between/{}/{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )),
            league_ids,
        );
        let query = market_params(query, market_ids, bookmaker_ids);
        let fixtures = self.get_records(query.includes(includes)).await?;
        info!(
            "fetched {} fixtures of season {season_id} between {start} and {end}",
            fixtures.len()
        );
        Ok(fixtures)
    }

    /// Return multiple fixtures by id. `api/v2.0/fixtures/multi/{ids}`
    pub async fn fixtures_by_multiple_ids(
        &self,
        fixture_ids: &[u64],
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(
            Query::new(format!("fixtures/multi/{}", csv(fixture_ids))),
            league_ids,
        );
        let query = market_params(query, market_ids, bookmaker_ids);
        self.get_records(query.includes(includes)).await
    }

    /// Return today's fixtures, played and to be played.
    /// `api/v2.0/livescores`
    pub async fn fixtures_today(
        &self,
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(Query::new("livescores"), league_ids);
        let query = market_params(query, market_ids, bookmaker_ids);
        let fixtures = self.get_records(query.includes(includes)).await?;
        info!("fetched {} fixtures today", fixtures.len());
        Ok(fixtures)
    }

    /// Return in-play fixtures: currently played, starting within 45
    /// minutes, or ended less than 30 minutes ago. `api/v2.0/livescores/now`
    pub async fn fixtures_in_play(
        &self,
        includes: impl Into<Includes>,
        league_ids: Option<&[i64]>,
        market_ids: Option<&[i64]>,
        bookmaker_ids: Option<&[i64]>,
    ) -> Result<Vec<Record>> {
        let query = league_filtered(Query::new("livescores/now"), league_ids);
        let query = market_params(query, market_ids, bookmaker_ids);
        let fixtures = self.get_records(query.includes(includes)).await?;
        info!("fetched {} fixtures in play", fixtures.len());
        Ok(fixtures)
    }

    /// Return all head-to-head fixtures of two teams.
    /// `api/v2.0/head2head/{team_id_1}/{team_id_2}`
    pub async fn head_to_head(
        &self,
        team_id_1: u64,
        team_id_2: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("head2head/{team_id_1}/{team_id_2}")).includes(includes))
            .await
    }

    /// Return commentaries of a fixture; fixtures without commentaries yield
    /// an empty list. `api/v2.0/commentaries/fixture/{id}`
    pub async fn commentaries_by_fixture_id(&self, fixture_id: u64) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("commentaries/fixture/{fixture_id}")))
            .await
    }

    /// Return links to video highlights of all fixtures.
    /// `api/v2.0/highlights`
    pub async fn all_video_highlights(&self, includes: impl Into<Includes>) -> Result<Vec<Record>> {
        self.get_records(Query::new("highlights").includes(includes))
            .await
    }

    /// Return links to video highlights of one fixture.
    /// `api/v2.0/highlights/fixture/{id}`
    pub async fn video_highlights_by_fixture_id(
        &self,
        fixture_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("highlights/fixture/{fixture_id}")).includes(includes))
            .await
    }

    /// Return standings of a season. `api/v2.0/standings/season/{id}`
    pub async fn standings_by_season_id(
        &self,
        season_id: u64,
        group_id: Option<u64>,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        let mut query = Query::new(format!("standings/season/{season_id}"));
        if let Some(group_id) = group_id {
            query = query.param("group_id", group_id.to_string());
        }
        self.get_records(query.includes(includes)).await
    }

    /// Return standings that take in-play fixtures into account.
    /// `api/v2.0/standings/season/live/{id}`
    pub async fn live_standings_by_season_id(
        &self,
        season_id: u64,
        group_id: Option<u64>,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        let mut query = Query::new(format!("standings/season/live/{season_id}"));
        if let Some(group_id) = group_id {
            query = query.param("group_id", group_id.to_string());
        }
        self.get_records(query.includes(includes)).await
    }

    /// Return a team. `api/v2.0/teams/{id}`
    pub async fn team_by_id(&self, team_id: u64, includes: impl Into<Includes>) -> Result<Record> {
        self.get_record(Query::new(format!("teams/{team_id}")).includes(includes))
            .await
    }

    /// Return all teams of a season. `api/v2.0/teams/season/{id}`
    pub async fn teams_by_season_id(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        let teams = self
            .get_records(Query::new(format!("teams/season/{season_id}")).includes(includes))
            .await?;
        info!("fetched {} teams of season {season_id}", teams.len());
        Ok(teams)
    }

    /// Return the stats of a team, unnested from its `stats` include.
    pub async fn team_stats(&self, team_id: u64) -> Result<Value> {
        let mut team = self.team_by_id(team_id, "stats").await?;
        team.remove("stats")
            .ok_or_else(|| SportmonksError::malformed("team record carries no `stats` include"))
    }

    /// Return top scorers of a season. `api/v2.0/topscorers/season/{id}`
    pub async fn top_scorers_by_season_id(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.get_record(Query::new(format!("topscorers/season/{season_id}")).includes(includes))
            .await
    }

    /// Return a venue. `api/v2.0/venues/{id}`
    pub async fn venue_by_id(&self, venue_id: u64) -> Result<Record> {
        self.get_record(Query::new(format!("venues/{venue_id}"))).await
    }

    /// Return the venues used in a season. `api/v2.0/venues/season/{id}`
    pub async fn venues_by_season_id(&self, season_id: u64) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("venues/season/{season_id}")))
            .await
    }

    /// Return a round. `api/v2.0/rounds/{id}`
    pub async fn round_by_id(&self, round_id: u64, includes: impl Into<Includes>) -> Result<Record> {
        self.get_record(Query::new(format!("rounds/{round_id}")).includes(includes))
            .await
    }

    /// Return the rounds of a season. `api/v2.0/rounds/season/{id}`
    pub async fn rounds_by_season_id(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("rounds/season/{season_id}")).includes(includes))
            .await
    }

    /// Return pre-match odds of a fixture, optionally restricted to one
    /// bookmaker or one market. `api/v2.0/odds/fixture/{id}[...]`
    pub async fn pre_match_odds(
        &self,
        fixture_id: u64,
        bookmaker_id: Option<u64>,
        market_id: Option<u64>,
    ) -> Result<Vec<Record>> {
        let path = match (bookmaker_id, market_id) {
            (Some(bookmaker_id), _) => {
                format!("odds/fixture/{fixture_id}/bookmaker/{bookmaker_id}")
            }
            (None, Some(market_id)) => format!("odds/fixture/{fixture_id}/market/{market_id}"),
            (None, None) => format!("odds/fixture/{fixture_id}"),
        };
        self.get_records(Query::new(path)).await
    }

    /// Return in-play odds of a fixture, or of all live fixtures when no
    /// fixture is given. `api/v2.0/odds/inplay/...`
    pub async fn in_play_odds(&self, fixture_id: Option<u64>) -> Result<Vec<Record>> {
        let path = match fixture_id {
            Some(fixture_id) => format!("odds/inplay/fixture/{fixture_id}"),
            None => "odds/inplay/live".to_string(),
        };
        self.get_records(Query::new(path)).await
    }

    /// Return a player. `api/v2.0/players/{id}`
    pub async fn player_by_id(
        &self,
        player_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Record> {
        self.get_record(Query::new(format!("players/{player_id}")).includes(includes))
            .await
    }

    /// Return the squad of a team in a season.
    /// `api/v2.0/squad/season/{season_id}/team/{team_id}`
    pub async fn squad_by_season_and_team_id(
        &self,
        season_id: u64,
        team_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        self.get_records(
            Query::new(format!("squad/season/{season_id}/team/{team_id}")).includes(includes),
        )
        .await
    }

    /// Return a stage. `api/v2.0/stages/{id}`
    pub async fn stage_by_id(&self, stage_id: u64, includes: impl Into<Includes>) -> Result<Record> {
        self.get_record(Query::new(format!("stages/{stage_id}")).includes(includes))
            .await
    }

    /// Return the stages of a season. `api/v2.0/stages/season/{id}`
    pub async fn stages_by_season_id(
        &self,
        season_id: u64,
        includes: impl Into<Includes>,
    ) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("stages/season/{season_id}")).includes(includes))
            .await
    }

    /// Return the TV stations broadcasting a fixture.
    /// `api/v2.0/tvstations/fixture/{id}`
    pub async fn tv_stations_by_fixture_id(&self, fixture_id: u64) -> Result<Vec<Record>> {
        self.get_records(Query::new(format!("tvstations/fixture/{fixture_id}")))
            .await
    }

    /// Return all bookmakers. `api/v2.0/bookmakers`
    pub async fn all_bookmakers(&self) -> Result<Vec<Record>> {
        let bookmakers = self.get_records(Query::new("bookmakers")).await?;
        info!("fetched {} bookmakers", bookmakers.len());
        Ok(bookmakers)
    }

    /// Return a bookmaker. `api/v2.0/bookmakers/{id}`
    pub async fn bookmaker_by_id(&self, bookmaker_id: u64) -> Result<Record> {
        self.lookup("bookmakers", bookmaker_id, Includes::none()).await
    }

    /// Return all betting markets. `api/v2.0/markets`
    pub async fn all_markets(&self) -> Result<Vec<Record>> {
        let markets = self.get_records(Query::new("markets")).await?;
        info!("fetched {} markets", markets.len());
        Ok(markets)
    }

    /// Return a betting market. `api/v2.0/markets/{id}`
    pub async fn market_by_id(&self, market_id: u64) -> Result<Record> {
        self.lookup("markets", market_id, Includes::none()).await
    }

    /// Return a coach. `api/v2.0/coaches/{id}`
    pub async fn coach_by_id(&self, coach_id: u64) -> Result<Record> {
        self.get_record(Query::new(format!("coaches/{coach_id}"))).await
    }
}
